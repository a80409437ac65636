//! Restricted two-stage aggregation over collection snapshots.

use serde_json::Value;

use crate::types::{AggregateResult, Document, GroupCount, Pipeline};

/// Execute `pipeline` against a snapshot: an optional single-field
/// equality match, then an optional group-and-count. With no group stage
/// the matched documents come back unchanged.
pub fn run(docs: Vec<Document>, pipeline: &Pipeline) -> AggregateResult {
  let matched: Vec<Document> = match &pipeline.match_field {
    Some((field, value)) => docs
      .into_iter()
      .filter(|doc| doc.get(field) == Some(value))
      .collect(),
    None => docs,
  };

  let Some(group_by) = &pipeline.group_by else {
    return AggregateResult::Documents(matched);
  };

  // Groups keep first-seen order; a missing field groups under null.
  let mut groups: Vec<GroupCount> = Vec::new();
  for doc in &matched {
    let key = doc.get(group_by).cloned().unwrap_or(Value::Null);
    match groups.iter_mut().find(|group| group.key == key) {
      Some(group) => group.count += 1,
      None => groups.push(GroupCount { key, count: 1 }),
    }
  }
  AggregateResult::Groups(groups)
}
