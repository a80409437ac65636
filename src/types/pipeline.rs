use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::document::Document;

/// The restricted aggregation pipeline: at most one single-field equality
/// match followed by at most one group-and-count. `$match` and `$group`
/// are the only stage kinds; anything else is rejected when parsing.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
  pub(crate) match_field: Option<(String, Value)>,
  pub(crate) group_by: Option<String>,
}

/// One group summary: the distinct value and how many documents share it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupCount {
  #[serde(rename = "_id")]
  pub key: Value,
  pub count: u64,
}

/// Result of running a pipeline: group summaries when a group stage was
/// given, the matched documents unchanged otherwise.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AggregateResult {
  Groups(Vec<GroupCount>),
  Documents(Vec<Document>),
}

impl AggregateResult {
  pub fn into_groups(self) -> Vec<GroupCount> {
    match self {
      AggregateResult::Groups(groups) => groups,
      AggregateResult::Documents(_) => Vec::new(),
    }
  }

  pub fn into_documents(self) -> Vec<Document> {
    match self {
      AggregateResult::Documents(docs) => docs,
      AggregateResult::Groups(_) => Vec::new(),
    }
  }
}

#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
  #[error("unsupported pipeline stage: {0}")]
  UnsupportedStage(String),
  #[error("duplicate {0} stage")]
  DuplicateStage(&'static str),
  #[error("$match must name exactly one field")]
  InvalidMatch,
  #[error("$group _id must reference a field as \"$name\"")]
  InvalidGroupKey,
}

impl Pipeline {
  pub fn new() -> Self {
    Self::default()
  }

  /// Keep only documents whose `field` equals `value`.
  pub fn match_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
    self.match_field = Some((field.into(), value.into()));
    self
  }

  /// Partition the surviving documents by `field` and count each group.
  pub fn group_by(mut self, field: impl Into<String>) -> Self {
    self.group_by = Some(field.into());
    self
  }

  /// Parse the wire shape, e.g.
  /// `[{"$match": {"user_id": "u1"}}, {"$group": {"_id": "$status"}}]`.
  /// Unknown stage kinds, duplicate stages, multi-field matches and
  /// malformed group keys are all hard errors rather than silently
  /// ignored.
  pub fn from_stages(stages: &[Value]) -> Result<Self, PipelineError> {
    let mut pipeline = Pipeline::default();
    for stage in stages {
      let Some(object) = stage.as_object() else {
        return Err(PipelineError::UnsupportedStage(stage.to_string()));
      };
      let mut keys = object.keys();
      let (Some(kind), None) = (keys.next(), keys.next()) else {
        return Err(PipelineError::UnsupportedStage(stage.to_string()));
      };

      match kind.as_str() {
        "$match" => {
          if pipeline.match_field.is_some() {
            return Err(PipelineError::DuplicateStage("$match"));
          }
          let Some(fields) = object[kind].as_object() else {
            return Err(PipelineError::InvalidMatch);
          };
          let mut entries = fields.iter();
          match (entries.next(), entries.next()) {
            (Some((field, value)), None) => {
              pipeline.match_field = Some((field.clone(), value.clone()));
            }
            _ => return Err(PipelineError::InvalidMatch),
          }
        }
        "$group" => {
          if pipeline.group_by.is_some() {
            return Err(PipelineError::DuplicateStage("$group"));
          }
          let key = object[kind]
            .get("_id")
            .and_then(|v| v.as_str())
            .and_then(|s| s.strip_prefix('$'))
            .filter(|s| !s.is_empty());
          match key {
            Some(field) => pipeline.group_by = Some(field.to_string()),
            None => return Err(PipelineError::InvalidGroupKey),
          }
        }
        other => return Err(PipelineError::UnsupportedStage(other.to_string())),
      }
    }
    Ok(pipeline)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn parse_match_and_group() {
    let pipeline = Pipeline::from_stages(&[
      json!({"$match": {"user_id": "u1"}}),
      json!({"$group": {"_id": "$status"}}),
    ])
    .unwrap();
    assert_eq!(
      pipeline.match_field,
      Some(("user_id".to_string(), json!("u1")))
    );
    assert_eq!(pipeline.group_by.as_deref(), Some("status"));
  }

  #[test]
  fn unknown_stage_is_rejected() {
    let err = Pipeline::from_stages(&[json!({"$lookup": {"from": "users"}})]).unwrap_err();
    assert_eq!(err, PipelineError::UnsupportedStage("$lookup".to_string()));
  }

  #[test]
  fn duplicate_stage_is_rejected() {
    let err = Pipeline::from_stages(&[
      json!({"$match": {"a": 1}}),
      json!({"$match": {"b": 2}}),
    ])
    .unwrap_err();
    assert_eq!(err, PipelineError::DuplicateStage("$match"));
  }

  #[test]
  fn multi_field_match_is_rejected() {
    let err = Pipeline::from_stages(&[json!({"$match": {"a": 1, "b": 2}})]).unwrap_err();
    assert_eq!(err, PipelineError::InvalidMatch);
  }

  #[test]
  fn group_key_must_be_field_reference() {
    let err = Pipeline::from_stages(&[json!({"$group": {"_id": "status"}})]).unwrap_err();
    assert_eq!(err, PipelineError::InvalidGroupKey);
  }

  #[test]
  fn group_count_serializes_with_mongo_key() {
    let group = GroupCount {
      key: json!("Applied"),
      count: 3,
    };
    assert_eq!(
      serde_json::to_value(&group).unwrap(),
      json!({"_id": "Applied", "count": 3})
    );
  }
}
