//! Predicate evaluation against documents.

use serde_json::Value;

use crate::types::{as_timestamp, Document, FieldPredicate, Filter, Range};

/// Whether `doc` satisfies every predicate in `filter`. An empty filter
/// matches everything; a literal predicate on a field the document does
/// not carry never matches.
pub fn matches(doc: &Document, filter: &Filter) -> bool {
  filter
    .predicates()
    .all(|(field, predicate)| match predicate {
      FieldPredicate::Value(expected) => doc.get(field) == Some(expected),
      FieldPredicate::Range(range) => in_range(doc.get(field), range),
    })
}

/// Inclusive range check. Whenever a bound is present, both that bound and
/// the document field must be timestamp-comparable; a missing field or an
/// uninterpretable value fails the predicate.
fn in_range(value: Option<&Value>, range: &Range) -> bool {
  if range.gte.is_none() && range.lte.is_none() {
    return true;
  }
  let Some(actual) = value.and_then(as_timestamp) else {
    return false;
  };

  if let Some(bound) = &range.gte {
    match as_timestamp(bound) {
      Some(lo) if actual >= lo => {}
      _ => return false,
    }
  }
  if let Some(bound) = &range.lte {
    match as_timestamp(bound) {
      Some(hi) if actual <= hi => {}
      _ => return false,
    }
  }
  true
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn doc(value: Value) -> Document {
    serde_json::from_value(value).unwrap()
  }

  #[test]
  fn equality_is_strict() {
    let d = doc(json!({"count": 1}));
    assert!(matches(&d, &Filter::new().eq("count", 1)));
    // No coercion across types.
    assert!(!matches(&d, &Filter::new().eq("count", "1")));
    assert!(!matches(&d, &Filter::new().eq("count", 1.0)));
  }

  #[test]
  fn absent_field_never_matches_a_literal() {
    let d = doc(json!({"a": 1}));
    assert!(!matches(&d, &Filter::new().eq("b", 1)));
  }

  #[test]
  fn empty_filter_matches_everything() {
    assert!(matches(&doc(json!({})), &Filter::new()));
  }

  #[test]
  fn range_bounds_are_inclusive() {
    let d = doc(json!({"deadline": "2024-06-15T00:00:00.000Z"}));
    let exact = Filter::new().between(
      "deadline",
      Some(json!("2024-06-15T00:00:00.000Z")),
      Some(json!("2024-06-15T00:00:00.000Z")),
    );
    assert!(matches(&d, &exact));

    let before = Filter::new().between("deadline", Some(json!("2024-06-16T00:00:00Z")), None);
    assert!(!matches(&d, &before));

    let after = Filter::new().between("deadline", None, Some(json!("2024-06-14T00:00:00Z")));
    assert!(!matches(&d, &after));
  }

  #[test]
  fn range_accepts_epoch_millis() {
    let d = doc(json!({"deadline": 1_700_000_000_000_i64}));
    let filter = Filter::new().between(
      "deadline",
      Some(json!(1_600_000_000_000_i64)),
      Some(json!(1_800_000_000_000_i64)),
    );
    assert!(matches(&d, &filter));
  }

  #[test]
  fn range_on_missing_or_unparseable_field_fails() {
    let bound = Some(json!("2024-01-01T00:00:00Z"));
    let filter = Filter::new().between("deadline", bound.clone(), None);
    assert!(!matches(&doc(json!({})), &filter));
    assert!(!matches(&doc(json!({"deadline": "soonish"})), &filter));
  }

  #[test]
  fn predicates_combine_conjunctively() {
    let d = doc(json!({
      "user_id": "u1",
      "status": "Interview",
      "interview_date": "2024-06-15T10:00:00.000Z"
    }));
    let filter = Filter::new()
      .eq("user_id", "u1")
      .eq("status", "Interview")
      .between(
        "interview_date",
        Some(json!("2024-06-15T00:00:00Z")),
        Some(json!("2024-06-15T23:59:59Z")),
      );
    assert!(matches(&d, &filter));

    let wrong_user = Filter::new().eq("user_id", "u2").eq("status", "Interview");
    assert!(!matches(&d, &wrong_user));
  }
}
