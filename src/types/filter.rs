use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A query predicate. Each key constrains one top-level document field,
/// either to an exact value or to an inclusive `$gte`/`$lte` range over
/// timestamp-comparable values. Nested paths are not supported; a document
/// matches iff every predicate is satisfied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter(HashMap<String, FieldPredicate>);

/// Condition on a single field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldPredicate {
  /// `{ "$gte": ..., "$lte": ... }` with either side optional.
  Range(Range),
  /// Any other value: strict equality, no type coercion.
  Value(Value),
}

/// Inclusive bounds. Bound values and the document field are interpreted
/// as timestamps (RFC 3339 strings or epoch milliseconds).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Range {
  #[serde(default, rename = "$gte", skip_serializing_if = "Option::is_none")]
  pub gte: Option<Value>,
  #[serde(default, rename = "$lte", skip_serializing_if = "Option::is_none")]
  pub lte: Option<Value>,
}

impl Filter {
  pub fn new() -> Self {
    Self::default()
  }

  /// Constrain `field` to exactly `value`.
  pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
    self
      .0
      .insert(field.into(), FieldPredicate::Value(value.into()));
    self
  }

  /// Constrain `field` to an inclusive range. `None` leaves that side
  /// open.
  pub fn between(
    mut self,
    field: impl Into<String>,
    gte: Option<Value>,
    lte: Option<Value>,
  ) -> Self {
    self
      .0
      .insert(field.into(), FieldPredicate::Range(Range { gte, lte }));
    self
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn predicates(&self) -> impl Iterator<Item = (&String, &FieldPredicate)> {
    self.0.iter()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn deserialize_equality_filter() {
    let filter: Filter = serde_json::from_value(json!({"status": "Applied"})).unwrap();
    assert_eq!(filter.predicates().count(), 1);
    let (_, predicate) = filter.predicates().next().unwrap();
    assert!(matches!(predicate, FieldPredicate::Value(_)));
  }

  #[test]
  fn deserialize_range_filter() {
    let filter: Filter = serde_json::from_value(json!({
      "deadline": {"$gte": "2024-01-01T00:00:00Z", "$lte": "2024-12-31T00:00:00Z"}
    }))
    .unwrap();
    let (_, predicate) = filter.predicates().next().unwrap();
    match predicate {
      FieldPredicate::Range(range) => {
        assert!(range.gte.is_some());
        assert!(range.lte.is_some());
      }
      FieldPredicate::Value(_) => panic!("expected a range predicate"),
    }
  }

  #[test]
  fn plain_objects_are_equality_predicates() {
    // An object without $gte/$lte is a literal to compare against.
    let filter: Filter =
      serde_json::from_value(json!({"prefs": {"deadline_alerts": true}})).unwrap();
    let (_, predicate) = filter.predicates().next().unwrap();
    assert!(matches!(predicate, FieldPredicate::Value(Value::Object(_))));
  }

  #[test]
  fn builder_matches_serde_shape() {
    let built = Filter::new().between(
      "deadline",
      Some(json!("2024-01-01T00:00:00Z")),
      None,
    );
    let json = serde_json::to_value(&built).unwrap();
    assert_eq!(json, json!({"deadline": {"$gte": "2024-01-01T00:00:00Z"}}));
  }
}
