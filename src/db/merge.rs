//! Partial-document updates.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::types::{timestamp_value, Document, CREATED_AT_FIELD, ID_FIELD, LAST_UPDATED_FIELD};

/// Produce the next version of `current` under `patch`: a shallow merge
/// with the patch winning field by field, then `last_updated` stamped to
/// `now`. `_id` and `createdAt` are identity fields and survive any patch,
/// including one that names them explicitly. Non-object patches contribute
/// nothing beyond the timestamp.
pub fn apply_patch(current: &Document, patch: &Value, now: DateTime<Utc>) -> Document {
  let mut next = current.clone();
  if let Value::Object(fields) = patch {
    for (field, value) in fields {
      if field == ID_FIELD || field == CREATED_AT_FIELD {
        continue;
      }
      next.set(field.clone(), value.clone());
    }
  }
  next.set(LAST_UPDATED_FIELD, timestamp_value(now));
  next
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn doc(value: Value) -> Document {
    serde_json::from_value(value).unwrap()
  }

  #[test]
  fn untouched_fields_survive() {
    let current = doc(json!({
      "_id": "1",
      "createdAt": "2024-01-01T00:00:00.000Z",
      "company_name": "Google",
      "role": "SWE"
    }));
    let updated = apply_patch(&current, &json!({"role": "SRE"}), Utc::now());

    assert_eq!(updated.get_str("company_name"), Some("Google"));
    assert_eq!(updated.get_str("role"), Some("SRE"));
  }

  #[test]
  fn identity_fields_are_immutable() {
    let current = doc(json!({"_id": "1", "createdAt": "2024-01-01T00:00:00.000Z"}));
    let updated = apply_patch(
      &current,
      &json!({"_id": "evil", "createdAt": "1999-01-01T00:00:00.000Z"}),
      Utc::now(),
    );

    assert_eq!(updated.id(), Some("1"));
    assert_eq!(updated.created_at(), current.created_at());
  }

  #[test]
  fn last_updated_wins_over_patch() {
    let now = Utc::now();
    let current = doc(json!({"_id": "1", "createdAt": "2024-01-01T00:00:00.000Z"}));
    let updated = apply_patch(
      &current,
      &json!({"last_updated": "1999-01-01T00:00:00.000Z"}),
      now,
    );

    assert_eq!(
      updated.last_updated().unwrap().timestamp_millis(),
      now.timestamp_millis()
    );
    assert!(updated.last_updated().unwrap() >= updated.created_at().unwrap());
  }
}
