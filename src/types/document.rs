use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Primary key field, assigned once at creation.
pub const ID_FIELD: &str = "_id";
/// Creation timestamp field, assigned once at creation.
pub const CREATED_AT_FIELD: &str = "createdAt";
/// Modification timestamp field, stamped on every successful update.
pub const LAST_UPDATED_FIELD: &str = "last_updated";

/// One record in a collection: an open field map carrying `_id` and
/// `createdAt` (and, after the first update, `last_updated`) alongside
/// arbitrary domain fields. Different documents in the same collection may
/// have entirely different field sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
  pub fn new(fields: Map<String, Value>) -> Self {
    Self(fields)
  }

  pub fn id(&self) -> Option<&str> {
    self.0.get(ID_FIELD).and_then(|v| v.as_str())
  }

  pub fn created_at(&self) -> Option<DateTime<Utc>> {
    self.0.get(CREATED_AT_FIELD).and_then(as_timestamp)
  }

  pub fn last_updated(&self) -> Option<DateTime<Utc>> {
    self.0.get(LAST_UPDATED_FIELD).and_then(as_timestamp)
  }

  /// `last_updated` when present, `createdAt` otherwise. Activity feeds
  /// sort by this.
  pub fn recency(&self) -> Option<DateTime<Utc>> {
    self.last_updated().or_else(|| self.created_at())
  }

  pub fn get(&self, field: &str) -> Option<&Value> {
    self.0.get(field)
  }

  pub fn get_str(&self, field: &str) -> Option<&str> {
    self.0.get(field).and_then(|v| v.as_str())
  }

  pub fn set(&mut self, field: impl Into<String>, value: Value) {
    self.0.insert(field.into(), value);
  }

  pub fn fields(&self) -> &Map<String, Value> {
    &self.0
  }

  pub fn into_fields(self) -> Map<String, Value> {
    self.0
  }
}

/// Interpret a JSON value as a point in time. RFC 3339 strings and numeric
/// epoch milliseconds are both accepted; everything else is not a
/// timestamp.
pub fn as_timestamp(value: &Value) -> Option<DateTime<Utc>> {
  match value {
    Value::String(s) => DateTime::parse_from_rfc3339(s)
      .ok()
      .map(|dt| dt.with_timezone(&Utc)),
    Value::Number(n) => n
      .as_i64()
      .or_else(|| n.as_f64().map(|f| f as i64))
      .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
    _ => None,
  }
}

/// Canonical JSON representation of an instant, millisecond precision.
pub fn timestamp_value(instant: DateTime<Utc>) -> Value {
  Value::String(instant.to_rfc3339_opts(SecondsFormat::Millis, true))
}
