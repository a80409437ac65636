//! Opportunity management.

use std::sync::Arc;

use serde_json::Value;

use super::error::ServiceError;
use crate::db::Database;
use crate::types::{as_timestamp, timestamp_value, Document, Filter};

pub struct OpportunityService {
  db: Arc<Database>,
}

impl OpportunityService {
  pub fn new(db: Arc<Database>) -> Self {
    Self { db }
  }

  /// Create an opportunity owned by `created_by`. A parseable `deadline`
  /// is normalized to RFC 3339 so range queries and sorting agree on it.
  pub async fn create(&self, mut data: Value, created_by: &str) -> Result<Document, ServiceError> {
    normalize_deadline(&mut data);
    if let Value::Object(fields) = &mut data {
      fields.insert("created_by".into(), Value::String(created_by.to_string()));
    }
    Ok(self.db.opportunities.create(data).await?)
  }

  pub async fn list(&self, filter: &Filter) -> Result<Vec<Document>, ServiceError> {
    Ok(self.db.opportunities.find(filter).await)
  }

  pub async fn get(&self, id: &str) -> Result<Document, ServiceError> {
    self
      .db
      .opportunities
      .find_by_id(id)
      .await
      .ok_or(ServiceError::NotFound("opportunity"))
  }

  pub async fn update(&self, id: &str, mut data: Value) -> Result<Document, ServiceError> {
    normalize_deadline(&mut data);
    self
      .db
      .opportunities
      .update_by_id(id, data)
      .await?
      .ok_or(ServiceError::NotFound("opportunity"))
  }

  pub async fn delete(&self, id: &str) -> Result<Document, ServiceError> {
    self
      .db
      .opportunities
      .delete_by_id(id)
      .await?
      .ok_or(ServiceError::NotFound("opportunity"))
  }
}

/// Rewrite a `deadline` field into canonical RFC 3339 when it parses as a
/// timestamp. Unparseable values are left alone; the matcher will treat
/// them as out of any range.
fn normalize_deadline(data: &mut Value) {
  let Value::Object(fields) = data else { return };
  if let Some(ts) = fields.get("deadline").and_then(as_timestamp) {
    fields.insert("deadline".into(), timestamp_value(ts));
  }
}
