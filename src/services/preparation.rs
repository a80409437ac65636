//! Per-opportunity preparation checklists.

use std::sync::Arc;

use serde_json::{json, Value};

use super::error::ServiceError;
use crate::db::Database;
use crate::query::populate;
use crate::types::{Document, Filter};

const SUMMARY_PROJECTION: &[&str] = &["_id", "company_name", "role"];

/// Checklist every new preparation document starts with.
fn default_checklist() -> Value {
  json!([
    { "title": "Research Company", "completed": false },
    { "title": "Review Job Description", "completed": false },
    { "title": "Prepare Resume", "completed": false },
    { "title": "Practice Common Interview Questions", "completed": false },
  ])
}

pub struct PreparationService {
  db: Arc<Database>,
}

impl PreparationService {
  pub fn new(db: Arc<Database>) -> Self {
    Self { db }
  }

  /// The user's preparation document for an opportunity, created with the
  /// default checklist on first access.
  pub async fn get_or_create(
    &self,
    user_id: &str,
    opportunity_id: &str,
  ) -> Result<Document, ServiceError> {
    if self
      .db
      .opportunities
      .find_by_id(opportunity_id)
      .await
      .is_none()
    {
      return Err(ServiceError::NotFound("opportunity"));
    }

    let key = Filter::new()
      .eq("user_id", user_id)
      .eq("opportunity_id", opportunity_id);
    let fields = json!({
      "user_id": user_id,
      "opportunity_id": opportunity_id,
      "checklist_items": default_checklist(),
      "notes": "",
    });
    let outcome = self.db.preparation.create_unique(&key, fields).await?;
    Ok(outcome.into_document())
  }

  /// One entry per opportunity, each with an inline opportunity summary.
  /// Missing preparation documents are created on the fly so the list is
  /// always complete.
  pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Document>, ServiceError> {
    let opportunities = self.db.opportunities.find_all().await;
    tracing::debug!(
      user_id,
      count = opportunities.len(),
      "reconciling preparation documents"
    );

    let mut prepared = Vec::with_capacity(opportunities.len());
    for opportunity in &opportunities {
      let Some(opportunity_id) = opportunity.id() else {
        continue;
      };
      match self.get_or_create(user_id, opportunity_id).await {
        Ok(doc) => prepared.push(doc),
        Err(err) => {
          tracing::warn!(user_id, opportunity_id, %err, "skipping preparation entry");
        }
      }
    }

    Ok(
      populate::populate(
        prepared,
        "opportunity_id",
        &self.db.opportunities,
        SUMMARY_PROJECTION,
      )
      .await,
    )
  }

  /// Patch the checklist or notes of an existing preparation document.
  pub async fn update(
    &self,
    user_id: &str,
    opportunity_id: &str,
    patch: Value,
  ) -> Result<Document, ServiceError> {
    let key = Filter::new()
      .eq("user_id", user_id)
      .eq("opportunity_id", opportunity_id);
    let existing = self
      .db
      .preparation
      .find_one(&key)
      .await
      .ok_or(ServiceError::NotFound("preparation document"))?;
    let id = existing
      .id()
      .ok_or(ServiceError::NotFound("preparation document"))?;

    self
      .db
      .preparation
      .update_by_id(id, patch)
      .await?
      .ok_or(ServiceError::NotFound("preparation document"))
  }
}
