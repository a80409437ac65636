//! Application lifecycle: apply, list with opportunity context, update
//! status.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use super::error::ServiceError;
use crate::db::{CreateUnique, Database};
use crate::query::populate;
use crate::types::{as_timestamp, timestamp_value, ApplicationStatus, Document, Filter};

/// Fields of the referenced opportunity inlined into listed applications.
const OPPORTUNITY_PROJECTION: &[&str] = &["_id", "company_name", "role", "deadline"];

pub struct ApplicationService {
  db: Arc<Database>,
}

impl ApplicationService {
  pub fn new(db: Arc<Database>) -> Self {
    Self { db }
  }

  /// Apply `user_id` to `opportunity_id`. The opportunity must exist, its
  /// deadline must not have passed, and a user holds at most one
  /// application per opportunity.
  pub async fn create(
    &self,
    user_id: &str,
    opportunity_id: &str,
  ) -> Result<Document, ServiceError> {
    let opportunity = self
      .db
      .opportunities
      .find_by_id(opportunity_id)
      .await
      .ok_or(ServiceError::NotFound("opportunity"))?;

    if deadline_passed(&opportunity, Utc::now()) {
      return Err(ServiceError::DeadlinePassed);
    }

    tracing::info!(user_id, opportunity_id, "creating application");

    let uniqueness = Filter::new()
      .eq("user_id", user_id)
      .eq("opportunity_id", opportunity_id);
    let fields = json!({
      "user_id": user_id,
      "opportunity_id": opportunity_id,
      "status": ApplicationStatus::Applied.as_str(),
      "last_updated": timestamp_value(Utc::now()),
    });

    match self
      .db
      .applications
      .create_unique(&uniqueness, fields)
      .await?
    {
      CreateUnique::Created(doc) => Ok(doc),
      CreateUnique::Exists(_) => Err(ServiceError::AlreadyApplied),
    }
  }

  /// Applications matching `filter`, each with its opportunity inlined,
  /// most recently touched first.
  pub async fn list(&self, filter: &Filter) -> Result<Vec<Document>, ServiceError> {
    let apps = self.db.applications.find(filter).await;
    tracing::debug!(count = apps.len(), "listing applications");

    let mut enriched = populate::populate(
      apps,
      "opportunity_id",
      &self.db.opportunities,
      OPPORTUNITY_PROJECTION,
    )
    .await;
    enriched.sort_by(|a, b| b.recency().cmp(&a.recency()));
    Ok(enriched)
  }

  /// Move an application to `status`. Reverting to `Applied` once the
  /// opportunity deadline passed is rejected; an `Interview` transition
  /// may carry the interview date.
  pub async fn update_status(
    &self,
    id: &str,
    status: ApplicationStatus,
    interview_date: Option<DateTime<Utc>>,
  ) -> Result<Document, ServiceError> {
    let application = self
      .db
      .applications
      .find_by_id(id)
      .await
      .ok_or(ServiceError::NotFound("application"))?;

    if status == ApplicationStatus::Applied {
      let opportunity = match application.get_str("opportunity_id") {
        Some(opportunity_id) => self.db.opportunities.find_by_id(opportunity_id).await,
        None => None,
      };
      if let Some(opportunity) = opportunity {
        if deadline_passed(&opportunity, Utc::now()) {
          return Err(ServiceError::RevertAfterDeadline);
        }
      }
    }

    let mut patch = json!({ "status": status.as_str() });
    if status == ApplicationStatus::Interview {
      if let (Some(date), Value::Object(fields)) = (interview_date, &mut patch) {
        fields.insert("interview_date".into(), timestamp_value(date));
      }
    }

    self
      .db
      .applications
      .update_by_id(id, patch)
      .await?
      .ok_or(ServiceError::NotFound("application"))
  }
}

/// Whether the opportunity's deadline lies strictly in the past. An
/// absent or unparseable deadline never blocks an application.
fn deadline_passed(opportunity: &Document, now: DateTime<Utc>) -> bool {
  opportunity
    .get("deadline")
    .and_then(as_timestamp)
    .map(|deadline| now > deadline)
    .unwrap_or(false)
}
