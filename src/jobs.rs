//! Periodic background sweeps.

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::db::Database;
use crate::types::{timestamp_value, ApplicationStatus, Filter};

/// Notification loop: logs opportunities expiring within 48 hours and
/// interviews scheduled today. Runs until the task is dropped.
pub async fn run_notification_task(db: Arc<Database>, interval_secs: u64) {
  loop {
    tokio::time::sleep(tokio::time::Duration::from_secs(interval_secs)).await;
    sweep(&db).await;
  }
}

/// One pass of the notification checks.
pub async fn sweep(db: &Database) {
  tracing::info!("running notification checks");

  let now = Utc::now();
  let closing = Filter::new().between(
    "deadline",
    Some(timestamp_value(now)),
    Some(timestamp_value(now + Duration::hours(48))),
  );
  let expiring = db.opportunities.find(&closing).await;
  if !expiring.is_empty() {
    tracing::info!(count = expiring.len(), "opportunities expiring soon");
    for opportunity in &expiring {
      tracing::info!(
        company = opportunity.get_str("company_name").unwrap_or("unknown"),
        role = opportunity.get_str("role").unwrap_or("unknown"),
        deadline = ?opportunity.get("deadline"),
        "deadline approaching"
      );
    }
  }

  let day = now.date_naive();
  let start_of_day = day.and_hms_opt(0, 0, 0).map(|t| t.and_utc()).unwrap_or(now);
  let end_of_day = day
    .and_hms_milli_opt(23, 59, 59, 999)
    .map(|t| t.and_utc())
    .unwrap_or(now);
  let todays = Filter::new()
    .eq("status", ApplicationStatus::Interview.as_str())
    .between(
      "interview_date",
      Some(timestamp_value(start_of_day)),
      Some(timestamp_value(end_of_day)),
    );
  let interviews = db.applications.find(&todays).await;
  if interviews.is_empty() {
    return;
  }

  tracing::info!(count = interviews.len(), "interviews scheduled for today");
  for application in &interviews {
    let user = match application.get_str("user_id") {
      Some(id) => db.users.find_by_id(id).await,
      None => None,
    };
    let opportunity = match application.get_str("opportunity_id") {
      Some(id) => db.opportunities.find_by_id(id).await,
      None => None,
    };
    tracing::info!(
      user = user.as_ref().and_then(|u| u.get_str("name")).unwrap_or("unknown"),
      company = opportunity
        .as_ref()
        .and_then(|o| o.get_str("company_name"))
        .unwrap_or("unknown"),
      time = ?application.get("interview_date"),
      "interview reminder"
    );
  }
}
