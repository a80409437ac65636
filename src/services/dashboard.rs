//! Per-user dashboard summaries.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;

use super::error::ServiceError;
use crate::db::Database;
use crate::query::populate;
use crate::types::{as_timestamp, timestamp_value, ApplicationStatus, Document, Filter, Pipeline};

/// Application counts plus deadlines landing in the next week.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
  pub applied: u64,
  pub interviews: u64,
  pub selected: u64,
  pub rejected: u64,
  pub upcoming_deadlines: Vec<DeadlineEntry>,
}

/// Projected opportunity in a deadline list.
#[derive(Debug, Clone, Serialize)]
pub struct DeadlineEntry {
  pub company_name: Option<String>,
  pub role: Option<String>,
  pub deadline: Option<Value>,
}

impl From<&Document> for DeadlineEntry {
  fn from(doc: &Document) -> Self {
    Self {
      company_name: doc.get_str("company_name").map(str::to_string),
      role: doc.get_str("role").map(str::to_string),
      deadline: doc.get("deadline").cloned(),
    }
  }
}

/// Today's interviews and deadlines inside 24 hours.
#[derive(Debug, Clone, Serialize)]
pub struct Today {
  pub interviews_today: Vec<Document>,
  pub urgent_deadlines: Vec<DeadlineEntry>,
}

pub struct DashboardService {
  db: Arc<Database>,
}

impl DashboardService {
  pub fn new(db: Arc<Database>) -> Self {
    Self { db }
  }

  /// Status counts for the user's applications, computed through the
  /// aggregation pipeline, plus opportunities closing within 7 days.
  pub async fn summary(&self, user_id: &str) -> Result<Summary, ServiceError> {
    let pipeline = Pipeline::new()
      .match_eq("user_id", user_id)
      .group_by("status");
    let groups = self
      .db
      .applications
      .aggregate(&pipeline)
      .await
      .into_groups();

    let mut summary = Summary::default();
    for group in groups {
      let Some(status) = group.key.as_str() else {
        continue;
      };
      match status.parse::<ApplicationStatus>() {
        Ok(ApplicationStatus::Applied) => summary.applied += group.count,
        Ok(ApplicationStatus::Interview) => summary.interviews += group.count,
        Ok(ApplicationStatus::Selected) => summary.selected += group.count,
        Ok(ApplicationStatus::Rejected) => summary.rejected += group.count,
        Err(_) => tracing::debug!(status, "ignoring unknown application status"),
      }
    }

    let now = Utc::now();
    summary.upcoming_deadlines = self.deadlines_between(now, now + Duration::days(7)).await;
    Ok(summary)
  }

  /// The user's interviews scheduled for today plus deadlines within the
  /// next 24 hours.
  pub async fn today(&self, user_id: &str) -> Result<Today, ServiceError> {
    let now = Utc::now();
    let day = now.date_naive();
    let start_of_day = day.and_hms_opt(0, 0, 0).map(|t| t.and_utc()).unwrap_or(now);
    let end_of_day = day
      .and_hms_milli_opt(23, 59, 59, 999)
      .map(|t| t.and_utc())
      .unwrap_or(now);

    let filter = Filter::new()
      .eq("user_id", user_id)
      .eq("status", ApplicationStatus::Interview.as_str())
      .between(
        "interview_date",
        Some(timestamp_value(start_of_day)),
        Some(timestamp_value(end_of_day)),
      );
    let interviews = self.db.applications.find(&filter).await;
    let interviews_today = populate::populate(
      interviews,
      "opportunity_id",
      &self.db.opportunities,
      &["_id", "company_name", "role"],
    )
    .await;

    let urgent_deadlines = self.deadlines_between(now, now + Duration::hours(24)).await;

    Ok(Today {
      interviews_today,
      urgent_deadlines,
    })
  }

  /// Opportunities whose deadline falls inside the window, soonest first.
  async fn deadlines_between(
    &self,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
  ) -> Vec<DeadlineEntry> {
    let filter = Filter::new().between(
      "deadline",
      Some(timestamp_value(from)),
      Some(timestamp_value(until)),
    );
    let mut matching = self.db.opportunities.find(&filter).await;
    matching.sort_by(|a, b| {
      let a_deadline = a.get("deadline").and_then(as_timestamp);
      let b_deadline = b.get("deadline").and_then(as_timestamp);
      a_deadline.cmp(&b_deadline)
    });
    matching.iter().map(DeadlineEntry::from).collect()
  }
}
