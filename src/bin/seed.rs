//! Loads (or destroys) the demo dataset.

use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Utc};
use clap::Parser;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use placetrack::config::Config;
use placetrack::db::Database;
use placetrack::services::{OpportunityService, UserService};
use placetrack::types::timestamp_value;

#[derive(Parser)]
#[command(name = "seed", about = "Load or destroy the placetrack demo dataset")]
struct Args {
  /// Destroy all data instead of importing.
  #[arg(short, long)]
  destroy: bool,

  /// Data directory (overrides the config file).
  #[arg(long, env = "PLACETRACK_DATA_DIR")]
  data_dir: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let args = Args::parse();
  let config = Config::find_and_load()?.unwrap_or_default();
  let dir = args.data_dir.unwrap_or(config.data.dir);

  let db = Arc::new(Database::open(&dir).await.context("opening database")?);
  db.clear_all().await?;
  tracing::info!("data destroyed");

  if args.destroy {
    return Ok(());
  }

  import(db).await?;
  tracing::info!("demo data imported");
  Ok(())
}

async fn import(db: Arc<Database>) -> anyhow::Result<()> {
  let users = UserService::new(db.clone());
  let user1 = users
    .register("Ashish Student", "ashish@example.com", "password123")
    .await?;
  let user2 = users
    .register("John Doe", "john@example.com", "password123")
    .await?;
  let user1_id = user1.id().context("user id missing")?.to_string();
  let user2_id = user2.id().context("user id missing")?.to_string();
  tracing::info!("users created");

  let now = Utc::now();
  let opportunity_data = [
    (
      "Google",
      "Software Engineer Intern",
      "12 LPA",
      "CGPA > 8.0, CSE/IT",
      Duration::days(2),
      user1_id.as_str(),
    ),
    (
      "Microsoft",
      "SDE-1",
      "45 LPA",
      "CGPA > 7.5, All Branches",
      Duration::days(5),
      user1_id.as_str(),
    ),
    (
      "Amazon",
      "Cloud Support Associate",
      "18 LPA",
      "Any Graduate",
      Duration::days(-1), // already expired
      user1_id.as_str(),
    ),
    (
      "Flipkart",
      "SDE Intern",
      "32 LPA",
      "CGPA > 8.0",
      Duration::days(10),
      user1_id.as_str(),
    ),
    (
      "Atlassian",
      "Product Manager",
      "50 LPA",
      "MBA/B.Tech",
      Duration::days(1),
      user2_id.as_str(),
    ),
  ];

  let opportunity_service = OpportunityService::new(db.clone());
  let mut opportunities = Vec::new();
  for (company, role, ctc, eligibility, offset, owner) in opportunity_data {
    let doc = opportunity_service
      .create(
        json!({
          "company_name": company,
          "role": role,
          "ctc": ctc,
          "eligibility": eligibility,
          "deadline": timestamp_value(now + offset),
        }),
        owner,
      )
      .await?;
    opportunities.push(doc);
  }
  tracing::info!(count = opportunities.len(), "opportunities created");

  let opportunity_ids = opportunities
    .iter()
    .map(|doc| {
      doc
        .id()
        .map(str::to_string)
        .context("opportunity id missing")
    })
    .collect::<anyhow::Result<Vec<String>>>()?;

  // Applications go straight through the store: the demo set includes one
  // for an expired opportunity, which the service would refuse.
  let application_data = [
    (opportunity_ids[0].as_str(), "Applied", None),
    (
      opportunity_ids[1].as_str(),
      "Interview",
      Some(now + Duration::hours(4)),
    ),
    (opportunity_ids[2].as_str(), "Rejected", None),
    (opportunity_ids[3].as_str(), "Selected", None),
  ];
  for (opportunity, status, interview) in application_data {
    let mut fields = json!({
      "user_id": user1_id.as_str(),
      "opportunity_id": opportunity,
      "status": status,
    });
    if let (Some(date), Some(object)) = (interview, fields.as_object_mut()) {
      object.insert("interview_date".into(), timestamp_value(date));
    }
    db.applications.create(fields).await?;
  }
  tracing::info!("applications created");

  db.preparation
    .create(json!({
      "user_id": user1_id.as_str(),
      "opportunity_id": opportunity_ids[1].as_str(),
      "checklist_items": [
        { "title": "Research Company", "completed": true },
        { "title": "Review Job Description", "completed": true },
        { "title": "Prepare Resume", "completed": false },
        { "title": "Practice Common Interview Questions", "completed": false },
      ],
      "notes": "Microsoft focuses on DSA strings and arrays.",
    }))
    .await?;
  tracing::info!("preparation data created");

  Ok(())
}
