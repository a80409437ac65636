//! Relationship resolver tests - manual joins across collections

use serde_json::json;
use tempfile::tempdir;

use placetrack::db::Collection;
use placetrack::query::populate;
use placetrack::types::Filter;

#[tokio::test]
async fn test_populate_inlines_projected_fields() {
  let dir = tempdir().unwrap();
  let opportunities = Collection::open(dir.path(), "opportunities").await.unwrap();
  let applications = Collection::open(dir.path(), "applications").await.unwrap();

  let opportunity = opportunities
    .create(json!({
      "company_name": "Google",
      "role": "SWE Intern",
      "deadline": "2030-01-01T00:00:00.000Z",
      "ctc": "12 LPA"
    }))
    .await
    .unwrap();
  let application = applications
    .create(json!({
      "user_id": "u1",
      "opportunity_id": opportunity.id().unwrap(),
      "status": "Applied"
    }))
    .await
    .unwrap();

  let enriched = populate::populate_one(
    application,
    "opportunity_id",
    &opportunities,
    &["_id", "company_name", "role", "deadline"],
  )
  .await;

  let inlined = enriched.get("opportunity_id").unwrap();
  assert_eq!(inlined.get("company_name"), Some(&json!("Google")));
  assert_eq!(inlined.get("role"), Some(&json!("SWE Intern")));
  assert_eq!(
    inlined.get("_id"),
    Some(&json!(opportunity.id().unwrap()))
  );
  // Fields outside the projection are not copied.
  assert!(inlined.get("ctc").is_none());
  // The rest of the application is untouched.
  assert_eq!(enriched.get_str("status"), Some("Applied"));
}

#[tokio::test]
async fn test_dangling_reference_becomes_null() {
  let dir = tempdir().unwrap();
  let opportunities = Collection::open(dir.path(), "opportunities").await.unwrap();
  let applications = Collection::open(dir.path(), "applications").await.unwrap();

  let application = applications
    .create(json!({"user_id": "u1", "opportunity_id": "gone", "status": "Applied"}))
    .await
    .unwrap();

  let enriched = populate::populate_one(
    application,
    "opportunity_id",
    &opportunities,
    &["_id", "company_name"],
  )
  .await;

  assert_eq!(enriched.get("opportunity_id"), Some(&json!(null)));
}

#[tokio::test]
async fn test_batch_keeps_order_and_survives_dangling_references() {
  let dir = tempdir().unwrap();
  let opportunities = Collection::open(dir.path(), "opportunities").await.unwrap();
  let applications = Collection::open(dir.path(), "applications").await.unwrap();

  let google = opportunities
    .create(json!({"company_name": "Google"}))
    .await
    .unwrap();
  let amazon = opportunities
    .create(json!({"company_name": "Amazon"}))
    .await
    .unwrap();

  let references = [
    google.id().unwrap().to_string(),
    "dangling".to_string(),
    amazon.id().unwrap().to_string(),
  ];
  for (i, reference) in references.iter().enumerate() {
    applications
      .create(json!({"seq": i, "opportunity_id": reference}))
      .await
      .unwrap();
  }

  let mut input = applications.find(&Filter::new()).await;
  // Work in insertion order to make the order check obvious.
  input.reverse();

  let enriched = populate::populate(
    input,
    "opportunity_id",
    &opportunities,
    &["_id", "company_name"],
  )
  .await;

  assert_eq!(enriched.len(), 3);
  assert_eq!(enriched[0].get("seq"), Some(&json!(0)));
  assert_eq!(enriched[1].get("seq"), Some(&json!(1)));
  assert_eq!(enriched[2].get("seq"), Some(&json!(2)));

  assert_eq!(
    enriched[0].get("opportunity_id").unwrap().get("company_name"),
    Some(&json!("Google"))
  );
  assert_eq!(enriched[1].get("opportunity_id"), Some(&json!(null)));
  assert_eq!(
    enriched[2].get("opportunity_id").unwrap().get("company_name"),
    Some(&json!("Amazon"))
  );
}

#[tokio::test]
async fn test_missing_foreign_key_field_becomes_null() {
  let dir = tempdir().unwrap();
  let opportunities = Collection::open(dir.path(), "opportunities").await.unwrap();
  let applications = Collection::open(dir.path(), "applications").await.unwrap();

  let application = applications
    .create(json!({"user_id": "u1", "status": "Applied"}))
    .await
    .unwrap();

  let enriched =
    populate::populate_one(application, "opportunity_id", &opportunities, &["_id"]).await;
  assert_eq!(enriched.get("opportunity_id"), Some(&json!(null)));
}
