//! Manual joins: inline a referenced document in place of its foreign
//! key.

use serde_json::{Map, Value};

use crate::db::Collection;
use crate::types::Document;

/// Replace `field` on each document with a projection of the document it
/// references in `target`, or JSON null when the reference dangles.
/// Documents are resolved independently and keep their input order, so one
/// dangling reference never aborts the batch.
pub async fn populate(
  docs: Vec<Document>,
  field: &str,
  target: &Collection,
  projection: &[&str],
) -> Vec<Document> {
  let mut enriched = Vec::with_capacity(docs.len());
  for doc in docs {
    enriched.push(populate_one(doc, field, target, projection).await);
  }
  enriched
}

/// Single-document populate; see [`populate`].
pub async fn populate_one(
  mut doc: Document,
  field: &str,
  target: &Collection,
  projection: &[&str],
) -> Document {
  let target_id = doc.get_str(field).map(|s| s.to_string());
  let referenced = match &target_id {
    Some(id) => target.find_by_id(id).await,
    None => None,
  };

  let value = match referenced {
    Some(found) => Value::Object(project(&found, projection)),
    None => {
      if let Some(id) = &target_id {
        tracing::warn!(
          field,
          id = %id,
          collection = target.name(),
          "reference did not resolve"
        );
      }
      Value::Null
    }
  };
  doc.set(field, value);
  doc
}

/// The subset of `fields` the referenced document actually carries.
fn project(doc: &Document, fields: &[&str]) -> Map<String, Value> {
  let mut out = Map::new();
  for field in fields {
    if let Some(value) = doc.get(field) {
      out.insert((*field).to_string(), value.clone());
    }
  }
  out
}
