//! File-backed collection store.
//!
//! One `Collection` owns one logical collection: an in-memory vector of
//! documents mirrored to a single JSON-array file. Every mutation rewrites
//! the whole file (temp file, then rename) and only commits to the
//! in-memory view once the rewrite succeeded, so a failed disk write
//! leaves memory and disk agreeing on the previous state.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::{Map, Value};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use super::error::StoreError;
use super::ids::IdAllocator;
use super::merge;
use crate::query::{aggregate, matcher};
use crate::types::{
  timestamp_value, AggregateResult, Document, Filter, Pipeline, CREATED_AT_FIELD, ID_FIELD,
};

/// Outcome of a [`Collection::create_unique`] call.
#[derive(Debug, Clone)]
pub enum CreateUnique {
  /// No existing document matched the filter; the document was created.
  Created(Document),
  /// An existing document matched; nothing was written.
  Exists(Document),
}

impl CreateUnique {
  pub fn into_document(self) -> Document {
    match self {
      CreateUnique::Created(doc) | CreateUnique::Exists(doc) => doc,
    }
  }

  pub fn is_created(&self) -> bool {
    matches!(self, CreateUnique::Created(_))
  }
}

pub struct Collection {
  name: String,
  path: PathBuf,
  ids: IdAllocator,
  docs: RwLock<Vec<Document>>,
}

impl Collection {
  /// Open the collection backed by `<dir>/<name>.json`. A missing file is
  /// created empty so it always exists after first use; an unparseable
  /// one is logged and replaced by an empty collection, trading the
  /// corrupt data for availability.
  pub async fn open(dir: impl AsRef<Path>, name: &str) -> Result<Self, StoreError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).await.map_err(|source| StoreError::Io {
      path: dir.to_path_buf(),
      source,
    })?;

    let collection = Self {
      name: name.to_string(),
      path: dir.join(format!("{}.json", name)),
      ids: IdAllocator::new(),
      docs: RwLock::new(Vec::new()),
    };
    collection.load().await?;
    Ok(collection)
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  async fn load(&self) -> Result<(), StoreError> {
    match fs::read(&self.path).await {
      Ok(bytes) if bytes.is_empty() => Ok(()),
      Ok(bytes) => match serde_json::from_slice::<Vec<Document>>(&bytes) {
        Ok(loaded) => {
          let mut docs = self.docs.write().await;
          *docs = loaded;
          Ok(())
        }
        Err(err) => {
          tracing::warn!(
            collection = %self.name,
            %err,
            "backing file did not parse, resetting collection to empty"
          );
          Ok(())
        }
      },
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
        let docs = self.docs.read().await;
        self.persist(&docs).await
      }
      Err(source) => Err(StoreError::Io {
        path: self.path.clone(),
        source,
      }),
    }
  }

  /// Rewrite the backing file with `docs` in full. The temp-file-and-
  /// rename keeps a crashed write from truncating the previous contents.
  async fn persist(&self, docs: &[Document]) -> Result<(), StoreError> {
    let json = serde_json::to_vec_pretty(docs).map_err(|source| StoreError::Serialize {
      collection: self.name.clone(),
      source,
    })?;

    let io = |source| StoreError::Io {
      path: self.path.clone(),
      source,
    };
    let tmp = self.path.with_extension("json.tmp");
    let mut file = File::create(&tmp).await.map_err(io)?;
    file.write_all(&json).await.map_err(io)?;
    file.sync_all().await.map_err(io)?;
    drop(file);
    fs::rename(&tmp, &self.path).await.map_err(io)?;

    tracing::debug!(collection = %self.name, documents = docs.len(), "collection persisted");
    Ok(())
  }

  fn new_document(&self, fields: Value) -> Document {
    let allocated = self.ids.allocate();
    let mut map = Map::new();
    map.insert(ID_FIELD.to_string(), Value::String(allocated.id));
    map.insert(
      CREATED_AT_FIELD.to_string(),
      timestamp_value(allocated.created_at),
    );
    // Caller fields land after the generated ones, so an explicit `_id`
    // or `createdAt` in `fields` wins. Domain services never pass either.
    if let Value::Object(extra) = fields {
      map.extend(extra);
    }
    Document::new(map)
  }

  /// Allocate an identity, merge the caller's fields, append and persist.
  pub async fn create(&self, fields: Value) -> Result<Document, StoreError> {
    let doc = self.new_document(fields);

    let mut docs = self.docs.write().await;
    let mut next = docs.clone();
    next.push(doc.clone());
    self.persist(&next).await?;
    *docs = next;
    Ok(doc)
  }

  /// Check-then-create under a single write acquisition: if any existing
  /// document matches `filter`, nothing is written and the conflicting
  /// document is returned instead. This is the primitive callers use for
  /// "at most one per key" semantics.
  pub async fn create_unique(
    &self,
    filter: &Filter,
    fields: Value,
  ) -> Result<CreateUnique, StoreError> {
    let mut docs = self.docs.write().await;
    if let Some(existing) = docs.iter().find(|doc| matcher::matches(doc, filter)) {
      return Ok(CreateUnique::Exists(existing.clone()));
    }

    let doc = self.new_document(fields);
    let mut next = docs.clone();
    next.push(doc.clone());
    self.persist(&next).await?;
    *docs = next;
    Ok(CreateUnique::Created(doc))
  }

  /// All documents matching `filter`, newest first. An empty filter
  /// returns the whole collection in that order.
  pub async fn find(&self, filter: &Filter) -> Vec<Document> {
    let docs = self.docs.read().await;
    let mut matched: Vec<Document> = docs
      .iter()
      .filter(|doc| matcher::matches(doc, filter))
      .cloned()
      .collect();
    // Ids encode allocation order, so same-tick creates still sort
    // newest first.
    matched.sort_by(|a, b| {
      b.created_at()
        .cmp(&a.created_at())
        .then_with(|| b.id().cmp(&a.id()))
    });
    matched
  }

  pub async fn find_all(&self) -> Vec<Document> {
    self.find(&Filter::default()).await
  }

  pub async fn find_one(&self, filter: &Filter) -> Option<Document> {
    self.find(filter).await.into_iter().next()
  }

  pub async fn find_by_id(&self, id: &str) -> Option<Document> {
    let docs = self.docs.read().await;
    docs.iter().find(|doc| doc.id() == Some(id)).cloned()
  }

  /// Merge `patch` into the document with `id` and persist. `None` when
  /// no such document exists; the patch is never partially applied.
  pub async fn update_by_id(
    &self,
    id: &str,
    patch: Value,
  ) -> Result<Option<Document>, StoreError> {
    let mut docs = self.docs.write().await;
    let Some(index) = docs.iter().position(|doc| doc.id() == Some(id)) else {
      return Ok(None);
    };

    let updated = merge::apply_patch(&docs[index], &patch, Utc::now());
    let mut next = docs.clone();
    next[index] = updated.clone();
    self.persist(&next).await?;
    *docs = next;
    Ok(Some(updated))
  }

  /// Remove the document with `id` and persist. `None` when absent.
  pub async fn delete_by_id(&self, id: &str) -> Result<Option<Document>, StoreError> {
    let mut docs = self.docs.write().await;
    let Some(index) = docs.iter().position(|doc| doc.id() == Some(id)) else {
      return Ok(None);
    };

    let mut next = docs.clone();
    let removed = next.remove(index);
    self.persist(&next).await?;
    *docs = next;
    Ok(Some(removed))
  }

  /// Drop every document and persist the empty collection.
  pub async fn clear(&self) -> Result<(), StoreError> {
    let mut docs = self.docs.write().await;
    self.persist(&[]).await?;
    docs.clear();
    Ok(())
  }

  pub async fn len(&self) -> usize {
    self.docs.read().await.len()
  }

  pub async fn is_empty(&self) -> bool {
    self.docs.read().await.is_empty()
  }

  /// Run the restricted match/group pipeline against the current
  /// snapshot (ordered newest first, like `find`).
  pub async fn aggregate(&self, pipeline: &Pipeline) -> AggregateResult {
    let snapshot = self.find_all().await;
    aggregate::run(snapshot, pipeline)
  }
}
