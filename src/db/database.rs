//! The application's collection set.

use std::path::Path;

use super::collection::Collection;
use super::error::StoreError;

/// All collections backing the tracker, one JSON file each under the data
/// directory.
pub struct Database {
  pub users: Collection,
  pub opportunities: Collection,
  pub applications: Collection,
  pub preparation: Collection,
}

impl Database {
  pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
    let dir = dir.as_ref();
    Ok(Self {
      users: Collection::open(dir, "users").await?,
      opportunities: Collection::open(dir, "opportunities").await?,
      applications: Collection::open(dir, "applications").await?,
      preparation: Collection::open(dir, "preparation").await?,
    })
  }

  /// Empty every collection. The seed tool and tests use this for full
  /// resets.
  pub async fn clear_all(&self) -> Result<(), StoreError> {
    self.users.clear().await?;
    self.opportunities.clear().await?;
    self.applications.clear().await?;
    self.preparation.clear().await?;
    Ok(())
  }
}
