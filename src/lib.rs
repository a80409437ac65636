//! Embedded JSON document store and the placement-tracking services built
//! on it.
//!
//! Each collection lives in one JSON-array file mirrored by an in-memory
//! vector; queries, partial updates, manual joins and the restricted
//! match/group aggregation all run in application memory.

pub mod config;
pub mod db;
pub mod jobs;
pub mod query;
pub mod services;
pub mod types;

pub use config::Config;
pub use db::{Collection, CreateUnique, Database, StoreError};
pub use services::ServiceError;
pub use types::{Document, Filter, Pipeline};
