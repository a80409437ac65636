mod collection;
mod database;
mod error;
mod ids;
mod merge;

pub use collection::{Collection, CreateUnique};
pub use database::Database;
pub use error::StoreError;
pub use ids::{IdAllocator, NewId};
pub use merge::apply_patch;
