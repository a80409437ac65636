mod document;
mod filter;
mod pipeline;
mod status;

pub use document::{
  as_timestamp, timestamp_value, Document, CREATED_AT_FIELD, ID_FIELD, LAST_UPDATED_FIELD,
};
pub use filter::{FieldPredicate, Filter, Range};
pub use pipeline::{AggregateResult, GroupCount, Pipeline, PipelineError};
pub use status::ApplicationStatus;
