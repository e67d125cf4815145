//! Core data models for per-file results and run statistics.

mod record;
mod summary;

pub use record::{DoiOutcome, ResultRecord, Status, DOI_NOT_FOUND};
pub use summary::RunSummary;
