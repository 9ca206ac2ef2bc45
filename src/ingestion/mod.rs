//! Feed ingestion: reconciliation of a ranked batch and the fetch → parse →
//! reconcile run around it.

mod engine;
mod service;

pub use engine::{ReconciliationEngine, ReconciliationResult};
pub use service::{IngestionError, IngestionService};
