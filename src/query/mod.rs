//! Dynamic album queries: typed filters, composite sorting and pagination.

mod engine;
mod error;
mod fields;
mod filter;
mod page;
mod sort;

pub use engine::{QueryEngine, QueryRequest, QueryResult};
pub use error::QueryError;
pub use fields::{Field, FieldType, FilterOp};
pub use filter::{Filter, FilterValue};
pub use page::{PageInfo, PageRequest};
pub use sort::{SortDirection, SortKey};
