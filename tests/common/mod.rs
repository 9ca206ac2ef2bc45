//! Common test infrastructure
//!
//! Feed documents are built with [`FeedBuilder`] and applied to a throwaway
//! SQLite catalog owned by [`TestCatalog`].
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{FeedBuilder, FeedEntry, TestCatalog};
//!
//! #[test]
//! fn test_ingest() {
//!     let catalog = TestCatalog::new();
//!     let feed = FeedBuilder::new().entry(FeedEntry::new("1").genres(&["Pop"]));
//!     let result = catalog.ingest(&feed);
//!     assert_eq!(result.created, 1);
//! }
//! ```

mod catalog;
mod feed;

pub use catalog::TestCatalog;
pub use feed::{FeedBuilder, FeedEntry};
