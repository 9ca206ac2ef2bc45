//! The external top albums feed: retrieval, raw shape and normalization.

mod error;
mod fetcher;
mod models;
mod parser;

pub use error::{FeedError, FetchError};
#[cfg(any(test, feature = "mock"))]
pub use fetcher::MockFeedFetcher;
pub use fetcher::{FeedFetcher, FileFeedFetcher, HttpFeedFetcher};
pub use models::{FeedDocument, OneOrMany, RawEntry};
pub use parser::{Candidate, FeedParser, ParsedFeed};
