//! Core pipeline of account-scan.
//!
//! The pipeline is a sequence of four steps, each backed by one module:
//! - [IdCollector](crate::collector::IdCollector) pages through the followers or friends of an
//!   account and flattens the pages into one ordered list of identifiers.
//! - [BatchFetcher](crate::fetcher::BatchFetcher) makes sure every identifier has a cached
//!   [ProfileRecord](crate::model::ProfileRecord) in the [RecordStore](crate::store::RecordStore),
//!   fetching only on cache miss and stopping early when the remaining
//!   [quota](crate::quota::QuotaMonitor) for user lookups runs low.
//! - [Filter](crate::filter::Filter) keeps the records matching a [FilterCriteria](crate::filter::FilterCriteria).
//! - [ReportRenderer](crate::report::ReportRenderer) renders the target account and the filtered
//!   records as Markdown, caching each profile image on disk.
//!
//! The remote API is abstracted behind the [SocialGraph](crate::graph::SocialGraph) and
//! [ImageFetcher](crate::graph::ImageFetcher) traits. Every component takes the client handle
//! explicitly; there is no global session.

pub mod collector;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod graph;
pub mod model;
pub mod quota;
pub mod report;
pub mod store;

#[cfg(test)]
pub(crate) mod test_utils;

pub use collector::IdCollector;
pub use error::{GraphError, Result, ScanError};
pub use fetcher::{BatchFetcher, BatchPolicy, FetchOutcome};
pub use filter::{Filter, FilterCriteria};
pub use graph::{ImageFetcher, SocialGraph};
pub use model::{AccountRef, FIRST_CURSOR, IdPage, ProfileRecord, Relation, UserId};
pub use quota::{QuotaCategory, QuotaMonitor, QuotaStatus};
pub use report::{DEFAULT_FIELDS, ReportRenderer, render_plain};
pub use store::RecordStore;
