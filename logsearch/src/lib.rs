//! Search and aggregation client for log indices on an Elasticsearch-style
//! backend.
//!
//! Two operations are served over the same index pattern:
//!
//! - filtered, scroll-paged retrieval of raw log events inside a time
//!   window ([`LogSearchClient::search`], [`LogSearchClient::drain_window`])
//! - time-bucketed event counts grouped by host, source file, or both,
//!   post-processed into dense, boundary-complete series
//!   ([`LogSearchClient::aggregate`])
//!
//! # Example
//!
//! ```no_run
//! use logsearch::{FilterSpec, LogSearchClient, SearchConfig, SortOrder};
//!
//! # async fn run() -> logsearch::Result<()> {
//! let client = LogSearchClient::new(SearchConfig::default());
//! let codec = client.codec();
//!
//! let filter = FilterSpec::between(
//!     &codec,
//!     "2017-11-07 03:00:00.000",
//!     "2017-11-07 08:00:00.000",
//! )?
//! .with_hosts(vec!["test04".to_string()])
//! .with_sort(SortOrder::Desc)
//! .with_page(100, 1);
//!
//! let page = client.search(&filter).await?;
//! for line in &page.formatted_messages {
//!     println!("{line}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggs;
pub mod client;
pub mod config;
pub mod error;
pub mod query;
pub mod response;
pub mod scroll;
pub mod time;
pub mod transport;
pub mod types;

pub use client::LogSearchClient;
pub use config::SearchConfig;
pub use error::{Error, Result};
pub use time::{PeriodUnit, TimeCodec};
pub use types::{
    AggregationResult, AggregationSpec, FilterSpec, Grouping, LogRecord, SearchPage, Series,
    SeriesPoint, SortOrder,
};
