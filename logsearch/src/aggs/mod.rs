//! Aggregation request construction and series post-processing

pub mod builder;
pub mod series;

pub use builder::{AggregationBuilder, AggsBody};
pub use series::SeriesGapFiller;

/// Aggregation names used in request bodies and echoed back in responses.
pub const AGG_TIME_COUNT: &str = "TIME_COUNT";
pub const AGG_HOST: &str = "HOST";
pub const AGG_FILE: &str = "FILE";
pub const AGG_HOST_FILE: &str = "HOST_FILE";

/// Series key of the single synthesized series when an ungrouped aggregation
/// matches no documents.
pub const KEY_ALL: &str = "ALL";

/// Keyword sub-fields used for exact-value terms bucketing.
pub const AGG_FIELD_HOST: &str = "host.keyword";
pub const AGG_FIELD_FILE: &str = "file.keyword";
