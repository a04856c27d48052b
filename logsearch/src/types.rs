//! Public request and result entities

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::error::Result;
use crate::time::{PeriodUnit, TimeCodec};

/// Batch-size ceiling; requests asking for 0 or more than this are clamped.
pub const MAX_PAGE_SIZE: usize = 10_000;

/// Result ordering on the record timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse a sort string. Only `"DESC"` selects descending; anything else
    /// (including empty) is ascending.
    pub fn from_code(code: &str) -> Self {
        if code == "DESC" {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Dimension an aggregation is grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Grouping {
    All,
    Host,
    File,
    HostFile,
}

/// Filter for a paged log search.
///
/// `start_millis`/`end_millis` bound the record timestamp; host terms are
/// OR-combined into a single analyzed match, file terms become optional
/// phrase clauses, and the message phrase is an exact phrase match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterSpec {
    pub start_millis: i64,
    pub end_millis: i64,
    #[serde(default)]
    pub host_terms: Vec<String>,
    #[serde(default)]
    pub file_terms: Vec<String>,
    #[serde(default)]
    pub message_phrase: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_page_index")]
    pub page_index: usize,
}

fn default_page_size() -> usize {
    MAX_PAGE_SIZE
}

fn default_page_index() -> usize {
    1
}

impl FilterSpec {
    /// Filter over an explicit `[start, end]` window given as localized
    /// timestamp strings.
    pub fn between(codec: &TimeCodec, start: &str, end: &str) -> Result<Self> {
        Ok(Self::from_millis(
            codec.parse_millis(start)?,
            codec.parse_millis(end)?,
        ))
    }

    /// Filter over `[time - minutes, time + minutes]` around a standard time.
    pub fn around(codec: &TimeCodec, time: &str, plus_minus_minutes: i64) -> Result<Self> {
        let center = codec.parse_millis(time)?;
        let delta = plus_minus_minutes * 60_000;
        Ok(Self::from_millis(center - delta, center + delta))
    }

    /// Filter over `[time - minutes, time)`, the "last N minutes" window
    /// used with the drain operation.
    pub fn recent(codec: &TimeCodec, time: &str, minus_minutes: i64) -> Result<Self> {
        let end = codec.parse_millis(time)?;
        Ok(Self::from_millis(end - minus_minutes * 60_000, end))
    }

    pub fn from_millis(start_millis: i64, end_millis: i64) -> Self {
        Self {
            start_millis,
            end_millis,
            host_terms: Vec::new(),
            file_terms: Vec::new(),
            message_phrase: None,
            sort: SortOrder::Asc,
            page_size: default_page_size(),
            page_index: default_page_index(),
        }
    }

    pub fn with_hosts(mut self, hosts: Vec<String>) -> Self {
        self.host_terms = hosts;
        self
    }

    pub fn with_files(mut self, files: Vec<String>) -> Self {
        self.file_terms = files;
        self
    }

    pub fn with_message_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.message_phrase = Some(phrase.into());
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_page(mut self, page_size: usize, page_index: usize) -> Self {
        self.page_size = page_size;
        self.page_index = page_index;
        self
    }

    /// Requested page size with the 0/oversize clamp applied.
    pub fn effective_page_size(&self) -> usize {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            MAX_PAGE_SIZE
        } else {
            self.page_size
        }
    }
}

/// One log event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: String,
    pub epoch_millis: i64,
    pub host: String,
    pub file: String,
    pub message: String,
}

impl LogRecord {
    /// `"[host | file] message"` rendering used for display lists.
    pub fn formatted(&self) -> String {
        format!("[{} | {}] {}", self.host, self.file, self.message)
    }
}

/// One page of search results plus paging bookkeeping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchPage {
    pub total_count: i64,
    pub total_pages: usize,
    pub current_page: usize,
    pub elapsed_ms: f64,
    pub records: Vec<LogRecord>,
    pub formatted_messages: Vec<String>,
}

impl SearchPage {
    pub fn log_summary(&self) {
        for message in &self.formatted_messages {
            debug!("{}", message);
        }
        debug!("Search count : {}", self.total_count);
        debug!("Page num     : {}", self.current_page);
        debug!("Paging total : {}", self.total_pages);
        debug!("Elapsed (s)  : {}", self.elapsed_ms / 1000.0);
    }
}

/// Aggregation request: bucket counts over a time window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationSpec {
    pub start_millis: i64,
    pub end_millis: i64,
    pub period: u32,
    pub period_unit: PeriodUnit,
    pub grouping: Grouping,
}

impl AggregationSpec {
    pub fn between(
        codec: &TimeCodec,
        start: &str,
        end: &str,
        period: u32,
        period_unit: PeriodUnit,
        grouping: Grouping,
    ) -> Result<Self> {
        Ok(Self {
            start_millis: codec.parse_millis(start)?,
            end_millis: codec.parse_millis(end)?,
            period,
            period_unit,
            grouping,
        })
    }
}

/// One histogram bucket of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub bucket_start_millis: i64,
    pub bucket_start_label: String,
    pub count: i64,
}

/// A dense time series for one group key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Series {
    pub key: String,
    pub points: Vec<SeriesPoint>,
}

/// Aggregation outcome: one series per group key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationResult {
    pub request_start_millis: i64,
    pub request_end_millis: i64,
    pub period: u32,
    pub period_unit: PeriodUnit,
    pub elapsed_ms: f64,
    pub series_by_key: HashMap<String, Series>,
}

impl AggregationResult {
    pub fn log_summary(&self) {
        for (key, series) in &self.series_by_key {
            debug!("-------- {} --------", key);
            for point in &series.points {
                debug!("{} : {}", point.bucket_start_label, point.count);
            }
        }
        debug!("Elapsed (ms) : {}", self.elapsed_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn codec() -> TimeCodec {
        TimeCodec::new(FixedOffset::east_opt(9 * 3600).unwrap())
    }

    #[test]
    fn test_sort_order_parsing() {
        assert_eq!(SortOrder::from_code("DESC"), SortOrder::Desc);
        assert_eq!(SortOrder::from_code("ASC"), SortOrder::Asc);
        assert_eq!(SortOrder::from_code(""), SortOrder::Asc);
        assert_eq!(SortOrder::from_code("desc"), SortOrder::Asc);
        assert_eq!(SortOrder::from_code("newest-first"), SortOrder::Asc);
    }

    #[test]
    fn test_effective_page_size_clamp() {
        let base = FilterSpec::from_millis(0, 1);
        assert_eq!(base.clone().with_page(0, 1).effective_page_size(), 10_000);
        assert_eq!(
            base.clone().with_page(20_000, 1).effective_page_size(),
            10_000
        );
        assert_eq!(base.clone().with_page(500, 1).effective_page_size(), 500);
        assert_eq!(
            base.with_page(10_000, 1).effective_page_size(),
            10_000
        );
    }

    #[test]
    fn test_filter_around() {
        let codec = codec();
        let spec = FilterSpec::around(&codec, "2017-09-24 00:05:00.000", 5).unwrap();
        assert_eq!(
            spec.start_millis,
            codec.parse_millis("2017-09-24 00:00:00.000").unwrap()
        );
        assert_eq!(
            spec.end_millis,
            codec.parse_millis("2017-09-24 00:10:00.000").unwrap()
        );
    }

    #[test]
    fn test_filter_between_rejects_bad_input() {
        let codec = codec();
        assert!(FilterSpec::between(&codec, "nope", "2017-09-24 00:10:00.000").is_err());
    }

    #[test]
    fn test_formatted_record() {
        let record = LogRecord {
            timestamp: "2017-11-07 03:00:00.000".to_string(),
            epoch_millis: 0,
            host: "test04".to_string(),
            file: "/var/log/messages".to_string(),
            message: "kernel: oom".to_string(),
        };
        assert_eq!(
            record.formatted(),
            "[test04 | /var/log/messages] kernel: oom"
        );
    }
}
