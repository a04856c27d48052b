//! Wire response types and result assembly
//!
//! Response modelling mirrors the backend's search envelope; nested
//! aggregation trees are captured by flattening every non-reserved bucket
//! key into a child node map, which handles any nesting depth the builder
//! can request.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::aggs::{AGG_FILE, AGG_HOST, AGG_HOST_FILE, AGG_TIME_COUNT, KEY_ALL};
use crate::time::TimeCodec;
use crate::types::{Grouping, LogRecord, SearchPage, Series, SeriesPoint};

/// Search response envelope (used for both scrolled searches and
/// aggregation-only queries).
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default, rename = "_scroll_id")]
    pub scroll_id: Option<String>,
    #[serde(default)]
    pub took: u64,
    #[serde(default)]
    pub hits: HitsEnvelope,
    #[serde(default)]
    pub aggregations: HashMap<String, AggNode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HitsEnvelope {
    #[serde(default)]
    pub total: TotalHits,
    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// Total hit count; older backends report a bare integer, newer ones an
/// object with a relation.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TotalHits {
    Count(i64),
    Object { value: i64 },
}

impl TotalHits {
    pub fn value(&self) -> i64 {
        match self {
            Self::Count(v) => *v,
            Self::Object { value } => *value,
        }
    }
}

impl Default for TotalHits {
    fn default() -> Self {
        Self::Count(0)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hit {
    #[serde(default, rename = "_source")]
    pub source: HitSource,
    #[serde(default)]
    pub sort: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HitSource {
    #[serde(default, rename = "@timestamp")]
    pub timestamp: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub message: String,
}

/// One aggregation node: a bucket list plus whatever the backend nests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AggNode {
    #[serde(default)]
    pub buckets: Vec<AggBucket>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggBucket {
    pub key: Value,
    #[serde(default)]
    pub key_as_string: Option<String>,
    #[serde(default)]
    pub doc_count: i64,
    #[serde(flatten)]
    pub aggs: HashMap<String, AggNode>,
}

impl AggBucket {
    fn key_string(&self) -> String {
        match &self.key {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn key_millis(&self) -> i64 {
        self.key
            .as_i64()
            .or_else(|| self.key.as_f64().map(|f| f as i64))
            .unwrap_or_default()
    }
}

/// Clear-scroll acknowledgement.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClearScrollResponse {
    #[serde(default)]
    pub succeeded: bool,
    #[serde(default)]
    pub num_freed: i64,
}

/// Shapes raw hits and bucket trees into the public result entities.
pub struct ResultAssembler;

impl ResultAssembler {
    /// Records and formatted messages of one batch, plus the total count.
    /// Paging and elapsed fields are filled in by the caller.
    pub fn page(response: &SearchResponse) -> SearchPage {
        let records = Self::records(&response.hits);
        let formatted_messages = records.iter().map(LogRecord::formatted).collect();
        SearchPage {
            total_count: response.hits.total.value(),
            records,
            formatted_messages,
            ..Default::default()
        }
    }

    pub fn records(hits: &HitsEnvelope) -> Vec<LogRecord> {
        hits.hits
            .iter()
            .map(|hit| LogRecord {
                timestamp: hit.source.timestamp.clone(),
                // The sort value is the canonical epoch time of the hit.
                epoch_millis: hit.sort.first().and_then(Value::as_i64).unwrap_or_default(),
                host: hit.source.host.clone(),
                file: hit.source.file.clone(),
                message: hit.source.message.clone(),
            })
            .collect()
    }

    /// Traverse the aggregation tree for the given grouping into one series
    /// per group key. Groups whose histogram came back empty are skipped.
    pub fn series_map(
        aggregations: &HashMap<String, AggNode>,
        grouping: Grouping,
        codec: &TimeCodec,
    ) -> HashMap<String, Series> {
        let mut series_by_key = HashMap::new();

        match grouping {
            Grouping::All => {
                if let Some(histogram) = aggregations.get(AGG_TIME_COUNT) {
                    Self::insert_series(&mut series_by_key, KEY_ALL.to_string(), histogram, codec);
                }
            }
            Grouping::Host | Grouping::File => {
                let name = if grouping == Grouping::Host {
                    AGG_HOST
                } else {
                    AGG_FILE
                };
                if let Some(terms) = aggregations.get(name) {
                    for bucket in &terms.buckets {
                        if let Some(histogram) = bucket.aggs.get(AGG_TIME_COUNT) {
                            Self::insert_series(
                                &mut series_by_key,
                                bucket.key_string(),
                                histogram,
                                codec,
                            );
                        }
                    }
                }
            }
            Grouping::HostFile => {
                if let Some(hosts) = aggregations.get(AGG_HOST_FILE) {
                    for host_bucket in &hosts.buckets {
                        let Some(files) = host_bucket.aggs.get(AGG_FILE) else {
                            continue;
                        };
                        for file_bucket in &files.buckets {
                            if let Some(histogram) = file_bucket.aggs.get(AGG_TIME_COUNT) {
                                let key = format!(
                                    "{}_{}",
                                    host_bucket.key_string(),
                                    file_bucket.key_string()
                                );
                                Self::insert_series(&mut series_by_key, key, histogram, codec);
                            }
                        }
                    }
                }
            }
        }

        series_by_key
    }

    fn insert_series(
        series_by_key: &mut HashMap<String, Series>,
        key: String,
        histogram: &AggNode,
        codec: &TimeCodec,
    ) {
        if histogram.buckets.is_empty() {
            return;
        }
        let points = histogram
            .buckets
            .iter()
            .map(|bucket| {
                let millis = bucket.key_millis();
                SeriesPoint {
                    bucket_start_millis: millis,
                    bucket_start_label: bucket
                        .key_as_string
                        .clone()
                        .unwrap_or_else(|| codec.format_millis(millis)),
                    count: bucket.doc_count,
                }
            })
            .collect();
        series_by_key.insert(key.clone(), Series { key, points });
    }
}
