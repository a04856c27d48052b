//! AggregationSpec to aggregation-body translation

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{AGG_FIELD_FILE, AGG_FIELD_HOST, AGG_FILE, AGG_HOST, AGG_HOST_FILE, AGG_TIME_COUNT};
use crate::query::builder::FIELD_TIMESTAMP;
use crate::query::types::{BoolClause, QueryClause, RangeClause};
use crate::time;
use crate::types::{AggregationSpec, Grouping};

/// Body of an aggregation-only search request (`size: 0`, no hits).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggsBody {
    pub query: QueryClause,
    pub size: usize,
    pub aggs: HashMap<String, AggClause>,
}

/// One aggregation node; terms and date-histogram are the only kinds this
/// client requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggClause {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<TermsAgg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_histogram: Option<DateHistogramAgg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggs: Option<HashMap<String, AggClause>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermsAgg {
    pub field: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateHistogramAgg {
    pub field: String,
    pub fixed_interval: String,
    pub min_doc_count: i64,
    pub time_zone: String,
}

/// Builds aggregation bodies out of an [`AggregationSpec`].
pub struct AggregationBuilder;

impl AggregationBuilder {
    pub fn body(spec: &AggregationSpec, time_zone: &str) -> AggsBody {
        let histogram = AggClause {
            date_histogram: Some(DateHistogramAgg {
                field: FIELD_TIMESTAMP.to_string(),
                fixed_interval: time::interval(spec.period, spec.period_unit),
                min_doc_count: 0,
                time_zone: time_zone.to_string(),
            }),
            ..Default::default()
        };

        let aggs = match spec.grouping {
            Grouping::All => single(AGG_TIME_COUNT, histogram),
            Grouping::Host => single(
                AGG_HOST,
                terms_over(AGG_FIELD_HOST, single(AGG_TIME_COUNT, histogram)),
            ),
            Grouping::File => single(
                AGG_FILE,
                terms_over(AGG_FIELD_FILE, single(AGG_TIME_COUNT, histogram)),
            ),
            Grouping::HostFile => single(
                AGG_HOST_FILE,
                terms_over(
                    AGG_FIELD_HOST,
                    single(
                        AGG_FILE,
                        terms_over(AGG_FIELD_FILE, single(AGG_TIME_COUNT, histogram)),
                    ),
                ),
            ),
        };

        AggsBody {
            query: QueryClause::Bool(Box::new(BoolClause {
                must: vec![
                    QueryClause::match_all(),
                    QueryClause::range(
                        FIELD_TIMESTAMP,
                        RangeClause::inclusive(spec.start_millis, spec.end_millis),
                    ),
                ],
                ..Default::default()
            })),
            size: 0,
            aggs,
        }
    }
}

fn single(name: &str, clause: AggClause) -> HashMap<String, AggClause> {
    let mut map = HashMap::new();
    map.insert(name.to_string(), clause);
    map
}

fn terms_over(field: &str, sub: HashMap<String, AggClause>) -> AggClause {
    AggClause {
        terms: Some(TermsAgg {
            field: field.to_string(),
        }),
        aggs: Some(sub),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::PeriodUnit;

    fn spec(grouping: Grouping) -> AggregationSpec {
        AggregationSpec {
            start_millis: 1_509_991_200_000,
            end_millis: 1_510_009_200_000,
            period: 60,
            period_unit: PeriodUnit::Hour,
            grouping,
        }
    }

    #[test]
    fn test_body_requests_zero_hits() {
        let json = serde_json::to_value(AggregationBuilder::body(
            &spec(Grouping::All),
            "Asia/Seoul",
        ))
        .unwrap();

        assert_eq!(json["size"], 0);
        let must = json["query"]["bool"]["must"].as_array().unwrap();
        assert_eq!(must[0], serde_json::json!({"match_all": {}}));
        assert_eq!(
            must[1]["range"]["@timestamp"],
            serde_json::json!({"gte": 1_509_991_200_000i64, "lte": 1_510_009_200_000i64})
        );
    }

    #[test]
    fn test_all_grouping_is_histogram_only() {
        let json = serde_json::to_value(AggregationBuilder::body(
            &spec(Grouping::All),
            "Asia/Seoul",
        ))
        .unwrap();

        let hist = &json["aggs"]["TIME_COUNT"]["date_histogram"];
        assert_eq!(hist["field"], "@timestamp");
        assert_eq!(hist["fixed_interval"], "60h");
        assert_eq!(hist["min_doc_count"], 0);
        assert_eq!(hist["time_zone"], "Asia/Seoul");
        assert!(json["aggs"]["TIME_COUNT"].get("terms").is_none());
    }

    #[test]
    fn test_host_grouping_wraps_histogram_in_terms() {
        let json = serde_json::to_value(AggregationBuilder::body(
            &spec(Grouping::Host),
            "Asia/Seoul",
        ))
        .unwrap();

        assert_eq!(json["aggs"]["HOST"]["terms"]["field"], "host.keyword");
        assert!(json["aggs"]["HOST"]["aggs"]["TIME_COUNT"]["date_histogram"].is_object());
    }

    #[test]
    fn test_file_grouping_wraps_histogram_in_terms() {
        let json = serde_json::to_value(AggregationBuilder::body(
            &spec(Grouping::File),
            "Asia/Seoul",
        ))
        .unwrap();

        assert_eq!(json["aggs"]["FILE"]["terms"]["field"], "file.keyword");
        assert!(json["aggs"]["FILE"]["aggs"]["TIME_COUNT"]["date_histogram"].is_object());
    }

    #[test]
    fn test_host_file_grouping_nests_two_terms_levels() {
        let json = serde_json::to_value(AggregationBuilder::body(
            &spec(Grouping::HostFile),
            "Asia/Seoul",
        ))
        .unwrap();

        let outer = &json["aggs"]["HOST_FILE"];
        assert_eq!(outer["terms"]["field"], "host.keyword");
        let inner = &outer["aggs"]["FILE"];
        assert_eq!(inner["terms"]["field"], "file.keyword");
        assert!(inner["aggs"]["TIME_COUNT"]["date_histogram"].is_object());
    }

    #[test]
    fn test_interval_uses_unit_code() {
        let mut s = spec(Grouping::All);
        s.period = 5;
        s.period_unit = PeriodUnit::Minute;
        let json = serde_json::to_value(AggregationBuilder::body(&s, "UTC")).unwrap();
        assert_eq!(
            json["aggs"]["TIME_COUNT"]["date_histogram"]["fixed_interval"],
            "5m"
        );
        assert_eq!(json["aggs"]["TIME_COUNT"]["date_histogram"]["time_zone"], "UTC");
    }
}
