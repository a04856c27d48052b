//! Boundary gap-filling for aggregation series
//!
//! The backend's histogram only spans the range where data exists, so a
//! series that starts or ends inside the requested window is padded out to
//! the period-aligned window boundaries with zero-count points. Interior
//! gaps are left untouched; `min_doc_count: 0` keeps the backend's own
//! histogram dense within its span.

use std::collections::HashMap;

use super::KEY_ALL;
use crate::time::{self, TimeCodec};
use crate::types::{AggregationSpec, Grouping, Series, SeriesPoint};

/// Pads raw series to period-aligned request boundaries.
pub struct SeriesGapFiller;

impl SeriesGapFiller {
    /// Extend every series to cover the truncated `[start, end]` window.
    ///
    /// When the backend returned no series at all, an ungrouped request gets
    /// one fully synthesized zero series under [`KEY_ALL`]; grouped requests
    /// stay empty since there is no group key to attach zeroes to.
    pub fn fill(
        mut series_by_key: HashMap<String, Series>,
        spec: &AggregationSpec,
        codec: &TimeCodec,
    ) -> HashMap<String, Series> {
        let step = time::period_length_millis(spec.period, spec.period_unit);
        if step <= 0 {
            return series_by_key;
        }

        let start = codec.truncate_to_period(spec.start_millis, spec.period, spec.period_unit);
        let end = codec.truncate_to_period(spec.end_millis, spec.period, spec.period_unit);

        if series_by_key.is_empty() {
            if spec.grouping == Grouping::All {
                let mut map = HashMap::new();
                map.insert(KEY_ALL.to_string(), Self::synthesize(start, end, step, codec));
                return map;
            }
            return series_by_key;
        }

        for series in series_by_key.values_mut() {
            Self::extend_bounds(series, start, end, step, codec);
        }
        series_by_key
    }

    fn extend_bounds(series: &mut Series, start: i64, end: i64, step: i64, codec: &TimeCodec) {
        let (first, last) = match (series.points.first(), series.points.last()) {
            (Some(f), Some(l)) => (f.bucket_start_millis, l.bucket_start_millis),
            _ => return,
        };

        if first <= start && last >= end {
            return;
        }

        while series.points[0].bucket_start_millis - step >= start {
            let t = series.points[0].bucket_start_millis - step;
            series.points.insert(0, zero_point(t, codec));
        }

        while series.points[series.points.len() - 1].bucket_start_millis + step <= end {
            let t = series.points[series.points.len() - 1].bucket_start_millis + step;
            series.points.push(zero_point(t, codec));
        }
    }

    fn synthesize(start: i64, end: i64, step: i64, codec: &TimeCodec) -> Series {
        let mut points = vec![zero_point(start, codec)];
        while points[points.len() - 1].bucket_start_millis + step <= end {
            let t = points[points.len() - 1].bucket_start_millis + step;
            points.push(zero_point(t, codec));
        }
        Series {
            key: KEY_ALL.to_string(),
            points,
        }
    }
}

fn zero_point(millis: i64, codec: &TimeCodec) -> SeriesPoint {
    SeriesPoint {
        bucket_start_millis: millis,
        bucket_start_label: codec.format_millis(millis),
        count: 0,
    }
}
