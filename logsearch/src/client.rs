//! Public search and aggregation operations
//!
//! Every operation opens its own backend connection and, for searches, its
//! own scroll cursor; both are torn down before the call returns regardless
//! of outcome. Errors propagate to the caller, so an empty page always means
//! an empty dataset, never a hidden failure.

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::aggs::{AggregationBuilder, SeriesGapFiller};
use crate::config::SearchConfig;
use crate::error::Result;
use crate::query::QueryBuilder;
use crate::response::{ResultAssembler, SearchResponse};
use crate::scroll::ScrollSession;
use crate::time::TimeCodec;
use crate::transport::{HttpTransport, SearchTransport};
use crate::types::{AggregationResult, AggregationSpec, FilterSpec, LogRecord, SearchPage};

/// Client over one backend cluster.
pub struct LogSearchClient {
    config: SearchConfig,
    codec: TimeCodec,
    transport: Option<Arc<dyn SearchTransport>>,
}

impl LogSearchClient {
    pub fn new(config: SearchConfig) -> Self {
        let codec = TimeCodec::new(config.utc_offset());
        Self {
            config,
            codec,
            transport: None,
        }
    }

    /// Client with a caller-supplied transport instead of HTTP; the seam
    /// integration tests drive.
    pub fn with_transport(config: SearchConfig, transport: Arc<dyn SearchTransport>) -> Self {
        let codec = TimeCodec::new(config.utc_offset());
        Self {
            config,
            codec,
            transport: Some(transport),
        }
    }

    /// Codec anchored to this client's configured UTC offset.
    pub fn codec(&self) -> TimeCodec {
        self.codec
    }

    fn transport(&self) -> Result<Arc<dyn SearchTransport>> {
        match &self.transport {
            Some(transport) => Ok(Arc::clone(transport)),
            None => Ok(Arc::new(HttpTransport::new(&self.config)?)),
        }
    }

    /// Fetch one page of log records.
    ///
    /// Reaching page N costs N sequential scroll round trips, since the
    /// cursor can only move forward one batch at a time. Suitable for
    /// shallow pagination only.
    pub async fn search(&self, filter: &FilterSpec) -> Result<SearchPage> {
        let started = Instant::now();
        let transport = self.transport()?;
        let body = QueryBuilder::paged(filter);

        let (mut session, first) =
            ScrollSession::open(transport.as_ref(), self.config.scroll_ttl_secs, &body).await?;
        let outcome = Self::seek_page(&mut session, &first, filter.page_index).await;
        session.close().await;
        let mut page = outcome?;

        page.total_pages = total_pages(page.total_count, filter.effective_page_size());
        page.current_page = filter.page_index.max(1);
        if page.current_page > page.total_pages {
            page.records.clear();
            page.formatted_messages.clear();
        }
        page.elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        debug!(
            total = page.total_count,
            page = page.current_page,
            records = page.records.len(),
            "search complete"
        );
        Ok(page)
    }

    /// Drain every record in the filter's time window into one page,
    /// ignoring the filter's paging fields. Meant for bounded windows such
    /// as "the last N minutes"; the caller owns keeping the window small.
    pub async fn drain_window(&self, filter: &FilterSpec) -> Result<SearchPage> {
        let started = Instant::now();
        let transport = self.transport()?;
        let body = QueryBuilder::window(filter);

        let (mut session, first) =
            ScrollSession::open(transport.as_ref(), self.config.scroll_ttl_secs, &body).await?;
        let outcome = Self::drain(&mut session, &first).await;
        session.close().await;
        let mut page = outcome?;

        page.elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        debug!(
            total = page.total_count,
            records = page.records.len(),
            "window drain complete"
        );
        Ok(page)
    }

    /// Bucket counts over a time window, grouped per the spec, with the
    /// series padded out to period-aligned window boundaries.
    pub async fn aggregate(&self, spec: &AggregationSpec) -> Result<AggregationResult> {
        let started = Instant::now();
        let transport = self.transport()?;
        let body = AggregationBuilder::body(spec, &self.config.time_zone);

        let response = transport.aggregate(&body).await?;
        let raw = ResultAssembler::series_map(&response.aggregations, spec.grouping, &self.codec);
        let series_by_key = SeriesGapFiller::fill(raw, spec, &self.codec);

        debug!(series = series_by_key.len(), "aggregation complete");
        Ok(AggregationResult {
            request_start_millis: spec.start_millis,
            request_end_millis: spec.end_millis,
            period: spec.period,
            period_unit: spec.period_unit,
            elapsed_ms: started.elapsed().as_secs_f64() * 1000.0,
            series_by_key,
        })
    }

    /// Advance to the requested page. The first batch is page 1; only
    /// non-empty batches count. An empty batch before the target ends the
    /// seek with the last assembled page.
    async fn seek_page(
        session: &mut ScrollSession<'_>,
        first: &SearchResponse,
        page_index: usize,
    ) -> Result<SearchPage> {
        let mut page = ResultAssembler::page(first);
        if page_index <= 1 {
            return Ok(page);
        }

        let mut batch_len = first.hits.hits.len();
        let mut current = 1usize;
        while batch_len > 0 {
            let response = session.advance().await?;
            batch_len = response.hits.hits.len();
            if batch_len > 0 {
                current += 1;
            }
            if current == page_index {
                page = ResultAssembler::page(&response);
                break;
            }
        }
        Ok(page)
    }

    /// Append every non-empty batch after the first; an empty batch ends
    /// the drain.
    async fn drain(session: &mut ScrollSession<'_>, first: &SearchResponse) -> Result<SearchPage> {
        let mut page = ResultAssembler::page(first);
        let mut batch_len = first.hits.hits.len();
        while batch_len > 0 {
            let response = session.advance().await?;
            batch_len = response.hits.hits.len();
            let records = ResultAssembler::records(&response.hits);
            page.formatted_messages
                .extend(records.iter().map(LogRecord::formatted));
            page.records.extend(records);
        }
        Ok(page)
    }
}

fn total_pages(total_count: i64, page_size: usize) -> usize {
    if total_count <= 0 || page_size == 0 {
        return 0;
    }
    ((total_count as usize) + page_size - 1) / page_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_ceiling() {
        assert_eq!(total_pages(0, 100), 0);
        assert_eq!(total_pages(1, 100), 1);
        assert_eq!(total_pages(100, 100), 1);
        assert_eq!(total_pages(101, 100), 2);
        assert_eq!(total_pages(1000, 100), 10);
    }
}
