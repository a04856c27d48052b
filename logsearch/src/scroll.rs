//! Scroll cursor lifecycle
//!
//! A session wraps one server-side cursor. Whoever opens a session must call
//! [`ScrollSession::close`] before dropping it, on success and on error
//! alike; `close` never fails the caller, it only logs.

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::query::types::SearchBody;
use crate::response::SearchResponse;
use crate::transport::SearchTransport;

pub struct ScrollSession<'a> {
    transport: &'a dyn SearchTransport,
    ttl_secs: u64,
    scroll_id: Option<String>,
    closed: bool,
}

impl<'a> ScrollSession<'a> {
    /// Run the initial search and keep its cursor. The first batch is
    /// returned alongside the session.
    pub async fn open(
        transport: &'a dyn SearchTransport,
        ttl_secs: u64,
        body: &SearchBody,
    ) -> Result<(Self, SearchResponse)> {
        let response = transport.open_scroll(body, ttl_secs).await?;
        debug!(
            scroll_id = response.scroll_id.as_deref().unwrap_or(""),
            hits = response.hits.hits.len(),
            "scroll opened"
        );
        let session = Self {
            transport,
            ttl_secs,
            scroll_id: response.scroll_id.clone(),
            closed: false,
        };
        Ok((session, response))
    }

    /// Fetch the next batch. The cursor id may be rotated by the backend.
    pub async fn advance(&mut self) -> Result<SearchResponse> {
        let scroll_id = self
            .scroll_id
            .clone()
            .ok_or_else(|| Error::Backend("No scroll cursor to advance".to_string()))?;
        let response = self
            .transport
            .continue_scroll(&scroll_id, self.ttl_secs)
            .await?;
        if response.scroll_id.is_some() {
            self.scroll_id = response.scroll_id.clone();
        }
        Ok(response)
    }

    /// Release the cursor. Idempotent; failures and already-released cursors
    /// are logged, never surfaced.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        let Some(scroll_id) = self.scroll_id.take() else {
            return;
        };
        match self.transport.clear_scroll(&scroll_id).await {
            Ok(ack) if !ack.succeeded => {
                warn!(scroll_id = %scroll_id, "scroll cursor was already released");
            }
            Ok(ack) => {
                debug!(scroll_id = %scroll_id, freed = ack.num_freed, "scroll closed");
            }
            Err(e) => {
                warn!(scroll_id = %scroll_id, error = %e, "failed to clear scroll cursor");
            }
        }
    }
}
