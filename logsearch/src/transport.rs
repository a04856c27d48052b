//! Backend transport boundary
//!
//! [`SearchTransport`] is the seam between the query layer and the HTTP
//! backend; tests drive the layer with an in-memory implementation and the
//! real client uses [`HttpTransport`].

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::Serialize;

use crate::aggs::AggsBody;
use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::query::types::SearchBody;
use crate::response::{ClearScrollResponse, SearchResponse};

/// One backend connection's worth of search operations.
#[async_trait]
pub trait SearchTransport: Send + Sync {
    /// Run a search and open a scroll cursor with the given idle TTL.
    async fn open_scroll(&self, body: &SearchBody, ttl_secs: u64) -> Result<SearchResponse>;

    /// Fetch the next batch of an open cursor, renewing its TTL.
    async fn continue_scroll(&self, scroll_id: &str, ttl_secs: u64) -> Result<SearchResponse>;

    /// Release a cursor. A cursor the backend no longer knows is reported
    /// via `succeeded == false`, not as an error.
    async fn clear_scroll(&self, scroll_id: &str) -> Result<ClearScrollResponse>;

    /// Run an aggregation-only search (no cursor involved).
    async fn aggregate(&self, body: &AggsBody) -> Result<SearchResponse>;
}

#[derive(Serialize)]
struct ScrollContinueBody<'a> {
    scroll: String,
    scroll_id: &'a str,
}

#[derive(Serialize)]
struct ClearScrollBody<'a> {
    scroll_id: Vec<&'a str>,
}

/// HTTP transport against a search cluster.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    index_pattern: String,
}

impl HttpTransport {
    /// Fresh connection pool carrying the content-type and role headers on
    /// every request.
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static("role"),
            HeaderValue::from_str(&config.role)
                .map_err(|e| Error::Config(format!("Bad role header value: {}", e)))?,
        );

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: config.base_url(),
            index_pattern: config.index_pattern.clone(),
        })
    }

    async fn decode_search(response: reqwest::Response) -> Result<SearchResponse> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if body.contains("search_context_missing")
                || body.contains("No search context found")
            {
                return Err(Error::CursorExpired(body));
            }
            return Err(Error::Backend(format!("{}: {}", status, body)));
        }
        Ok(response.json().await?)
    }

    fn transport_error(e: reqwest::Error) -> Error {
        if e.is_connect() || e.is_timeout() {
            Error::BackendUnavailable(e.to_string())
        } else {
            Error::Http(e)
        }
    }
}

#[async_trait]
impl SearchTransport for HttpTransport {
    async fn open_scroll(&self, body: &SearchBody, ttl_secs: u64) -> Result<SearchResponse> {
        let url = format!(
            "{}/{}/_search?scroll={}s",
            self.base_url, self.index_pattern, ttl_secs
        );
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Self::transport_error)?;
        Self::decode_search(response).await
    }

    async fn continue_scroll(&self, scroll_id: &str, ttl_secs: u64) -> Result<SearchResponse> {
        let url = format!("{}/_search/scroll", self.base_url);
        let body = ScrollContinueBody {
            scroll: format!("{}s", ttl_secs),
            scroll_id,
        };
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;
        Self::decode_search(response).await
    }

    async fn clear_scroll(&self, scroll_id: &str) -> Result<ClearScrollResponse> {
        let url = format!("{}/_search/scroll", self.base_url);
        let body = ClearScrollBody {
            scroll_id: vec![scroll_id],
        };
        let response = self
            .client
            .delete(url)
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;

        // A 404 means the cursor is already gone; report it, don't fail.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(ClearScrollResponse::default());
        }
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Backend(format!("{}: {}", status, body)));
        }
        Ok(response.json().await?)
    }

    async fn aggregate(&self, body: &AggsBody) -> Result<SearchResponse> {
        let url = format!("{}/{}/_search", self.base_url, self.index_pattern);
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Self::transport_error)?;
        Self::decode_search(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_construction() {
        let transport = HttpTransport::new(&SearchConfig::default()).unwrap();
        assert_eq!(transport.base_url, "http://127.0.0.1:9200");
        assert_eq!(transport.index_pattern, "index-*");
    }

    #[test]
    fn test_rejects_unprintable_role() {
        let mut config = SearchConfig::default();
        config.role = "Read\n".to_string();
        assert!(matches!(
            HttpTransport::new(&config),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_scroll_body_shapes() {
        let cont = ScrollContinueBody {
            scroll: "60s".to_string(),
            scroll_id: "abc",
        };
        assert_eq!(
            serde_json::to_value(&cont).unwrap(),
            serde_json::json!({"scroll": "60s", "scroll_id": "abc"})
        );

        let clear = ClearScrollBody {
            scroll_id: vec!["abc"],
        };
        assert_eq!(
            serde_json::to_value(&clear).unwrap(),
            serde_json::json!({"scroll_id": ["abc"]})
        );
    }
}
