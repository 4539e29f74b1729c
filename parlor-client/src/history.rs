//! History paging over HTTP.

use async_trait::async_trait;
use reqwest::Client;
use shared::models::{Direction, EventBatch, HistoryError};
use timeline::HistorySource;
use url::Url;

use crate::error::ClientError;

/// Retrieves history pages from
/// `GET {server}/api/rooms/{room}/messages?from={cursor}&dir=b&limit={n}`.
#[derive(Debug, Clone)]
pub struct HttpHistorySource {
    client: Client,
    api_base: Url,
}

impl HttpHistorySource {
    /// Builds a source rooted at `server_url`.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidUrl`] when the server URL cannot
    /// be parsed or the API base cannot be joined onto it.
    pub fn new(server_url: &str) -> Result<Self, ClientError> {
        let server = Url::parse(server_url)?;
        let api_base = server.join("api/")?;
        Ok(Self {
            client: Client::new(),
            api_base,
        })
    }

    /// The SSE endpoint carrying a room's live events.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidUrl`] when the room id cannot be
    /// joined into the endpoint path.
    pub fn stream_url(&self, room_id: &str) -> Result<Url, ClientError> {
        Ok(self.api_base.join(&format!("rooms/{room_id}/stream"))?)
    }

    pub(crate) const fn http(&self) -> &Client {
        &self.client
    }

    async fn request_page(
        &self,
        room_id: &str,
        from: Option<&str>,
        limit: u32,
    ) -> Result<EventBatch, ClientError> {
        let endpoint = self.api_base.join(&format!("rooms/{room_id}/messages"))?;
        let mut request = self
            .client
            .get(endpoint)
            .query(&[("dir", Direction::Backwards.as_wire())])
            .query(&[("limit", limit)]);
        if let Some(from) = from {
            request = request.query(&[("from", from)]);
        }

        let response = request.send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl HistorySource for HttpHistorySource {
    async fn fetch_older(
        &self,
        room_id: &str,
        from: Option<&str>,
        limit: u32,
    ) -> Result<EventBatch, HistoryError> {
        self.request_page(room_id, from, limit)
            .await
            .map_err(|err| HistoryError::FetchFailed(err.to_string()))
    }
}
