//! HTTP client for the bookmark service REST API.
//!
//! Wraps `reqwest` with bearer-token auth, typed envelope deserialization,
//! and service-specific error handling. Every call is a single attempt
//! bounded by the client timeout; retry policy belongs to the caller.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::RaindropError;
use crate::types::Raindrop;

const DEFAULT_BASE_URL: &str = "https://api.raindrop.io/rest/v1";

/// Collection id the service uses for unsorted bookmarks.
const UNSORTED_COLLECTION: &str = "-1";

/// Client for the bookmark service REST API.
///
/// Use [`RaindropClient::new`] for production or
/// [`RaindropClient::with_base_url`] to point at a mock server in tests.
pub struct RaindropClient {
    client: Client,
    token: String,
    base_url: String,
}

#[derive(Deserialize)]
struct ItemsEnvelope {
    #[serde(default)]
    items: Vec<Raindrop>,
}

#[derive(Deserialize)]
struct ItemEnvelope {
    item: Raindrop,
}

#[derive(Deserialize)]
struct UpdateAck {
    result: bool,
    #[serde(rename = "errorMessage", default)]
    error_message: Option<String>,
}

#[derive(Serialize)]
struct UpdateBody<'a> {
    tags: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<&'a str>,
}

impl RaindropClient {
    /// Creates a new client pointed at the production bookmark service.
    ///
    /// # Errors
    ///
    /// Returns [`RaindropError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(token: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, RaindropError> {
        Self::with_base_url(token, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`RaindropError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        token: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, RaindropError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent.to_owned())
            .build()?;

        Ok(Self {
            client,
            token: token.to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Fetches every bookmark in the unsorted collection.
    ///
    /// # Errors
    ///
    /// - [`RaindropError::Http`] on network failure or non-2xx HTTP status.
    /// - [`RaindropError::Deserialize`] if the response does not match the
    ///   expected `{"items": [...]}` envelope.
    pub async fn fetch_unsorted(&self) -> Result<Vec<Raindrop>, RaindropError> {
        let url = format!("{}/raindrops/{UNSORTED_COLLECTION}", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let envelope: ItemsEnvelope =
            serde_json::from_str(&body).map_err(|e| RaindropError::Deserialize {
                context: url,
                source: e,
            })?;

        Ok(envelope.items)
    }

    /// Fetches a single bookmark by id.
    ///
    /// # Errors
    ///
    /// - [`RaindropError::NotFound`] when the service answers 404.
    /// - [`RaindropError::Http`] on network failure or other non-2xx status.
    /// - [`RaindropError::Deserialize`] if the response does not match the
    ///   expected `{"item": {...}}` envelope.
    pub async fn get_raindrop(&self, id: &str) -> Result<Raindrop, RaindropError> {
        let url = format!("{}/raindrop/{id}", self.base_url);
        let response = self.client.get(&url).bearer_auth(&self.token).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(RaindropError::NotFound(id.to_owned()));
        }
        let response = response.error_for_status()?;

        let body = response.text().await?;
        let envelope: ItemEnvelope =
            serde_json::from_str(&body).map_err(|e| RaindropError::Deserialize {
                context: url,
                source: e,
            })?;

        Ok(envelope.item)
    }

    /// Writes enriched metadata back to one bookmark.
    ///
    /// Sends the full merged tag list and, when present, the new note text in
    /// one `PUT` so the write is a single round trip.
    ///
    /// # Errors
    ///
    /// - [`RaindropError::NotFound`] when the service answers 404.
    /// - [`RaindropError::Api`] when the service acknowledges with
    ///   `{"result": false}`.
    /// - [`RaindropError::Http`] on network failure or other non-2xx status.
    /// - [`RaindropError::Deserialize`] if the acknowledgement cannot be parsed.
    pub async fn update_raindrop(
        &self,
        id: &str,
        tags: &[String],
        note: Option<&str>,
    ) -> Result<(), RaindropError> {
        let url = format!("{}/raindrop/{id}", self.base_url);
        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .json(&UpdateBody { tags, note })
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(RaindropError::NotFound(id.to_owned()));
        }
        let response = response.error_for_status()?;

        let body = response.text().await?;
        let ack: UpdateAck =
            serde_json::from_str(&body).map_err(|e| RaindropError::Deserialize {
                context: url,
                source: e,
            })?;

        if !ack.result {
            let message = ack
                .error_message
                .unwrap_or_else(|| "update rejected".to_owned());
            tracing::warn!(bookmark_id = id, %message, "bookmark update rejected");
            return Err(RaindropError::Api(message));
        }

        Ok(())
    }
}
