use thiserror::Error;

/// Errors returned by the bookmark service client.
#[derive(Debug, Error)]
pub enum RaindropError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service has no bookmark with the requested id.
    #[error("bookmark {0} not found")]
    NotFound(String),

    /// The service answered 2xx but reported the operation failed.
    #[error("bookmark service error: {0}")]
    Api(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RaindropError {
    /// True when the underlying failure was a request timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, RaindropError::Http(e) if e.is_timeout())
    }
}
