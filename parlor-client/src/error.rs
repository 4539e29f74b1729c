use thiserror::Error;

/// Errors raised by the HTTP and SSE plumbing.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A server or endpoint URL could not be parsed or joined.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request failed or the server returned an error status.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A response body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}
