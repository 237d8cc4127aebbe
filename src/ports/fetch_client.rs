//! Network fetch port.
use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response, StatusCode};
use thiserror::Error;

/// Custom error type for fetch operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FetchError {
    /// Error when the network is unreachable or the connection fails
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error when the request cannot be converted or sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Error when the upstream returns an unusable response
    #[error("Upstream returned error status: {status}, url: {url}")]
    UpstreamError {
        /// The URL that was requested
        url: String,
        /// The status code returned by the upstream
        status: StatusCode,
    },
}

/// Result type alias for fetch operations
pub type FetchResult<T> = Result<T, FetchError>;

/// FetchClient defines the port (interface) for forwarding a request to the
/// network. The terminal pipeline handler and the pass-through fallback both
/// resolve requests through it.
#[async_trait]
pub trait FetchClient: Send + Sync + 'static {
    /// Forward a request to the network and return the response.
    async fn fetch(&self, request: Request<Bytes>) -> FetchResult<Response<Bytes>>;
}
