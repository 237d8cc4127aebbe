//! Reqwest-backed fetch client.
use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response};

use crate::ports::fetch_client::{FetchClient, FetchError, FetchResult};

/// Forwards requests to the network through a shared `reqwest::Client`.
pub struct ReqwestFetchClient {
    client: reqwest::Client,
}

impl ReqwestFetchClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Use a preconfigured client (timeouts, proxies, certificates).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestFetchClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FetchClient for ReqwestFetchClient {
    async fn fetch(&self, request: Request<Bytes>) -> FetchResult<Response<Bytes>> {
        let url = request.uri().to_string();
        let (parts, body) = request.into_parts();

        let upstream = self
            .client
            .request(parts.method, &url)
            .headers(parts.headers)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_builder() || e.is_request() {
                    FetchError::InvalidRequest(e.to_string())
                } else {
                    FetchError::ConnectionError(e.to_string())
                }
            })?;

        let status = upstream.status();
        let headers = upstream.headers().clone();
        let body = upstream
            .bytes()
            .await
            .map_err(|e| FetchError::ConnectionError(e.to_string()))?;

        let mut builder = Response::builder().status(status);
        if let Some(response_headers) = builder.headers_mut() {
            response_headers.extend(headers);
        }
        builder
            .body(body)
            .map_err(|e| FetchError::InvalidRequest(e.to_string()))
    }
}
