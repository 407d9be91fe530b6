//! The transport seam between [`crate::LinkupClient`] and the network.

use crate::types::{FetchRequest, SearchRequest};
use async_trait::async_trait;
use linkup_http::{HttpClient, HttpError, RawResponse};
use std::sync::Arc;
use std::time::Duration;

pub const SEARCH_PATH: &str = "v1/search";
pub const FETCH_PATH: &str = "v1/fetch";
pub const BALANCE_PATH: &str = "v1/credits/balance";

/// Sends one request per call and hands back the raw response, whatever its
/// status. Interpreting statuses and bodies is the client's job.
#[async_trait]
pub trait LinkupTransport: Send + Sync {
    async fn search(&self, body: &SearchRequest) -> Result<RawResponse, HttpError>;

    async fn balance(&self) -> Result<RawResponse, HttpError>;

    async fn fetch(&self, body: &FetchRequest) -> Result<RawResponse, HttpError>;
}

#[async_trait]
impl<T: LinkupTransport + ?Sized> LinkupTransport for Arc<T> {
    async fn search(&self, body: &SearchRequest) -> Result<RawResponse, HttpError> {
        (**self).search(body).await
    }

    async fn balance(&self) -> Result<RawResponse, HttpError> {
        (**self).balance().await
    }

    async fn fetch(&self, body: &FetchRequest) -> Result<RawResponse, HttpError> {
        (**self).fetch(body).await
    }
}

/// reqwest-backed transport; every request carries `Authorization: Bearer <key>`.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    http: HttpClient,
}

impl HttpTransport {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, HttpError> {
        // Url::join drops the last path segment unless the base ends in '/'
        let base = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let http = HttpClient::new(&base)?
            .with_timeout(timeout)
            .with_bearer(api_key)?;
        Ok(Self { http })
    }
}

#[async_trait]
impl LinkupTransport for HttpTransport {
    async fn search(&self, body: &SearchRequest) -> Result<RawResponse, HttpError> {
        self.http.post_json_raw(SEARCH_PATH, body).await
    }

    async fn balance(&self) -> Result<RawResponse, HttpError> {
        self.http.get_raw(BALANCE_PATH).await
    }

    async fn fetch(&self, body: &FetchRequest) -> Result<RawResponse, HttpError> {
        self.http.post_json_raw(FETCH_PATH, body).await
    }
}
