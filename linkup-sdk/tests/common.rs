#![allow(dead_code)]

use std::sync::{Mutex, OnceLock};

use async_trait::async_trait;
use linkup_common::observability::{LogConfig, LogFormat};
use linkup_http::{HttpError, HttpStatus, RawResponse};
use linkup_sdk::{FetchRequest, LinkupClient, LinkupTransport, OutputType, SearchRequest};
use serde_json::json;

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "linkup-tests",
            log_dir: Some(std::env::temp_dir().join("linkup-tests")),
            emit_stderr: true,
            format: LogFormat::from_env(),
            default_filter: "debug",
        };

        linkup_common::observability::init_logging(config).unwrap_or_default()
    });
}

fn ok(body: serde_json::Value) -> RawResponse {
    RawResponse::new(HttpStatus::OK, body.to_string())
}

fn too_many_requests() -> RawResponse {
    RawResponse::new(HttpStatus::TOO_MANY_REQUESTS, "an error occurred")
}

/// Canned upstream: answers every endpoint with plausible bodies shaped by
/// the request flags, or with 429 everywhere when `fails` is set.
#[derive(Default)]
pub struct MockTransport {
    pub fails: bool,
    pub searches: Mutex<Vec<SearchRequest>>,
    pub fetches: Mutex<Vec<FetchRequest>>,
}

impl MockTransport {
    pub fn healthy() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fails: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl LinkupTransport for MockTransport {
    async fn search(&self, body: &SearchRequest) -> Result<RawResponse, HttpError> {
        self.searches.lock().unwrap().push(body.clone());
        if self.fails {
            return Ok(too_many_requests());
        }
        let resp = match body.output_type {
            OutputType::Structured if body.include_sources => ok(json!({
                "data": {"title": "hello", "summary": "lorem ipsum dolor"},
                "sources": [{"name": "lake", "url": "https://thisisalake.com"}]
            })),
            OutputType::Structured => ok(json!({"title": "hello", "summary": "lorem ipsum dolor"})),
            OutputType::SearchResults => {
                let mut results = Vec::new();
                if body.include_images {
                    results.push(json!({"type": "image", "name": "lake", "url": "https://image.lake.com"}));
                }
                results.push(json!({
                    "type": "text",
                    "name": "lake",
                    "content": "This is a lake",
                    "url": "https://thisisalake.com",
                    "favicon": ""
                }));
                ok(json!({ "results": results }))
            }
            OutputType::SourcedAnswer => ok(json!({
                "answer": "This is a lake",
                "sources": [{
                    "name": "lake",
                    "url": "https://thisisalake.com",
                    "snippet": "A lake in the mountains",
                    "favicon": ""
                }]
            })),
        };
        Ok(resp)
    }

    async fn balance(&self) -> Result<RawResponse, HttpError> {
        if self.fails {
            return Ok(too_many_requests());
        }
        Ok(ok(json!({"balance": 12.5})))
    }

    async fn fetch(&self, body: &FetchRequest) -> Result<RawResponse, HttpError> {
        self.fetches.lock().unwrap().push(body.clone());
        if self.fails {
            return Ok(too_many_requests());
        }
        let mut out = json!({"markdown": "# Hello World!"});
        if body.extract_images {
            out["images"] = json!([{"url": "https://helloworld.image.png"}]);
        }
        if body.include_raw_html {
            out["rawHtml"] = json!("<h1>Hello World!</h1>");
        }
        Ok(ok(out))
    }
}

/// Returns the same status and body for every call.
pub struct FixedTransport {
    pub status: HttpStatus,
    pub body: String,
}

impl FixedTransport {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: HttpStatus::OK,
            body: body.into(),
        }
    }

    fn respond(&self) -> RawResponse {
        RawResponse::new(self.status, self.body.clone())
    }
}

#[async_trait]
impl LinkupTransport for FixedTransport {
    async fn search(&self, _body: &SearchRequest) -> Result<RawResponse, HttpError> {
        Ok(self.respond())
    }

    async fn balance(&self) -> Result<RawResponse, HttpError> {
        Ok(self.respond())
    }

    async fn fetch(&self, _body: &FetchRequest) -> Result<RawResponse, HttpError> {
        Ok(self.respond())
    }
}

/// Fails before any response exists, like a refused connection.
pub struct BrokenTransport;

#[async_trait]
impl LinkupTransport for BrokenTransport {
    async fn search(&self, _body: &SearchRequest) -> Result<RawResponse, HttpError> {
        Err(HttpError::Network("connection refused".into()))
    }

    async fn balance(&self) -> Result<RawResponse, HttpError> {
        Err(HttpError::Network("connection refused".into()))
    }

    async fn fetch(&self, _body: &FetchRequest) -> Result<RawResponse, HttpError> {
        Err(HttpError::Network("connection refused".into()))
    }
}

pub fn client_with<T: LinkupTransport + 'static>(transport: T) -> LinkupClient {
    init_test_tracing();
    LinkupClient::with_transport("hello", transport)
}
