//! Minimal HTTP transport for the Linkup API with safe logging and bearer auth.
//!
//! - One bearer token is fixed at construction and stamped on every request
//! - Responses come back raw (status + body); callers decide what a status means
//! - Never retries: a failed send is reported once as [`HttpError::Network`]
//! - Optional *raw* request/response logging via `LINKUP_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), linkup_http::HttpError> {
//! let client = linkup_http::HttpClient::new("https://api.linkup.so")?
//!     .with_bearer("my-key")?;
//! let resp = client
//!     .get_raw("v1/credits/balance")
//!     .await?;
//! println!("{} -> {} bytes", resp.status_text(), resp.body.len());
//! # Ok(()) }
//! ```
//!
//! Security: the bearer value is validated (never rewritten), and logs only ever
//! include the auth kind (bearer/none), never the secret.
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (truncated), send failures, and
//! (optionally) raw request/response lines (target `http.raw`).

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde::Deserialize;
use serde::Serialize;
use std::env;
use std::time::Duration;
use thiserror::Error;

pub use reqwest::StatusCode as HttpStatus;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "LINKUP_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024; // cap raw body logs (64 KiB)

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

/// Render a best-effort curl command for repro/debug, with secrets redacted.
fn make_curl(method: &Method, url: &Url, has_auth: bool, body: Option<&[u8]>) -> String {
    let mut parts = vec!["curl".to_string(), format!("-X{}", method)];
    if has_auth {
        parts.push("-H 'Authorization: Bearer <redacted>'".to_string());
    }
    if let Some(bytes) = body {
        parts.push("-H 'Content-Type: application/json'".to_string());
        if let Ok(s) = std::str::from_utf8(bytes) {
            let mut s = s.to_string();
            if s.len() > RAW_MAX_BODY {
                truncate_at_char_boundary(&mut s, RAW_MAX_BODY);
                s.push('…');
            }
            parts.push(format!("-d '{}'", s.replace('\'', r"'\''")));
        } else {
            parts.push(format!("--data-binary @- # ({} bytes)", bytes.len()));
        }
    }
    parts.push(format!("'{}'", url.as_str()));
    parts.join(" ")
}

/// Redact sensitive headers for logging
fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let mut val = v.to_str().unwrap_or("").to_string();
            if key.eq_ignore_ascii_case("authorization") || key.eq_ignore_ascii_case("set-cookie")
            {
                val = "<redacted>".into();
            }
            (key, val)
        })
        .collect()
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
}

// ==============================
// Raw responses
// ==============================

/// A response as it came off the wire: status line and undecoded body.
#[derive(Clone, Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Full status line, e.g. `429 Too Many Requests`.
    ///
    /// ```
    /// use linkup_http::{HttpStatus, RawResponse};
    ///
    /// let resp = RawResponse::new(HttpStatus::TOO_MANY_REQUESTS, "slow down");
    /// assert_eq!(resp.status_text(), "429 Too Many Requests");
    /// ```
    pub fn status_text(&self) -> String {
        self.status.to_string()
    }
}

// ==============================
// Client
// ==============================

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    bearer: Option<String>,
    pub default_timeout: Duration,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base", &self.base.as_str())
            .field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// ```no_run
    /// use linkup_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.linkup.so")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(30));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            bearer: None,
            default_timeout: Duration::from_secs(30),
        })
    }

    /// Override the default timeout returned by [`HttpClient::new`].
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// Stamp `Authorization: Bearer <token>` on every request sent by this client.
    ///
    /// ```
    /// use linkup_http::{HttpClient, HttpError};
    ///
    /// let err = HttpClient::new("https://api.linkup.so")?
    ///     .with_bearer("bad\u{7f}key")
    ///     .unwrap_err();
    /// assert!(matches!(err, HttpError::Build(_)));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn with_bearer(mut self, token: &str) -> Result<Self, HttpError> {
        self.bearer = Some(validate_api_key(token)?);
        Ok(self)
    }

    /// GET without a body; the response is returned whatever its status.
    pub async fn get_raw(&self, path: &str) -> Result<RawResponse, HttpError> {
        self.send_internal::<()>(Method::GET, path, None).await
    }

    /// POST a JSON body; the response is returned whatever its status.
    pub async fn post_json_raw<B>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<RawResponse, HttpError>
    where
        B: Serialize + ?Sized,
    {
        self.send_internal(Method::POST, path, Some(body)).await
    }

    // ==============================
    // Core request implementation
    // ==============================

    async fn send_internal<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<RawResponse, HttpError>
    where
        B: Serialize + ?Sized,
    {
        let url = self
            .base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))?;

        // ----- Build request -----
        let timeout = self.default_timeout;
        let mut rb = self
            .inner
            .request(method.clone(), url.clone())
            .timeout(timeout);

        // body (serialize ourselves so we can log exact bytes)
        let request_body_bytes = match body {
            Some(b) => {
                let bytes = serde_json::to_vec(b).map_err(|e| HttpError::Build(e.to_string()))?;
                rb = rb
                    .header(reqwest::header::CONTENT_TYPE, "application/json")
                    .body(bytes.clone());
                Some(bytes)
            }
            None => None,
        };

        if let Some(tok) = &self.bearer {
            rb = rb.bearer_auth(tok);
        }

        // ----- Safe request logging (pre-send) -----
        let auth_kind = if self.bearer.is_some() { "bearer" } else { "none" };
        let req_id = format!(
            "r{:x}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        );

        tracing::debug!(
            req_id=%req_id,
            method=%method,
            host_path=%format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
            timeout_ms=timeout.as_millis() as u64,
            auth_kind,
            has_body=%body.is_some(),
            "http.request.start"
        );

        if raw_enabled() {
            let curl = make_curl(
                &method,
                &url,
                self.bearer.is_some(),
                request_body_bytes.as_deref(),
            );
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        // ----- Send -----
        let t0 = std::time::Instant::now();
        let resp = rb.send().await.map_err(|err| {
            let message = err.to_string();
            tracing::warn!(req_id=%req_id, message=%message, "http.network_error.send");
            HttpError::Network(message)
        })?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.bytes().await.map_err(|err| {
            let message = err.to_string();
            tracing::warn!(req_id=%req_id, message=%message, "http.network_error.body");
            HttpError::Network(message)
        })?;
        let dur_ms = t0.elapsed().as_millis() as u64;

        let x_request_id = headers
            .get("x-request-id")
            .or_else(|| headers.get("x-correlation-id"))
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=dur_ms,
            body_len=content_len(&headers, bytes.len()),
            x_request_id=%x_request_id,
            "http.response.headers"
        );

        if raw_enabled() {
            let hdrs = redact_headers(&headers);
            let truncated = bytes.len() > RAW_MAX_BODY;
            let body_snip = if truncated {
                bytes.slice(..RAW_MAX_BODY)
            } else {
                bytes.clone()
            };
            let text = String::from_utf8_lossy(&body_snip);
            tracing::info!(
                target:"http.raw",
                %req_id,
                status=%status,
                duration_ms=dur_ms,
                headers=?hdrs,
                body=%text,
                truncated
            );
        }

        tracing::trace!(
            req_id=%req_id,
            body_snippet=%snip_body(&bytes),
            "http.response.body_snippet"
        );

        if !status.is_success() {
            tracing::warn!(
                req_id=%req_id,
                %status,
                message=%extract_error_message(&bytes),
                x_request_id=%x_request_id,
                "http.error"
            );
        }

        Ok(RawResponse {
            status,
            body: bytes,
        })
    }
}

// ==============================
// Helpers
// ==============================

fn extract_error_message(body: &[u8]) -> String {
    // Linkup style: {"statusCode":400,"error":{"code":"...","message":"..."}}
    #[derive(Deserialize)]
    struct NestedEnv {
        error: NestedDetail,
    }
    #[derive(Deserialize)]
    struct NestedDetail {
        message: String,
    }

    // Generic: {"message":"..."} or {"detail":"..."} or {"error":"..."}
    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    if let Ok(env) = serde_json::from_slice::<NestedEnv>(body) {
        return env.error.message;
    }
    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        if !m.message.is_empty() {
            return m.message;
        }
        if !m.detail.is_empty() {
            return m.detail;
        }
        if !m.error.is_empty() {
            return m.error;
        }
    }
    snip_body(body)
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > 500 {
        truncate_at_char_boundary(&mut snip, 500);
        snip.push_str("...");
    }
    snip
}

fn truncate_at_char_boundary(s: &mut String, max: usize) {
    let mut cut = max.min(s.len());
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    s.truncate(cut);
}

/// Check a key as given; callers trim it, nothing here rewrites it.
fn validate_api_key(key: &str) -> Result<String, HttpError> {
    if key.is_empty() {
        return Err(HttpError::Build("API key is empty".into()));
    }
    if key.chars().any(char::is_whitespace) {
        return Err(HttpError::Build("API key contains whitespace".into()));
    }
    if !key.is_ascii() {
        return Err(HttpError::Build("API key contains non-ASCII bytes".into()));
    }
    if key.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(HttpError::Build(
            "API key contains control characters".into(),
        ));
    }

    HeaderValue::from_str(&format!("Bearer {key}"))
        .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
    Ok(key.to_string())
}

fn content_len(headers: &HeaderMap, body_len: usize) -> usize {
    headers
        .get(reqwest::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(body_len)
}
