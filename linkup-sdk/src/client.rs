use crate::query::{
    FetchOptions, SearchOptions, SearchQuery, build_fetch_request, build_search_request,
};
use crate::results::{SearchResultsEnvelope, classify_results};
use crate::transport::{HttpTransport, LinkupTransport};
use crate::types::{
    Credit, FetchOutput, OutputType, SearchDepth, SearchOutput, SearchResultsOutput,
    SourcedAnswer, StructuredOutput,
};
use linkup_common::{LinkupError, Result};
use linkup_config::{API_KEY_ENV, ClientSettings, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use linkup_http::RawResponse;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Client for the Linkup search, fetch and balance endpoints.
///
/// The key is fixed at construction; the client holds no other state and is
/// cheap to clone.
#[derive(Clone)]
pub struct LinkupClient {
    api_key: String,
    transport: Arc<dyn LinkupTransport>,
}

impl fmt::Debug for LinkupClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkupClient")
            .field("api_key", &mask_key(&self.api_key))
            .finish_non_exhaustive()
    }
}

impl LinkupClient {
    /// Create a client for the public API.
    ///
    /// A missing or blank `api_key` falls back to `LINKUP_API_KEY`.
    ///
    /// ```no_run
    /// use linkup_sdk::{LinkupClient, SearchDepth};
    ///
    /// # async fn demo() -> linkup_sdk::Result<()> {
    /// let client = LinkupClient::new(None)?;
    /// let answer = client
    ///     .get_sourced_answer("What is Lake Como famous for?", SearchDepth::Standard, None)
    ///     .await?;
    /// println!("{}", answer.answer);
    /// # Ok(()) }
    /// ```
    pub fn new(api_key: Option<&str>) -> Result<Self> {
        let api_key = resolve_api_key(api_key)?;
        let transport = HttpTransport::new(
            DEFAULT_BASE_URL,
            &api_key,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )?;
        Ok(Self::with_transport(api_key, transport))
    }

    /// Create a client from loaded settings (base URL, timeout, optional key).
    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        settings
            .validate()
            .map_err(|e| LinkupError::Config(e.to_string()))?;
        let api_key = resolve_api_key(settings.api_key())?;
        let transport = HttpTransport::new(
            &settings.base_url,
            &api_key,
            Duration::from_secs(settings.timeout_secs),
        )?;
        Ok(Self::with_transport(api_key, transport))
    }

    /// Use a caller-supplied transport, e.g. a test double.
    pub fn with_transport<T>(api_key: impl Into<String>, transport: T) -> Self
    where
        T: LinkupTransport + 'static,
    {
        Self {
            api_key: api_key.into(),
            transport: Arc::new(transport),
        }
    }

    /// `/v1/search` with `searchResults` output, split into text and image results.
    ///
    /// Items that are neither text nor image are skipped; if nothing is left
    /// the call fails with [`LinkupError::NoValidResults`].
    pub async fn get_search_results(
        &self,
        query: &str,
        depth: SearchDepth,
        options: Option<&SearchOptions>,
    ) -> Result<SearchResultsOutput> {
        let resp = self
            .dispatch_search(query, depth, OutputType::SearchResults, options, None)
            .await?;
        let envelope: SearchResultsEnvelope = serde_json::from_slice(&resp.body)?;
        let received = envelope.results.len();
        let output = classify_results(envelope.results);

        tracing::debug!(
            received,
            text = output.text_results.len(),
            images = output.image_results.len(),
            "linkup.search_results.classified"
        );

        if output.is_empty() {
            return Err(LinkupError::NoValidResults);
        }
        Ok(output)
    }

    /// `/v1/search` with `sourcedAnswer` output.
    pub async fn get_sourced_answer(
        &self,
        query: &str,
        depth: SearchDepth,
        options: Option<&SearchOptions>,
    ) -> Result<SourcedAnswer> {
        let resp = self
            .dispatch_search(query, depth, OutputType::SourcedAnswer, options, None)
            .await?;
        Ok(serde_json::from_slice(&resp.body)?)
    }

    /// `/v1/search` with `structured` output constrained by `schema`
    /// (see [`crate::schema::generate_json_schema`]).
    ///
    /// With `include_sources` unset the body is kept verbatim as
    /// [`StructuredOutput::RawJson`]; with it set the body is parsed as
    /// [`StructuredOutput::Sourced`].
    pub async fn get_structured_results(
        &self,
        query: &str,
        depth: SearchDepth,
        schema: &Value,
        options: Option<&SearchOptions>,
    ) -> Result<StructuredOutput> {
        let include_sources = options.is_some_and(|o| o.include_sources);
        let resp = self
            .dispatch_search(query, depth, OutputType::Structured, options, Some(schema))
            .await?;

        if include_sources {
            Ok(StructuredOutput::Sourced(serde_json::from_slice(&resp.body)?))
        } else {
            Ok(StructuredOutput::RawJson(raw_json_body(&resp)?))
        }
    }

    /// Run a prepared [`SearchQuery`], dispatching on its output type.
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchOutput> {
        let options = Some(&query.options);
        match query.output_type() {
            OutputType::SearchResults => self
                .get_search_results(&query.query, query.depth, options)
                .await
                .map(SearchOutput::SearchResults),
            OutputType::SourcedAnswer => self
                .get_sourced_answer(&query.query, query.depth, options)
                .await
                .map(SearchOutput::SourcedAnswer),
            OutputType::Structured => {
                let schema = query.schema().unwrap_or(&Value::Null);
                self.get_structured_results(&query.query, query.depth, schema, options)
                    .await
                    .map(SearchOutput::Structured)
            }
        }
    }

    /// Remaining credits for the account behind the API key.
    pub async fn get_balance(&self) -> Result<f64> {
        tracing::debug!("linkup.balance");
        let resp = self.transport.balance().await?;
        ensure_success(&resp)?;
        let credit: Credit = serde_json::from_slice(&resp.body)?;
        Ok(credit.balance)
    }

    /// `/v1/fetch`: a single page as markdown, optionally with raw HTML and images.
    pub async fn fetch(&self, url: &str, options: Option<&FetchOptions>) -> Result<FetchOutput> {
        let options = options.copied().unwrap_or_default();
        let request = build_fetch_request(url, &options)?;
        tracing::debug!(
            render_js = request.render_js,
            include_raw_html = request.include_raw_html,
            extract_images = request.extract_images,
            "linkup.fetch"
        );
        let resp = self.transport.fetch(&request).await?;
        ensure_success(&resp)?;
        Ok(serde_json::from_slice(&resp.body)?)
    }

    async fn dispatch_search(
        &self,
        query: &str,
        depth: SearchDepth,
        output_type: OutputType,
        options: Option<&SearchOptions>,
        schema: Option<&Value>,
    ) -> Result<RawResponse> {
        let defaults = SearchOptions::default();
        let options = options.unwrap_or(&defaults);
        let request = build_search_request(query, depth, output_type, options, schema)?;

        tracing::debug!(
            %depth,
            %output_type,
            query_len = query.len(),
            include_domains = request.include_domains.len(),
            exclude_domains = request.exclude_domains.len(),
            "linkup.search"
        );

        let resp = self.transport.search(&request).await?;
        ensure_success(&resp)?;
        Ok(resp)
    }
}

fn ensure_success(resp: &RawResponse) -> Result<()> {
    if resp.is_success() {
        return Ok(());
    }
    Err(LinkupError::Status {
        code: resp.status_code(),
        status: resp.status_text(),
    })
}

fn raw_json_body(resp: &RawResponse) -> Result<String> {
    String::from_utf8(resp.body.to_vec())
        .map_err(|e| LinkupError::Decode(serde::de::Error::custom(e)))
}

fn resolve_api_key(explicit: Option<&str>) -> Result<String> {
    if let Some(key) = explicit.map(str::trim).filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }
    match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(LinkupError::Config(format!(
            "api key not provided and could not find {API_KEY_ENV} in the environment"
        ))),
    }
}

fn mask_key(key: &str) -> String {
    let tail: String = key
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if key.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("****{tail}")
    }
}
