//! Caller-facing options and the request bodies built from them.

use crate::types::{FetchRequest, OutputType, SearchDepth, SearchRequest};
use chrono::NaiveDate;
use linkup_common::{LinkupError, Result};
use serde_json::Value;

/// Upper bound on `include_domains` accepted by the search endpoint.
pub const MAX_INCLUDE_DOMAINS: usize = 100;

/// Optional search filters. `Default` leaves the search unrestricted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOptions {
    pub exclude_domains: Vec<String>,
    pub include_domains: Vec<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub include_images: bool,
    /// Only meaningful for [`OutputType::SourcedAnswer`].
    pub include_inline_citations: bool,
    /// Only meaningful for [`OutputType::Structured`]; switches the response
    /// to the `{data, sources}` envelope.
    pub include_sources: bool,
    pub max_results: Option<f64>,
}

impl SearchOptions {
    /// Check the constraints the search endpoint documents for its filters.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use linkup_sdk::SearchOptions;
    ///
    /// let opts = SearchOptions {
    ///     from_date: NaiveDate::from_ymd_opt(2024, 6, 1),
    ///     to_date: NaiveDate::from_ymd_opt(2024, 1, 1),
    ///     ..Default::default()
    /// };
    /// assert!(opts.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        if self.include_domains.len() > MAX_INCLUDE_DOMAINS {
            return Err(LinkupError::InvalidOptions(format!(
                "at most {MAX_INCLUDE_DOMAINS} include domains are allowed, got {}",
                self.include_domains.len()
            )));
        }

        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1);
        for (label, date) in [("from_date", self.from_date), ("to_date", self.to_date)] {
            if let Some(d) = date {
                if epoch.is_some_and(|e| d < e) {
                    return Err(LinkupError::InvalidOptions(format!(
                        "{label} {d} is earlier than 1970-01-01"
                    )));
                }
            }
        }
        if let (Some(from), Some(to)) = (self.from_date, self.to_date) {
            if from >= to {
                return Err(LinkupError::InvalidOptions(format!(
                    "from_date {from} must be before to_date {to}"
                )));
            }
        }

        if let Some(max) = self.max_results {
            if !max.is_finite() || max <= 0.0 {
                return Err(LinkupError::InvalidOptions(format!(
                    "max_results must be a positive number, got {max}"
                )));
            }
        }
        Ok(())
    }
}

/// Options for `/v1/fetch`; all off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    pub extract_images: bool,
    pub include_raw_html: bool,
    pub render_js: bool,
}

/// A complete search: query text, depth, output type and filters.
///
/// Structured queries can only be built with a schema attached.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub query: String,
    pub depth: SearchDepth,
    pub options: SearchOptions,
    output_type: OutputType,
    schema: Option<Value>,
}

impl SearchQuery {
    pub fn search_results(query: impl Into<String>, depth: SearchDepth) -> Self {
        Self::new(query.into(), depth, OutputType::SearchResults, None)
    }

    pub fn sourced_answer(query: impl Into<String>, depth: SearchDepth) -> Self {
        Self::new(query.into(), depth, OutputType::SourcedAnswer, None)
    }

    pub fn structured(query: impl Into<String>, depth: SearchDepth, schema: Value) -> Self {
        Self::new(query.into(), depth, OutputType::Structured, Some(schema))
    }

    fn new(query: String, depth: SearchDepth, output_type: OutputType, schema: Option<Value>) -> Self {
        Self {
            query,
            depth,
            options: SearchOptions::default(),
            output_type,
            schema,
        }
    }

    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn output_type(&self) -> OutputType {
        self.output_type
    }

    pub fn schema(&self) -> Option<&Value> {
        self.schema.as_ref()
    }
}

pub(crate) fn build_search_request(
    query: &str,
    depth: SearchDepth,
    output_type: OutputType,
    options: &SearchOptions,
    schema: Option<&Value>,
) -> Result<SearchRequest> {
    options.validate()?;

    let structured_output_schema = match output_type {
        OutputType::Structured => match schema {
            Some(s) if !s.is_null() => Some(s.clone()),
            _ => {
                return Err(LinkupError::InvalidOptions(
                    "structured searches require a JSON schema".into(),
                ));
            }
        },
        _ => None,
    };

    Ok(SearchRequest {
        q: query.to_string(),
        depth,
        output_type,
        exclude_domains: options.exclude_domains.clone(),
        include_domains: options.include_domains.clone(),
        from_date: options.from_date,
        to_date: options.to_date,
        include_images: options.include_images,
        max_results: options.max_results,
        include_inline_citations: options.include_inline_citations,
        include_sources: options.include_sources,
        structured_output_schema,
    })
}

pub(crate) fn build_fetch_request(url: &str, options: &FetchOptions) -> Result<FetchRequest> {
    let url = url.trim();
    if url.is_empty() {
        return Err(LinkupError::InvalidOptions("fetch requires a url".into()));
    }
    Ok(FetchRequest {
        url: url.to_string(),
        render_js: options.render_js,
        include_raw_html: options.include_raw_html,
        extract_images: options.extract_images,
    })
}
