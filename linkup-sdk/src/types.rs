//! Wire types for the `/v1/search`, `/v1/fetch` and `/v1/credits/balance`
//! endpoints, plus the typed outputs handed back to callers.

use chrono::NaiveDate;
use linkup_common::{LinkupError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// How thorough a search should be.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    #[default]
    Standard,
    Deep,
}

/// Shape of the `/v1/search` response.
///
/// Unknown values fail closed:
///
/// ```
/// use linkup_sdk::OutputType;
///
/// assert_eq!("sourcedAnswer".parse::<OutputType>().unwrap(), OutputType::SourcedAnswer);
/// assert!("summary".parse::<OutputType>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutputType {
    SearchResults,
    SourcedAnswer,
    Structured,
}

fn parse_wire_enum<T: DeserializeOwned>(s: &str) -> Result<T> {
    Ok(serde_json::from_value(Value::String(s.to_string()))?)
}

impl FromStr for SearchDepth {
    type Err = LinkupError;

    fn from_str(s: &str) -> Result<Self> {
        parse_wire_enum(s)
    }
}

impl FromStr for OutputType {
    type Err = LinkupError;

    fn from_str(s: &str) -> Result<Self> {
        parse_wire_enum(s)
    }
}

impl fmt::Display for SearchDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Standard => "standard",
            Self::Deep => "deep",
        })
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SearchResults => "searchResults",
            Self::SourcedAnswer => "sourcedAnswer",
            Self::Structured => "structured",
        })
    }
}

// ==============================
// Requests
// ==============================

/// Body of `POST /v1/search`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub q: String,
    pub depth: SearchDepth,
    pub output_type: OutputType,
    pub exclude_domains: Vec<String>,
    pub include_domains: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_date: Option<NaiveDate>,
    pub include_images: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<f64>,
    pub include_inline_citations: bool,
    pub include_sources: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_output_schema: Option<Value>,
}

/// Body of `POST /v1/fetch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    pub url: String,
    pub render_js: bool,
    pub include_raw_html: bool,
    pub extract_images: bool,
}

// ==============================
// Search results
// ==============================

/// A web page hit. `name` and `url` are required; a missing `content` or
/// `favicon` decodes as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSearchResult {
    pub name: String,
    #[serde(default)]
    pub content: String,
    pub url: String,
    #[serde(default)]
    pub favicon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSearchResult {
    pub name: String,
    pub url: String,
}

/// `searchResults` output, split by the `type` discriminator of each item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResultsOutput {
    pub text_results: Vec<TextSearchResult>,
    pub image_results: Vec<ImageSearchResult>,
}

impl SearchResultsOutput {
    pub fn is_empty(&self) -> bool {
        self.text_results.is_empty() && self.image_results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.text_results.len() + self.image_results.len()
    }
}

// ==============================
// Sourced answers
// ==============================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub url: String,
    pub snippet: String,
    #[serde(default)]
    pub favicon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcedAnswer {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<Source>,
}

// ==============================
// Structured output
// ==============================

/// Citation attached to a structured result; every field is optional upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredSource {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Structured result returned when sources were requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredWithSources {
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<StructuredSource>>,
}

/// `structured` output. Which variant is present is decided by the
/// `include_sources` option of the request, never by the response body.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredOutput {
    /// Response body verbatim; it follows the submitted schema.
    RawJson(String),
    /// `{data, sources}` envelope.
    Sourced(StructuredWithSources),
}

impl StructuredOutput {
    pub fn raw_json(&self) -> Option<&str> {
        match self {
            Self::RawJson(raw) => Some(raw),
            Self::Sourced(_) => None,
        }
    }

    pub fn sourced_output(&self) -> Option<&StructuredWithSources> {
        match self {
            Self::RawJson(_) => None,
            Self::Sourced(sourced) => Some(sourced),
        }
    }

    /// Decode either variant into the caller's result shape.
    pub fn decode_into<T: DeserializeOwned>(&self) -> Result<T> {
        match self {
            Self::RawJson(raw) => crate::decode::decode(raw),
            Self::Sourced(sourced) => crate::decode::decode_from_sourced_data(sourced),
        }
    }
}

/// Any `/v1/search` output, tagged by the output type that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutput {
    SearchResults(SearchResultsOutput),
    SourcedAnswer(SourcedAnswer),
    Structured(StructuredOutput),
}

impl SearchOutput {
    pub fn output_type(&self) -> OutputType {
        match self {
            Self::SearchResults(_) => OutputType::SearchResults,
            Self::SourcedAnswer(_) => OutputType::SourcedAnswer,
            Self::Structured(_) => OutputType::Structured,
        }
    }
}

// ==============================
// Fetch & balance
// ==============================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchOutput {
    pub markdown: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<FetchImage>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Credit {
    pub balance: f64,
}
