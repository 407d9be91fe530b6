//! Typed client for the Linkup web search and fetch API.
//!
//! [`LinkupClient`] wraps the `/v1/search`, `/v1/fetch` and
//! `/v1/credits/balance` endpoints. Search comes in three output types:
//!
//! - [`LinkupClient::get_search_results`]: text and image results
//! - [`LinkupClient::get_sourced_answer`]: an answer with its sources
//! - [`LinkupClient::get_structured_results`]: output shaped by a JSON Schema
//!   generated with [`schema::generate_json_schema`] and read back with
//!   [`decode`]
//!
//! # Examples
//! ```no_run
//! use linkup_sdk::{LinkupClient, SearchDepth, SearchOptions, schema::generate_json_schema};
//! use schemars::JsonSchema;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, JsonSchema)]
//! struct LakeComo {
//!     /// Castles to visit on Lake Como
//!     castles: Vec<String>,
//!     /// Cities to visit on Lake Como
//!     cities: Vec<String>,
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> linkup_sdk::Result<()> {
//! let client = LinkupClient::new(None)?; // reads LINKUP_API_KEY
//! let schema = generate_json_schema::<LakeComo>()?;
//! let output = client
//!     .get_structured_results("Places to visit on Lake Como", SearchDepth::Standard, &schema, None)
//!     .await?;
//! let lake: LakeComo = output.decode_into()?;
//! println!("{} castles", lake.castles.len());
//!
//! let opts = SearchOptions { include_sources: true, ..Default::default() };
//! let sourced = client
//!     .get_structured_results("Places to visit on Lake Como", SearchDepth::Deep, &schema, Some(&opts))
//!     .await?;
//! assert!(sourced.sourced_output().is_some());
//! # Ok(())
//! # }
//! ```
pub mod client;
pub mod decode;
pub mod query;
mod results;
pub mod schema;
pub mod transport;
pub mod types;

pub use chrono::NaiveDate;
pub use client::LinkupClient;
pub use linkup_common::{LinkupError, Result};
pub use query::{FetchOptions, MAX_INCLUDE_DOMAINS, SearchOptions, SearchQuery};
pub use transport::{HttpTransport, LinkupTransport};
pub use types::{
    FetchImage, FetchOutput, FetchRequest, ImageSearchResult, OutputType, SearchDepth,
    SearchOutput, SearchRequest, SearchResultsOutput, Source, SourcedAnswer, StructuredOutput,
    StructuredSource, StructuredWithSources, TextSearchResult,
};

/// Production API host.
pub const LINKUP_SERVER_URL: &str = linkup_config::DEFAULT_BASE_URL;
