//! Common types and utilities shared across the Linkup crates.
//!
//! This crate defines the shared error taxonomy and observability helpers
//! used throughout the workspace. It stays dependency-light so that every
//! crate can depend on it.
//!
//! # Overview
//!
//! - [`LinkupError`] and [`Result`]: Shared error handling
//! - [`observability`]: Centralised tracing/logging initialisation
//!
//! # Examples
//!
//! ```rust
//! use linkup_common::LinkupError;
//!
//! let err = LinkupError::Status {
//!     code: 429,
//!     status: "429 Too Many Requests".to_string(),
//! };
//! assert_eq!(
//!     err.to_string(),
//!     "response returned a status code of 429: 429 Too Many Requests"
//! );
//! ```
pub mod observability;

pub use linkup_http::HttpError;

/// Error types used across the Linkup client.
#[derive(thiserror::Error, Debug)]
pub enum LinkupError {
    /// No API key was supplied and none could be found in the environment,
    /// or client settings were otherwise unusable.
    #[error("configuration error: {0}")]
    Config(String),

    /// Search or fetch options violate a documented constraint.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// The transport failed before a response was received.
    #[error(transparent)]
    Transport(#[from] HttpError),

    /// The remote service answered with a non-2xx status.
    #[error("response returned a status code of {code}: {status}")]
    Status { code: u16, status: String },

    /// A payload was not valid JSON or did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A search-results call returned no item that was either text or image.
    #[error("no valid results were found")]
    NoValidResults,

    /// A sourced structured result carried no data map.
    #[error("the data field is null")]
    MissingData,
}

/// Convenient alias for results that use [`LinkupError`].
pub type Result<T> = std::result::Result<T, LinkupError>;
