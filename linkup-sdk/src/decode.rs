//! Decoding structured search output back into caller-defined types.
//!
//! ```
//! use linkup_sdk::decode::decode;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Lake { name: String, depth_m: u32 }
//!
//! let lake: Lake = decode(r#"{"name":"Como","depth_m":425}"#)?;
//! assert_eq!(lake.name, "Como");
//! assert_eq!(lake.depth_m, 425);
//! # Ok::<(), linkup_sdk::LinkupError>(())
//! ```

use crate::types::StructuredWithSources;
use linkup_common::{LinkupError, Result};
use serde::de::DeserializeOwned;

/// Deserialize a raw JSON string (e.g. [`crate::StructuredOutput::RawJson`]).
pub fn decode<T: DeserializeOwned>(json: &str) -> Result<T> {
    Ok(serde_json::from_str(json)?)
}

/// Deserialize the `data` map of a sourced structured result.
///
/// Fails with [`LinkupError::MissingData`] when the map is absent.
pub fn decode_from_sourced_data<T: DeserializeOwned>(output: &StructuredWithSources) -> Result<T> {
    let data = output.data.as_ref().ok_or(LinkupError::MissingData)?;
    let bytes = serde_json::to_vec(data)?;
    Ok(serde_json::from_slice(&bytes)?)
}
