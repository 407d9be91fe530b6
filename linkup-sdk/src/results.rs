//! Splitting polymorphic `searchResults` items into text and image results.

use crate::types::{ImageSearchResult, SearchResultsOutput, TextSearchResult};
use serde::Deserialize;
use serde_json::Value;

/// Raw `searchResults` body; items stay untyped until classified.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResultsEnvelope {
    #[serde(default)]
    pub results: Vec<Value>,
}

/// Route each item by its `type` field. `"image"` decodes as an image result
/// (extra fields dropped); anything else is decoded as a text result. Items
/// matching neither shape are skipped. Order is kept within each partition.
pub(crate) fn classify_results(items: Vec<Value>) -> SearchResultsOutput {
    let mut output = SearchResultsOutput {
        text_results: Vec::with_capacity(items.len()),
        image_results: Vec::with_capacity(items.len()),
    };

    for (index, item) in items.into_iter().enumerate() {
        let is_image = item.get("type").and_then(Value::as_str) == Some("image");
        if is_image {
            match serde_json::from_value::<ImageSearchResult>(item) {
                Ok(image) => output.image_results.push(image),
                Err(e) => skip(index, "image", &e),
            }
        } else {
            match serde_json::from_value::<TextSearchResult>(item) {
                Ok(text) => output.text_results.push(text),
                Err(e) => skip(index, "text", &e),
            }
        }
    }

    output
}

fn skip(index: usize, shape: &str, err: &serde_json::Error) {
    tracing::warn!(
        index,
        shape,
        error=%err,
        "linkup.search_results.skipped_item"
    );
}
