//! JSON Schema generation for structured search output.
//!
//! The schema travels inside the search request body, and the remote side does
//! not resolve references, so every subschema is inlined. Object schemas are
//! closed with `additionalProperties: false` and the `$schema`/`$id` metadata
//! is dropped.
//!
//! Field annotations map the usual schemars/serde way: doc comments and
//! `#[schemars(title = "..", description = "..")]` become `title`/`description`,
//! `#[schemars(example = "fn_name")]` adds `examples`, `#[serde(default)]`
//! adds `default`, unit enums become `enum` lists, externally tagged enums
//! become `oneOf` groups and untagged enums become `anyOf` unions.
//!
//! ```
//! use linkup_sdk::schema::generate_json_schema;
//! use schemars::JsonSchema;
//!
//! #[derive(JsonSchema)]
//! struct LakeComo {
//!     /// Castles to visit on Lake Como
//!     castles: Vec<String>,
//!     cities: Vec<String>,
//! }
//!
//! let schema = generate_json_schema::<LakeComo>()?;
//! assert_eq!(schema["additionalProperties"], false);
//! assert!(schema.get("$schema").is_none());
//! # Ok::<(), linkup_sdk::LinkupError>(())
//! ```

use linkup_common::Result;
use schemars::JsonSchema;
use schemars::r#gen::SchemaSettings;
use serde_json::Value;

// keywords whose values are instance data, not subschemas
const DATA_KEYWORDS: [&str; 4] = ["default", "enum", "const", "examples"];
// keywords whose values map arbitrary names to subschemas
const NAMED_SUBSCHEMA_KEYWORDS: [&str; 4] =
    ["properties", "patternProperties", "definitions", "$defs"];

/// Build a self-contained JSON Schema document for `T`.
pub fn generate_json_schema<T: JsonSchema>() -> Result<Value> {
    let settings = SchemaSettings::draft07().with(|s| {
        s.inline_subschemas = true;
        s.meta_schema = None;
    });
    let root = settings.into_generator().into_root_schema_for::<T>();
    let mut schema = serde_json::to_value(root)?;

    if let Value::Object(top) = &mut schema {
        top.remove("$schema");
        top.remove("$id");
        if top
            .get("definitions")
            .and_then(Value::as_object)
            .is_some_and(|defs| defs.is_empty())
        {
            top.remove("definitions");
        }
    }
    forbid_additional_properties(&mut schema);

    tracing::trace!(
        type_name = %T::schema_name(),
        "linkup.schema.generated"
    );
    Ok(schema)
}

fn forbid_additional_properties(v: &mut Value) {
    match v {
        Value::Object(map) => {
            if map.contains_key("properties") && !map.contains_key("additionalProperties") {
                map.insert("additionalProperties".into(), Value::Bool(false));
            }
            for (key, child) in map.iter_mut() {
                if DATA_KEYWORDS.contains(&key.as_str()) {
                    continue;
                }
                if NAMED_SUBSCHEMA_KEYWORDS.contains(&key.as_str()) {
                    // keys here are user-chosen names, every value is a schema
                    if let Value::Object(named) = child {
                        named.values_mut().for_each(forbid_additional_properties);
                    }
                    continue;
                }
                forbid_additional_properties(child);
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(forbid_additional_properties),
        _ => {}
    }
}
