//! Raw query input files.
//!
//! A JSON or YAML mapping from parameter name to a scalar or a list of
//! scalars. Scalars are kept as their textual form so the field set decides
//! how to interpret them; `null` entries count as absent.
//!
//! ```yaml
//! title: Hello
//! width: 800
//! tags: [a, b]
//! ```

use std::collections::BTreeMap;
use std::io::BufReader;
use std::path::Path;

use query_schema_core::{RawQuery, RawValue};
use tracing::debug;

use crate::FileFormat;
use crate::error::{ConfigError, Result};

/// Loads a raw query from a JSON or YAML file.
///
/// # Errors
///
/// Returns [`IoError`](ConfigError::IoError) if the file cannot be read,
/// a decode error if it is not a mapping, or
/// [`InvalidInput`](ConfigError::InvalidInput) for nested values.
pub fn load_raw_query(path: impl AsRef<Path>) -> Result<RawQuery> {
    let path = path.as_ref();
    let reader = BufReader::new(std::fs::File::open(path)?);
    let entries: BTreeMap<String, serde_json::Value> = match FileFormat::from_path(path) {
        FileFormat::Json => serde_json::from_reader(reader)?,
        FileFormat::Yaml => serde_yaml::from_reader(reader)?,
    };
    let raw = raw_query_from_values(entries)?;
    debug!(path = %path.display(), params = raw.len(), "loaded query input");
    Ok(raw)
}

/// Converts decoded values into a raw query.
///
/// # Examples
///
/// ```
/// use query_schema_config::raw_query_from_values;
/// use query_schema_core::RawValue;
///
/// let values = serde_json::json!({"n": 3, "on": true, "tags": ["a", 1], "skip": null});
/// let map = serde_json::from_value(values).unwrap();
/// let raw = raw_query_from_values(map).unwrap();
///
/// assert_eq!(raw["n"], RawValue::from("3"));
/// assert_eq!(raw["on"], RawValue::from("true"));
/// assert_eq!(raw["tags"], RawValue::from(vec!["a", "1"]));
/// assert!(!raw.contains_key("skip"));
/// ```
pub fn raw_query_from_values(entries: BTreeMap<String, serde_json::Value>) -> Result<RawQuery> {
    let mut raw = RawQuery::new();
    for (key, value) in entries {
        let converted = match value {
            serde_json::Value::Null => continue,
            serde_json::Value::Array(items) => RawValue::Multiple(
                items
                    .iter()
                    .map(scalar_text)
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| {
                        ConfigError::InvalidInput(format!("'{key}' must list only scalar values"))
                    })?,
            ),
            other => RawValue::Single(scalar_text(&other).ok_or_else(|| {
                ConfigError::InvalidInput(format!("'{key}' must be a scalar or a list"))
            })?),
        };
        raw.insert(key, converted);
    }
    Ok(raw)
}

/// Textual form of a JSON scalar; `None` for null, lists and maps.
pub(crate) fn scalar_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
