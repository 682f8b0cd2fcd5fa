//! Declarative schema files.
//!
//! A schema file describes a field set in YAML or JSON so that it can live
//! next to the application instead of in code.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! fields:
//!   width:
//!     type: number
//!     description: Canvas width
//!     default: 800
//!     min: 1
//!     max: 4096
//!   theme:
//!     type: string
//!     choices: [light, dark]
//!     required: true
//!   tags:
//!     type: array
//!     max_items: 5
//! ```

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

use query_schema_core::fields::{self, TypedValidator};
use query_schema_core::{FieldDef, FieldSet, FieldSpec, FieldType, FieldValue, RawValue, Value, validate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::input::scalar_text;

/// On-disk encoding, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
}

impl FileFormat {
    /// `.json` selects JSON; anything else is read as YAML.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use query_schema_config::FileFormat;
    ///
    /// assert_eq!(FileFormat::from_path(Path::new("fields.JSON")), FileFormat::Json);
    /// assert_eq!(FileFormat::from_path(Path::new("fields.yml")), FileFormat::Yaml);
    /// assert_eq!(FileFormat::from_path(Path::new("fields")), FileFormat::Yaml);
    /// ```
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// One field as written in a schema file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Value type tag.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    /// Default value; parsed with the field's own rules when loaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// Display sort hint.
    #[serde(default)]
    pub order: i32,
    /// Inclusive lower bound (number fields).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Inclusive upper bound (number fields).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Allowed values (string fields) or allowed items (array fields).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    /// Regex the whole value must match (string fields).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
}

impl FieldConfig {
    /// Creates an optional field of the given type with no constraints.
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            description: String::new(),
            required: false,
            default: None,
            order: 0,
            min: None,
            max: None,
            choices: None,
            pattern: None,
            min_items: None,
            max_items: None,
        }
    }

    /// Builds the field descriptor, installing constraint validators and the
    /// typed default.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSchema`](ConfigError::InvalidSchema) when a
    /// constraint does not apply to the field type, bounds are inverted, the
    /// pattern does not compile, or the default does not parse.
    pub fn build(&self, name: &str) -> Result<FieldDef> {
        self.check_constraints(name)?;

        let mut field = match self.field_type {
            FieldType::String => fields::string(self.spec(self.string_checks(name)?)),
            FieldType::Boolean => fields::boolean(self.spec(Vec::new())),
            FieldType::Number => fields::number(self.spec(self.number_checks())),
            FieldType::Color => fields::color(self.spec(Vec::new())),
            FieldType::Date => fields::date(self.spec(Vec::new())),
            FieldType::Array => fields::array(self.spec(self.array_checks())),
        };
        field.default = self.typed_default(name, &field)?;
        Ok(field)
    }

    fn spec<T: FieldValue>(&self, checks: Vec<TypedValidator<T>>) -> FieldSpec<T> {
        let mut spec = FieldSpec::new(self.description.clone()).with_order(self.order);
        if self.required {
            spec = spec.required();
        }
        if !checks.is_empty() {
            spec = spec.with_validator(move |value: &T| {
                checks.iter().try_for_each(|check| check(value))
            });
        }
        spec
    }

    fn number_checks(&self) -> Vec<TypedValidator<f64>> {
        if self.min.is_none() && self.max.is_none() {
            return Vec::new();
        }
        let check: TypedValidator<f64> = Arc::new(validate::range(self.min, self.max));
        vec![check]
    }

    fn string_checks(&self, name: &str) -> Result<Vec<TypedValidator<String>>> {
        let mut checks: Vec<TypedValidator<String>> = Vec::new();
        if let Some(choices) = &self.choices {
            checks.push(Arc::new(validate::one_of(choices.clone())));
        }
        if let Some(pattern) = &self.pattern {
            let check = validate::matches(pattern)
                .map_err(|err| invalid(name, format!("bad pattern: {err}")))?;
            checks.push(Arc::new(check));
        }
        Ok(checks)
    }

    fn array_checks(&self) -> Vec<TypedValidator<Vec<String>>> {
        let mut checks: Vec<TypedValidator<Vec<String>>> = Vec::new();
        if let Some(choices) = &self.choices {
            checks.push(Arc::new(validate::each_one_of(choices.clone())));
        }
        if self.min_items.is_some() || self.max_items.is_some() {
            checks.push(Arc::new(validate::item_count(self.min_items, self.max_items)));
        }
        checks
    }

    fn check_constraints(&self, name: &str) -> Result<()> {
        let ty = self.field_type;
        let is_number = ty == FieldType::Number;
        let is_string = ty == FieldType::String;
        let is_array = ty == FieldType::Array;

        let constraints = [
            ("min", self.min.is_some(), is_number),
            ("max", self.max.is_some(), is_number),
            ("choices", self.choices.is_some(), is_string || is_array),
            ("pattern", self.pattern.is_some(), is_string),
            ("min_items", self.min_items.is_some(), is_array),
            ("max_items", self.max_items.is_some(), is_array),
        ];
        for (key, present, applies) in constraints {
            if present && !applies {
                return Err(invalid(name, format!("'{key}' does not apply to {ty} fields")));
            }
        }

        if let (Some(lo), Some(hi)) = (self.min, self.max) {
            if lo > hi {
                return Err(invalid(name, "'min' is greater than 'max'"));
            }
        }
        if let (Some(lo), Some(hi)) = (self.min_items, self.max_items) {
            if lo > hi {
                return Err(invalid(name, "'min_items' is greater than 'max_items'"));
            }
        }
        Ok(())
    }

    fn typed_default(&self, name: &str, field: &FieldDef) -> Result<Option<Value>> {
        let Some(default) = &self.default else {
            return Ok(None);
        };

        let raw = match default {
            serde_json::Value::Null => return Ok(None),
            serde_json::Value::Array(items) => RawValue::Multiple(
                items
                    .iter()
                    .map(scalar_text)
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| invalid(name, "default list must hold only scalars"))?,
            ),
            scalar => RawValue::Single(
                scalar_text(scalar)
                    .ok_or_else(|| invalid(name, "default must be a scalar or a list"))?,
            ),
        };

        field
            .resolve(&raw)
            .map(Some)
            .map_err(|err| invalid(name, format!("invalid default: {err}")))
    }
}

/// A complete schema file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaFile {
    /// Schema file format version (e.g., `"1.0"`).
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Field definitions keyed by parameter name.
    #[serde(default)]
    pub fields: BTreeMap<String, FieldConfig>,
}

impl SchemaFile {
    /// Creates an empty schema with the given version.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            name: None,
            description: None,
            fields: BTreeMap::new(),
        }
    }

    /// Adds a field definition.
    pub fn with_field(mut self, name: impl Into<String>, field: FieldConfig) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    /// Loads a schema from a JSON or YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](ConfigError::IoError) if the file cannot be read,
    /// or [`JsonError`](ConfigError::JsonError) /
    /// [`YamlError`](ConfigError::YamlError) if decoding fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(std::fs::File::open(path)?);
        let schema: Self = match FileFormat::from_path(path) {
            FileFormat::Json => serde_json::from_reader(reader)?,
            FileFormat::Yaml => serde_yaml::from_reader(reader)?,
        };
        debug!(
            path = %path.display(),
            fields = schema.fields.len(),
            "loaded schema file"
        );
        Ok(schema)
    }

    /// Saves the schema, encoding by file extension.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](ConfigError::IoError) if the file cannot be
    /// written, or a serialization error.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let writer = BufWriter::new(std::fs::File::create(path)?);
        match FileFormat::from_path(path) {
            FileFormat::Json => serde_json::to_writer_pretty(writer, self)?,
            FileFormat::Yaml => serde_yaml::to_writer(writer, self)?,
        }
        Ok(())
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds the field set described by this schema.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSchema`](ConfigError::InvalidSchema) for an empty
    /// version, an empty field name, or any field that fails
    /// [`FieldConfig::build`].
    ///
    /// # Examples
    ///
    /// ```
    /// use query_schema_config::SchemaFile;
    /// use query_schema_core::{Value, parse, raw_query_from_pairs};
    ///
    /// let schema = SchemaFile::from_yaml_str(r#"
    /// version: "1.0"
    /// fields:
    ///   accent:
    ///     type: color
    ///     default: f00
    ///   size:
    ///     type: number
    ///     min: 8
    /// "#).unwrap();
    /// let fields = schema.to_field_set().unwrap();
    ///
    /// let result = parse(&raw_query_from_pairs([("size", "4")]), &fields);
    /// assert_eq!(result.values["accent"], Value::Color("#ff0000".into()));
    /// assert_eq!(result.errors["size"].message, "Expected a value of at least 8");
    /// ```
    pub fn to_field_set(&self) -> Result<FieldSet> {
        if self.version.trim().is_empty() {
            return Err(ConfigError::InvalidSchema(
                "schema version cannot be empty".to_string(),
            ));
        }

        let mut set = FieldSet::new();
        for (name, config) in &self.fields {
            if name.trim().is_empty() {
                return Err(ConfigError::InvalidSchema(
                    "field name cannot be empty".to_string(),
                ));
            }
            set.insert(name.clone(), config.build(name)?);
        }
        Ok(set)
    }
}

/// Loads a schema file and builds its field set.
pub fn load_field_set(path: impl AsRef<Path>) -> Result<FieldSet> {
    SchemaFile::load(path)?.to_field_set()
}

fn invalid(field: &str, message: impl std::fmt::Display) -> ConfigError {
    ConfigError::InvalidSchema(format!("field '{field}': {message}"))
}
