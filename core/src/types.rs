//! Field model and parse result types.
//!
//! A [`FieldSet`] maps field names to [`FieldDef`] descriptors. Each
//! descriptor carries its value type, default, required flag, display
//! metadata, and the parse/validate functions installed by the builder that
//! created it. The engine turns a [`RawQuery`] into a [`ParseResult`].

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize, Serializer};

use crate::{ErrorKind, FieldError};

/// Text layout used when rendering and serializing date values.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse function installed on a field: raw input to typed value.
pub type ParseFn = Arc<dyn Fn(&RawValue) -> Result<Value, FieldError> + Send + Sync>;

/// Second-stage check run on a successfully parsed value.
pub type ValidateFn = Arc<dyn Fn(&Value) -> Result<(), FieldError> + Send + Sync>;

/// Value type tag of a field.
///
/// # Examples
///
/// ```
/// use query_schema_core::FieldType;
///
/// assert_eq!(FieldType::Color.as_str(), "color");
/// assert_eq!("array".parse::<FieldType>(), Ok(FieldType::Array));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Boolean,
    Number,
    Color,
    Date,
    /// Ordered list of strings.
    Array,
}

impl FieldType {
    /// Returns the lowercase tag name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::Color => "color",
            Self::Date => "date",
            Self::Array => "array",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(Self::String),
            "boolean" => Ok(Self::Boolean),
            "number" => Ok(Self::Number),
            "color" => Ok(Self::Color),
            "date" => Ok(Self::Date),
            "array" => Ok(Self::Array),
            other => Err(format!("unknown field type: {other}")),
        }
    }
}

/// A resolved, typed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Boolean(bool),
    Number(f64),
    /// Normalized lowercase `#rrggbb`.
    Color(String),
    /// Local wall-clock time.
    Date(NaiveDateTime),
    Array(Vec<String>),
}

impl Value {
    /// Returns the value type tag this value belongs to.
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::String(_) => FieldType::String,
            Self::Boolean(_) => FieldType::Boolean,
            Self::Number(_) => FieldType::Number,
            Self::Color(_) => FieldType::Color,
            Self::Date(_) => FieldType::Date,
            Self::Array(_) => FieldType::Array,
        }
    }

    /// Returns the string for string and color values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Color(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[String]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) | Self::Color(s) => f.write_str(s),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Self::Array(items) => f.write_str(&items.join(",")),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::String(s) | Self::Color(s) => serializer.serialize_str(s),
            Self::Boolean(b) => serializer.serialize_bool(*b),
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Date(d) => serializer.collect_str(&d.format(DATE_FORMAT)),
            Self::Array(items) => items.serialize(serializer),
        }
    }
}

/// One raw query parameter: a single string or a repeated parameter.
///
/// # Examples
///
/// ```
/// use query_schema_core::RawValue;
///
/// let mut value = RawValue::from("a");
/// value.push("b".to_string());
/// assert_eq!(value, RawValue::Multiple(vec!["a".into(), "b".into()]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Single(String),
    Multiple(Vec<String>),
}

impl RawValue {
    /// Appends another occurrence, turning a single value into a sequence.
    pub fn push(&mut self, value: String) {
        match self {
            Self::Single(first) => {
                *self = Self::Multiple(vec![std::mem::take(first), value]);
            }
            Self::Multiple(items) => items.push(value),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for RawValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multiple(values)
    }
}

impl From<Vec<&str>> for RawValue {
    fn from(values: Vec<&str>) -> Self {
        Self::Multiple(values.into_iter().map(String::from).collect())
    }
}

/// Unparsed input keyed by field name.
pub type RawQuery = BTreeMap<String, RawValue>;

/// Builds a [`RawQuery`] from `(key, value)` pairs; repeated keys accumulate.
///
/// # Examples
///
/// ```
/// use query_schema_core::{RawValue, raw_query_from_pairs};
///
/// let raw = raw_query_from_pairs([("tag", "a"), ("tag", "b"), ("q", "x")]);
/// assert_eq!(raw["tag"], RawValue::from(vec!["a", "b"]));
/// assert_eq!(raw["q"], RawValue::from("x"));
/// ```
pub fn raw_query_from_pairs<I, K, V>(pairs: I) -> RawQuery
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut raw = RawQuery::new();
    for (key, value) in pairs {
        let value = value.into();
        match raw.entry(key.into()) {
            Entry::Occupied(mut entry) => entry.get_mut().push(value),
            Entry::Vacant(entry) => {
                entry.insert(RawValue::Single(value));
            }
        }
    }
    raw
}

/// Descriptor for one named input slot.
///
/// Construct with the builders in [`crate::fields`] so that `value_type`,
/// `default` and the installed parse function agree.
#[derive(Clone)]
pub struct FieldDef {
    pub value_type: FieldType,
    pub default: Option<Value>,
    pub required: bool,
    pub description: String,
    /// Display sort hint; lower sorts first.
    pub order: i32,
    pub parse: ParseFn,
    pub validator: Option<ValidateFn>,
}

impl FieldDef {
    /// Runs the parse function and, on success, the validator.
    pub fn resolve(&self, raw: &RawValue) -> Result<Value, FieldError> {
        let value = (self.parse)(raw)?;
        if let Some(validator) = &self.validator {
            validator(&value)?;
        }
        Ok(value)
    }
}

impl fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("value_type", &self.value_type)
            .field("default", &self.default)
            .field("required", &self.required)
            .field("description", &self.description)
            .field("order", &self.order)
            .field("validator", &self.validator.is_some())
            .finish_non_exhaustive()
    }
}

/// Named collection of field descriptors.
///
/// # Examples
///
/// ```
/// use query_schema_core::{FieldSet, FieldSpec, fields};
///
/// let set = FieldSet::new()
///     .with_field("q", fields::string(FieldSpec::new("Search text").required()))
///     .with_field("page", fields::number(FieldSpec::new("Page").with_default(1.0)));
/// assert_eq!(set.len(), 2);
/// assert!(set.get("q").unwrap().required);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FieldSet {
    fields: BTreeMap<String, FieldDef>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, replacing any existing field with the same name.
    pub fn with_field(mut self, name: impl Into<String>, field: FieldDef) -> Self {
        self.insert(name, field);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, field: FieldDef) -> Option<FieldDef> {
        self.fields.insert(name.into(), field)
    }

    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldDef)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    /// Returns fields in display order: required first, then `order`
    /// ascending, then name.
    pub fn display_order(&self) -> Vec<(&str, &FieldDef)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|(a_name, a), (b_name, b)| {
            b.required
                .cmp(&a.required)
                .then(a.order.cmp(&b.order))
                .then(a_name.cmp(b_name))
        });
        entries
    }
}

impl<K: Into<String>> FromIterator<(K, FieldDef)> for FieldSet {
    fn from_iter<I: IntoIterator<Item = (K, FieldDef)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(name, field)| (name.into(), field))
                .collect(),
        }
    }
}

/// Collects named field descriptors into a [`FieldSet`].
pub fn define<I, K>(fields: I) -> FieldSet
where
    I: IntoIterator<Item = (K, FieldDef)>,
    K: Into<String>,
{
    fields.into_iter().collect()
}

/// Problem recorded for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    /// Whether the field is required.
    pub required: bool,
    pub message: String,
    pub kind: ErrorKind,
}

impl FieldIssue {
    /// Creates an issue from a field failure.
    pub fn new(required: bool, error: &FieldError) -> Self {
        Self {
            required,
            message: error.to_string(),
            kind: error.kind(),
        }
    }
}

/// Output of the parse engine: typed values plus per-field problems.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseResult {
    /// Resolved value per field; absent when no value and no default.
    pub values: BTreeMap<String, Value>,
    /// Only fields with problems appear here.
    pub errors: BTreeMap<String, FieldIssue>,
}

impl ParseResult {
    /// Returns `true` when no field reported a problem.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns `true` when a required field reported a problem.
    pub fn has_required_errors(&self) -> bool {
        self.errors.values().any(|issue| issue.required)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}
