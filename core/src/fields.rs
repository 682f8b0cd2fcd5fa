//! Field builders.
//!
//! One constructor per [`FieldType`]. Each takes a [`FieldSpec`] shell with
//! the shared descriptor settings and installs the type-specific parse
//! function, so the resulting [`FieldDef`] always produces values of its own
//! type.
//!
//! # Examples
//!
//! ```
//! use query_schema_core::{FieldError, FieldSpec, fields};
//!
//! let width = fields::number(
//!     FieldSpec::new("Canvas width")
//!         .with_default(800.0)
//!         .with_validator(|w: &f64| {
//!             if *w > 4096.0 {
//!                 Err(FieldError::invalid("Width is too large"))
//!             } else {
//!                 Ok(())
//!             }
//!         }),
//! );
//! assert_eq!(width.value_type.as_str(), "number");
//! ```

use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::parsers::{parse_boolean, parse_color, parse_date, parse_number};
use crate::{FieldDef, FieldError, FieldType, RawValue, ValidateFn, Value};

/// Typed validator accepted by [`FieldSpec::with_validator`].
pub type TypedValidator<T> = Arc<dyn Fn(&T) -> Result<(), FieldError> + Send + Sync>;

/// Override applied to the item list of an array field.
pub type ListParseFn = Arc<dyn Fn(Vec<String>) -> Result<Vec<String>, FieldError> + Send + Sync>;

/// Rust types that back a field's value.
pub trait FieldValue: Sized + Send + Sync + 'static {
    /// Wraps the typed value for the given field type.
    fn into_value(self, field_type: FieldType) -> Value;

    /// Borrows the typed value back out of a [`Value`].
    fn extract(value: &Value) -> Option<&Self>;
}

impl FieldValue for String {
    fn into_value(self, field_type: FieldType) -> Value {
        match field_type {
            FieldType::Color => Value::Color(self),
            _ => Value::String(self),
        }
    }

    fn extract(value: &Value) -> Option<&Self> {
        match value {
            Value::String(s) | Value::Color(s) => Some(s),
            _ => None,
        }
    }
}

impl FieldValue for bool {
    fn into_value(self, _: FieldType) -> Value {
        Value::Boolean(self)
    }

    fn extract(value: &Value) -> Option<&Self> {
        match value {
            Value::Boolean(b) => Some(b),
            _ => None,
        }
    }
}

impl FieldValue for f64 {
    fn into_value(self, _: FieldType) -> Value {
        Value::Number(self)
    }

    fn extract(value: &Value) -> Option<&Self> {
        match value {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }
}

impl FieldValue for NaiveDateTime {
    fn into_value(self, _: FieldType) -> Value {
        Value::Date(self)
    }

    fn extract(value: &Value) -> Option<&Self> {
        match value {
            Value::Date(d) => Some(d),
            _ => None,
        }
    }
}

impl FieldValue for Vec<String> {
    fn into_value(self, _: FieldType) -> Value {
        Value::Array(self)
    }

    fn extract(value: &Value) -> Option<&Self> {
        match value {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }
}

/// Settings shared by every field builder.
///
/// # Examples
///
/// ```
/// use query_schema_core::FieldSpec;
///
/// let spec = FieldSpec::<bool>::new("Enable debug overlay")
///     .with_default(false)
///     .with_order(3);
/// assert!(!spec.required);
/// assert_eq!(spec.order, 3);
/// ```
pub struct FieldSpec<T> {
    pub description: String,
    pub default: Option<T>,
    pub required: bool,
    pub order: i32,
    pub validator: Option<TypedValidator<T>>,
    list_parse: Option<ListParseFn>,
}

impl<T: FieldValue> FieldSpec<T> {
    /// Creates an optional field spec with no default.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            default: None,
            required: false,
            order: 0,
            validator: None,
            list_parse: None,
        }
    }

    /// Marks the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<T>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Sets the display sort hint.
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Installs a check run after a successful parse.
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&T) -> Result<(), FieldError> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }
}

impl FieldSpec<Vec<String>> {
    /// Installs an override that transforms or rejects the item list of an
    /// array field.
    ///
    /// # Examples
    ///
    /// ```
    /// use query_schema_core::{FieldSpec, RawValue, Value, fields};
    ///
    /// let ids = fields::array(
    ///     FieldSpec::<Vec<String>>::new("Ids").with_parse(|items| {
    ///         Ok(items.into_iter().map(|s| s.to_uppercase()).collect())
    ///     }),
    /// );
    /// let value = (ids.parse)(&RawValue::from("a,b")).unwrap();
    /// assert_eq!(value, Value::Array(vec!["A".into(), "B".into()]));
    /// ```
    pub fn with_parse<F>(mut self, parse: F) -> Self
    where
        F: Fn(Vec<String>) -> Result<Vec<String>, FieldError> + Send + Sync + 'static,
    {
        self.list_parse = Some(Arc::new(parse));
        self
    }
}

fn build<T, P>(value_type: FieldType, spec: FieldSpec<T>, parse: P) -> FieldDef
where
    T: FieldValue,
    P: Fn(&RawValue) -> Result<Value, FieldError> + Send + Sync + 'static,
{
    let validator = spec.validator.map(|typed| {
        Arc::new(move |value: &Value| match T::extract(value) {
            Some(inner) => typed(inner),
            // Builders only ever produce their own variant.
            None => Ok(()),
        }) as ValidateFn
    });

    FieldDef {
        value_type,
        default: spec.default.map(|d| d.into_value(value_type)),
        required: spec.required,
        description: spec.description,
        order: spec.order,
        parse: Arc::new(parse),
        validator,
    }
}

fn single(raw: &RawValue) -> Result<&str, FieldError> {
    match raw {
        RawValue::Single(s) => Ok(s),
        RawValue::Multiple(_) => Err(FieldError::UnexpectedArray),
    }
}

/// Plain string field.
pub fn string(spec: FieldSpec<String>) -> FieldDef {
    build(FieldType::String, spec, |raw| match raw {
        RawValue::Single(s) => Ok(Value::String(s.clone())),
        RawValue::Multiple(_) => Err(FieldError::ExpectedSingleValue),
    })
}

/// Boolean switch field; see [`parse_boolean`].
pub fn boolean(spec: FieldSpec<bool>) -> FieldDef {
    build(FieldType::Boolean, spec, |raw| match raw {
        RawValue::Single(s) => Ok(Value::Boolean(parse_boolean(s))),
        RawValue::Multiple(_) => Err(FieldError::ExpectedSingleValue),
    })
}

/// Decimal number field; see [`parse_number`].
pub fn number(spec: FieldSpec<f64>) -> FieldDef {
    build(FieldType::Number, spec, |raw| {
        parse_number(single(raw)?).map(Value::Number)
    })
}

/// Opaque color field, normalized to lowercase `#rrggbb`.
pub fn color(spec: FieldSpec<String>) -> FieldDef {
    build(FieldType::Color, spec, |raw| {
        normalize_color(single(raw)?).map(Value::Color)
    })
}

/// Timestamp field; see [`parse_date`].
pub fn date(spec: FieldSpec<NaiveDateTime>) -> FieldDef {
    build(FieldType::Date, spec, |raw| {
        parse_date(single(raw)?)
            .map(Value::Date)
            .ok_or(FieldError::InvalidDate)
    })
}

/// String list field.
///
/// A repeated parameter is taken as given; a single value is split on
/// commas with whitespace trimmed and empty segments dropped.
pub fn array(spec: FieldSpec<Vec<String>>) -> FieldDef {
    let list_parse = spec.list_parse.clone();
    build(FieldType::Array, spec, move |raw| {
        let items = split_list(raw);
        match &list_parse {
            Some(parse) => parse(items).map(Value::Array),
            None => Ok(Value::Array(items)),
        }
    })
}

/// Splits raw input into list items the way array fields do.
///
/// # Examples
///
/// ```
/// use query_schema_core::{RawValue, fields::split_list};
///
/// assert_eq!(split_list(&RawValue::from("a, b ,c,,")), vec!["a", "b", "c"]);
/// assert_eq!(split_list(&RawValue::from(vec![" a ", ""])), vec![" a ", ""]);
/// ```
pub fn split_list(raw: &RawValue) -> Vec<String> {
    match raw {
        RawValue::Multiple(items) => items.clone(),
        RawValue::Single(s) => s
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(String::from)
            .collect(),
    }
}

/// Normalizes user color input to lowercase `#rrggbb`.
///
/// A missing leading `#` is added before parsing. Translucent colors are
/// rejected.
///
/// # Examples
///
/// ```
/// use query_schema_core::{FieldError, fields::normalize_color};
///
/// assert_eq!(normalize_color("f00").unwrap(), "#ff0000");
/// assert_eq!(normalize_color("#FF0000").unwrap(), "#ff0000");
/// assert_eq!(normalize_color("#ff000080"), Err(FieldError::AlphaNotSupported));
/// ```
pub fn normalize_color(input: &str) -> Result<String, FieldError> {
    let prefixed;
    let candidate = if input.starts_with('#') {
        input
    } else {
        prefixed = format!("#{input}");
        &prefixed
    };

    let color = parse_color(candidate).ok_or(FieldError::InvalidColor)?;
    if !color.is_opaque() {
        return Err(FieldError::AlphaNotSupported);
    }
    Ok(color.to_hex())
}
