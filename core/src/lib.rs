//! Schema-driven parsing of query-string style input.
//!
//! This crate turns raw key/value input (each key carrying one string or a
//! list of strings) into typed values according to a set of field
//! definitions:
//!
//! - [`FieldDef`]: one named input slot with its value type, default, required
//!   flag, description, display order, parse and validate functions.
//! - [`fields`]: one builder per [`FieldType`] (`string`, `boolean`,
//!   `number`, `color`, `date`, `array`) taking a [`FieldSpec`] shell.
//! - [`FieldSet`] / [`define`]: the named collection of fields.
//! - [`parse`]: resolves a [`RawQuery`] against a [`FieldSet`], producing a
//!   [`ParseResult`] with the typed output record and the per-field error
//!   record. It never fails as a whole.
//!
//! The primitive parsers ([`parse_boolean`], [`parse_number`],
//! [`parse_color`], [`parse_date`]) are exposed on their own, reusable
//! validators live in [`validate`], and [`display`] renders field sets and
//! error records for a terminal.
//!
//! # Example
//!
//! ```
//! use query_schema_core::*;
//!
//! let schema = define([
//!     ("title", fields::string(FieldSpec::new("Card title").required())),
//!     ("accent", fields::color(FieldSpec::new("Accent color").with_default("#3366ff"))),
//!     ("dark", fields::boolean(FieldSpec::new("Dark mode").with_default(false))),
//!     ("tags", fields::array(FieldSpec::new("Tags"))),
//! ]);
//!
//! let raw = raw_query_from_pairs([("title", "Hello"), ("accent", "F80"), ("tags", "a, b")]);
//! let result = parse(&raw, &schema);
//!
//! assert!(result.is_ok());
//! assert_eq!(result.values["accent"], Value::Color("#ff8800".into()));
//! assert_eq!(result.values["dark"], Value::Boolean(false));
//! assert_eq!(result.values["tags"].as_array().unwrap(), ["a", "b"]);
//! ```

pub mod display;
mod engine;
mod error;
pub mod fields;
mod parsers;
mod types;
pub mod validate;

pub use engine::parse;
pub use error::{ErrorKind, FieldError, MISSING_REQUIRED_MESSAGE};
pub use fields::{FieldSpec, FieldValue};
pub use parsers::{Rgba, days_in_month, parse_boolean, parse_color, parse_date, parse_number};
pub use types::*;
