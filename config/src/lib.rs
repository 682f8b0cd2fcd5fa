//! Declarative schema and input files for query-schema.
//!
//! This crate loads field sets from YAML or JSON schema files and raw query
//! input from YAML or JSON mappings, so that a schema can be maintained
//! outside of code.
//!
//! # Quick start
//!
//! ```no_run
//! use query_schema_config::{SchemaFile, load_raw_query};
//! use query_schema_core::parse;
//!
//! let fields = SchemaFile::load("fields.yml").unwrap().to_field_set().unwrap();
//! let raw = load_raw_query("query.json").unwrap();
//!
//! let result = parse(&raw, &fields);
//! for (name, issue) in &result.errors {
//!     eprintln!("{name}: {}", issue.message);
//! }
//! ```

mod error;
mod input;
mod schema;

pub use error::{ConfigError, Result};
pub use input::{load_raw_query, raw_query_from_values};
pub use schema::{FieldConfig, FileFormat, SchemaFile, load_field_set};
