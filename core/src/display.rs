//! Console rendering of field sets and error records.
//!
//! These helpers only read the engine's inputs and outputs; nothing here
//! feeds back into parsing.

use std::collections::BTreeMap;

use crate::{FieldIssue, FieldSet, FieldType};

fn ansi(code: &str, s: &str) -> String {
    format!("\x1B[{code}m{s}\x1B[0m")
}

pub fn red(s: &str) -> String {
    ansi("31", s)
}

pub fn green(s: &str) -> String {
    ansi("32", s)
}

pub fn yellow(s: &str) -> String {
    ansi("33", s)
}

pub fn blue(s: &str) -> String {
    ansi("34", s)
}

pub fn magenta(s: &str) -> String {
    ansi("35", s)
}

pub fn cyan(s: &str) -> String {
    ansi("36", s)
}

pub fn dim(s: &str) -> String {
    ansi("2", s)
}

pub fn gray(s: &str) -> String {
    ansi("90", s)
}

pub fn bold(s: &str) -> String {
    ansi("1", s)
}

/// Red `*` marker, optionally followed by a name.
///
/// # Examples
///
/// ```
/// use query_schema_core::display::required;
///
/// assert_eq!(required(None), "\x1B[31m*\x1B[0m");
/// assert_eq!(required(Some("id")), "\x1B[31m*id\x1B[0m");
/// ```
pub fn required(name: Option<&str>) -> String {
    match name {
        Some(name) if !name.is_empty() => red(&format!("*{name}")),
        _ => red("*"),
    }
}

/// Whether rendered output carries ANSI escapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub const ANSI: Self = Self { enabled: true };
    pub const PLAIN: Self = Self { enabled: false };

    fn paint(self, style: fn(&str) -> String, s: &str) -> String {
        if self.enabled {
            style(s)
        } else {
            s.to_string()
        }
    }
}

fn type_style(field_type: FieldType) -> fn(&str) -> String {
    match field_type {
        FieldType::String => cyan,
        FieldType::Boolean => magenta,
        FieldType::Number => yellow,
        FieldType::Color => green,
        FieldType::Date => blue,
        FieldType::Array => red,
    }
}

/// Renders the parameter listing with ANSI colors.
pub fn format_fields(fields: &FieldSet) -> String {
    render_fields(fields, Palette::ANSI)
}

/// Renders the parameter listing.
///
/// Fields are listed required first, then by `order`. Each line shows the
/// name, the `(type)` tag, a `*` for required fields, the description and
/// the default when there is one.
///
/// # Examples
///
/// ```
/// use query_schema_core::{FieldSpec, define, fields};
/// use query_schema_core::display::{Palette, render_fields};
///
/// let set = define([
///     ("page", fields::number(FieldSpec::new("Page number").with_default(1.0))),
///     ("q", fields::string(FieldSpec::new("Search text").required())),
/// ]);
/// let text = render_fields(&set, Palette::PLAIN);
/// assert_eq!(
///     text,
///     "Parameters:\n\n - q(string)*   : Search text\n - page(number) : Page number (default: 1)"
/// );
/// ```
pub fn render_fields(fields: &FieldSet, palette: Palette) -> String {
    let entries = fields.display_order();

    let label_len = |name: &str, required: bool, field_type: FieldType| {
        name.chars().count() + usize::from(required) + field_type.as_str().len() + 2
    };
    let width = entries
        .iter()
        .map(|(name, field)| label_len(name, field.required, field.value_type))
        .max()
        .unwrap_or(0);

    let lines: Vec<String> = entries
        .iter()
        .map(|(name, field)| {
            let padding = " ".repeat(width - label_len(name, field.required, field.value_type));
            let tag = palette.paint(type_style(field.value_type), &format!("({})", field.value_type));
            let marker = if field.required {
                palette.paint(red, "*")
            } else {
                String::new()
            };
            let default = field
                .default
                .as_ref()
                .map(|d| format!(" (default: {d})"))
                .unwrap_or_default();
            format!(
                " - {}{tag}{marker}{padding} : {}{default}",
                palette.paint(bold, name),
                palette.paint(gray, &field.description),
            )
        })
        .collect();

    format!("{}\n\n{}", palette.paint(bold, "Parameters:"), lines.join("\n"))
}

/// Renders an error record with ANSI colors.
pub fn format_errors(errors: &BTreeMap<String, FieldIssue>) -> String {
    render_errors(errors, Palette::ANSI)
}

/// Renders an error record; required-field messages in red, others in
/// yellow. An empty record renders as an empty string.
///
/// # Examples
///
/// ```
/// use query_schema_core::*;
/// use query_schema_core::display::{Palette, render_errors};
///
/// let set = define([("id", fields::number(FieldSpec::new("Id").required()))]);
/// let result = parse(&RawQuery::new(), &set);
/// assert_eq!(
///     render_errors(&result.errors, Palette::PLAIN),
///     "Errors:\n\n - id : Required field is missing"
/// );
/// ```
pub fn render_errors(errors: &BTreeMap<String, FieldIssue>, palette: Palette) -> String {
    if errors.is_empty() {
        return String::new();
    }

    let width = errors.keys().map(|name| name.chars().count()).max().unwrap_or(0);
    let lines: Vec<String> = errors
        .iter()
        .map(|(name, issue)| {
            let style = if issue.required { red } else { yellow };
            format!(
                " - {} : {}",
                palette.paint(bold, &format!("{name:<width$}")),
                palette.paint(style, &issue.message)
            )
        })
        .collect();

    let header = if palette.enabled {
        red(&bold("Errors:"))
    } else {
        "Errors:".to_string()
    };
    format!("{header}\n\n{}", lines.join("\n"))
}

/// Prints the colored parameter listing to stdout.
pub fn print_fields(fields: &FieldSet) {
    println!("{}", format_fields(fields));
}

/// Prints the colored error listing to stdout; prints nothing when empty.
pub fn print_errors(errors: &BTreeMap<String, FieldIssue>) {
    let text = format_errors(errors);
    if !text.is_empty() {
        println!("{text}");
    }
}
