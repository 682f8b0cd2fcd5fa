//! The parse engine.
//!
//! [`parse`] walks a [`FieldSet`], resolves each field against the raw input
//! and produces the typed output record together with the error record. It
//! never panics and never returns an error: every problem is reported per
//! field in [`ParseResult::errors`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, trace, warn};

use crate::{FieldDef, FieldError, FieldIssue, FieldSet, ParseResult, RawQuery, RawValue, Value};

/// Resolves every field in `fields` against `raw`.
///
/// - Absent and required: error recorded, no output value.
/// - Absent and optional: the default, if any, becomes the output value.
/// - Present: parsed then validated. On failure the default (if any) is
///   still written to the output and the error is recorded, so callers must
///   consult [`ParseResult::errors`] to tell the two cases apart.
///
/// Keys in `raw` that have no field are ignored.
///
/// # Examples
///
/// ```
/// use query_schema_core::*;
///
/// let fields = define([
///     ("color", fields::color(FieldSpec::new("Text color").with_default("#000000"))),
///     ("size", fields::number(FieldSpec::new("Font size").required())),
/// ]);
/// let raw = raw_query_from_pairs([("color", "f00")]);
///
/// let result = parse(&raw, &fields);
/// assert_eq!(result.values["color"], Value::Color("#ff0000".into()));
/// assert!(result.errors["size"].required);
/// assert!(!result.values.contains_key("size"));
/// ```
///
/// # Panics
///
/// Never. A validator or array override that panics is recorded as that
/// field's error. The process panic hook still runs first, so the default
/// hook prints the panic to stderr; install a quieter hook if that output is
/// unwanted:
///
/// ```
/// use query_schema_core::*;
///
/// std::panic::set_hook(Box::new(|_| {}));
///
/// let fields = define([(
///     "n",
///     fields::number(FieldSpec::new("n").with_validator(|_: &f64| panic!("boom"))),
/// )]);
/// let result = parse(&raw_query_from_pairs([("n", "1")]), &fields);
/// assert_eq!(result.errors["n"].message, "boom");
/// ```
pub fn parse(raw: &RawQuery, fields: &FieldSet) -> ParseResult {
    let mut result = ParseResult::default();

    for (name, field) in fields.iter() {
        match (raw.get(name), field.required) {
            (None, true) => {
                debug!(field = name, "required field is missing");
                result
                    .errors
                    .insert(name.to_string(), FieldIssue::new(true, &FieldError::Missing));
            }
            (None, false) => {
                if let Some(default) = &field.default {
                    result.values.insert(name.to_string(), default.clone());
                }
            }
            (Some(value), _) => {
                let (resolved, issue) = resolve_field(name, field, value);
                if let Some(resolved) = resolved {
                    result.values.insert(name.to_string(), resolved);
                }
                if let Some(issue) = issue {
                    result.errors.insert(name.to_string(), issue);
                }
            }
        }
    }

    result
}

/// Resolves one present value, returning the output value and the issue
/// together so that fallback-to-default and error recording cannot disagree.
fn resolve_field(
    name: &str,
    field: &FieldDef,
    value: &RawValue,
) -> (Option<Value>, Option<FieldIssue>) {
    match contain_panics(name, || field.resolve(value)) {
        Ok(resolved) => {
            trace!(field = name, value = %resolved, "field resolved");
            (Some(resolved), None)
        }
        Err(err) => {
            debug!(field = name, error = %err, "field rejected, falling back to default");
            (
                field.default.clone(),
                Some(FieldIssue::new(field.required, &err)),
            )
        }
    }
}

// Validators and array override parsers are caller code; a panic in one is
// reported as a failure of that field.
fn contain_panics<F>(name: &str, resolve: F) -> Result<Value, FieldError>
where
    F: FnOnce() -> Result<Value, FieldError>,
{
    panic::catch_unwind(AssertUnwindSafe(resolve)).unwrap_or_else(|payload| {
        let message = panic_message(payload.as_ref());
        warn!(field = name, %message, "field parser panicked");
        Err(FieldError::Panicked(message))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "field parser panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use crate::{ErrorKind, FieldSpec, define, fields, raw_query_from_pairs};

    use super::*;

    #[test]
    fn test_missing_required_field() {
        let set = define([("q", fields::string(FieldSpec::new("query").required()))]);
        let result = parse(&RawQuery::new(), &set);

        assert!(result.values.is_empty());
        let issue = &result.errors["q"];
        assert!(issue.required);
        assert_eq!(issue.message, "Required field is missing");
        assert_eq!(issue.kind, ErrorKind::MissingRequired);
    }

    // A required field with a default still omits the output on absence.
    #[test]
    fn test_missing_required_field_ignores_default() {
        let set = define([(
            "q",
            fields::string(FieldSpec::new("query").required().with_default("x")),
        )]);
        let result = parse(&RawQuery::new(), &set);
        assert!(!result.values.contains_key("q"));
        assert!(result.errors.contains_key("q"));
    }

    #[test]
    fn test_missing_optional_field_uses_default() {
        let set = define([
            ("page", fields::number(FieldSpec::new("page").with_default(1.0))),
            ("sort", fields::string(FieldSpec::new("sort"))),
        ]);
        let result = parse(&RawQuery::new(), &set);

        assert_eq!(result.values["page"], Value::Number(1.0));
        assert!(!result.values.contains_key("sort"));
        assert!(result.is_ok());
    }

    #[test]
    fn test_invalid_value_falls_back_to_default_and_records_error() {
        let set = define([(
            "bg",
            fields::color(FieldSpec::new("background").with_default("#ffffff")),
        )]);
        let raw = raw_query_from_pairs([("bg", "#ff000080")]);
        let result = parse(&raw, &set);

        assert_eq!(result.values["bg"], Value::Color("#ffffff".into()));
        let issue = &result.errors["bg"];
        assert!(!issue.required);
        assert_eq!(issue.message, "Invalid color, alpha channel is not supported");
        assert_eq!(issue.kind, ErrorKind::ValidationFailed);
    }

    #[test]
    fn test_invalid_value_without_default_leaves_output_unset() {
        let set = define([("n", fields::number(FieldSpec::new("n").required()))]);
        let raw = raw_query_from_pairs([("n", "abc")]);
        let result = parse(&raw, &set);

        assert!(!result.values.contains_key("n"));
        assert!(result.errors["n"].required);
        assert_eq!(result.errors["n"].kind, ErrorKind::TypeMismatch);
        assert!(result.has_required_errors());
    }

    #[test]
    fn test_validator_failure_is_recorded() {
        let set = define([(
            "level",
            fields::number(
                FieldSpec::new("level")
                    .with_default(1.0)
                    .with_validator(|n: &f64| {
                        if *n > 5.0 {
                            Err(FieldError::invalid("Level must be at most 5"))
                        } else {
                            Ok(())
                        }
                    }),
            ),
        )]);

        let result = parse(&raw_query_from_pairs([("level", "9")]), &set);
        assert_eq!(result.values["level"], Value::Number(1.0));
        assert_eq!(result.errors["level"].message, "Level must be at most 5");

        let result = parse(&raw_query_from_pairs([("level", "3")]), &set);
        assert_eq!(result.values["level"], Value::Number(3.0));
        assert!(result.is_ok());
    }

    #[test]
    fn test_validator_not_run_when_parse_fails() {
        let set = define([(
            "n",
            fields::number(FieldSpec::new("n").with_validator(|_: &f64| {
                Err(FieldError::invalid("validator ran"))
            })),
        )]);
        let result = parse(&raw_query_from_pairs([("n", "x")]), &set);
        assert_eq!(result.errors["n"].message, "Expected a number");
    }

    #[test]
    fn test_panicking_override_is_contained() {
        let set = define([(
            "ids",
            fields::array(
                FieldSpec::<Vec<String>>::new("ids")
                    .with_default(vec!["0".to_string()])
                    .with_parse(|_| panic!("override exploded")),
            ),
        )]);
        let result = parse(&raw_query_from_pairs([("ids", "1,2")]), &set);

        assert_eq!(result.values["ids"], Value::Array(vec!["0".into()]));
        assert_eq!(result.errors["ids"].message, "override exploded");
    }

    #[test]
    fn test_panicking_validator_with_formatted_message() {
        let set = define([(
            "name",
            fields::string(FieldSpec::new("name").with_validator(|s: &String| {
                panic!("bad name: {s}")
            })),
        )]);
        let result = parse(&raw_query_from_pairs([("name", "zed")]), &set);
        assert_eq!(result.errors["name"].message, "bad name: zed");
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let set = define([("a", fields::string(FieldSpec::new("a")))]);
        let raw = raw_query_from_pairs([("a", "1"), ("b", "2")]);
        let result = parse(&raw, &set);
        assert_eq!(result.values.len(), 1);
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_is_deterministic() {
        let set = define([
            ("a", fields::array(FieldSpec::new("a"))),
            ("b", fields::boolean(FieldSpec::new("b").required())),
            ("c", fields::date(FieldSpec::new("c"))),
        ]);
        let raw = raw_query_from_pairs([("a", "x, y"), ("c", "bad")]);
        assert_eq!(parse(&raw, &set), parse(&raw, &set));
    }
}
