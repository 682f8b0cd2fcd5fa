//! Reusable field validators.
//!
//! Each constructor returns a closure suitable for
//! [`FieldSpec::with_validator`](crate::FieldSpec::with_validator). They
//! cover the common range, membership, pattern and list-size checks.
//!
//! # Examples
//!
//! ```
//! use query_schema_core::*;
//!
//! let theme = fields::string(
//!     FieldSpec::new("Color theme").with_validator(validate::one_of(["light", "dark"])),
//! );
//! let result = parse(&raw_query_from_pairs([("theme", "blue")]), &define([("theme", theme)]));
//! assert_eq!(result.errors["theme"].message, "Expected one of: light, dark");
//! ```

use regex::Regex;

use crate::FieldError;

/// Number must fall within the inclusive bounds; either bound may be open.
///
/// # Examples
///
/// ```
/// use query_schema_core::validate::range;
///
/// let check = range(Some(1.0), Some(10.0));
/// assert!(check(&5.0).is_ok());
/// assert_eq!(check(&11.0).unwrap_err().to_string(), "Expected a value between 1 and 10");
///
/// let floor = range(Some(0.5), None);
/// assert_eq!(floor(&0.0).unwrap_err().to_string(), "Expected a value of at least 0.5");
/// ```
pub fn range(
    min: Option<f64>,
    max: Option<f64>,
) -> impl Fn(&f64) -> Result<(), FieldError> + Send + Sync + 'static {
    move |value: &f64| {
        let below = min.is_some_and(|m| *value < m);
        let above = max.is_some_and(|m| *value > m);
        if !below && !above {
            return Ok(());
        }
        let message = match (min, max) {
            (Some(lo), Some(hi)) => format!("Expected a value between {lo} and {hi}"),
            (Some(lo), None) => format!("Expected a value of at least {lo}"),
            (None, Some(hi)) => format!("Expected a value of at most {hi}"),
            (None, None) => unreachable!("an open range accepts every value"),
        };
        Err(FieldError::Invalid(message))
    }
}

/// String must be one of `choices`.
pub fn one_of<I, S>(choices: I) -> impl Fn(&String) -> Result<(), FieldError> + Send + Sync + 'static
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let choices: Vec<String> = choices.into_iter().map(Into::into).collect();
    move |value: &String| {
        if choices.iter().any(|c| c == value) {
            Ok(())
        } else {
            Err(choice_error(&choices))
        }
    }
}

/// Every item of an array must be one of `choices`.
///
/// # Examples
///
/// ```
/// use query_schema_core::validate::each_one_of;
///
/// let check = each_one_of(["a", "b"]);
/// assert!(check(&vec!["a".into(), "b".into()]).is_ok());
/// assert_eq!(
///     check(&vec!["a".into(), "z".into()]).unwrap_err().to_string(),
///     "Unexpected item 'z', expected one of: a, b"
/// );
/// ```
pub fn each_one_of<I, S>(
    choices: I,
) -> impl Fn(&Vec<String>) -> Result<(), FieldError> + Send + Sync + 'static
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let choices: Vec<String> = choices.into_iter().map(Into::into).collect();
    move |items: &Vec<String>| match items.iter().find(|item| !choices.contains(*item)) {
        Some(item) => Err(FieldError::Invalid(format!(
            "Unexpected item '{item}', expected one of: {}",
            choices.join(", ")
        ))),
        None => Ok(()),
    }
}

/// String must match `pattern` in full.
///
/// The pattern is anchored, so `[a-z]+` rejects `abc1`.
///
/// # Errors
///
/// Returns the regex error when `pattern` does not compile.
pub fn matches(
    pattern: &str,
) -> Result<impl Fn(&String) -> Result<(), FieldError> + Send + Sync + use<>, regex::Error> {
    let anchored = Regex::new(&format!("^(?:{pattern})$"))?;
    let pattern = pattern.to_string();
    Ok(move |value: &String| {
        if anchored.is_match(value) {
            Ok(())
        } else {
            Err(FieldError::Invalid(format!(
                "Expected a value matching /{pattern}/"
            )))
        }
    })
}

/// Array length must fall within the inclusive bounds.
pub fn item_count(
    min: Option<usize>,
    max: Option<usize>,
) -> impl Fn(&Vec<String>) -> Result<(), FieldError> + Send + Sync + 'static {
    move |items: &Vec<String>| {
        let len = items.len();
        if let Some(lo) = min.filter(|lo| len < *lo) {
            return Err(FieldError::Invalid(format!(
                "Expected at least {lo} item(s), got {len}"
            )));
        }
        if let Some(hi) = max.filter(|hi| len > *hi) {
            return Err(FieldError::Invalid(format!(
                "Expected at most {hi} item(s), got {len}"
            )));
        }
        Ok(())
    }
}

fn choice_error(choices: &[String]) -> FieldError {
    FieldError::Invalid(format!("Expected one of: {}", choices.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let check = range(Some(1.0), Some(3.0));
        assert!(check(&1.0).is_ok());
        assert!(check(&3.0).is_ok());
        assert!(check(&0.5).is_err());
        assert!(check(&3.5).is_err());
    }

    #[test]
    fn test_range_upper_only() {
        let check = range(None, Some(100.0));
        assert!(check(&0.0).is_ok());
        assert_eq!(
            check(&101.0).unwrap_err().to_string(),
            "Expected a value of at most 100"
        );
    }

    #[test]
    fn test_one_of() {
        let check = one_of(["asc", "desc"]);
        assert!(check(&"asc".to_string()).is_ok());
        assert_eq!(
            check(&"up".to_string()).unwrap_err(),
            FieldError::invalid("Expected one of: asc, desc")
        );
    }

    #[test]
    fn test_matches_requires_full_match() {
        let check = matches("[a-z]+").unwrap();
        assert!(check(&"abc".to_string()).is_ok());
        assert!(check(&"abc1".to_string()).is_err());
        assert!(check(&"".to_string()).is_err());
        assert_eq!(
            check(&"1".to_string()).unwrap_err().to_string(),
            "Expected a value matching /[a-z]+/"
        );
    }

    #[test]
    fn test_matches_alternation_is_anchored_as_a_group() {
        let check = matches("a|ab").unwrap();
        assert!(check(&"ab".to_string()).is_ok());
        assert!(check(&"abc".to_string()).is_err());
        assert!(matches("(").is_err());
    }

    #[test]
    fn test_item_count() {
        let check = item_count(Some(1), Some(2));
        assert!(check(&strings(&["a"])).is_ok());
        assert_eq!(
            check(&strings(&[])).unwrap_err().to_string(),
            "Expected at least 1 item(s), got 0"
        );
        assert_eq!(
            check(&strings(&["a", "b", "c"])).unwrap_err().to_string(),
            "Expected at most 2 item(s), got 3"
        );
    }

    #[test]
    fn test_each_one_of_accepts_empty_list() {
        let check = each_one_of(["x"]);
        assert!(check(&strings(&[])).is_ok());
    }
}
