//! Primitive string-to-value parsers.
//!
//! These are the leaf conversions used by the field builders. None of them
//! know about fields, defaults or multi-value input; they take one string and
//! either produce a semantic value or report that the string does not match.

use std::sync::LazyLock;

use chrono::{Days, NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::FieldError;

static HEX_COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^#([0-9a-f]{3,4}|[0-9a-f]{6}|[0-9a-f]{8})$").expect("static regex must compile")
});
static RGB_COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^rgba?\((\d+),\s*(\d+),\s*(\d+)(?:,\s*([\d.]+))?\)$")
        .expect("static regex must compile")
});
static DATE_LAYOUTS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"^(\d{4})-(\d{2})-(\d{2})\s(\d{2}):(\d{2}):(\d{2})$")
            .expect("static regex must compile"),
        Regex::new(r"^(\d{4})/(\d{2})/(\d{2})\s(\d{2}):(\d{2}):(\d{2})$")
            .expect("static regex must compile"),
    ]
});

const TRUTHY: [&str; 5] = ["on", "true", "yes", "y", "1"];

/// A parsed color with 8-bit channels and a fractional alpha in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    /// Returns `true` when the color has no translucency.
    pub fn is_opaque(&self) -> bool {
        self.a == 1.0
    }

    /// Encodes the color channels as lowercase `#rrggbb`, dropping alpha.
    ///
    /// # Examples
    ///
    /// ```
    /// use query_schema_core::parse_color;
    ///
    /// let color = parse_color("#F0A").unwrap();
    /// assert_eq!(color.to_hex(), "#ff00aa");
    /// ```
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Interprets a query value as a boolean switch.
///
/// Returns `true` only for `on`, `true`, `yes`, `y` and `1`, compared
/// case-insensitively. Everything else, including the empty string, is
/// `false`.
///
/// # Examples
///
/// ```
/// use query_schema_core::parse_boolean;
///
/// assert!(parse_boolean("YES"));
/// assert!(parse_boolean("1"));
/// assert!(!parse_boolean("no"));
/// assert!(!parse_boolean(""));
/// ```
pub fn parse_boolean(s: &str) -> bool {
    !s.is_empty() && TRUTHY.iter().any(|t| s.eq_ignore_ascii_case(t))
}

/// Parses a decimal number.
///
/// Surrounding whitespace is ignored. Signs, fractions and exponents are
/// accepted. The rule is permissive: a blank string and a lone `.` both
/// convert to `0`. Text that does not read as a finite number fails.
///
/// # Examples
///
/// ```
/// use query_schema_core::parse_number;
///
/// assert_eq!(parse_number("42"), Ok(42.0));
/// assert_eq!(parse_number(" -3.5 "), Ok(-3.5));
/// assert_eq!(parse_number("1e3"), Ok(1000.0));
/// assert_eq!(parse_number(""), Ok(0.0));
/// assert!(parse_number("ten").is_err());
/// ```
pub fn parse_number(s: &str) -> Result<f64, FieldError> {
    let s = s.trim();
    if s.is_empty() || s == "." {
        return Ok(0.0);
    }
    match s.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(FieldError::ExpectedNumber),
    }
}

/// Parses a hex or functional color string.
///
/// Hex forms are `#RGB`, `#RGBA`, `#RRGGBB` and `#RRGGBBAA`; short forms are
/// expanded by duplicating each nibble. Functional forms are `rgb(r,g,b)` and
/// `rgba(r,g,b,a)`. Alpha defaults to `1` when not given. Returns `None`
/// when the string matches neither form.
///
/// # Examples
///
/// ```
/// use query_schema_core::parse_color;
///
/// let c = parse_color("#ff000080").unwrap();
/// assert_eq!((c.r, c.g, c.b), (255, 0, 0));
/// assert!(!c.is_opaque());
///
/// let c = parse_color("rgb(0, 128, 255)").unwrap();
/// assert_eq!(c.to_hex(), "#0080ff");
///
/// assert!(parse_color("red").is_none());
/// ```
pub fn parse_color(s: &str) -> Option<Rgba> {
    if let Some(caps) = HEX_COLOR_RE.captures(s) {
        let digits = &caps[1];
        let has_alpha = digits.len() == 4 || digits.len() == 8;
        let hex: String = if digits.len() <= 4 {
            digits.chars().flat_map(|c| [c, c]).collect()
        } else {
            digits.to_string()
        };
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        return Some(Rgba {
            r: byte(0)?,
            g: byte(2)?,
            b: byte(4)?,
            a: if has_alpha {
                f64::from(byte(6)?) / 255.0
            } else {
                1.0
            },
        });
    }

    let caps = RGB_COLOR_RE.captures(s)?;
    let a = match caps.get(4) {
        Some(alpha) => alpha.as_str().parse::<f64>().ok()?,
        None => 1.0,
    };
    Some(Rgba {
        r: caps[1].parse().ok()?,
        g: caps[2].parse().ok()?,
        b: caps[3].parse().ok()?,
        a,
    })
}

/// Parses a `YYYY-MM-DD HH:mm:ss` or `YYYY/MM/DD HH:mm:ss` timestamp.
///
/// Components are range-checked before construction; a value outside its
/// calendar range makes the layout not match. February has 29 days in every
/// year divisible by 4. Years below 100 are read as 1900 plus the year.
/// The result is a local wall-clock time.
///
/// # Examples
///
/// ```
/// use query_schema_core::parse_date;
///
/// assert!(parse_date("2020-02-29 10:00:00").is_some());
/// assert!(parse_date("2021/02/29 10:00:00").is_none());
/// assert!(parse_date("2021-01-01T00:00:00").is_none());
/// ```
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    DATE_LAYOUTS.iter().find_map(|layout| {
        let caps = layout.captures(s)?;
        let num = |i: usize| caps[i].parse::<u32>().ok();
        let (year, month, day) = (num(1)?, num(2)?, num(3)?);
        let (hour, minute, second) = (num(4)?, num(5)?, num(6)?);

        if !(1..=12).contains(&month) || day == 0 || day > days_in_month(month, year) {
            return None;
        }
        if hour > 23 || minute > 59 || second > 59 {
            return None;
        }

        // Two-digit years land in the 1900s.
        let year = if year < 100 { year + 1900 } else { year };
        calendar_date(year as i32, month, day)?.and_hms_opt(hour, minute, second)
    })
}

/// Days in `month` (1-based) using the every-fourth-year leap rule.
pub fn days_in_month(month: u32, year: u32) -> u32 {
    match month {
        2 if year % 4 == 0 => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

// Feb 29 on a Gregorian non-leap century year rolls over to March 1.
fn calendar_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).or_else(|| {
        NaiveDate::from_ymd_opt(year, month, 1)?.checked_add_days(Days::new(u64::from(day - 1)))
    })
}
