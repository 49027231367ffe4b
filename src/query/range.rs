//! Comparison sub-grammar for metadata fields
//!
//! Parses range/threshold expressions like `5..10`, `<=5`, `5..` and casts
//! operands by the field's declared type. Pattern order matters: the
//! two-ended `A..B` form must be tried before the open-ended `..A`/`A..`
//! forms, which are substrings of its shape. Nothing here ever fails:
//! malformed operands cast to [`QueryValue::None`] and the comparison
//! becomes unsatisfiable.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use super::types::{CastType, QueryValue, RangeExpr};

/// Numeral with an optional k/m unit suffix and an optional trailing 'b'
fn filesize_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d+(?:\.\d*)?|\d*\.\d+)([kKmM]?)[bB]?$")
            .expect("filesize pattern is valid")
    })
}

/// Cast a raw operand string by its declared type
///
/// Integers parse exactly, with decimal input truncating toward zero;
/// invalid dates and unparseable filesizes yield `None` rather than
/// raising.
#[must_use]
pub fn parse_cast(raw: &str, cast: CastType) -> QueryValue {
    match cast {
        CastType::Integer => {
            // Exact parse first so full-width ids survive; the float path
            // only handles decimal input, not exponent forms
            if let Ok(i) = raw.parse::<i64>() {
                QueryValue::Integer(i)
            } else if raw.contains('.')
                && let Ok(f) = raw.parse::<f64>()
                && f.is_finite()
            {
                QueryValue::Integer(f.trunc() as i64)
            } else {
                QueryValue::None
            }
        }
        CastType::Float => match raw.parse::<f64>() {
            Ok(f) if f.is_finite() => QueryValue::Float(f),
            _ => QueryValue::None,
        },
        CastType::Date => match NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(raw, "%Y/%m/%d"))
        {
            Ok(date) => QueryValue::Date(date),
            Err(_) => QueryValue::None,
        },
        CastType::Filesize => {
            let Some(captures) = filesize_regex().captures(raw) else {
                return QueryValue::None;
            };
            let Ok(size) = captures[1].parse::<f64>() else {
                return QueryValue::None;
            };
            let factor = match captures[2].to_lowercase().as_str() {
                "m" => 1024.0 * 1024.0,
                "k" => 1024.0,
                _ => 1.0,
            };
            QueryValue::Filesize((size * factor) as u64)
        }
    }
}

impl RangeExpr {
    /// Parse a comparison expression, casting operands as `cast`
    ///
    /// Grammar, attempted in order: `A..B` (between), `<=A` / `..A` (lte),
    /// `<A` (lt), `>=A` / `A..` (gte), `>A` (gt), plain `A` (eq).
    #[must_use]
    pub fn parse(text: &str, cast: CastType) -> Self {
        if let Some(idx) = text.find("..") {
            // Two-ended form needs a non-empty operand on each side
            if idx > 0 && idx + 2 < text.len() {
                return Self::Between(
                    parse_cast(&text[..idx], cast),
                    parse_cast(&text[idx + 2..], cast),
                );
            }
        }

        if let Some(rest) = text.strip_prefix("<=")
            && !rest.is_empty()
        {
            return Self::Lte(parse_cast(rest, cast));
        }
        if let Some(rest) = text.strip_prefix("..")
            && !rest.is_empty()
        {
            return Self::Lte(parse_cast(rest, cast));
        }
        if let Some(rest) = text.strip_prefix('<')
            && !rest.is_empty()
        {
            return Self::Lt(parse_cast(rest, cast));
        }
        if let Some(rest) = text.strip_prefix(">=")
            && !rest.is_empty()
        {
            return Self::Gte(parse_cast(rest, cast));
        }
        if let Some(rest) = text.strip_suffix("..")
            && !rest.is_empty()
        {
            return Self::Gte(parse_cast(rest, cast));
        }
        if let Some(rest) = text.strip_prefix('>')
            && !rest.is_empty()
        {
            return Self::Gt(parse_cast(rest, cast));
        }

        Self::Eq(parse_cast(text, cast))
    }
}
