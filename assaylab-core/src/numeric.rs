//! Lenient number parsing for instrument readings.
//!
//! Readings arrive as typed numbers, as text copied out of instrument PDFs
//! (`"2.95e -2"`, `"−0.013"`), or as spreadsheet cells written with a comma
//! decimal separator. None of these paths may fail: anything that cannot be
//! read as a finite number becomes `0.0`.

use assaylab_schemas::sample::RawReading;
use once_cell::sync::Lazy;
use regex::Regex;

// Exponent marker with optional sign and stray whitespace, e.g. "e -2", "e+ 3".
static EXPONENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"e\s*[-+]?\s*(\d+)").expect("exponent pattern is valid"));

static NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[-+]?(?:\d+(?:\.\d*)?|\.\d+)(?:e[-+]?\d+)?").expect("number pattern is valid")
});

/// Parses the first number found in `raw`, or returns `0.0`.
pub fn parse_number(raw: &str) -> f64 {
    try_parse_number(raw).unwrap_or(0.0)
}

/// Like [`parse_number`] but tells "no number here" apart from a real zero.
pub fn try_parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let unified = trimmed.replace('\u{2212}', "-").replace('E', "e");
    let normalized = EXPONENT.replace_all(&unified, |caps: &regex::Captures<'_>| {
        let sign = if caps[0].contains('-') { '-' } else { '+' };
        format!("e{}{}", sign, &caps[1])
    });

    if let Some(token) = NUMBER.find(&normalized) {
        if let Ok(value) = token.as_str().parse::<f64>() {
            return Some(value).filter(|v| v.is_finite());
        }
    }

    normalized
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Variant used for tabular uploads: the first comma is read as a decimal
/// point before the usual parsing rules apply.
pub fn parse_decimal_comma(raw: &str) -> f64 {
    parse_number(&raw.replacen(',', ".", 1))
}

/// Normalizes an optional raw reading; absent values read as zero.
pub fn parse_reading(raw: Option<&RawReading>) -> f64 {
    match raw {
        Some(RawReading::Number(value)) => finite_or_zero(*value),
        Some(RawReading::Text(text)) => parse_number(text),
        None => 0.0,
    }
}

/// Whether `raw` holds a usable number; used to validate manual entry.
pub fn is_numeric_reading(raw: Option<&RawReading>) -> bool {
    match raw {
        Some(RawReading::Number(value)) => value.is_finite(),
        Some(RawReading::Text(text)) => try_parse_number(text).is_some(),
        None => false,
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
