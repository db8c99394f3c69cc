// Scalar formatting shared by every rendering surface.

use serde_json::Value as JsonValue;

/// Magnitudes outside this range switch to exponent form (`1e300`).
const PLAIN_MAX: f64 = 1e16;
const PLAIN_MIN: f64 = 1e-5;

/// Shortest text that reads back as the same number (`1`, `2.5`, `-0.25`).
/// Non-finite values render as `inf`, `-inf` and `nan`.
pub fn format_number(v: f64) -> String {
    if v == 0.0 {
        // keeps -0.0 from rendering as "-0"
        return "0".to_string();
    }
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let magnitude = v.abs();
    if magnitude >= PLAIN_MAX || magnitude < PLAIN_MIN {
        format!("{v:e}")
    } else {
        format!("{v}")
    }
}

/// Like [`format_number`] but always carries a decimal point (`1.0`, `2.5`).
pub fn format_decimal(v: f64) -> String {
    let s = format_number(v);
    if !v.is_finite() || s.contains('.') || s.contains('e') {
        s
    } else {
        format!("{s}.0")
    }
}

pub fn format_numbers(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format_number(*v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Double-quotes `s`, escaping backslashes, quotes and newlines.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// `snake_case` / `kebab case` / `Mixed` -> `PascalCase`.
pub fn to_pascal_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper_next = true;
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            if upper_next {
                out.push(c.to_ascii_uppercase());
                upper_next = false;
            } else {
                out.push(c);
            }
        } else {
            upper_next = true;
        }
    }
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Makes `s` usable as a script identifier (enum member, variable name).
pub fn to_identifier(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.trim().chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else {
            out.push('_');
        }
    }
    if out.is_empty() || out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Integral values become JSON integers so source data keeps `3` rather than `3.0`.
pub fn number_json(v: f64) -> JsonValue {
    if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        JsonValue::from(v as i64)
    } else {
        serde_json::Number::from_f64(v)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null)
    }
}
