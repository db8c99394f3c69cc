use once_cell::sync::Lazy;
use regex::Regex;

use crate::instance::{ComplexValue, SceneValue};

/// Reads a value off the front of the input: bytes consumed plus the value.
pub(crate) type Matcher = fn(&str) -> Option<(usize, SceneValue)>;

/// Attribute values, tried in order. The enum index must stay ahead of the
/// general number so bare non-negative integers read as selections.
pub(crate) const VALUE_CASCADE: &[Matcher] = &[
    match_null,
    match_string,
    match_enum_index,
    match_number,
    match_true,
    match_false,
    match_array,
    match_complex,
];

/// Array elements: no nesting, no enum indices.
pub(crate) const ELEMENT_CASCADE: &[Matcher] = &[
    match_string,
    match_number,
    match_true,
    match_false,
    match_complex,
];

pub(crate) static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(\w+)(?:\s+(.*))?\]$").unwrap());
pub(crate) static KEY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w+)\s*=\s*").unwrap());
pub(crate) static METADATA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^metadata/[\w/]+\s*=\s*").unwrap());
pub(crate) static STRUCT_OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w+)\s*=?\s*\{").unwrap());
pub(crate) static STRUCT_ENTRY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^"?(\w+)"?\s*[=:]\s*"#).unwrap());

static NULL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^null\b").unwrap());
static STRING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^"((?:[^"\\]|\\.)*)""#).unwrap());
static ENUM_INDEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)(?:[\s,\]\)}]|$)").unwrap());
static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?(?:(?:inf|nan)\b|(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)").unwrap());
static TRUE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^true\b").unwrap());
static FALSE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^false\b").unwrap());
static COMPLEX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Za-z_]\w*)\(").unwrap());

/// First matcher in `cascade` that accepts `text`.
pub(crate) fn match_value(text: &str, cascade: &[Matcher]) -> Option<(usize, SceneValue)> {
    cascade.iter().find_map(|matcher| matcher(text))
}

/// Drops leading whitespace and at most one `,` separator.
pub(crate) fn skip_separator(text: &str) -> &str {
    let text = text.trim_start();
    text.strip_prefix(',').unwrap_or(text).trim_start()
}

// -------------------- Scalars --------------------

fn match_null(text: &str) -> Option<(usize, SceneValue)> {
    NULL_RE.find(text).map(|m| (m.end(), SceneValue::Null))
}

fn match_string(text: &str) -> Option<(usize, SceneValue)> {
    let caps = STRING_RE.captures(text)?;
    let whole = caps.get(0)?;
    Some((whole.end(), SceneValue::Str(unescape(&caps[1]))))
}

fn match_enum_index(text: &str) -> Option<(usize, SceneValue)> {
    let digits = ENUM_INDEX_RE.captures(text)?.get(1)?;
    let index = digits.as_str().parse().ok()?;
    Some((digits.end(), SceneValue::EnumIndex(index)))
}

fn match_number(text: &str) -> Option<(usize, SceneValue)> {
    let m = NUMBER_RE.find(text)?;
    let n = m.as_str().parse().ok()?;
    Some((m.end(), SceneValue::Number(n)))
}

fn match_true(text: &str) -> Option<(usize, SceneValue)> {
    TRUE_RE.find(text).map(|m| (m.end(), SceneValue::Bool(true)))
}

fn match_false(text: &str) -> Option<(usize, SceneValue)> {
    FALSE_RE.find(text).map(|m| (m.end(), SceneValue::Bool(false)))
}

// -------------------- Composites --------------------

fn match_array(text: &str) -> Option<(usize, SceneValue)> {
    if !text.starts_with('[') {
        return None;
    }
    let close = find_closing(text)?;
    let mut rest = text[1..close].trim_start();
    let mut items = Vec::new();
    while !rest.is_empty() {
        let (len, item) = match_value(rest, ELEMENT_CASCADE)?;
        items.push(item);
        let after = rest[len..].trim_start();
        rest = match after.strip_prefix(',') {
            Some(next) => next.trim_start(),
            None if after.is_empty() => after,
            None => return None,
        };
    }
    Some((close + 1, SceneValue::Array(items)))
}

fn match_complex(text: &str) -> Option<(usize, SceneValue)> {
    let caps = COMPLEX_RE.captures(text)?;
    let ty = caps[1].to_string();
    let open = caps.get(0)?.end() - 1;
    let close = open + find_closing(&text[open..])?;
    let args = &text[open + 1..close];

    let params = if ty == "ExtResource" {
        // resource ids are opaque even when they look numeric
        split_top_level(args)
            .into_iter()
            .map(|arg| SceneValue::Str(unquote(arg)))
            .collect()
    } else {
        split_top_level(args).into_iter().map(coerce_param).collect()
    };
    Some((close + 1, SceneValue::Complex(ComplexValue { ty, params })))
}

fn coerce_param(arg: &str) -> SceneValue {
    match arg {
        "true" => SceneValue::Bool(true),
        "false" => SceneValue::Bool(false),
        _ => match arg.parse::<f64>() {
            Ok(n) => SceneValue::Number(n),
            Err(_) => SceneValue::Str(unquote(arg)),
        },
    }
}

/// Byte index of the bracket closing the one `text` starts with. Quoted
/// sections are skipped.
fn find_closing(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits constructor arguments on commas outside quotes and brackets.
fn split_top_level(args: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in args.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(args[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = args[start..].trim();
    if !last.is_empty() || !parts.is_empty() {
        parts.push(last);
    }
    parts
}

fn unquote(arg: &str) -> String {
    let arg = arg.trim();
    match arg.strip_prefix('"').and_then(|a| a.strip_suffix('"')) {
        Some(inner) => unescape(inner),
        None => arg.to_string(),
    }
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
