//! Literal grammar for `var` defaults.
//!
//! ```text
//! {a: 1, "b": 2}   mapping
//! [1, 2, 3]        sequence
//! [[1, 2], [3]]    nested sequence
//! 42  -1.5  TRUE   int, float, bool
//! anything else    text (surrounding double quotes removed)
//! ```
//!
//! Collection elements are inferred together: all ints, else all floats,
//! else all bools, else everything is text.

use stencil_value::{Key, Mapping, Value};

/// Parse a literal into a value. Never fails; unknown input is text.
pub fn parse_literal(text: &str) -> Value {
    let text = text.trim();
    if let Some(inner) = text.strip_prefix('{').and_then(|t| t.strip_suffix('}')) {
        return parse_mapping(inner);
    }
    if let Some(inner) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        return parse_sequence(inner);
    }
    parse_scalar(text)
}

fn parse_sequence(inner: &str) -> Value {
    let parts = split_top_level(inner);
    if parts.first().is_some_and(|p| p.starts_with('[')) {
        return Value::seq(parts.iter().map(|p| parse_literal(p)));
    }
    Value::seq(infer_homogeneous(&parts))
}

fn parse_mapping(inner: &str) -> Value {
    let mut keys = Vec::new();
    let mut raw_values = Vec::new();
    for entry in split_top_level(inner) {
        let (key, value) = match entry.split_once(':') {
            Some((k, v)) => (k.trim(), v.trim()),
            None => (entry, ""),
        };
        keys.push(Key::Text(unquote(key).to_string()));
        raw_values.push(value);
    }
    let values = infer_homogeneous(&raw_values);
    Value::Mapping(keys.into_iter().zip(values).collect::<Mapping>())
}

/// Split on commas that are not nested inside brackets, braces or quotes.
fn split_top_level(inner: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '[' | '{' if !in_quotes => depth += 1,
            ']' | '}' if !in_quotes => depth = depth.saturating_sub(1),
            ',' if !in_quotes && depth == 0 => {
                parts.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = inner[start..].trim();
    if !last.is_empty() || !parts.is_empty() {
        parts.push(last);
    }
    parts
}

fn infer_homogeneous(parts: &[&str]) -> Vec<Value> {
    if let Some(ints) = parts.iter().map(|p| p.parse::<i64>().ok()).collect::<Option<Vec<_>>>() {
        return ints.into_iter().map(Value::from).collect();
    }
    if let Some(floats) = parts.iter().map(|p| parse_float(p)).collect::<Option<Vec<_>>>() {
        return floats.into_iter().map(Value::from).collect();
    }
    if let Some(bools) = parts.iter().map(|p| parse_bool(p)).collect::<Option<Vec<_>>>() {
        return bools.into_iter().map(Value::from).collect();
    }
    parts.iter().map(|p| Value::from(unquote(p))).collect()
}

fn parse_scalar(text: &str) -> Value {
    if let Ok(i) = text.parse::<i64>() {
        return Value::from(i);
    }
    if let Some(f) = parse_float(text) {
        return Value::from(f);
    }
    if let Some(b) = parse_bool(text) {
        return Value::from(b);
    }
    Value::from(unquote(text))
}

/// Decimal floats only; `inf` and `NaN` stay text.
fn parse_float(text: &str) -> Option<f64> {
    if !text.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn parse_bool(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
}
