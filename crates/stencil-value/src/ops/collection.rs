//! Collection access, fallbacks and conversions.

use crate::coerce::round_half_away;
use crate::diagnostics::Diagnostics;
use crate::dispatch::{apply, Leaf, NUMERIC, SCALAR};
use crate::value::Value;

fn unsupported(op: &str, target: &Value, diagnostics: &mut Diagnostics) -> Value {
    diagnostics.warn(op, format!("cannot apply to {} value", target.kind()));
    target.clone()
}

/// Number of elements, entries, public fields or characters.
pub fn len(target: &Value, diagnostics: &mut Diagnostics) -> Value {
    let n = match target.resolve() {
        Value::Sequence(seq) => seq.len(),
        Value::Mapping(map) => map.len(),
        Value::Record(rec) => rec.public_fields().count(),
        Value::Text(s) => s.chars().count(),
        Value::Null | Value::Any(_) => 0,
        other => return unsupported("len", other, diagnostics),
    };
    Value::from(n as i64)
}

/// First element of a sequence or first character of text.
pub fn first(target: &Value, diagnostics: &mut Diagnostics) -> Value {
    match target.resolve() {
        Value::Sequence(seq) => seq.items.first().cloned().unwrap_or_default(),
        Value::Text(s) => s.chars().next().map(|c| Value::Text(c.to_string())).unwrap_or_default(),
        Value::Null | Value::Any(_) => Value::Null,
        other => unsupported("first", other, diagnostics),
    }
}

/// Last element of a sequence or last character of text.
pub fn last(target: &Value, diagnostics: &mut Diagnostics) -> Value {
    match target.resolve() {
        Value::Sequence(seq) => seq.items.last().cloned().unwrap_or_default(),
        Value::Text(s) => s.chars().last().map(|c| Value::Text(c.to_string())).unwrap_or_default(),
        Value::Null | Value::Any(_) => Value::Null,
        other => unsupported("last", other, diagnostics),
    }
}

/// Mapping keys in iteration order, or public field names of a record.
pub fn keys(target: &Value, diagnostics: &mut Diagnostics) -> Value {
    match target.resolve() {
        Value::Mapping(map) => Value::seq(map.keys().map(|k| k.to_value())),
        Value::Record(rec) => Value::seq(rec.public_fields().map(|f| Value::from(f.name.as_str()))),
        other => unsupported("keys", other, diagnostics),
    }
}

/// Mapping values in key order, or public field values of a record.
pub fn values(target: &Value, diagnostics: &mut Diagnostics) -> Value {
    match target.resolve() {
        Value::Mapping(map) => Value::seq(map.values().cloned()),
        Value::Record(rec) => Value::seq(rec.public_fields().map(|f| f.value.clone())),
        other => unsupported("values", other, diagnostics),
    }
}

/// Join the text form of every sequence element with `separator`.
pub fn join(separator: &Value, target: &Value, diagnostics: &mut Diagnostics) -> Value {
    let Some(separator) = separator.as_text() else {
        diagnostics.warn(
            "join",
            format!("separator must be text, got {}", separator.kind()),
        );
        return target.clone();
    };
    match target.resolve() {
        Value::Sequence(seq) => Value::Text(
            seq.items
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(separator),
        ),
        other => unsupported("join", other, diagnostics),
    }
}

/// `fallback` when `target` is the zero value of its type, else `target`.
pub fn default(fallback: &Value, target: &Value) -> Value {
    if target.is_zero() {
        fallback.clone()
    } else {
        target.resolve().clone()
    }
}

/// Convert every scalar leaf to text.
pub fn to_string(target: &Value, diagnostics: &mut Diagnostics) -> Value {
    let op = Leaf::new("to_string", SCALAR, |v: &Value, _: &mut Diagnostics| {
        Value::Text(v.to_string())
    });
    apply(&op, target, diagnostics)
}

/// Convert every scalar leaf to a 64-bit integer.
pub fn to_int(target: &Value, diagnostics: &mut Diagnostics) -> Value {
    let op = Leaf::new("to_int", SCALAR, |v: &Value, d: &mut Diagnostics| match v.to_i64() {
        Ok(i) => Value::from(i),
        Err(e) => {
            d.warn("to_int", e.to_string());
            v.clone()
        }
    });
    apply(&op, target, diagnostics)
}

/// Convert every scalar leaf to a 64-bit float.
pub fn to_float(target: &Value, diagnostics: &mut Diagnostics) -> Value {
    let op = Leaf::new("to_float", SCALAR, |v: &Value, d: &mut Diagnostics| match v.to_f64() {
        Ok(f) => Value::from(f),
        Err(e) => {
            d.warn("to_float", e.to_string());
            v.clone()
        }
    });
    apply(&op, target, diagnostics)
}

/// Render numeric leaves as text with `precision` decimals and `,` between
/// thousands.
pub fn format_number(precision: &Value, target: &Value, diagnostics: &mut Diagnostics) -> Value {
    let precision = match precision.to_i64() {
        Ok(p) if (0..=20).contains(&p) => p as usize,
        _ => {
            diagnostics.warn(
                "format_number",
                format!("precision must be between 0 and 20, got {precision}"),
            );
            return target.clone();
        }
    };
    let op = Leaf::new("format_number", NUMERIC, move |v: &Value, _: &mut Diagnostics| {
        let number = match v {
            Value::Int(i, w) if w.is_unsigned() => *i as u64 as f64,
            Value::Int(i, _) => *i as f64,
            Value::Float(f, _) => round_half_away(*f, precision as i32),
            _ => return v.clone(),
        };
        Value::Text(group_thousands(&format!("{number:.precision$}")))
    });
    apply(&op, target, diagnostics)
}

fn group_thousands(formatted: &str) -> String {
    let (sign, rest) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (whole, fraction) = match rest.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (rest, None),
    };
    let mut grouped = String::with_capacity(formatted.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    match fraction {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}
