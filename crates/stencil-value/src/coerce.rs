//! Numeric and text coercions, and type compatibility checks.

use crate::error::ConversionError;
use crate::value::Value;

/// Round half away from zero at the given number of decimal places.
pub fn round_half_away(value: f64, precision: i32) -> f64 {
    if precision == 0 {
        return value.round();
    }
    let scale = 10f64.powi(precision);
    (value * scale).round() / scale
}

fn parse_number(text: &str) -> Option<f64> {
    text.parse::<f64>().ok()
}

impl Value {
    /// Convert to a 64-bit float.
    ///
    /// Succeeds for numbers, booleans (`true` is 1) and numeric-looking text.
    pub fn to_f64(&self) -> Result<f64, ConversionError> {
        match self.resolve() {
            Value::Int(i, w) if w.is_unsigned() => Ok(*i as u64 as f64),
            Value::Int(i, _) => Ok(*i as f64),
            Value::Float(f, _) => Ok(*f),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::Text(s) => parse_number(s).ok_or_else(|| ConversionError::NotNumeric {
                text: s.clone(),
            }),
            other => Err(ConversionError::Unsupported {
                from: other.kind(),
                to: "float",
            }),
        }
    }

    /// Convert to a 64-bit integer, rounding floats half away from zero.
    pub fn to_i64(&self) -> Result<i64, ConversionError> {
        match self.resolve() {
            Value::Int(i, _) => Ok(*i),
            Value::Float(f, _) => Ok(f.round() as i64),
            Value::Bool(b) => Ok(i64::from(*b)),
            Value::Text(s) => parse_number(s)
                .map(|f| f.round() as i64)
                .ok_or_else(|| ConversionError::NotNumeric { text: s.clone() }),
            other => Err(ConversionError::Unsupported {
                from: other.kind(),
                to: "int",
            }),
        }
    }

    /// Convert a scalar to text. Containers and null cannot be converted.
    pub fn to_text(&self) -> Result<String, ConversionError> {
        match self.resolve() {
            v @ (Value::Int(..) | Value::Float(..) | Value::Bool(_)) => Ok(v.to_string()),
            Value::Text(s) => Ok(s.clone()),
            other => Err(ConversionError::Unsupported {
                from: other.kind(),
                to: "text",
            }),
        }
    }
}

/// Whether two values can take part in the same operation, ignoring numeric
/// width.
pub fn loose_compatible(a: &Value, b: &Value) -> bool {
    compatible(a, b, false)
}

/// Like [`loose_compatible`] but also requiring identical concrete types.
pub fn strict_compatible(a: &Value, b: &Value) -> bool {
    compatible(a, b, true)
}

fn compatible(a: &Value, b: &Value, strict: bool) -> bool {
    let (a, b) = (a.resolve(), b.resolve());
    match (a, b) {
        (Value::Int(_, wa), Value::Int(_, wb)) => !strict || wa == wb,
        (Value::Float(_, wa), Value::Float(_, wb)) => !strict || wa == wb,
        (Value::Int(..), Value::Float(..)) | (Value::Float(..), Value::Int(..)) => !strict,
        (Value::Sequence(x), Value::Sequence(y)) => match (x.items.first(), y.items.first()) {
            (Some(p), Some(q)) => compatible(p, q, strict),
            _ => !strict || x.fixed == y.fixed,
        },
        (Value::Mapping(x), Value::Mapping(y)) => match (x.iter().next(), y.iter().next()) {
            (Some((ka, va)), Some((kb, vb))) => {
                ka.kind() == kb.kind() && compatible(va, vb, strict)
            }
            _ => true,
        },
        (Value::Record(x), Value::Record(y)) => {
            (!strict || x.name == y.name)
                && x.fields.len() == y.fields.len()
                && x.fields.iter().zip(&y.fields).all(|(f, g)| {
                    f.name == g.name
                        && f.public == g.public
                        && compatible(&f.value, &g.value, strict)
                })
        }
        _ => a.kind() == b.kind() && !a.kind().is_container(),
    }
}
