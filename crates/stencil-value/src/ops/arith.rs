//! Arithmetic and container algebra.
//!
//! Integer targets are computed in `f64`, rounded half away from zero and
//! narrowed back to their original width. Extra operands are validated once
//! up front and then broadcast unchanged over containers.

use crate::coerce::round_half_away;
use crate::diagnostics::Diagnostics;
use crate::dispatch::{apply, Leaf, NUMERIC, TEXT};
use crate::value::{Sequence, Value};

/// Combine a numeric target with `operand`, keeping the target's width.
fn numeric(target: &Value, operand: f64, f: impl Fn(f64, f64) -> f64) -> Value {
    match target {
        Value::Int(i, w) => {
            let current = if w.is_unsigned() {
                *i as u64 as f64
            } else {
                *i as f64
            };
            let result = round_half_away(f(current, operand), 0);
            let wide = if w.is_unsigned() && result >= 0.0 {
                result as u64 as i64
            } else {
                result as i64
            };
            Value::Int(w.wrap(wide), *w)
        }
        Value::Float(v, w) => Value::Float(w.narrow(f(*v, operand)), *w),
        other => other.clone(),
    }
}

/// Validate a numeric operand, recording a warning when it is unusable.
fn numeric_operand(op: &str, operand: &Value, diagnostics: &mut Diagnostics) -> Option<f64> {
    let operand = operand.resolve();
    if !operand.kind().is_numeric() {
        diagnostics.warn(op, format!("operand must be numeric, got {}", operand.kind()));
        return None;
    }
    operand.to_f64().ok()
}

/// Add `addend` to `target`.
///
/// Sequences concatenate (target first), mappings merge with colliding
/// values added recursively, text concatenates, numbers add. Mismatched
/// containers are refused and `target` is returned unchanged.
pub fn add(addend: &Value, target: &Value, diagnostics: &mut Diagnostics) -> Value {
    let (addend, target) = (addend.resolve(), target.resolve());
    match (addend, target) {
        (Value::Sequence(a), Value::Sequence(t)) => {
            let mut items = t.items.clone();
            items.extend(a.items.iter().cloned());
            Value::Sequence(Sequence::new(items))
        }
        (Value::Mapping(a), Value::Mapping(t)) => {
            let mut merged = t.clone();
            for (key, value) in a {
                let combined = match t.get(key) {
                    Some(existing) => add(value, existing, diagnostics),
                    None => value.clone(),
                };
                merged.insert(key.clone(), combined);
            }
            Value::Mapping(merged)
        }
        (a, t) if a.kind().is_container() && t.kind().is_container() => {
            diagnostics.error(
                "add",
                format!("cannot add {} to {}", a.kind(), t.kind()),
            );
            t.clone()
        }
        (a, t) if a.kind().is_container() => {
            diagnostics.warn(
                "add",
                format!("cannot add {} to {}", a.kind(), t.kind()),
            );
            t.clone()
        }
        (Value::Text(suffix), t) => {
            let suffix = suffix.clone();
            let op = Leaf::new("add", TEXT, move |v: &Value, _: &mut Diagnostics| {
                Value::Text(format!("{}{}", v.as_text().unwrap_or_default(), suffix))
            });
            apply(&op, t, diagnostics)
        }
        (a, t) => match numeric_operand("add", a, diagnostics) {
            Some(n) => {
                let op = Leaf::new("add", NUMERIC, move |v: &Value, _: &mut Diagnostics| {
                    numeric(v, n, |x, y| x + y)
                });
                apply(&op, t, diagnostics)
            }
            None => t.clone(),
        },
    }
}

/// Subtract `subtrahend` from `target`.
///
/// Sequences lose every element deep-equal to one in the subtrahend.
/// Mappings subtract colliding values and drop keys whose result is zero.
/// Text subtrahends remove every occurrence from text leaves.
pub fn subtract(subtrahend: &Value, target: &Value, diagnostics: &mut Diagnostics) -> Value {
    let (sub, target) = (subtrahend.resolve(), target.resolve());
    match (sub, target) {
        (Value::Sequence(s), Value::Sequence(t)) => Value::Sequence(Sequence::new(
            t.items
                .iter()
                .filter(|item| !s.items.iter().any(|x| x.deep_eq(item)))
                .cloned()
                .collect(),
        )),
        (Value::Mapping(s), Value::Mapping(t)) => {
            let mut result = t.clone();
            for (key, removal) in s {
                if let Some(existing) = t.get(key) {
                    let remaining = subtract(removal, existing, diagnostics);
                    if remaining.is_zero() {
                        result.remove(key);
                    } else {
                        result.insert(key.clone(), remaining);
                    }
                }
            }
            Value::Mapping(result)
        }
        (s, t) if s.kind().is_container() && t.kind().is_container() => {
            diagnostics.error(
                "subtract",
                format!("cannot subtract {} from {}", s.kind(), t.kind()),
            );
            t.clone()
        }
        (s, t) if s.kind().is_container() => {
            diagnostics.warn(
                "subtract",
                format!("cannot subtract {} from {}", s.kind(), t.kind()),
            );
            t.clone()
        }
        (Value::Text(needle), t) => {
            let needle = needle.clone();
            let op = Leaf::new("subtract", TEXT, move |v: &Value, _: &mut Diagnostics| {
                Value::Text(v.as_text().unwrap_or_default().replace(needle.as_str(), ""))
            });
            apply(&op, t, diagnostics)
        }
        (s, t) => match numeric_operand("subtract", s, diagnostics) {
            Some(n) => {
                let op = Leaf::new("subtract", NUMERIC, move |v: &Value, _: &mut Diagnostics| {
                    numeric(v, n, |x, y| x - y)
                });
                apply(&op, t, diagnostics)
            }
            None => t.clone(),
        },
    }
}

/// Multiply every numeric leaf of `target` by `factor`.
pub fn multiply(factor: &Value, target: &Value, diagnostics: &mut Diagnostics) -> Value {
    match numeric_operand("multiply", factor, diagnostics) {
        Some(n) => {
            let op = Leaf::new("multiply", NUMERIC, move |v: &Value, _: &mut Diagnostics| {
                numeric(v, n, |x, y| x * y)
            });
            apply(&op, target, diagnostics)
        }
        None => target.clone(),
    }
}

/// Divide every numeric leaf of `target` by `divisor`.
///
/// A zero or non-numeric divisor records an error and returns `target`
/// unchanged.
pub fn divide(divisor: &Value, target: &Value, diagnostics: &mut Diagnostics) -> Value {
    match divisor_of("divide", divisor, diagnostics) {
        Some(n) => {
            let op = Leaf::new("divide", NUMERIC, move |v: &Value, _: &mut Diagnostics| {
                numeric(v, n, |x, y| x / y)
            });
            apply(&op, target, diagnostics)
        }
        None => target.clone(),
    }
}

/// Remainder of every numeric leaf of `target` divided by `divisor`.
pub fn modulo(divisor: &Value, target: &Value, diagnostics: &mut Diagnostics) -> Value {
    match divisor_of("modulo", divisor, diagnostics) {
        Some(n) => {
            let op = Leaf::new("modulo", NUMERIC, move |v: &Value, d: &mut Diagnostics| match v {
                Value::Int(i, w) => {
                    let divisor = round_half_away(n, 0) as i128;
                    if divisor == 0 {
                        d.error("modulo", format!("divisible by zero: {n} rounds to 0"));
                        return v.clone();
                    }
                    let current = if w.is_unsigned() {
                        i128::from(*i as u64)
                    } else {
                        i128::from(*i)
                    };
                    Value::Int(w.wrap((current % divisor) as i64), *w)
                }
                _ => numeric(v, n, |x, y| x % y),
            });
            apply(&op, target, diagnostics)
        }
        None => target.clone(),
    }
}

fn divisor_of(op: &str, divisor: &Value, diagnostics: &mut Diagnostics) -> Option<f64> {
    match divisor.resolve().to_f64() {
        Ok(n) if n != 0.0 && divisor.kind().is_numeric() => Some(n),
        _ => {
            diagnostics.error(op, format!("divisible by zero or non-numeric divisor: {divisor}"));
            None
        }
    }
}

/// Round every float leaf of `target` to `precision` decimal places.
///
/// Integer leaves are returned unchanged.
pub fn round(precision: &Value, target: &Value, diagnostics: &mut Diagnostics) -> Value {
    let precision = match precision.to_i64() {
        Ok(p) => p.clamp(-308, 308) as i32,
        Err(e) => {
            diagnostics.warn("round", format!("invalid precision: {e}"));
            return target.clone();
        }
    };
    let op = Leaf::new("round", NUMERIC, move |v: &Value, _: &mut Diagnostics| match v {
        Value::Float(f, w) => Value::Float(w.narrow(round_half_away(*f, precision)), *w),
        other => other.clone(),
    });
    apply(&op, target, diagnostics)
}

fn float_leaf(
    name: &'static str,
    target: &Value,
    diagnostics: &mut Diagnostics,
    f: fn(f64) -> f64,
) -> Value {
    let op = Leaf::new(name, NUMERIC, move |v: &Value, _: &mut Diagnostics| match v {
        Value::Float(x, w) => Value::Float(w.narrow(f(*x)), *w),
        other => other.clone(),
    });
    apply(&op, target, diagnostics)
}

/// Round float leaves up.
pub fn ceil(target: &Value, diagnostics: &mut Diagnostics) -> Value {
    float_leaf("ceil", target, diagnostics, f64::ceil)
}

/// Round float leaves down.
pub fn floor(target: &Value, diagnostics: &mut Diagnostics) -> Value {
    float_leaf("floor", target, diagnostics, f64::floor)
}

/// Absolute value of every numeric leaf.
pub fn abs(target: &Value, diagnostics: &mut Diagnostics) -> Value {
    let op = Leaf::new("abs", NUMERIC, |v: &Value, _: &mut Diagnostics| match v {
        Value::Int(i, w) => Value::Int(w.wrap(i.wrapping_abs()), *w),
        Value::Float(x, w) => Value::Float(x.abs(), *w),
        other => other.clone(),
    });
    apply(&op, target, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{DiagnosticPolicy, Severity};
    use crate::value::{FloatWidth, IntWidth, Record};

    fn diag() -> Diagnostics {
        Diagnostics::new(DiagnosticPolicy::silent())
    }

    fn ints(values: &[i64]) -> Value {
        Value::seq(values.iter().map(|v| Value::from(*v)))
    }

    #[test]
    fn test_add_broadcasts_scalar_over_sequence() {
        let mut d = diag();
        let out = add(&Value::from(5i64), &ints(&[10, 20]), &mut d);
        assert_eq!(out, ints(&[15, 30]));
        assert!(d.is_empty());
    }

    #[test]
    fn test_add_keeps_integer_width() {
        let mut d = diag();
        assert_eq!(
            add(&Value::from(1i64), &Value::from(127i8), &mut d),
            Value::Int(-128, IntWidth::I8)
        );
        assert_eq!(
            add(&Value::from(10i64), &Value::from(250u8), &mut d),
            Value::Int(4, IntWidth::U8)
        );
        assert_eq!(
            add(&Value::from(0.6), &Value::from(1i32), &mut d),
            Value::Int(2, IntWidth::I32)
        );
    }

    #[test]
    fn test_add_float_width() {
        let mut d = diag();
        assert_eq!(
            add(&Value::from(0.5), &Value::from(1.25f32), &mut d),
            Value::Float(1.75, FloatWidth::F32)
        );
    }

    #[test]
    fn test_add_concatenates_sequences() {
        let mut d = diag();
        assert_eq!(add(&ints(&[3]), &ints(&[1, 2]), &mut d), ints(&[1, 2, 3]));
    }

    #[test]
    fn test_add_merges_mappings() {
        let mut d = diag();
        let target = Value::map([("a", Value::from(1i64)), ("b", Value::from(2i64))]);
        let addend = Value::map([("b", Value::from(10i64)), ("c", Value::from(3i64))]);
        let expected = Value::map([
            ("a", Value::from(1i64)),
            ("b", Value::from(12i64)),
            ("c", Value::from(3i64)),
        ]);
        assert_eq!(add(&addend, &target, &mut d), expected);
    }

    #[test]
    fn test_add_mismatched_containers_returns_target() {
        let mut d = diag();
        let target = Value::map([("a", Value::from(1i64))]);
        assert_eq!(add(&ints(&[1]), &target, &mut d), target);
        assert!(d.has(Severity::Error));
    }

    #[test]
    fn test_add_bool_target_is_unsupported() {
        let mut d = diag();
        assert_eq!(add(&Value::from(1i64), &Value::from(true), &mut d), Value::from(true));
        assert!(d.has(Severity::Warning));
    }

    #[test]
    fn test_add_into_record_fields() {
        let mut d = diag();
        let rec = Value::Record(
            Record::new("Stats")
                .with_field("count", 2u16)
                .with_private_field("hidden", 9u16),
        );
        match add(&Value::from(3i64), &rec, &mut d) {
            Value::Record(r) => {
                assert_eq!(r.get("count"), Some(&Value::Int(5, IntWidth::U16)));
                assert_eq!(r.fields[1].value, Value::Int(0, IntWidth::U16));
            }
            other => panic!("expected record, got {other:?}"),
        }
    }

    #[test]
    fn test_subtract_removes_elements_anywhere() {
        let mut d = diag();
        assert_eq!(
            subtract(&ints(&[2, 4]), &ints(&[1, 2, 3, 4, 2]), &mut d),
            ints(&[1, 3])
        );
    }

    #[test]
    fn test_subtract_drops_zeroed_keys() {
        let mut d = diag();
        let target = Value::map([("from", Value::from("f")), ("remove", Value::from("v"))]);
        let sub = Value::map([("remove", Value::from("v"))]);
        assert_eq!(
            subtract(&sub, &target, &mut d),
            Value::map([("from", Value::from("f"))])
        );

        let target = Value::map([("n", Value::from(5i64)), ("m", Value::from(1i64))]);
        let sub = Value::map([("n", Value::from(2i64)), ("m", Value::from(1i64))]);
        assert_eq!(
            subtract(&sub, &target, &mut d),
            Value::map([("n", Value::from(3i64))])
        );
    }

    #[test]
    fn test_subtract_numeric() {
        let mut d = diag();
        assert_eq!(
            subtract(&Value::from(1.5), &Value::from(4i64), &mut d),
            Value::from(3i64)
        );
    }

    #[test]
    fn test_divide_by_zero_returns_target() {
        let mut d = diag();
        let target = ints(&[4, 8]);
        assert_eq!(divide(&Value::from(0i64), &target, &mut d), target);
        assert!(d.has(Severity::Error));
        assert!(d.entries()[0].message.contains("divisible by zero"));

        let mut d = diag();
        assert_eq!(divide(&Value::from("x"), &target, &mut d), target);
        assert!(d.has(Severity::Error));
    }

    #[test]
    fn test_divide_rounds_integers() {
        let mut d = diag();
        assert_eq!(divide(&Value::from(2i64), &ints(&[5, 9]), &mut d), ints(&[3, 5]));
        assert_eq!(
            divide(&Value::from(4i64), &Value::from(1.0), &mut d),
            Value::from(0.25)
        );
    }

    #[test]
    fn test_multiply_and_modulo() {
        let mut d = diag();
        assert_eq!(multiply(&Value::from(3i64), &ints(&[1, 2]), &mut d), ints(&[3, 6]));
        assert_eq!(modulo(&Value::from(3i64), &ints(&[7, 9]), &mut d), ints(&[1, 0]));
    }

    #[test]
    fn test_modulo_extremes_do_not_overflow() {
        let mut d = diag();
        assert_eq!(
            modulo(&Value::from(-1i64), &Value::from(i64::MIN), &mut d),
            Value::from(0i64)
        );
        assert_eq!(
            modulo(&Value::from(10i64), &Value::from(u64::MAX), &mut d),
            Value::from(5u64)
        );
        assert!(d.is_empty());
    }

    #[test]
    fn test_modulo_divisor_rounding_to_zero_is_reported() {
        let mut d = diag();
        assert_eq!(modulo(&Value::from(0.4), &Value::from(7i64), &mut d), Value::from(7i64));
        assert!(d.has(Severity::Error));
        assert_eq!(d.entries()[0].operation, "modulo");
    }

    #[test]
    fn test_round() {
        let mut d = diag();
        assert_eq!(
            round(&Value::from(1i64), &Value::seq([Value::from(2.25), Value::from(-2.25)]), &mut d),
            Value::seq([Value::from(2.3), Value::from(-2.3)])
        );
        assert_eq!(round(&Value::from(0i64), &Value::from(9u8), &mut d), Value::from(9u8));
    }

    #[test]
    fn test_ceil_floor_abs() {
        let mut d = diag();
        assert_eq!(ceil(&Value::from(1.2), &mut d), Value::from(2.0));
        assert_eq!(floor(&Value::from(-1.2), &mut d), Value::from(-2.0));
        assert_eq!(abs(&Value::from(-3i32), &mut d), Value::from(3i32));
    }
}
