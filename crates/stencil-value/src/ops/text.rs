//! String operations.
//!
//! These act on text leaves only. Any other leaf is returned as-is with a
//! warning; nothing is coerced to text implicitly.

use crate::diagnostics::Diagnostics;
use crate::dispatch::{apply, Leaf, TEXT};
use crate::value::Value;

/// Require a text operand, warning and returning `None` otherwise.
fn text_operand(op: &str, operand: &Value, diagnostics: &mut Diagnostics) -> Option<String> {
    match operand.as_text() {
        Some(s) => Some(s.to_string()),
        None => {
            diagnostics.warn(op, format!("operand must be text, got {}", operand.kind()));
            None
        }
    }
}

fn count_operand(op: &str, operand: &Value, diagnostics: &mut Diagnostics) -> Option<usize> {
    match operand.resolve() {
        v @ (Value::Int(..) | Value::Float(..)) => match v.to_i64() {
            Ok(n) if n >= 0 => Some(n as usize),
            _ => {
                diagnostics.warn(op, format!("count must not be negative, got {v}"));
                None
            }
        },
        other => {
            diagnostics.warn(op, format!("count must be numeric, got {}", other.kind()));
            None
        }
    }
}

/// Apply `f` to every text leaf of `target`.
fn map_text(
    name: &'static str,
    target: &Value,
    diagnostics: &mut Diagnostics,
    f: impl Fn(&str) -> Value,
) -> Value {
    let op = Leaf::new(name, TEXT, |v: &Value, _: &mut Diagnostics| {
        f(v.as_text().unwrap_or_default())
    });
    apply(&op, target, diagnostics)
}

pub fn upper(target: &Value, diagnostics: &mut Diagnostics) -> Value {
    map_text("upper", target, diagnostics, |s| s.to_uppercase().into())
}

pub fn lower(target: &Value, diagnostics: &mut Diagnostics) -> Value {
    map_text("lower", target, diagnostics, |s| s.to_lowercase().into())
}

/// Capitalise the first letter of every whitespace-separated word.
pub fn title(target: &Value, diagnostics: &mut Diagnostics) -> Value {
    map_text("title", target, diagnostics, |s| {
        let mut out = String::with_capacity(s.len());
        let mut at_word_start = true;
        for c in s.chars() {
            if at_word_start && c.is_alphabetic() {
                out.extend(c.to_uppercase());
            } else {
                out.push(c);
            }
            at_word_start = c.is_whitespace();
        }
        out.into()
    })
}

/// Trim whitespace, or every character in `cutset` when given.
pub fn trim(cutset: Option<&Value>, target: &Value, diagnostics: &mut Diagnostics) -> Value {
    let cutset: Option<Vec<char>> = match cutset {
        Some(c) => match text_operand("trim", c, diagnostics) {
            Some(s) => Some(s.chars().collect()),
            None => return target.clone(),
        },
        None => None,
    };
    map_text("trim", target, diagnostics, |s| match &cutset {
        Some(chars) => s.trim_matches(|c: char| chars.contains(&c)).into(),
        None => s.trim().into(),
    })
}

pub fn trim_prefix(prefix: &Value, target: &Value, diagnostics: &mut Diagnostics) -> Value {
    let Some(prefix) = text_operand("trim_prefix", prefix, diagnostics) else {
        return target.clone();
    };
    map_text("trim_prefix", target, diagnostics, |s| {
        s.strip_prefix(prefix.as_str()).unwrap_or(s).into()
    })
}

pub fn trim_suffix(suffix: &Value, target: &Value, diagnostics: &mut Diagnostics) -> Value {
    let Some(suffix) = text_operand("trim_suffix", suffix, diagnostics) else {
        return target.clone();
    };
    map_text("trim_suffix", target, diagnostics, |s| {
        s.strip_suffix(suffix.as_str()).unwrap_or(s).into()
    })
}

/// Remove every occurrence of `needle`.
pub fn remove(needle: &Value, target: &Value, diagnostics: &mut Diagnostics) -> Value {
    let Some(needle) = text_operand("remove", needle, diagnostics) else {
        return target.clone();
    };
    if needle.is_empty() {
        return target.clone();
    }
    map_text("remove", target, diagnostics, |s| s.replace(needle.as_str(), "").into())
}

pub fn replace(old: &Value, new: &Value, target: &Value, diagnostics: &mut Diagnostics) -> Value {
    let (Some(old), Some(new)) = (
        text_operand("replace", old, diagnostics),
        text_operand("replace", new, diagnostics),
    ) else {
        return target.clone();
    };
    if old.is_empty() {
        return target.clone();
    }
    map_text("replace", target, diagnostics, |s| s.replace(old.as_str(), &new).into())
}

pub fn has_prefix(prefix: &Value, target: &Value, diagnostics: &mut Diagnostics) -> Value {
    let Some(prefix) = text_operand("has_prefix", prefix, diagnostics) else {
        return target.clone();
    };
    map_text("has_prefix", target, diagnostics, |s| s.starts_with(prefix.as_str()).into())
}

pub fn has_suffix(suffix: &Value, target: &Value, diagnostics: &mut Diagnostics) -> Value {
    let Some(suffix) = text_operand("has_suffix", suffix, diagnostics) else {
        return target.clone();
    };
    map_text("has_suffix", target, diagnostics, |s| s.ends_with(suffix.as_str()).into())
}

pub fn contains(needle: &Value, target: &Value, diagnostics: &mut Diagnostics) -> Value {
    let Some(needle) = text_operand("contains", needle, diagnostics) else {
        return target.clone();
    };
    map_text("contains", target, diagnostics, |s| s.contains(needle.as_str()).into())
}

/// Cut text leaves to at most `length` characters.
pub fn truncate(length: &Value, target: &Value, diagnostics: &mut Diagnostics) -> Value {
    let Some(length) = count_operand("truncate", length, diagnostics) else {
        return target.clone();
    };
    map_text("truncate", target, diagnostics, |s| {
        s.chars().take(length).collect::<String>().into()
    })
}

/// Upper bound on the length of a single `repeat` result, in bytes.
pub const MAX_REPEAT_LEN: usize = 1 << 20;

/// Repeat text leaves `count` times.
///
/// A leaf whose result would exceed [`MAX_REPEAT_LEN`] is kept unchanged and
/// reported as an error.
pub fn repeat(count: &Value, target: &Value, diagnostics: &mut Diagnostics) -> Value {
    let Some(count) = count_operand("repeat", count, diagnostics) else {
        return target.clone();
    };
    let op = Leaf::new("repeat", TEXT, move |v: &Value, d: &mut Diagnostics| {
        let s = v.as_text().unwrap_or_default();
        match s.len().checked_mul(count) {
            Some(len) if len <= MAX_REPEAT_LEN => s.repeat(count).into(),
            _ => {
                d.error(
                    "repeat",
                    format!("result of repeating {} bytes {count} times is too large", s.len()),
                );
                v.clone()
            }
        }
    });
    apply(&op, target, diagnostics)
}

/// Split text leaves on `separator` into sequences of text.
pub fn split(separator: &Value, target: &Value, diagnostics: &mut Diagnostics) -> Value {
    let Some(separator) = text_operand("split", separator, diagnostics) else {
        return target.clone();
    };
    map_text("split", target, diagnostics, |s| {
        if separator.is_empty() {
            Value::seq(s.chars().map(|c| Value::Text(c.to_string())))
        } else {
            Value::seq(s.split(separator.as_str()).map(Value::from))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{DiagnosticPolicy, Severity};

    fn diag() -> Diagnostics {
        Diagnostics::new(DiagnosticPolicy::silent())
    }

    #[test]
    fn test_case_changes() {
        let mut d = diag();
        assert_eq!(upper(&Value::from("abc"), &mut d), Value::from("ABC"));
        assert_eq!(lower(&Value::from("ÀB"), &mut d), Value::from("àb"));
        assert_eq!(
            title(&Value::from("hello big  world"), &mut d),
            Value::from("Hello Big  World")
        );
    }

    #[test]
    fn test_non_text_leaf_warns_and_is_kept() {
        let mut d = diag();
        let input = Value::seq([Value::from(" a "), Value::from(3)]);
        let out = trim(None, &input, &mut d);
        assert_eq!(out, Value::seq([Value::from("a"), Value::from(3)]));
        assert!(d.has(Severity::Warning));
    }

    #[test]
    fn test_trim_cutset() {
        let mut d = diag();
        assert_eq!(
            trim(Some(&Value::from("-_")), &Value::from("_-x-_"), &mut d),
            Value::from("x")
        );
    }

    #[test]
    fn test_prefix_suffix() {
        let mut d = diag();
        assert_eq!(
            trim_prefix(&Value::from("pre"), &Value::from("prefix"), &mut d),
            Value::from("fix")
        );
        assert_eq!(
            trim_suffix(&Value::from(".tmpl"), &Value::from("page.tmpl"), &mut d),
            Value::from("page")
        );
        assert_eq!(
            has_prefix(
                &Value::from("a"),
                &Value::seq([Value::from("ab"), Value::from("ba")]),
                &mut d
            ),
            Value::seq([Value::from(true), Value::from(false)])
        );
        assert_eq!(
            has_suffix(&Value::from("a"), &Value::from("ba"), &mut d),
            Value::from(true)
        );
    }

    #[test]
    fn test_remove_and_replace() {
        let mut d = diag();
        let input = Value::map([("k", Value::from("a-b-c"))]);
        assert_eq!(
            remove(&Value::from("-"), &input, &mut d),
            Value::map([("k", Value::from("abc"))])
        );
        assert_eq!(
            replace(&Value::from("-"), &Value::from("+"), &input, &mut d),
            Value::map([("k", Value::from("a+b+c"))])
        );
    }

    #[test]
    fn test_non_text_operand_returns_target() {
        let mut d = diag();
        let target = Value::from("abc");
        assert_eq!(remove(&Value::from(1), &target, &mut d), target);
        assert_eq!(d.entries().len(), 1);
    }

    #[test]
    fn test_contains_truncate_repeat() {
        let mut d = diag();
        assert_eq!(contains(&Value::from("ll"), &Value::from("hello"), &mut d), Value::from(true));
        assert_eq!(truncate(&Value::from(3), &Value::from("héllo"), &mut d), Value::from("hél"));
        assert_eq!(repeat(&Value::from(2), &Value::from("ab"), &mut d), Value::from("abab"));
        assert!(d.is_empty());

        assert_eq!(repeat(&Value::from(-1), &Value::from("ab"), &mut d), Value::from("ab"));
        assert!(d.has(Severity::Warning));
    }

    #[test]
    fn test_repeat_refuses_oversized_results() {
        let mut d = diag();
        let input = Value::seq([Value::from("ab"), Value::from("")]);
        let out = repeat(&Value::from(i64::MAX), &input, &mut d);
        assert_eq!(out, Value::seq([Value::from("ab"), Value::from("")]));
        assert_eq!(d.entries().len(), 1);
        assert!(d.has(Severity::Error));
    }

    #[test]
    fn test_split() {
        let mut d = diag();
        assert_eq!(
            split(&Value::from(","), &Value::from("a,b"), &mut d),
            Value::seq([Value::from("a"), Value::from("b")])
        );
        assert_eq!(
            split(&Value::from(""), &Value::from("ab"), &mut d),
            Value::seq([Value::from("a"), Value::from("b")])
        );
    }
}
