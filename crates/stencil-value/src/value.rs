//! Runtime value model.
//!
//! Every value flowing through a render is a [`Value`]. Numeric values keep
//! the concrete width they were produced with so that arithmetic can be done
//! in a wide representation and narrowed back at the end.

use std::collections::BTreeMap;
use std::fmt;

/// Map type used by [`Value::Mapping`]. Iteration order is the key order.
pub type Mapping = BTreeMap<Key, Value>;

/// The dispatch-level kind of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Int,
    Float,
    Text,
    Sequence,
    Mapping,
    Record,
}

impl Kind {
    /// Lowercase name used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Text => "text",
            Kind::Sequence => "sequence",
            Kind::Mapping => "mapping",
            Kind::Record => "record",
        }
    }

    /// Whether this is `Int` or `Float`.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Kind::Int | Kind::Float)
    }

    /// Whether this is `Sequence`, `Mapping` or `Record`.
    pub fn is_container(&self) -> bool {
        matches!(self, Kind::Sequence | Kind::Mapping | Kind::Record)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete width of an integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IntWidth {
    I8,
    I16,
    I32,
    #[default]
    I64,
    U8,
    U16,
    U32,
    U64,
}

impl IntWidth {
    /// Truncate a 64-bit value to this width, wrapping on overflow.
    pub fn wrap(&self, value: i64) -> i64 {
        match self {
            IntWidth::I8 => value as i8 as i64,
            IntWidth::I16 => value as i16 as i64,
            IntWidth::I32 => value as i32 as i64,
            IntWidth::I64 => value,
            IntWidth::U8 => value as u8 as i64,
            IntWidth::U16 => value as u16 as i64,
            IntWidth::U32 => value as u32 as i64,
            IntWidth::U64 => value as u64 as i64,
        }
    }

    /// Whether the width is unsigned.
    pub fn is_unsigned(&self) -> bool {
        matches!(
            self,
            IntWidth::U8 | IntWidth::U16 | IntWidth::U32 | IntWidth::U64
        )
    }
}

/// Concrete width of a floating point value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FloatWidth {
    F32,
    #[default]
    F64,
}

impl FloatWidth {
    /// Narrow a 64-bit float to this width.
    pub fn narrow(&self, value: f64) -> f64 {
        match self {
            FloatWidth::F32 => value as f32 as f64,
            FloatWidth::F64 => value,
        }
    }
}

/// A scalar mapping key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl Key {
    /// The key as a value.
    pub fn to_value(&self) -> Value {
        match self {
            Key::Bool(b) => Value::Bool(*b),
            Key::Int(i) => Value::Int(*i, IntWidth::I64),
            Key::Text(s) => Value::Text(s.clone()),
        }
    }

    /// Kind of the key when viewed as a value.
    pub fn kind(&self) -> Kind {
        match self {
            Key::Bool(_) => Kind::Bool,
            Key::Int(_) => Kind::Int,
            Key::Text(_) => Kind::Text,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Bool(b) => write!(f, "{b}"),
            Key::Int(i) => write!(f, "{i}"),
            Key::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Text(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Text(s)
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}

/// An ordered list of values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sequence {
    /// Elements in order.
    pub items: Vec<Value>,
    /// Fixed-length sequences keep their length through element-wise operations.
    pub fixed: bool,
}

impl Sequence {
    /// A growable sequence.
    pub fn new(items: Vec<Value>) -> Self {
        Self { items, fixed: false }
    }

    /// A fixed-length sequence.
    pub fn fixed(items: Vec<Value>) -> Self {
        Self { items, fixed: true }
    }

    /// Build a sequence of the same shape with `f` applied to every element.
    pub fn map(&self, mut f: impl FnMut(&Value) -> Value) -> Self {
        Self {
            items: self.items.iter().map(&mut f).collect(),
            fixed: self.fixed,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A named record field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: Value,
    /// Only public fields can be read or written generically.
    pub public: bool,
}

/// A record-like aggregate with ordered, visibility-tagged fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    /// Type name, used for strict compatibility.
    pub name: String,
    pub fields: Vec<Field>,
}

impl Record {
    /// Create an empty record.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a public field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push(Field {
            name: name.into(),
            value: value.into(),
            public: true,
        });
        self
    }

    /// Add a private field.
    pub fn with_private_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push(Field {
            name: name.into(),
            value: value.into(),
            public: false,
        });
        self
    }

    /// Read a public field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|f| f.public && f.name == name)
            .map(|f| &f.value)
    }

    /// Iterate over public fields.
    pub fn public_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.public)
    }

    /// Build a record of the same shape. Public fields are mapped through `f`,
    /// private fields are left at their zero value.
    pub fn map_public(&self, mut f: impl FnMut(&Value) -> Value) -> Self {
        let fields = self
            .fields
            .iter()
            .map(|field| Field {
                name: field.name.clone(),
                value: if field.public {
                    f(&field.value)
                } else {
                    field.value.zero_like()
                },
                public: field.public,
            })
            .collect();
        Self {
            name: self.name.clone(),
            fields,
        }
    }
}

/// A runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64, IntWidth),
    Float(f64, FloatWidth),
    Text(String),
    Sequence(Sequence),
    Mapping(Mapping),
    Record(Record),
    /// A dynamically typed slot. `Any(None)` is the invalid value.
    Any(Option<Box<Value>>),
}

static NULL: Value = Value::Null;

impl Value {
    /// Wrap a value in a dynamic slot.
    pub fn any(value: Value) -> Self {
        Value::Any(Some(Box::new(value)))
    }

    /// A growable sequence.
    pub fn seq(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Sequence(Sequence::new(items.into_iter().collect()))
    }

    /// A mapping with text keys.
    pub fn map<K: Into<Key>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Mapping(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Strip dynamic wrappers. An empty wrapper resolves to `Null`.
    pub fn resolve(&self) -> &Value {
        let mut current = self;
        loop {
            match current {
                Value::Any(Some(inner)) => current = inner,
                Value::Any(None) => return &NULL,
                other => return other,
            }
        }
    }

    /// Classify the value for dispatch.
    pub fn kind(&self) -> Kind {
        match self.resolve() {
            Value::Null | Value::Any(_) => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Int(..) => Kind::Int,
            Value::Float(..) => Kind::Float,
            Value::Text(_) => Kind::Text,
            Value::Sequence(_) => Kind::Sequence,
            Value::Mapping(_) => Kind::Mapping,
            Value::Record(_) => Kind::Record,
        }
    }

    pub fn is_null(&self) -> bool {
        self.kind() == Kind::Null
    }

    /// The zero value of the same concrete type.
    pub fn zero_like(&self) -> Value {
        match self {
            Value::Null => Value::Null,
            Value::Bool(_) => Value::Bool(false),
            Value::Int(_, w) => Value::Int(0, *w),
            Value::Float(_, w) => Value::Float(0.0, *w),
            Value::Text(_) => Value::Text(String::new()),
            Value::Sequence(seq) if seq.fixed => Value::Sequence(seq.map(Value::zero_like)),
            Value::Sequence(_) => Value::Sequence(Sequence::default()),
            Value::Mapping(_) => Value::Mapping(Mapping::new()),
            Value::Record(rec) => Value::Record(Record {
                name: rec.name.clone(),
                fields: rec
                    .fields
                    .iter()
                    .map(|f| Field {
                        name: f.name.clone(),
                        value: f.value.zero_like(),
                        public: f.public,
                    })
                    .collect(),
            }),
            Value::Any(_) => Value::Any(None),
        }
    }

    /// Whether this equals the zero value of its type.
    pub fn is_zero(&self) -> bool {
        match self.resolve() {
            Value::Null | Value::Any(_) => true,
            Value::Bool(b) => !b,
            Value::Int(i, _) => *i == 0,
            Value::Float(f, _) => *f == 0.0,
            Value::Text(s) => s.is_empty(),
            Value::Sequence(seq) => {
                if seq.fixed {
                    seq.items.iter().all(Value::is_zero)
                } else {
                    seq.is_empty()
                }
            }
            Value::Mapping(map) => map.is_empty(),
            Value::Record(rec) => rec.fields.iter().all(|f| f.value.is_zero()),
        }
    }

    /// Structural equality that ignores dynamic wrappers and numeric width.
    pub fn deep_eq(&self, other: &Value) -> bool {
        match (self.resolve(), other.resolve()) {
            (Value::Int(a, _), Value::Int(b, _)) => a == b,
            (Value::Float(a, _), Value::Float(b, _)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => {
                a.len() == b.len() && a.items.iter().zip(&b.items).all(|(x, y)| x.deep_eq(y))
            }
            (Value::Mapping(a), Value::Mapping(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .all(|(k, v)| b.get(k).map_or(false, |other| v.deep_eq(other)))
            }
            (Value::Record(a), Value::Record(b)) => {
                a.name == b.name
                    && a.fields.len() == b.fields.len()
                    && a.fields.iter().zip(&b.fields).all(|(x, y)| {
                        x.name == y.name && x.public == y.public && x.value.deep_eq(&y.value)
                    })
            }
            (a, b) => a == b,
        }
    }

    /// Text content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self.resolve() {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to a mapping key. Only scalar values qualify.
    pub fn to_key(&self) -> Option<Key> {
        match self.resolve() {
            Value::Bool(b) => Some(Key::Bool(*b)),
            Value::Int(i, _) => Some(Key::Int(*i)),
            Value::Text(s) => Some(Key::Text(s.clone())),
            _ => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

macro_rules! int_from {
    ($($t:ty => $w:ident),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(v as i64, IntWidth::$w)
                }
            }
        )*
    };
}

int_from!(
    i8 => I8, i16 => I16, i32 => I32, i64 => I64,
    u8 => U8, u16 => U16, u32 => U32, u64 => U64,
);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64, FloatWidth::F32)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v, FloatWidth::F64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Value::Record(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::seq(v.into_iter().map(Into::into))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.resolve() {
            Value::Null | Value::Any(_) => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i, w) if w.is_unsigned() => write!(f, "{}", *i as u64),
            Value::Int(i, _) => write!(f, "{i}"),
            Value::Float(v, FloatWidth::F32) => write!(f, "{}", *v as f32),
            Value::Float(v, FloatWidth::F64) => write!(f, "{v}"),
            Value::Text(s) => f.write_str(s),
            Value::Sequence(seq) => {
                f.write_str("[")?;
                for (i, item) in seq.items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Mapping(map) => {
                f.write_str("map[")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{k}:{v}")?;
                }
                f.write_str("]")
            }
            Value::Record(rec) => {
                f.write_str("{")?;
                for (i, field) in rec.public_fields().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}:{}", field.name, field.value)?;
                }
                f.write_str("}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_unwraps_dynamic_slots() {
        let nested = Value::any(Value::any(Value::from(3)));
        assert_eq!(nested.resolve(), &Value::Int(3, IntWidth::I32));
        assert_eq!(nested.kind(), Kind::Int);

        let invalid = Value::Any(None);
        assert_eq!(invalid.resolve(), &Value::Null);
        assert_eq!(invalid.kind(), Kind::Null);
    }

    #[test]
    fn test_int_width_wraps() {
        assert_eq!(IntWidth::I8.wrap(128), -128);
        assert_eq!(IntWidth::U8.wrap(256), 0);
        assert_eq!(IntWidth::U8.wrap(-1), 255);
        assert_eq!(IntWidth::I16.wrap(40_000), 40_000 - 65_536);
        assert_eq!(IntWidth::I64.wrap(i64::MAX), i64::MAX);
    }

    #[test]
    fn test_zero_like_keeps_shape() {
        let rec = Record::new("User")
            .with_field("name", "ada")
            .with_private_field("token", 42i64);
        let zero = Value::Record(rec).zero_like();
        match zero {
            Value::Record(r) => {
                assert_eq!(r.fields.len(), 2);
                assert_eq!(r.fields[0].value, Value::Text(String::new()));
                assert_eq!(r.fields[1].value, Value::Int(0, IntWidth::I64));
                assert!(!r.fields[1].public);
            }
            other => panic!("expected record, got {other:?}"),
        }

        let fixed = Value::Sequence(Sequence::fixed(vec![Value::from(1u8), Value::from(2u8)]));
        assert_eq!(
            fixed.zero_like(),
            Value::Sequence(Sequence::fixed(vec![
                Value::Int(0, IntWidth::U8),
                Value::Int(0, IntWidth::U8)
            ]))
        );
    }

    #[test]
    fn test_record_map_public_zeroes_private_fields() {
        let rec = Record::new("Item")
            .with_field("label", "a")
            .with_private_field("secret", "b");
        let mapped = rec.map_public(|v| Value::Text(format!("{v}!")));
        assert_eq!(mapped.get("label"), Some(&Value::from("a!")));
        assert_eq!(mapped.fields[1].value, Value::Text(String::new()));
        assert_eq!(mapped.get("secret"), None);
    }

    #[test]
    fn test_deep_eq_ignores_width() {
        assert!(Value::from(5u8).deep_eq(&Value::from(5i64)));
        assert!(!Value::from(5u8).deep_eq(&Value::from(5.0)));
        assert!(Value::any(Value::from("x")).deep_eq(&Value::from("x")));
        assert!(Value::seq([Value::from(1), Value::from(2)])
            .deep_eq(&Value::seq([Value::from(1i64), Value::from(2i64)])));
    }

    #[test]
    fn test_is_zero() {
        assert!(Value::from("").is_zero());
        assert!(Value::from(0u16).is_zero());
        assert!(Value::Any(None).is_zero());
        assert!(Value::map(Vec::<(&str, Value)>::new()).is_zero());
        assert!(!Value::from("v").is_zero());
        assert!(!Value::seq([Value::Null]).is_zero());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(1.5).to_string(), "1.5");
        assert_eq!(Value::from(0.1f32).to_string(), "0.1");
        assert_eq!(Value::from(u64::MAX).to_string(), u64::MAX.to_string());
        assert_eq!(
            Value::seq([Value::from(1), Value::from("a")]).to_string(),
            "[1 a]"
        );
        assert_eq!(
            Value::map([("b", Value::from(2)), ("a", Value::from(1))]).to_string(),
            "map[a:1 b:2]"
        );
    }
}
