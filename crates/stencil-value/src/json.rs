//! Conversion between [`Value`] and `serde_json::Value`.
//!
//! Template data arrives as JSON and leaves as JSON, so this is the boundary
//! between the executor and the operation library.

use serde_json::{Map, Number, Value as Json};

use crate::value::{FloatWidth, IntWidth, Key, Mapping, Value};

impl From<&Json> for Value {
    fn from(json: &Json) -> Self {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => from_number(n),
            Json::String(s) => Value::Text(s.clone()),
            Json::Array(items) => Value::seq(items.iter().map(Value::from)),
            Json::Object(map) => Value::Mapping(
                map.iter()
                    .map(|(k, v)| (Key::Text(k.clone()), Value::from(v)))
                    .collect::<Mapping>(),
            ),
        }
    }
}

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        Value::from(&json)
    }
}

fn from_number(n: &Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Int(i, IntWidth::I64)
    } else if let Some(u) = n.as_u64() {
        Value::Int(u as i64, IntWidth::U64)
    } else {
        Value::Float(n.as_f64().unwrap_or(f64::NAN), FloatWidth::F64)
    }
}

impl Value {
    /// Convert to JSON. Records become objects of their public fields and
    /// non-finite floats become `null`.
    pub fn to_json(&self) -> Json {
        match self.resolve() {
            Value::Null | Value::Any(_) => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i, w) if w.is_unsigned() => Json::from(*i as u64),
            Value::Int(i, _) => Json::from(*i),
            Value::Float(f, _) => Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Value::Text(s) => Json::String(s.clone()),
            Value::Sequence(seq) => Json::Array(seq.items.iter().map(Value::to_json).collect()),
            Value::Mapping(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect::<Map<_, _>>(),
            ),
            Value::Record(rec) => Json::Object(
                rec.public_fields()
                    .map(|f| (f.name.clone(), f.value.to_json()))
                    .collect::<Map<_, _>>(),
            ),
        }
    }
}
