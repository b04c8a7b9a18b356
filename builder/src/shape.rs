use jsongraph_core::model::PrimitiveKind;
use serde_json::{Map, Value};

/// Closed classification of a JSON value. Every value falls in exactly one
/// case, so the walker never needs an "unknown type" branch.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape<'a> {
    Null,
    Primitive(PrimitiveKind, String),
    Array(&'a [Value]),
    Object(&'a Map<String, Value>),
}

impl<'a> Shape<'a> {
    pub fn of(value: &'a Value) -> Self {
        match value {
            Value::Null => Shape::Null,
            Value::Bool(flag) => Shape::Primitive(PrimitiveKind::Boolean, flag.to_string()),
            Value::Number(number) => Shape::Primitive(PrimitiveKind::Number, number.to_string()),
            Value::String(text) => Shape::Primitive(PrimitiveKind::String, text.clone()),
            Value::Array(items) => Shape::Array(items),
            Value::Object(fields) => Shape::Object(fields),
        }
    }
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
