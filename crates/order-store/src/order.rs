use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{DecodeError, Result};

/// A single order as received from the broker.
///
/// Orders are schema-less: any JSON object is accepted and kept verbatim.
/// They carry no identity beyond their position in the store and are never
/// mutated after being decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Order(Map<String, Value>);

impl Order {
    /// Decodes a raw broker payload.
    ///
    /// The payload must be UTF-8 JSON whose top-level value is an object.
    pub fn from_slice(payload: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(payload)?;
        Self::try_from(value)
    }

    /// Returns the value of a field, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl TryFrom<Value> for Order {
    type Error = DecodeError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(DecodeError::NotAnObject {
                found: json_type_name(&other),
            }),
        }
    }
}

impl From<Order> for Value {
    fn from(order: Order) -> Self {
        Value::Object(order.0)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_json_object() {
        let order = Order::from_slice(br#"{"id":1,"item":"widget"}"#).unwrap();
        assert_eq!(order.get("id"), Some(&serde_json::json!(1)));
        assert_eq!(order.get("item"), Some(&serde_json::json!("widget")));
    }

    #[test]
    fn decodes_empty_object() {
        let order = Order::from_slice(b"{}").unwrap();
        assert!(order.as_map().is_empty());
    }

    #[test]
    fn rejects_invalid_json() {
        let result = Order::from_slice(b"not json at all");
        assert!(matches!(result, Err(DecodeError::Json(_))));
    }

    #[test]
    fn rejects_invalid_utf8() {
        let result = Order::from_slice(&[0xff, 0xfe, 0xfd]);
        assert!(matches!(result, Err(DecodeError::Json(_))));
    }

    #[test]
    fn rejects_non_object_json() {
        let result = Order::from_slice(b"[1, 2, 3]");
        assert!(matches!(
            result,
            Err(DecodeError::NotAnObject { found: "array" })
        ));

        let result = Order::from_slice(b"42");
        assert!(matches!(
            result,
            Err(DecodeError::NotAnObject { found: "number" })
        ));
    }

    #[test]
    fn serializes_transparently() {
        let order = Order::from_slice(br#"{"id":1,"item":"widget"}"#).unwrap();
        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value, serde_json::json!({"id": 1, "item": "widget"}));
    }

    #[test]
    fn nested_values_are_preserved() {
        let payload = serde_json::json!({
            "id": "A-17",
            "lines": [{"sku": "X", "qty": 2}],
            "meta": {"priority": true}
        });
        let order = Order::from_slice(payload.to_string().as_bytes()).unwrap();
        assert_eq!(Value::from(order), payload);
    }
}
