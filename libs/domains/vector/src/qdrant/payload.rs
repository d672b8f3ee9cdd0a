//! JSON <-> Qdrant payload conversion.

use std::collections::HashMap;

use qdrant_client::qdrant::{ListValue, Struct, Value as QdrantValue, value::Kind};
use serde_json::Value;

use crate::models::Metadata;

/// Payload field holding the caller-facing id.
pub const ID_FIELD: &str = "_id";
/// Payload field holding the namespace.
pub const NAMESPACE_FIELD: &str = "_namespace";

pub fn json_to_qdrant_value(val: Value) -> Option<QdrantValue> {
    let kind = match val {
        Value::Null => return None,
        Value::Bool(b) => return Some(QdrantValue::from(b)),
        Value::Number(n) => {
            return match n.as_i64() {
                Some(i) => Some(QdrantValue::from(i)),
                None => n.as_f64().map(QdrantValue::from),
            };
        }
        Value::String(s) => return Some(QdrantValue::from(s)),
        Value::Array(items) => Kind::ListValue(ListValue {
            values: items.into_iter().filter_map(json_to_qdrant_value).collect(),
        }),
        Value::Object(map) => Kind::StructValue(Struct {
            fields: map
                .into_iter()
                .filter_map(|(k, v)| json_to_qdrant_value(v).map(|v| (k, v)))
                .collect(),
        }),
    };
    Some(QdrantValue { kind: Some(kind) })
}

pub fn qdrant_value_to_json(val: QdrantValue) -> Option<Value> {
    match val.kind? {
        Kind::NullValue(_) => Some(Value::Null),
        Kind::BoolValue(b) => Some(Value::Bool(b)),
        Kind::IntegerValue(i) => Some(Value::Number(i.into())),
        Kind::DoubleValue(f) => serde_json::Number::from_f64(f).map(Value::Number),
        Kind::StringValue(s) => Some(Value::String(s)),
        Kind::ListValue(list) => Some(Value::Array(
            list.values
                .into_iter()
                .filter_map(qdrant_value_to_json)
                .collect(),
        )),
        Kind::StructValue(s) => Some(Value::Object(
            s.fields
                .into_iter()
                .filter_map(|(k, v)| qdrant_value_to_json(v).map(|v| (k, v)))
                .collect(),
        )),
    }
}

/// Metadata plus the reserved id and namespace fields.
pub fn to_payload(metadata: Metadata, id: &str, namespace: &str) -> HashMap<String, QdrantValue> {
    let mut payload: HashMap<String, QdrantValue> = metadata
        .into_iter()
        .filter_map(|(k, v)| json_to_qdrant_value(v).map(|v| (k, v)))
        .collect();
    payload.insert(ID_FIELD.to_string(), QdrantValue::from(id.to_string()));
    payload.insert(
        NAMESPACE_FIELD.to_string(),
        QdrantValue::from(namespace.to_string()),
    );
    payload
}

/// Splits a stored payload back into (caller id, metadata without reserved fields).
pub fn from_payload(mut payload: HashMap<String, QdrantValue>) -> (Option<String>, Metadata) {
    let id = payload
        .remove(ID_FIELD)
        .and_then(qdrant_value_to_json)
        .and_then(|v| v.as_str().map(str::to_string));
    payload.remove(NAMESPACE_FIELD);

    let metadata = payload
        .into_iter()
        .filter_map(|(k, v)| qdrant_value_to_json(v).map(|v| (k, v)))
        .collect();
    (id, metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_values_survive_round_trip() {
        let original = json!({ "tags": ["a", "b"], "author": { "name": "x", "age": 3 } });
        let converted = json_to_qdrant_value(original.clone()).unwrap();
        assert_eq!(qdrant_value_to_json(converted), Some(original));
    }

    #[test]
    fn test_nulls_are_dropped() {
        assert!(json_to_qdrant_value(Value::Null).is_none());
    }

    #[test]
    fn test_reserved_fields_are_split_out() {
        let metadata = json!({ "source": "faq" }).as_object().cloned().unwrap();
        let payload = to_payload(metadata, "42", "tenant-a");
        assert_eq!(payload.len(), 3);

        let (id, metadata) = from_payload(payload);
        assert_eq!(id.as_deref(), Some("42"));
        assert_eq!(metadata.len(), 1);
        assert_eq!(metadata["source"], "faq");
    }
}
