//! The serialized-object reader adapter (spec §4.3): a narrow, defensive
//! wrapper around whatever external deserializer actually turns a decrypted
//! asset blob into typed objects.
//!
//! The upstream deserializer is treated as a black box (spec §1); this
//! module defines the contract it must satisfy (`GameObject`) and a
//! `serde_json::Value`-backed adapter (`JsonObjectReader`) that implements it
//! against a decrypted blob already normalized to JSON by whatever asset
//! unpacker sits in front of this crate. The attribute-alias and default
//! rules come straight from §4.3.

use serde_json::Value;

/// One deserialized object: a type name plus named attributes.
pub trait GameObject {
    fn type_name(&self) -> &str;

    /// Look up an attribute by its plain name, also trying the `m_`-prefixed
    /// alias used by the original serializer (§4.3).
    fn attr(&self, name: &str) -> Option<&Value>;

    fn attr_i64(&self, name: &str, default: i64) -> i64 {
        self.attr(name).and_then(Value::as_i64).unwrap_or(default)
    }

    fn attr_f64(&self, name: &str, default: f64) -> f64 {
        self.attr(name).and_then(Value::as_f64).unwrap_or(default)
    }

    fn attr_str(&self, name: &str, default: &str) -> String {
        self.attr(name)
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| default.to_owned())
    }

    /// A list-valued attribute, each entry itself an object. Missing or
    /// non-array values read as empty.
    fn attr_object_list(&self, name: &str) -> Vec<JsonObject> {
        self.attr(name)
            .and_then(Value::as_array)
            .map(|items| items.iter().cloned().map(JsonObject::new).collect())
            .unwrap_or_default()
    }

    fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }
}

/// One object backed by a `serde_json::Value`, with the implementer's choice
/// of attribute representation being plain JSON values (§4.3).
#[derive(Debug, Clone)]
pub struct JsonObject {
    type_name: String,
    value: Value,
}

impl JsonObject {
    pub fn new(value: Value) -> Self {
        let type_name = value
            .get("$Type")
            .or_else(|| value.get("Type"))
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_owned();
        Self { type_name, value }
    }
}

impl GameObject for JsonObject {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn attr(&self, name: &str) -> Option<&Value> {
        self.value
            .get(name)
            .or_else(|| self.value.get(format!("m_{name}")))
    }
}

/// Parses a decrypted blob (already converted to a JSON array of objects by
/// the upstream unpacker) into `MonoBehaviour` objects, skipping any entry
/// that fails to deserialize (§4.3: "tolerates deserialization failures on
/// individual objects").
pub struct JsonObjectReader;

impl JsonObjectReader {
    pub fn parse_mono_behaviours(bytes: &[u8]) -> Vec<JsonObject> {
        let root: Value = match serde_json::from_slice(bytes) {
            Ok(v) => v,
            Err(_) => return Vec::new(),
        };
        let items = match root.as_array() {
            Some(items) => items.clone(),
            None => return Vec::new(),
        };
        items
            .into_iter()
            .map(JsonObject::new)
            .filter(|obj| obj.type_name() == "MonoBehaviour")
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filters_to_mono_behaviours_and_skips_the_rest() {
        let bytes = json!([
            {"$Type": "MonoBehaviour", "Text": "hi"},
            {"$Type": "Transform"},
        ])
        .to_string();
        let objects = JsonObjectReader::parse_mono_behaviours(bytes.as_bytes());
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].attr_str("Text", ""), "hi");
    }

    #[test]
    fn malformed_blob_yields_empty_list() {
        let objects = JsonObjectReader::parse_mono_behaviours(b"not json");
        assert!(objects.is_empty());
    }

    #[test]
    fn attribute_alias_and_defaults() {
        let obj = JsonObject::new(json!({"m_DataArray": [1, 2, 3]}));
        assert_eq!(obj.attr_object_list("DataArray").len(), 3);
        assert_eq!(obj.attr_i64("NextBlock", -1), -1);
    }
}
