//! Guest records as the seating engine sees them.
//!
//! A guest carries a free-form attribute bag (RSVP, gender marker, colour
//! tag, press flag, ...) whose keys and value encodings vary from event to
//! event. The bag is kept loosely typed here; interpretation happens in the
//! engine's attribute reader.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;

/// Opaque, stable guest identifier.
pub type GuestId = String;

/// A single scalar attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Bool(v)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Number(v)
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        AttributeValue::Number(f64::from(v))
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Number(v as f64)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::Text(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::Text(v)
    }
}

/// Unordered attribute-name → scalar mapping.
///
/// Deserialization never fails: anything that is not a JSON object (or a
/// string containing one) becomes an empty bag, and non-scalar values
/// (`null`, arrays, nested objects) are dropped.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "serde_json::Value")]
pub struct AttributeBag {
    entries: HashMap<String, AttributeValue>,
}

impl AttributeBag {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a bag from raw JSON text, degrading to an empty bag on error.
    pub fn from_json_str(raw: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(value) => Self::from(value),
            Err(e) => {
                tracing::debug!("Unparsable attribute bag treated as empty: {e}");
                Self::default()
            }
        }
    }

    pub fn to_json_string(&self) -> String {
        serde_json::to_string(&self.entries).unwrap_or_else(|_| "{}".into())
    }
}

impl From<serde_json::Value> for AttributeBag {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        let map = match value {
            Value::Object(map) => map,
            // Some exports double-encode the bag as a JSON string.
            Value::String(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Object(map)) => map,
                _ => return Self::default(),
            },
            _ => return Self::default(),
        };

        let entries = map
            .into_iter()
            .filter_map(|(key, value)| {
                let scalar = match value {
                    Value::Bool(b) => AttributeValue::Bool(b),
                    Value::Number(n) => AttributeValue::Number(n.as_f64()?),
                    Value::String(s) => AttributeValue::Text(s),
                    _ => return None,
                };
                Some((key, scalar))
            })
            .collect();

        Self { entries }
    }
}

impl Serialize for AttributeBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<K: Into<String>, V: Into<AttributeValue>> FromIterator<(K, V)> for AttributeBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// A guest of one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    pub id: GuestId,

    /// Dedicated VIP flag; VIPs are seated by hand and never touched.
    #[serde(default)]
    pub is_vip: bool,

    #[serde(default)]
    pub attributes: AttributeBag,

    /// Current banquet table, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_number: Option<u32>,
}

impl Guest {
    pub fn new(id: impl Into<GuestId>) -> Self {
        Self {
            id: id.into(),
            is_vip: false,
            attributes: AttributeBag::default(),
            table_number: None,
        }
    }

    pub fn vip(mut self, is_vip: bool) -> Self {
        self.is_vip = is_vip;
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key, value);
        self
    }

    pub fn at_table(mut self, table_number: u32) -> Self {
        self.table_number = Some(table_number);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bag_keeps_scalars_and_drops_the_rest() {
        let bag: AttributeBag = serde_json::from_str(
            r#"{"Zusage": true, "Tischfarbe": 2, "Presse": "ja", "Notiz": null, "Tags": [1]}"#,
        )
        .unwrap();
        assert_eq!(bag.len(), 3);
        assert_eq!(bag.get("Zusage"), Some(&AttributeValue::Bool(true)));
        assert_eq!(bag.get("Tischfarbe"), Some(&AttributeValue::Number(2.0)));
        assert_eq!(bag.get("Presse"), Some(&AttributeValue::Text("ja".into())));
        assert!(bag.get("Notiz").is_none());
    }

    #[test]
    fn malformed_bag_is_empty() {
        assert!(AttributeBag::from_json_str("{not json").is_empty());
        assert!(AttributeBag::from_json_str("[1, 2, 3]").is_empty());
        assert!(AttributeBag::from_json_str("42").is_empty());
    }

    #[test]
    fn double_encoded_bag_is_unwrapped() {
        let bag = AttributeBag::from(serde_json::Value::String(r#"{"vip": "true"}"#.into()));
        assert_eq!(bag.get("vip"), Some(&AttributeValue::Text("true".into())));
    }

    #[test]
    fn guest_deserializes_with_defaults() {
        let guest: Guest = serde_json::from_str(r#"{"id": "g1"}"#).unwrap();
        assert_eq!(guest.id, "g1");
        assert!(!guest.is_vip);
        assert!(guest.attributes.is_empty());
        assert_eq!(guest.table_number, None);
    }

    #[test]
    fn guest_uses_camel_case_fields() {
        let guest = Guest::new("g2").vip(true).at_table(7).attr("Zusage", true);
        let json = serde_json::to_string(&guest).unwrap();
        assert!(json.contains("\"isVip\":true"));
        assert!(json.contains("\"tableNumber\":7"));

        let back: Guest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, guest);
    }
}
