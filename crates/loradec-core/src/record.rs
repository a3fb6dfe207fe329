use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A decoded field value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Raw identifiers such as `featherID`.
    Unsigned(u64),
    Float(f64),
}

impl FieldValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            FieldValue::Unsigned(value) => value as f64,
            FieldValue::Float(value) => value,
        }
    }
}

/// Named values from one uplink, in layout order.
///
/// Serializes as a JSON object whose keys keep the insertion order.
///
/// # Examples
/// ```
/// use loradec_core::{DecodedRecord, FieldValue};
///
/// let mut record = DecodedRecord::new();
/// record.insert("featherID", FieldValue::Unsigned(7));
/// record.insert("celsius", FieldValue::Float(24.0));
/// assert_eq!(record.get_f64("celsius"), Some(24.0));
/// assert_eq!(
///     serde_json::to_string(&record).unwrap(),
///     r#"{"featherID":7,"celsius":24.0}"#
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedRecord {
    fields: Vec<(String, FieldValue)>,
}

impl DecodedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Insert a value, replacing an existing one with the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        match self.fields.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<FieldValue> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| *value)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).map(|value| value.as_f64())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, FieldValue)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for DecodedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = DecodedRecord;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of field names to numbers")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut record = DecodedRecord::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, FieldValue>()? {
            record.insert(key, value);
        }
        Ok(record)
    }
}

impl<'de> Deserialize<'de> for DecodedRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RecordVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_order_and_replaces_duplicates() {
        let mut record = DecodedRecord::new();
        record.insert("b", FieldValue::Float(1.0));
        record.insert("a", FieldValue::Float(2.0));
        record.insert("b", FieldValue::Float(3.0));
        assert_eq!(record.names().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(record.get_f64("b"), Some(3.0));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn serializes_in_insertion_order() {
        let mut record = DecodedRecord::new();
        record.insert("zeta", FieldValue::Float(0.5));
        record.insert("alpha", FieldValue::Unsigned(3));
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"zeta":0.5,"alpha":3}"#);
    }

    #[test]
    fn negative_zero_survives_serialization() {
        let mut record = DecodedRecord::new();
        record.insert("degreesC", FieldValue::Float(-0.0));
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"degreesC":-0.0}"#);
    }

    #[test]
    fn deserializes_integers_as_unsigned() {
        let record: DecodedRecord =
            serde_json::from_str(r#"{"featherID":7,"celsius":24.5}"#).unwrap();
        assert_eq!(record.get("featherID"), Some(FieldValue::Unsigned(7)));
        assert_eq!(record.get("celsius"), Some(FieldValue::Float(24.5)));
    }

    #[test]
    fn missing_field_is_none() {
        assert_eq!(DecodedRecord::new().get("celsius"), None);
    }
}
