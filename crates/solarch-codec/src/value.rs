//! Self-describing value trees and the integer-preserving transform.
//!
//! MessagePack has no integer type wider than 64 bits, so [`to_safe`] turns
//! every [`Value::BigInt`] into decimal text before serialization and
//! [`from_safe`] turns whole-string decimal text back into integers after
//! deserialization. Byte buffers are leaves in both directions.

use crate::decimal::is_decimal;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// A JSON-like tree that can also hold raw bytes and 128-bit integers.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Nil / null.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer that fits the native format.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Integer that may not fit 64 bits or an f64 mantissa.
    BigInt(i128),
    /// Text.
    String(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Ordered sequence.
    Array(Vec<Value>),
    /// String-keyed map.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Build a map from key/value pairs.
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Look up a key of a map value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Map(m) => m.get(key),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        i64::try_from(v).map_or(Self::BigInt(i128::from(v)), Self::Int)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

/// Replace every big integer with its decimal text.
pub fn to_safe(value: Value) -> Value {
    match value {
        Value::Bytes(b) => Value::Bytes(b),
        Value::BigInt(n) => Value::String(n.to_string()),
        Value::Array(items) => Value::Array(items.into_iter().map(to_safe).collect()),
        Value::Map(entries) => {
            Value::Map(entries.into_iter().map(|(k, v)| (k, to_safe(v))).collect())
        }
        leaf => leaf,
    }
}

/// Replace every whole-string decimal integer with a big integer.
///
/// Text outside the i128 range is left as text.
pub fn from_safe(value: Value) -> Value {
    match value {
        Value::Bytes(b) => Value::Bytes(b),
        Value::String(s) if is_decimal(&s) => match s.parse::<i128>() {
            Ok(n) => Value::BigInt(n),
            Err(_) => Value::String(s),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(from_safe).collect()),
        Value::Map(entries) => {
            Value::Map(entries.into_iter().map(|(k, v)| (k, from_safe(v))).collect())
        }
        leaf => leaf,
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(n) => serializer.serialize_i64(*n),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::BigInt(n) => serializer.serialize_i128(*n),
            Self::String(s) => serializer.serialize_str(s),
            Self::Bytes(b) => serializer.serialize_bytes(b),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any self-describing value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Value, D::Error> {
        Value::deserialize(d)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<Value, E> {
        Ok(Value::BigInt(v))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Value, E> {
        i128::try_from(v)
            .map(Value::BigInt)
            .map_err(|_| E::custom(format!("integer {v} exceeds i128")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Value, E> {
        Ok(Value::Bytes(v.to_vec()))
    }

    fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<Value, E> {
        Ok(Value::Bytes(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let mut entries = BTreeMap::new();
        while let Some((k, v)) = access.next_entry::<String, Value>()? {
            entries.insert(k, v);
        }
        Ok(Value::Map(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_tree() -> Value {
        Value::map([
            ("fee", Value::BigInt(18_446_744_073_709_551_615)),
            ("slot", Value::Int(250_000_000)),
            ("label", Value::from("transfer")),
            ("raw", Value::Bytes(b"0123".to_vec())),
            (
                "nested",
                Value::Array(vec![
                    Value::BigInt(-9_007_199_254_740_993),
                    Value::Null,
                    Value::Bool(true),
                    Value::Float(0.5),
                ]),
            ),
        ])
    }

    #[test]
    fn test_to_safe_stringifies_big_integers() {
        let safe = to_safe(sample_tree());
        assert_eq!(
            safe.get("fee"),
            Some(&Value::String("18446744073709551615".into()))
        );
        assert_eq!(safe.get("slot"), Some(&Value::Int(250_000_000)));
        assert_eq!(safe.get("raw"), Some(&Value::Bytes(b"0123".to_vec())));
        match safe.get("nested") {
            Some(Value::Array(items)) => {
                assert_eq!(items[0], Value::String("-9007199254740993".into()))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_from_safe_restores_big_integers() {
        assert_eq!(from_safe(to_safe(sample_tree())), sample_tree());
    }

    #[test]
    fn test_from_safe_only_matches_whole_strings() {
        for s in ["12a", "1.5", "-", "", " 1", "+7", "0x10"] {
            assert_eq!(from_safe(Value::from(s)), Value::from(s), "{s:?}");
        }
        assert_eq!(from_safe(Value::from("007")), Value::BigInt(7));
        assert_eq!(from_safe(Value::from("-0")), Value::BigInt(0));
    }

    #[test]
    fn test_bytes_are_never_walked() {
        let digits = Value::Bytes(b"12345".to_vec());
        assert_eq!(from_safe(digits.clone()), digits);
        assert_eq!(to_safe(digits.clone()), digits);
    }

    #[test]
    fn test_huge_digit_strings_stay_text() {
        let s = "9".repeat(60);
        assert_eq!(from_safe(Value::from(s.as_str())), Value::from(s.as_str()));
    }

    #[test]
    fn test_json_roundtrip_of_safe_tree() {
        let mut tree = sample_tree();
        if let Value::Map(m) = &mut tree {
            m.remove("raw");
        }
        let json = serde_json::to_string(&to_safe(tree.clone())).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(from_safe(back), tree);
    }

    proptest! {
        #[test]
        fn test_big_integers_survive(n in any::<i128>()) {
            let v = Value::Array(vec![Value::BigInt(n)]);
            prop_assert_eq!(from_safe(to_safe(v.clone())), v);
        }
    }
}
