//! Serde helpers for integer fields that may exceed 2^53.
//!
//! Values are written as base-10 strings and read back from either a string
//! or a native integer, so only fields declared here are ever parsed from
//! digit strings.

use serde::de::{self, Deserializer, Visitor};
use serde::Serializer;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

/// Integer types that can travel as decimal text.
pub trait DecimalInt: Sized + fmt::Display + FromStr + TryFrom<i64> + TryFrom<u64> {}

impl DecimalInt for u64 {}
impl DecimalInt for i64 {}
impl DecimalInt for u128 {}
impl DecimalInt for i128 {}

/// Serialize an integer as its decimal string.
pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: DecimalInt,
    S: Serializer,
{
    serializer.collect_str(value)
}

/// Deserialize an integer from a decimal string or a native integer.
pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: DecimalInt,
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(DecimalVisitor(PhantomData))
}

struct DecimalVisitor<T>(PhantomData<T>);

impl<'de, T: DecimalInt> Visitor<'de> for DecimalVisitor<T> {
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer or a decimal integer string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<T, E> {
        <T as TryFrom<i64>>::try_from(v).map_err(|_| E::custom(format!("integer {v} out of range")))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<T, E> {
        <T as TryFrom<u64>>::try_from(v).map_err(|_| E::custom(format!("integer {v} out of range")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<T, E> {
        if !is_decimal(v) {
            return Err(E::invalid_value(de::Unexpected::Str(v), &self));
        }
        v.parse()
            .map_err(|_| E::custom(format!("integer {v} out of range")))
    }
}

/// True if `s` is an optional minus followed by one or more ASCII digits.
pub fn is_decimal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Same encoding for optional fields; `None` is skipped or written as nil.
pub mod option {
    use super::DecimalInt;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize `Some` as a decimal string, `None` as nil.
    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: DecimalInt,
        S: Serializer,
    {
        match value {
            Some(v) => serializer.collect_str(v),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize nil as `None`, anything else like the non-optional helper.
    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: DecimalInt,
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Wrapper<T: DecimalInt>(#[serde(with = "crate::decimal")] T);

        let wrapped: Option<Wrapper<T>> = Option::deserialize(deserializer)?;
        Ok(wrapped.map(|Wrapper(v)| v))
    }
}
