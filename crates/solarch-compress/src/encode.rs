//! MessagePack encoding of batches and value trees.
//!
//! Structs are written as maps keyed by field name so archives stay readable
//! without this crate's type definitions.

use crate::error::CompressResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use solarch_codec::value::{from_safe, to_safe, Value};

/// Serialize a typed value.
pub fn to_msgpack<T: Serialize + ?Sized>(value: &T) -> CompressResult<Vec<u8>> {
    Ok(rmp_serde::to_vec_named(value)?)
}

/// Deserialize a typed value.
pub fn from_msgpack<T: DeserializeOwned>(bytes: &[u8]) -> CompressResult<T> {
    Ok(rmp_serde::from_slice(bytes)?)
}

/// Serialize a value tree, turning big integers into decimal text first.
pub fn tree_to_msgpack(tree: &Value) -> CompressResult<Vec<u8>> {
    to_msgpack(&to_safe(tree.clone()))
}

/// Deserialize a value tree, turning decimal text back into big integers.
pub fn tree_from_msgpack(bytes: &[u8]) -> CompressResult<Value> {
    Ok(from_safe(from_msgpack(bytes)?))
}
