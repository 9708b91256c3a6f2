//! Per-batch string dictionary: interning on pack, key table on unpack.
//!
//! Each distinct string is stored once, as Base58-decoded bytes when the text
//! is canonical Base58 and as UTF-8 bytes otherwise.

use crate::error::{CodecError, CodecResult};
use crate::packed::{EncodedKey, KeyEncoding, KeyRef};
use indexmap::IndexSet;

/// Assigns dense, first-seen indexes to strings during one packing call.
#[derive(Debug, Default)]
pub struct Interner {
    keys: IndexSet<String>,
}

impl Interner {
    /// Create an empty interner
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the reference for `s`, assigning the next index on first sight.
    pub fn intern(&mut self, s: &str) -> KeyRef {
        let i = match self.keys.get_index_of(s) {
            Some(i) => i,
            None => self.keys.insert_full(s.to_owned()).0,
        };
        KeyRef::new(i as u32)
    }

    /// Number of distinct strings seen
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Is the interner empty?
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Distinct strings in index order
    pub fn keys(&self) -> &indexmap::set::Slice<String> {
        self.keys.as_slice()
    }

    /// Consume the interner and encode every key for storage.
    pub fn into_encoded_keys(self) -> Vec<EncodedKey> {
        self.keys.iter().map(|k| encode_key(k)).collect()
    }
}

/// Encode one dictionary string.
///
/// The empty string and anything that is not canonical Base58 are stored as
/// UTF-8. Text that merely happens to be valid Base58 is stored as Base58.
pub fn encode_key(s: &str) -> EncodedKey {
    if s.is_empty() {
        return EncodedKey::new(Vec::new(), KeyEncoding::Utf8);
    }
    match bs58::decode(s).into_vec() {
        Ok(bytes) if bs58::encode(&bytes).into_string() == s => {
            EncodedKey::new(bytes, KeyEncoding::Base58)
        }
        _ => EncodedKey::new(s.as_bytes().to_vec(), KeyEncoding::Utf8),
    }
}

/// Decode one dictionary entry back into its string.
pub fn decode_key(key: &EncodedKey) -> CodecResult<String> {
    match key.kind {
        t if t == KeyEncoding::Base58.tag() => Ok(bs58::encode(&key.data).into_string()),
        t if t == KeyEncoding::Utf8.tag() => {
            if key.data.is_empty() {
                return Ok(String::new());
            }
            Ok(String::from_utf8(key.data.clone())?)
        }
        other => Err(CodecError::InvalidKeyType(other)),
    }
}

/// Decoded dictionary used to resolve [`KeyRef`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyTable {
    keys: Vec<String>,
}

impl KeyTable {
    /// Decode every entry of a stored dictionary.
    pub fn decode(encoded: &[EncodedKey]) -> CodecResult<Self> {
        let keys = encoded.iter().map(decode_key).collect::<CodecResult<Vec<_>>>()?;
        Ok(Self { keys })
    }

    /// Look up the string behind a reference.
    pub fn resolve(&self, key: KeyRef) -> CodecResult<&str> {
        self.keys
            .get(key.index())
            .map(String::as_str)
            .ok_or(CodecError::KeyOutOfRange {
                index: key.i,
                len: self.keys.len(),
            })
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl From<Vec<String>> for KeyTable {
    fn from(keys: Vec<String>) -> Self {
        Self { keys }
    }
}
