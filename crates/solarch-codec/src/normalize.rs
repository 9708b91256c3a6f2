//! Shape adjustments between canonical transactions and their packed form.
//!
//! Forward:  `err` JSON payload → compact JSON text (`""` when absent),
//!           `"legacy"` version → `-1`.
//! Inverse:  `""` → no error, other text → parsed JSON, `-1` → `"legacy"`.

use crate::block::TransactionVersion;
use crate::error::{CodecError, CodecResult};
use tracing::warn;

/// Packed version number standing for [`TransactionVersion::Legacy`].
pub const LEGACY_VERSION: i64 = -1;

/// Render a transaction error as the text stored in the dictionary.
pub fn error_to_text(err: Option<&serde_json::Value>) -> String {
    err.map(|e| e.to_string()).unwrap_or_default()
}

/// Rebuild a transaction error from its dictionary text.
///
/// Text that is not valid JSON is kept verbatim as a JSON string. This is
/// the only shape mismatch tolerated on the read path.
pub fn error_from_text(text: &str) -> Option<serde_json::Value> {
    if text.is_empty() {
        return None;
    }
    match serde_json::from_str(text) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(error = %e, len = text.len(), "transaction error text is not JSON, keeping raw text");
            Some(serde_json::Value::String(text.to_string()))
        }
    }
}

/// Packed form of a transaction version.
pub fn version_to_packed(version: TransactionVersion) -> i64 {
    match version {
        TransactionVersion::Legacy => LEGACY_VERSION,
        TransactionVersion::Versioned(v) => i64::from(v),
    }
}

/// Canonical form of a packed transaction version.
///
/// Stricter than a plain pass-through: negative values other than `-1` and
/// values above `u32::MAX` fail with [`CodecError::InvalidVersion`].
pub fn version_from_packed(version: i64) -> CodecResult<TransactionVersion> {
    if version == LEGACY_VERSION {
        return Ok(TransactionVersion::Legacy);
    }
    u32::try_from(version)
        .map(TransactionVersion::Versioned)
        .map_err(|_| CodecError::InvalidVersion(version))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_object_roundtrip() {
        let err = json!({"InstructionError": [2, {"Custom": 6001}]});
        let text = error_to_text(Some(&err));
        assert_eq!(text, r#"{"InstructionError":[2,{"Custom":6001}]}"#);
        assert_eq!(error_from_text(&text), Some(err));
    }

    #[test]
    fn test_absent_error_is_empty_text() {
        assert_eq!(error_to_text(None), "");
        assert_eq!(error_from_text(""), None);
    }

    #[test]
    fn test_scalar_error_roundtrip() {
        let err = json!("AccountInUse");
        let text = error_to_text(Some(&err));
        assert_eq!(text, r#""AccountInUse""#);
        assert_eq!(error_from_text(&text), Some(err));
    }

    #[test]
    fn test_non_json_text_kept_raw() {
        assert_eq!(
            error_from_text("InsufficientFundsForFee"),
            Some(json!("InsufficientFundsForFee"))
        );
    }

    #[test]
    fn test_versions() {
        assert_eq!(version_to_packed(TransactionVersion::Legacy), -1);
        assert_eq!(version_to_packed(TransactionVersion::Versioned(0)), 0);
        assert_eq!(version_from_packed(-1).unwrap(), TransactionVersion::Legacy);
        assert_eq!(
            version_from_packed(0).unwrap(),
            TransactionVersion::Versioned(0)
        );
        assert!(matches!(
            version_from_packed(-2),
            Err(CodecError::InvalidVersion(-2))
        ));
    }
}
