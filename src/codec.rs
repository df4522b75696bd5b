//! MessagePack encoding of session attributes.
//!
//! The attribute mapping is stored as an opaque blob. Decoding is the only
//! place where a stored session can turn out to be unusable, so failures are
//! reported as their own error type and classified by the store.

use std::collections::HashMap;

use serde_json::Value;

/// Session attributes, keyed by name.
pub type Attributes = HashMap<String, Value>;

/// Failure to convert attributes to or from their stored form.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("failed to encode session attributes: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("failed to decode session attributes: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

/// Encodes the attribute mapping into a blob.
pub fn encode(attributes: &Attributes) -> Result<Vec<u8>, CodecError> {
    Ok(rmp_serde::to_vec(attributes)?)
}

/// Decodes a blob produced by [`encode`].
///
/// An empty blob decodes to an empty mapping; some drivers hand back a
/// zero-length value for a row written without attributes.
pub fn decode(bytes: &[u8]) -> Result<Attributes, CodecError> {
    if bytes.is_empty() {
        return Ok(Attributes::new());
    }
    Ok(rmp_serde::from_slice(bytes)?)
}
