mod cbor;
mod json;

use crate::error::{ErrorClass, ErrorOrigin, InternalError};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error as ThisError;

/// Format-level serialization helpers.
///
/// - Records travel as JSON so the ledger can evaluate selectors over
///   named fields.
/// - Core-owned protocol payloads (continuation tokens) travel as CBOR.
/// - Size limits are caller policy; decode paths take explicit limits.

///
/// SerializeError
///

#[derive(Debug, ThisError)]
pub enum SerializeError {
    #[error("serialize error: {0}")]
    Serialize(String),

    #[error("deserialize error: {0}")]
    Deserialize(String),

    #[error("deserialize size limit exceeded: {len} bytes (limit {max_bytes})")]
    DeserializeSizeLimitExceeded { len: usize, max_bytes: usize },
}

impl From<SerializeError> for InternalError {
    fn from(err: SerializeError) -> Self {
        Self::new(ErrorClass::MalformedRecord, ErrorOrigin::Codec, err.to_string())
    }
}

/// Serialize a record-shaped value as JSON bytes.
pub fn to_json<T>(value: &T) -> Result<Vec<u8>, SerializeError>
where
    T: Serialize + ?Sized,
{
    json::serialize(value)
}

/// Deserialize JSON bytes produced by [`to_json`], with an explicit size limit.
pub fn from_json_bounded<T>(bytes: &[u8], max_bytes: usize) -> Result<T, SerializeError>
where
    T: DeserializeOwned,
{
    json::deserialize_bounded(bytes, max_bytes)
}

/// Serialize a protocol payload as CBOR bytes.
pub fn to_cbor<T>(value: &T) -> Result<Vec<u8>, SerializeError>
where
    T: Serialize,
{
    cbor::serialize(value)
}

/// Deserialize CBOR bytes produced by [`to_cbor`], with an explicit size limit.
pub fn from_cbor_bounded<T>(bytes: &[u8], max_bytes: usize) -> Result<T, SerializeError>
where
    T: DeserializeOwned,
{
    cbor::deserialize_bounded(bytes, max_bytes)
}
