use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    serialize::{from_cbor_bounded, to_cbor},
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error as ThisError;

const MAX_CONTINUATION_TOKEN_BYTES: usize = 8 * 1024;

///
/// TokenVersion
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum TokenVersion {
    V1,
}

impl TokenVersion {
    const V1_TAG: u8 = 1;

    const fn decode(raw: u8) -> Option<Self> {
        match raw {
            Self::V1_TAG => Some(Self::V1),
            _ => None,
        }
    }

    const fn encode(self) -> u8 {
        match self {
            Self::V1 => Self::V1_TAG,
        }
    }
}

///
/// PageSignature
///
/// Hash of the query shape a continuation token was issued for.
/// A token only resumes the query that produced it.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) struct PageSignature([u8; 32]);

impl PageSignature {
    pub(super) fn compute(kind: &str, shape: u8, components: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"pagesig:v1");
        write_str(&mut hasher, kind);
        hasher.update([shape]);
        for component in components {
            write_str(&mut hasher, component);
        }

        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);

        Self(out)
    }

    fn as_hex(&self) -> String {
        hex::encode(self.0)
    }
}

fn write_str(hasher: &mut Sha256, value: &str) {
    let len = u32::try_from(value.len()).unwrap_or(u32::MAX);
    hasher.update(len.to_be_bytes());
    hasher.update(value.as_bytes());
}

///
/// ContinuationToken
/// Core-issued bookmark naming the last key emitted on a page.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) struct ContinuationToken {
    signature: PageSignature,
    last_key: String,
}

impl ContinuationToken {
    pub(super) const fn new(signature: PageSignature, last_key: String) -> Self {
        Self {
            signature,
            last_key,
        }
    }

    pub(super) fn last_key(&self) -> &str {
        &self.last_key
    }

    /// Encode as lowercase hex.
    pub(super) fn encode(&self) -> Result<String, TokenWireError> {
        let wire = ContinuationTokenWire {
            version: TokenVersion::V1.encode(),
            signature: self.signature.0,
            last_key: self.last_key.clone(),
        };
        let bytes = to_cbor(&wire).map_err(|err| TokenWireError::Encode(err.to_string()))?;

        Ok(hex::encode(bytes))
    }

    /// Decode a token and check it belongs to `expected`.
    pub(super) fn decode(token: &str, expected: PageSignature) -> Result<Self, TokenWireError> {
        let bytes = hex::decode(token).map_err(|err| TokenWireError::Decode(err.to_string()))?;
        let wire: ContinuationTokenWire =
            from_cbor_bounded(&bytes, MAX_CONTINUATION_TOKEN_BYTES)
                .map_err(|err| TokenWireError::Decode(err.to_string()))?;

        if TokenVersion::decode(wire.version).is_none() {
            return Err(TokenWireError::UnsupportedVersion {
                version: wire.version,
            });
        }

        let signature = PageSignature(wire.signature);
        if signature != expected {
            return Err(TokenWireError::SignatureMismatch {
                expected: expected.as_hex(),
                actual: signature.as_hex(),
            });
        }

        Ok(Self::new(signature, wire.last_key))
    }

    #[cfg(test)]
    pub(super) fn encode_with_version_for_test(&self, version: u8) -> String {
        let wire = ContinuationTokenWire {
            version,
            signature: self.signature.0,
            last_key: self.last_key.clone(),
        };

        hex::encode(to_cbor(&wire).unwrap())
    }
}

///
/// ContinuationTokenWire
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
struct ContinuationTokenWire {
    version: u8,
    signature: [u8; 32],
    last_key: String,
}

///
/// TokenWireError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum TokenWireError {
    #[error("failed to encode continuation token: {0}")]
    Encode(String),

    #[error("failed to decode continuation token: {0}")]
    Decode(String),

    #[error("unsupported continuation token version: {version}")]
    UnsupportedVersion { version: u8 },

    #[error("continuation token does not match this query: expected={expected}, actual={actual}")]
    SignatureMismatch { expected: String, actual: String },
}

impl From<TokenWireError> for InternalError {
    fn from(err: TokenWireError) -> Self {
        Self::new(ErrorClass::MalformedQuery, ErrorOrigin::Cursor, err.to_string())
    }
}
