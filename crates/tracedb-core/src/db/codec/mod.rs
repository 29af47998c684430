mod key;

#[cfg(test)]
mod tests;

pub use key::{
    COMPOSITE_KEY_DELIMITER, CompositeKey, CompositeKeyError, MAX_UNICODE_RUNE, check_component,
    is_composite,
};

use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    serialize::{from_json_bounded, to_json},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::fmt::Debug;
use thiserror::Error as ThisError;

/// JSON field carrying the kind discriminator of every primary entry.
pub const KIND_FIELD: &str = "docType";

/// Max encoded bytes for one primary entry.
pub const MAX_RECORD_BYTES: usize = 1024 * 1024;

///
/// IndexDescriptor
///
/// Composite secondary index of one record kind.
///
/// `attributes` names the indexed fields in key order. The final attribute
/// is always the primary key, which is how an index entry dereferences to
/// its primary entry.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IndexDescriptor {
    pub namespace: &'static str,
    pub attributes: &'static [&'static str],
}

impl IndexDescriptor {
    #[must_use]
    pub const fn new(namespace: &'static str, attributes: &'static [&'static str]) -> Self {
        Self {
            namespace,
            attributes,
        }
    }

    #[must_use]
    pub const fn arity(&self) -> usize {
        self.attributes.len()
    }
}

///
/// Record
///
/// A domain entity stored as one primary entry plus one index entry.
///
/// Each kind declares its discriminator, index and key derivation here, so
/// every store operation derives keys the same way.
///

pub trait Record: Clone + Debug + Serialize + DeserializeOwned {
    /// Kind discriminator written under [`KIND_FIELD`].
    const KIND: &'static str;

    const INDEX: IndexDescriptor;

    fn primary_key(&self) -> &str;

    /// Current values of `INDEX.attributes`, in order.
    fn index_values(&self) -> Vec<&str>;

    /// Schema check for non-nullable fields.
    fn validate(&self) -> Result<(), RecordError> {
        Ok(())
    }

    /// Minimal stand-in carrying only the primary key.
    fn tombstone(primary_key: &str) -> Self;
}

///
/// Transferable
///
/// Record kinds with an ownership field that can change hands.
///

pub trait Transferable: Record {
    fn owner(&self) -> &str;

    fn transfer_to(&mut self, new_owner: &str, transfer_date: &str);
}

///
/// RecordError
///

#[derive(Debug, ThisError)]
pub enum RecordError {
    #[error("{kind} field '{field}' must not be empty")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },

    #[error("{kind} field '{field}' is invalid: {reason}")]
    InvalidField {
        kind: &'static str,
        field: &'static str,
        reason: String,
    },

    #[error("expected record kind '{expected}', found '{found}'")]
    KindMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("{kind} must encode as a JSON object")]
    NotAnObject { kind: &'static str },

    #[error("{kind} index '{namespace}' expects {expected} values, record produced {found}")]
    IndexArity {
        kind: &'static str,
        namespace: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{kind} index '{namespace}' must end with the primary key")]
    IndexPrimaryKey {
        kind: &'static str,
        namespace: &'static str,
    },

    #[error(transparent)]
    CompositeKey(#[from] CompositeKeyError),
}

impl From<RecordError> for InternalError {
    fn from(err: RecordError) -> Self {
        Self::new(ErrorClass::MalformedRecord, ErrorOrigin::Codec, err.to_string())
    }
}

/// Encode a record, stamping its kind discriminator.
pub fn encode<R: Record>(record: &R) -> Result<Vec<u8>, InternalError> {
    record.validate()?;
    primary_key(record)?;

    let value = serde_json::to_value(record).map_err(|err| {
        InternalError::codec_malformed(format!("{} encode failed: {err}", R::KIND))
    })?;
    let Value::Object(mut fields) = value else {
        return Err(RecordError::NotAnObject { kind: R::KIND }.into());
    };
    fields.insert(KIND_FIELD.to_string(), Value::String(R::KIND.to_string()));

    Ok(to_json(&fields)?)
}

/// Decode a primary entry of kind `R`.
pub fn decode<R: Record>(bytes: &[u8]) -> Result<R, InternalError> {
    let mut fields: Map<String, Value> = from_json_bounded(bytes, MAX_RECORD_BYTES)?;

    match fields.remove(KIND_FIELD) {
        Some(Value::String(kind)) if kind == R::KIND => {}
        Some(other) => {
            return Err(RecordError::KindMismatch {
                expected: R::KIND,
                found: kind_label(&other),
            }
            .into());
        }
        None => {
            return Err(RecordError::KindMismatch {
                expected: R::KIND,
                found: String::new(),
            }
            .into());
        }
    }

    serde_json::from_value(Value::Object(fields))
        .map_err(|err| InternalError::codec_malformed(format!("{} decode failed: {err}", R::KIND)))
}

/// Read the discriminator of an encoded entry without decoding the record.
///
/// Returns `None` for values that are not JSON objects (index markers).
#[must_use]
pub fn peek_kind(bytes: &[u8]) -> Option<String> {
    #[derive(serde::Deserialize)]
    struct KindProbe {
        #[serde(rename = "docType")]
        kind: Option<String>,
    }

    serde_json::from_slice::<KindProbe>(bytes)
        .ok()
        .and_then(|probe| probe.kind)
}

/// Primary key of a record, checked for use as a ledger key.
pub fn primary_key<R: Record>(record: &R) -> Result<&str, InternalError> {
    let key = record.primary_key();
    if key.is_empty() {
        return Err(RecordError::MissingField {
            kind: R::KIND,
            field: "primary key",
        }
        .into());
    }
    if is_composite(key) {
        return Err(RecordError::from(CompositeKeyError::ReservedCharacter {
            component: key.escape_debug().to_string(),
        })
        .into());
    }
    check_component(key).map_err(RecordError::from)?;

    Ok(key)
}

#[must_use]
pub const fn index_descriptor<R: Record>() -> IndexDescriptor {
    R::INDEX
}

/// Ordered index attribute values of a record, checked against its descriptor.
pub fn index_attribute_values<R: Record>(record: &R) -> Result<Vec<&str>, InternalError> {
    let values = record.index_values();
    let descriptor = R::INDEX;

    if values.len() != descriptor.arity() {
        return Err(RecordError::IndexArity {
            kind: R::KIND,
            namespace: descriptor.namespace,
            expected: descriptor.arity(),
            found: values.len(),
        }
        .into());
    }
    if values.last().copied() != Some(record.primary_key()) {
        return Err(RecordError::IndexPrimaryKey {
            kind: R::KIND,
            namespace: descriptor.namespace,
        }
        .into());
    }

    Ok(values)
}

/// Index entry key derived from a record's current attribute values.
pub fn index_key<R: Record>(record: &R) -> Result<CompositeKey, InternalError> {
    let values = index_attribute_values(record)?;

    CompositeKey::new(R::INDEX.namespace, &values)
        .map_err(|err| InternalError::from(RecordError::from(err)))
}

/// Helper for `Record::validate` implementations.
pub fn require_field(
    kind: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), RecordError> {
    if value.trim().is_empty() {
        return Err(RecordError::MissingField { kind, field });
    }

    Ok(())
}

fn kind_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
