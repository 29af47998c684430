use crate::serialize::SerializeError;
use serde::{Serialize, de::DeserializeOwned};

pub(super) fn serialize<T>(t: &T) -> Result<Vec<u8>, SerializeError>
where
    T: Serialize + ?Sized,
{
    serde_json::to_vec(t).map_err(|e| SerializeError::Serialize(e.to_string()))
}

pub(super) fn deserialize_bounded<T>(bytes: &[u8], max_bytes: usize) -> Result<T, SerializeError>
where
    T: DeserializeOwned,
{
    if bytes.len() > max_bytes {
        return Err(SerializeError::DeserializeSizeLimitExceeded {
            len: bytes.len(),
            max_bytes,
        });
    }

    serde_json::from_slice(bytes).map_err(|e| SerializeError::Deserialize(e.to_string()))
}
