use anyhow::Result;
use md5::{Digest, Md5};
use serde::Serialize;

/// Hashes a JSON-serializable value: compact JSON encoding, MD5, lowercase
/// hex. Stable for a given value, so it can be used as a content key.
pub fn hash_json<T: Serialize>(value: &T) -> Result<String> {
    let encoded = serde_json::to_vec(value)?;
    let digest = Md5::digest(&encoded);
    Ok(hex::encode(digest))
}
