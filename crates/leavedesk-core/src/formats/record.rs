//! Versioned postcard records.
//!
//! Layout: `[version: u8][postcard body]`. The version byte lets a later
//! build migrate old rows instead of misreading them.

use crate::error::{LeaveError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Current record format version.
pub const RECORD_VERSION: u8 = 1;

/// Encode a record for storage.
pub fn encode_record<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut out = vec![RECORD_VERSION];
    out.extend(postcard::to_stdvec(value)?);
    Ok(out)
}

/// Decode a record read from storage.
pub fn decode_record<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    match bytes.split_first() {
        Some((&RECORD_VERSION, body)) => Ok(postcard::from_bytes(body)?),
        Some((&other, _)) => Err(LeaveError::RecordVersion(other)),
        None => Err(LeaveError::RecordVersion(0)),
    }
}
