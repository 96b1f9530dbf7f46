//! The plaintext that goes inside an envelope: the encrypted fields' values, as a JSON object.
//!
//! JSON can't carry raw binary, nor numbers beyond what [`serde_json::Number`] holds, so values
//! that don't fit come back out however JSON mangled them.  Everything a [`Value`] can hold
//! survives intact.

use serde_json::Value;
use std::collections::BTreeMap;

use super::Error;

/// Field name to value, for the fields being carried in one envelope.
pub type Payload = BTreeMap<String, Value>;

/// Identifier reported in errors for records that don't have one (yet).
pub const UNKNOWN_RECORD: &str = "unknown";

/// Serialize the fields to be encrypted.
///
/// Absent fields should simply not be in `payload`; they are never written as `null`.
#[tracing::instrument(level = "trace", skip(payload))]
pub fn encode(payload: &Payload) -> Result<Vec<u8>, Error> {
	serde_json::to_vec(payload).map_err(|e| Error::encoding(e))
}

/// Parse a decrypted payload.
///
/// # Errors
///
/// Returns [`Error::Serialization`], tagged with `record_id` (or [`UNKNOWN_RECORD`]), if the
/// bytes aren't a JSON object.
#[tracing::instrument(level = "trace", skip(bytes))]
pub fn decode(bytes: &[u8], record_id: Option<&str>) -> Result<Payload, Error> {
	serde_json::from_slice(bytes).map_err(|e| {
		let record_id = record_id.unwrap_or(UNKNOWN_RECORD);
		tracing::debug!(%record_id, error = %e, "Payload did not parse");
		Error::serialization(record_id, e)
	})
}
