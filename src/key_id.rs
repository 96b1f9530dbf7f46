use hkdf::Hkdf;
use sha2::Sha256;

use super::Key;

type Kid = [u8; 16];

/// A short, non-secret fingerprint of a [`Key`].
///
/// It exists so that logs can say *which* key an engine is using, without ever saying what the
/// key is.  It is never written into an envelope.
#[allow(clippy::derived_hash_with_manual_eq)] // k1 == k2 => hash(k1) == hash(k2) will hold
#[derive(Clone, Copy, Debug, Hash)]
#[repr(transparent)]
pub struct KeyId(Kid);

impl KeyId {
	pub fn as_bytes(&self) -> &Kid {
		&self.0
	}
}

impl PartialEq for KeyId {
	fn eq(&self, other: &Self) -> bool {
		constant_time_eq::constant_time_eq_n(&self.0, &other.0)
	}
}

impl Eq for KeyId {}

impl std::fmt::Display for KeyId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		for b in &self.0 {
			f.write_fmt(format_args!("{b:02x}"))?;
		}

		Ok(())
	}
}

/// Get a reasonably-unique ID for a key
#[tracing::instrument(level = "trace", skip(key))]
pub(super) fn key_id(key: &Key) -> KeyId {
	let mut kid: Kid = Default::default();

	// A 32 byte PRK is always long enough, and 16 bytes is nowhere near the expansion limit
	if let Ok(hk) = Hkdf::<Sha256>::from_prk(key.expose_secret()) {
		let _ = hk.expand(b"key_id", &mut kid);
	}

	KeyId(kid)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{generate_key, test_support::init};

	#[test]
	fn same_key_same_id() {
		init();
		let key = generate_key();

		assert_eq!(key_id(&key), key_id(&key.clone()));
	}

	#[test]
	fn different_keys_different_ids() {
		init();
		assert_ne!(key_id(&generate_key()), key_id(&generate_key()));
	}

	#[test]
	fn id_is_not_the_key() {
		init();
		let key = Key::from([0x42; 32]);

		assert_ne!(&key.expose_secret()[..16], key_id(&key).as_bytes());
	}

	#[test]
	fn displays_as_hex() {
		init();
		let shown = key_id(&Key::from([0u8; 32])).to_string();

		assert_eq!(32, shown.len());
		assert!(shown.chars().all(|c| c.is_ascii_hexdigit()));
	}
}
