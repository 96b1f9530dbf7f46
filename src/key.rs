use base64::{Engine as _, engine::general_purpose::STANDARD};
use secrecy::{ExposeSecret as _, SecretSlice};

use super::Error;

/// Length, in bytes, of an AES-256 key.
pub const KEY_LEN: usize = 32;

/// The key an [`EncryptionEngine`](super::EncryptionEngine) encrypts and decrypts envelopes with.
///
/// The key material is zeroed when the [`Key`] is dropped, and never appears in `Debug` output.
#[derive(Debug)]
pub struct Key(secrecy::SecretBox<[u8; KEY_LEN]>);

impl Key {
	pub fn expose_secret(&self) -> &[u8; KEY_LEN] {
		self.0.expose_secret()
	}

	/// Decode a key from its base64 representation, which is how keys are usually handed to us
	/// by whatever keeps them.
	///
	/// # Errors
	///
	/// Returns [`Error::Configuration`] if `encoded` isn't valid base64, or doesn't decode to
	/// exactly [`KEY_LEN`] bytes.
	pub fn from_base64(encoded: impl AsRef<str>) -> Result<Self, Error> {
		let raw: SecretSlice<u8> = STANDARD
			.decode(encoded.as_ref().trim())
			.map_err(|e| Error::configuration(format!("key is not valid base64: {e}")))?
			.into();

		Self::try_from(raw.expose_secret())
	}
}

impl Clone for Key {
	fn clone(&self) -> Self {
		Self(Box::new(*self.expose_secret()).into())
	}
}

impl From<Box<[u8; KEY_LEN]>> for Key {
	fn from(k: Box<[u8; KEY_LEN]>) -> Self {
		Key(k.into())
	}
}

impl From<[u8; KEY_LEN]> for Key {
	fn from(k: [u8; KEY_LEN]) -> Self {
		Box::new(k).into()
	}
}

impl TryFrom<&[u8]> for Key {
	type Error = Error;

	fn try_from(k: &[u8]) -> Result<Self, Error> {
		if k.len() != KEY_LEN {
			return Err(Error::configuration(format!(
				"key must be exactly {KEY_LEN} bytes, got {}",
				k.len()
			)));
		}

		let mut buf = Box::new([0u8; KEY_LEN]);
		buf.copy_from_slice(k);

		Ok(buf.into())
	}
}

/// Create a key suitable for use in an [`EncryptionEngine`](super::EncryptionEngine).
///
/// Real deployments will have their key provisioned from somewhere else entirely, but for tests,
/// or for generating a key to provision in the first place, this is handy.
#[tracing::instrument(level = "debug")]
pub fn generate_key() -> Key {
	use rand::{RngCore, rng};

	let mut k = Box::new([0u8; KEY_LEN]);

	rng().fill_bytes(&mut k[..]);

	k.into()
}
