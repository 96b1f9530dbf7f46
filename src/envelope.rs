use cbc::cipher::{BlockDecryptMut as _, BlockEncryptMut as _, KeyIvInit as _, block_padding::Pkcs7};
use rand::{TryRngCore as _, rngs::OsRng};
use std::fmt::Debug;

use super::{Error, Key};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Length of the initialization vector at the front of every envelope.
pub const IV_LEN: usize = 16;

/// AES block size; ciphertexts are always a (non-zero) multiple of this.
pub const BLOCK_LEN: usize = 16;

/// Somewhere to get IVs from.
///
/// Every call must produce fresh, unpredictable bytes, independently of every other call (including
/// concurrent ones).  [`OsRandom`] is what you want, unless you're testing.
pub trait RandomSource: Debug + Send + Sync {
	/// Fill `dest` entirely with random bytes.
	///
	/// # Errors
	///
	/// Should return [`Error::RandomSource`] if the randomness isn't available.
	fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), Error>;
}

/// Randomness straight from the operating system.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
	fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), Error> {
		OsRng
			.try_fill_bytes(dest)
			.map_err(|e| Error::random_source(e.to_string()))
	}
}

/// An encrypted payload, as stored in a record's envelope attribute.
///
/// On the wire, it's just the IV followed by the AES-256-CBC ciphertext, with no framing.  There
/// is no authentication tag, so corruption (or deliberate tampering) is only noticed if it breaks
/// the padding or the payload that comes out the other end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
	iv: [u8; IV_LEN],
	ciphertext: Vec<u8>,
}

impl Envelope {
	pub fn iv(&self) -> &[u8; IV_LEN] {
		&self.iv
	}

	pub fn ciphertext(&self) -> &[u8] {
		&self.ciphertext
	}

	pub fn to_bytes(&self) -> Vec<u8> {
		let mut v = Vec::with_capacity(IV_LEN + self.ciphertext.len());

		v.extend_from_slice(&self.iv);
		v.extend_from_slice(&self.ciphertext);

		v
	}

	/// Encrypt `plaintext` under `key`, with a brand new IV from `random`.
	#[tracing::instrument(level = "trace", skip(key, plaintext))]
	pub fn seal(key: &Key, plaintext: &[u8], random: &dyn RandomSource) -> Result<Self, Error> {
		let mut iv = [0u8; IV_LEN];
		random.fill_bytes(&mut iv)?;

		let ciphertext = Aes256CbcEnc::new(key.expose_secret().into(), (&iv).into())
			.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

		Ok(Self { iv, ciphertext })
	}

	/// Decrypt the envelope with `key`.
	#[tracing::instrument(level = "trace", skip(self, key))]
	pub fn open(&self, key: &Key) -> Result<Vec<u8>, Error> {
		Aes256CbcDec::new(key.expose_secret().into(), (&self.iv).into())
			.decrypt_padded_vec_mut::<Pkcs7>(&self.ciphertext)
			.map_err(|_| Error::decryption("invalid padding"))
	}
}

impl TryFrom<&[u8]> for Envelope {
	type Error = Error;

	fn try_from(b: &[u8]) -> Result<Self, Self::Error> {
		if b.len() < IV_LEN {
			return Err(Error::decryption(format!(
				"envelope is {} bytes, too short for an IV",
				b.len()
			)));
		}

		let (iv, ciphertext) = b.split_at(IV_LEN);

		if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
			return Err(Error::decryption(format!(
				"ciphertext length {} is not a positive multiple of {BLOCK_LEN}",
				ciphertext.len()
			)));
		}

		let mut iv_buf = [0u8; IV_LEN];
		iv_buf.copy_from_slice(iv);

		Ok(Self {
			iv: iv_buf,
			ciphertext: ciphertext.to_vec(),
		})
	}
}

/// Encrypt `plaintext` into the bytes of an envelope.
///
/// # Errors
///
/// Returns [`Error::RandomSource`] if an IV couldn't be generated.
pub fn seal(key: &Key, plaintext: &[u8], random: &dyn RandomSource) -> Result<Vec<u8>, Error> {
	Ok(Envelope::seal(key, plaintext, random)?.to_bytes())
}

/// Recover the plaintext from the bytes of an envelope.
///
/// # Errors
///
/// Returns [`Error::Decryption`] if the envelope is too short, its ciphertext isn't a whole
/// number of blocks, or the padding doesn't check out after decryption (which is what usually
/// happens when the wrong key is used).
pub fn open(key: &Key, envelope: &[u8]) -> Result<Vec<u8>, Error> {
	Envelope::try_from(envelope)?.open(key)
}
