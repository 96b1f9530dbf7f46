use secrecy::{ExposeSecret as _, SecretSlice};
use std::sync::Arc;

use super::{
	EncryptedFieldSet, EncryptionOptions, Error, FieldDescriptor, FieldSelection, Key, KeyId,
	OsRandom, RandomSource, Record, envelope, key_id,
	payload::{self, Payload},
	selection,
};

/// Swaps a record's sensitive fields for an envelope, and back again.
///
/// The set of fields to encrypt is worked out once, when the engine is built, from the host's
/// field descriptors and the [`FieldSelection`].  After that, [`encrypt`](Self::encrypt) takes
/// the current values of those fields, seals them into the record's envelope, and removes them
/// from the record; [`decrypt`](Self::decrypt) does the reverse.
///
/// Both operations change the record in place, immediately.  A record that has been through
/// [`encrypt`](Self::encrypt) no longer has its plaintext values, whether or not it ever gets
/// written anywhere.
///
/// # Example
///
/// ```rust
/// use field_box::{EncryptionEngine, Error, FieldDescriptor, FieldSelection, Key, Record};
/// use serde_json::json;
/// # fn main() -> Result<(), Error> {
///
/// let engine = EncryptionEngine::new(
///     Key::from([0u8; 32]),
///     &FieldSelection::default(),
///     [
///         FieldDescriptor::new("id").identifier(),
///         FieldDescriptor::new("name"),
///         FieldDescriptor::new("ssn"),
///     ],
/// );
///
/// let mut record: Record = [
///     ("id", json!("u1")),
///     ("name", json!("Alice")),
///     ("ssn", json!("123-45-6789")),
/// ]
/// .into_iter()
/// .collect();
///
/// engine.encrypt(&mut record)?;
///
/// // Only the identifier is left in the clear
/// assert_eq!(Some(&json!("u1")), record.get("id"));
/// assert_eq!(None, record.get("name"));
/// assert_eq!(None, record.get("ssn"));
/// assert!(record.envelope().is_some());
///
/// engine.decrypt(&mut record)?;
///
/// assert_eq!(Some(&json!("Alice")), record.get("name"));
/// assert_eq!(Some(&json!("123-45-6789")), record.get("ssn"));
/// assert_eq!(None, record.envelope());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct EncryptionEngine {
	key: Key,
	key_id: KeyId,
	descriptors: Vec<FieldDescriptor>,
	identifier: String,
	fields: EncryptedFieldSet,
	random: Arc<dyn RandomSource>,
}

impl EncryptionEngine {
	/// Create a new [`EncryptionEngine`].
	#[tracing::instrument(level = "debug", skip(key, descriptors))]
	pub fn new(
		key: impl Into<Key>,
		selection: &FieldSelection,
		descriptors: impl IntoIterator<Item = FieldDescriptor>,
	) -> Self {
		let key = key.into();
		let key_id = key_id(&key);
		let descriptors = selection::with_envelope_field(descriptors);
		let identifier = selection::identifier_field(&descriptors).to_string();
		let fields = selection::resolve(&descriptors, selection);

		tracing::debug!(%key_id, %identifier, fields = ?fields, "Encryption engine ready");

		Self {
			key,
			key_id,
			descriptors,
			identifier,
			fields,
			random: Arc::new(OsRandom),
		}
	}

	/// Create a new [`EncryptionEngine`] from configuration.
	///
	/// # Errors
	///
	/// Returns [`Error::Configuration`] if the key is missing or invalid.
	#[tracing::instrument(level = "debug", skip(opts, descriptors))]
	pub fn from_options(
		opts: &EncryptionOptions,
		descriptors: impl IntoIterator<Item = FieldDescriptor>,
	) -> Result<Self, Error> {
		Ok(Self::new(opts.key()?, &opts.selection, descriptors))
	}

	/// Get IVs from somewhere other than the operating system.
	pub fn with_random_source(mut self, random: impl RandomSource + 'static) -> Self {
		self.random = Arc::new(random);
		self
	}

	pub fn encrypted_fields(&self) -> &EncryptedFieldSet {
		&self.fields
	}

	pub fn identifier_field(&self) -> &str {
		&self.identifier
	}

	/// The host's field descriptors, including the envelope attribute.
	pub fn descriptors(&self) -> &[FieldDescriptor] {
		&self.descriptors
	}

	pub fn key_id(&self) -> KeyId {
		self.key_id
	}

	/// Seal the record's encrypted fields into its envelope, removing them from the record.
	///
	/// Fields that are absent from the record are left out of the envelope, and so will still be
	/// absent after a [`decrypt`](Self::decrypt).  Any existing envelope is replaced.
	///
	/// # Errors
	///
	/// Returns [`Error::RandomSource`] if no IV could be generated, or [`Error::Encoding`] if the
	/// values couldn't be serialized.  Either way, the record is untouched.
	#[tracing::instrument(level = "debug", skip(self, record), fields(key_id = %self.key_id))]
	pub fn encrypt(&self, record: &mut Record) -> Result<(), Error> {
		let values: Payload = self
			.fields
			.iter()
			.filter_map(|name| record.get(name).map(|v| (name.to_string(), v.clone())))
			.collect();

		let plaintext: SecretSlice<u8> = payload::encode(&values)?.into();
		let sealed = envelope::seal(&self.key, plaintext.expose_secret(), self.random.as_ref())?;

		tracing::debug!(
			encrypted = values.len(),
			absent = self.fields.len() - values.len(),
			envelope_len = sealed.len(),
			"Sealed record"
		);

		for name in &self.fields {
			record.remove(name);
		}
		record.set_envelope(sealed);

		Ok(())
	}

	/// Restore the record's encrypted fields from its envelope, and clear the envelope.
	///
	/// A record without an envelope is left alone.
	///
	/// # Errors
	///
	/// Returns [`Error::Decryption`] if the envelope couldn't be decrypted, or
	/// [`Error::Serialization`] if what came out wasn't a valid payload.  A record that failed to
	/// decrypt shouldn't be used.
	#[tracing::instrument(level = "debug", skip(self, record), fields(key_id = %self.key_id))]
	pub fn decrypt(&self, record: &mut Record) -> Result<(), Error> {
		let Some(sealed) = record.envelope() else {
			tracing::debug!("No envelope, nothing to decrypt");
			return Ok(());
		};

		let plaintext: SecretSlice<u8> = envelope::open(&self.key, sealed)?.into();
		let record_id = record.describe(&self.identifier);
		let values = payload::decode(plaintext.expose_secret(), record_id.as_deref())?;

		tracing::debug!(decrypted = values.len(), "Opened record");

		for (name, value) in values {
			record.set(name, value);
		}
		record.clear_envelope();

		Ok(())
	}
}
