use super::{EncryptionEngine, Error, Record};

/// What the host knows about a record it is about to write.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SaveContext {
	/// The record has never been written before.
	pub is_new: bool,
	/// The record was loaded along with its envelope, so its (decrypted) plaintext fields are
	/// the real values.  A record loaded with a projection that left the envelope out has
	/// nothing trustworthy to encrypt.
	pub envelope_selected: bool,
}

impl SaveContext {
	pub fn new_record() -> Self {
		Self {
			is_new: true,
			envelope_selected: false,
		}
	}

	pub fn loaded(envelope_selected: bool) -> Self {
		Self {
			is_new: false,
			envelope_selected,
		}
	}

	pub fn should_encrypt(&self) -> bool {
		self.is_new || self.envelope_selected
	}
}

/// The points in a record's life where the host must hand it over for encryption or decryption.
///
/// The host decides *when* these run (typically from its own load and save machinery); the
/// implementation decides what happens.  Errors must abort the load or save: a record that
/// failed either hook is not fit to use or to store.
pub trait LifecycleHooks {
	/// Called with the raw record, straight from storage, before anything else sees it.
	///
	/// # Errors
	///
	/// Whatever decryption fails with.
	fn before_load(&self, record: &mut Record) -> Result<(), Error>;

	/// Called just before the record is written.  Returns whether the record was encrypted.
	///
	/// # Errors
	///
	/// Whatever encryption fails with.
	fn before_persist(&self, record: &mut Record, ctx: SaveContext) -> Result<bool, Error>;
}

impl LifecycleHooks for EncryptionEngine {
	#[tracing::instrument(level = "debug", skip(self, record))]
	fn before_load(&self, record: &mut Record) -> Result<(), Error> {
		self.decrypt(record)
	}

	#[tracing::instrument(level = "debug", skip(self, record))]
	fn before_persist(&self, record: &mut Record, ctx: SaveContext) -> Result<bool, Error> {
		if ctx.should_encrypt() {
			self.encrypt(record)?;
			Ok(true)
		} else {
			tracing::debug!("Plaintext fields are not authoritative, leaving envelope as-is");
			Ok(false)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{FieldDescriptor, FieldSelection, Key, test_support::init};
	use serde_json::json;

	fn engine() -> EncryptionEngine {
		EncryptionEngine::new(
			Key::from([0u8; 32]),
			&FieldSelection::default(),
			[
				FieldDescriptor::new("_id").identifier(),
				FieldDescriptor::new("email").indexed(),
				FieldDescriptor::new("ssn"),
			],
		)
	}

	fn record() -> Record {
		[
			("_id", json!("u1")),
			("email", json!("u1@example.com")),
			("ssn", json!("123-45-6789")),
		]
		.into_iter()
		.collect()
	}

	#[test]
	fn save_decision() {
		init();
		assert!(SaveContext::new_record().should_encrypt());
		assert!(SaveContext::loaded(true).should_encrypt());
		assert!(!SaveContext::loaded(false).should_encrypt());
		assert!(!SaveContext::default().should_encrypt());
	}

	#[test]
	fn save_then_load() {
		init();
		let hooks = engine();
		let mut record = record();

		assert!(hooks.before_persist(&mut record, SaveContext::new_record()).unwrap());
		assert!(record.is_sealed());
		assert!(!record.contains("ssn"));
		assert_eq!(Some(&json!("u1@example.com")), record.get("email"));

		hooks.before_load(&mut record).unwrap();
		assert_eq!(self::record(), record);
	}

	#[test]
	fn unselected_envelope_is_not_overwritten() {
		init();
		let hooks = engine();

		// Loaded without its envelope, only the email came along
		let mut partial: Record = [("_id", json!("u1")), ("email", json!("new@example.com"))]
			.into_iter()
			.collect();
		hooks.before_load(&mut partial).unwrap();

		assert!(!hooks.before_persist(&mut partial, SaveContext::loaded(false)).unwrap());
		assert_eq!(None, partial.envelope());
		assert_eq!(Some(&json!("new@example.com")), partial.get("email"));
	}

	#[test]
	fn load_failures_propagate() {
		init();
		let hooks = engine();
		let mut record = record();
		record.set_envelope(vec![0u8; 3]);

		assert!(matches!(
			hooks.before_load(&mut record),
			Err(Error::Decryption(_))
		));
	}

	#[test]
	fn usable_as_a_trait_object() {
		init();
		let hooks: Box<dyn LifecycleHooks> = Box::new(engine());
		let mut record = record();

		hooks
			.before_persist(&mut record, SaveContext::loaded(true))
			.unwrap();
		hooks.before_load(&mut record).unwrap();

		assert_eq!(self::record(), record);
	}
}
