//! Transparent field-level encryption for document records.
//!
//! Some fields of a record are too sensitive to sit around in a database in plaintext.  A
//! [`EncryptionEngine`] takes those fields, serializes them, and encrypts them all together into
//! a single opaque *envelope*, which is stored in the record's reserved `_ct` attribute in place
//! of the fields themselves.  When the record is loaded again, the envelope is decrypted and the
//! fields put back, so the rest of the application never has to deal with ciphertext.
//!
//! Which fields get encrypted is decided once, when the engine is created, from a list of
//! [`FieldDescriptor`]s describing the host's schema and a [`FieldSelection`].  By default,
//! everything is encrypted except the record's identifier and any indexed fields, because the
//! store can't look things up by ciphertext.  You can exclude more fields, or name exactly the
//! fields you want encrypted instead.
//!
//! The host stays in charge of *when* encryption and decryption happen: call
//! [`LifecycleHooks::before_load`] on everything that comes out of storage, and
//! [`LifecycleHooks::before_persist`] on everything that goes in.
//!
//! ```rust
//! use field_box::{
//!     EncryptionEngine, EncryptionOptions, Error, FieldDescriptor, LifecycleHooks, Record,
//!     SaveContext,
//! };
//! use serde_json::json;
//! # fn main() -> Result<(), Error> {
//!
//! let key = field_box::generate_key();
//! # let key_b64 = {
//! #     use base64::Engine as _;
//! #     base64::engine::general_purpose::STANDARD.encode(key.expose_secret())
//! # };
//! let opts = EncryptionOptions::new(key_b64).with_exclude(["display_name"]);
//!
//! let engine = EncryptionEngine::from_options(
//!     &opts,
//!     [
//!         FieldDescriptor::new("_id").identifier(),
//!         FieldDescriptor::new("email").indexed(),
//!         FieldDescriptor::new("display_name"),
//!         FieldDescriptor::new("ssn"),
//!         FieldDescriptor::new("dob"),
//!     ],
//! )?;
//!
//! let mut record: Record = [
//!     ("_id", json!(42)),
//!     ("email", json!("alice@example.com")),
//!     ("display_name", json!("Alice")),
//!     ("ssn", json!("123-45-6789")),
//! ]
//! .into_iter()
//! .collect();
//!
//! engine.before_persist(&mut record, SaveContext::new_record())?;
//! assert!(!record.contains("ssn"));
//! assert!(record.contains("email"));
//!
//! engine.before_load(&mut record)?;
//! assert_eq!(Some(&json!("123-45-6789")), record.get("ssn"));
//! // dob was never set, and still isn't
//! assert!(!record.contains("dob"));
//! # Ok(())
//! # }
//! ```
//!
//! # The envelope
//!
//! An envelope is a random 16 byte IV, followed by the AES-256-CBC (PKCS#7 padded) encryption
//! of a JSON object holding the encrypted fields' values.  A new IV is generated for every
//! encryption, so encrypting the same values twice gives two different envelopes.
//!
//! There is no authentication tag.  A damaged or tampered-with envelope will *usually* fail to
//! decrypt, or fail to parse once decrypted, but that is not guaranteed: it may instead decrypt to
//! different values.
mod engine;
mod envelope;
mod error;
mod hooks;
mod key;
mod key_id;
mod options;
mod payload;
mod record;
mod selection;

#[cfg(test)]
mod test_support;

pub use engine::EncryptionEngine;
pub use envelope::{BLOCK_LEN, Envelope, IV_LEN, OsRandom, RandomSource, open, seal};
pub use error::Error;
pub use hooks::{LifecycleHooks, SaveContext};
pub use key::{KEY_LEN, Key, generate_key};
pub use key_id::KeyId;
pub use options::EncryptionOptions;
pub use payload::{Payload, UNKNOWN_RECORD};
pub use record::Record;
pub use selection::{
	DEFAULT_IDENTIFIER_FIELD, ENVELOPE_FIELD, EncryptedFieldSet, FieldDescriptor, FieldSelection,
	identifier_field, resolve, with_envelope_field,
};

use key_id::key_id;
