use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Deserializer};

use super::{Error, FieldSelection, Key};

/// Everything needed to build an [`EncryptionEngine`](super::EncryptionEngine), in the shape it
/// usually arrives from a configuration file or the environment.
///
/// ```rust
/// # use field_box::{EncryptionOptions, Error};
/// # fn main() -> Result<(), Error> {
/// let opts: EncryptionOptions = serde_json::from_str(r#"{
///     "key": "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=",
///     "exclude": ["display_name"]
/// }"#).unwrap();
///
/// assert_eq!(&[0u8; 32], opts.key()?.expose_secret());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct EncryptionOptions {
	/// The 32 byte key, base64 encoded.
	#[serde(default, deserialize_with = "secret_string")]
	pub key: Option<SecretString>,

	#[serde(flatten)]
	pub selection: FieldSelection,
}

impl EncryptionOptions {
	pub fn new(key: impl Into<String>) -> Self {
		Self {
			key: Some(SecretString::from(key.into())),
			selection: FieldSelection::default(),
		}
	}

	pub fn with_fields(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.selection.fields = Some(fields.into_iter().map(Into::into).collect());
		self
	}

	pub fn with_exclude(mut self, exclude: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.selection.exclude = exclude.into_iter().map(Into::into).collect();
		self
	}

	/// Decode the configured key.
	///
	/// # Errors
	///
	/// Returns [`Error::Configuration`] if there is no key, or it isn't 32 bytes of base64.
	pub fn key(&self) -> Result<Key, Error> {
		let encoded = self
			.key
			.as_ref()
			.ok_or_else(|| Error::configuration("options.key is required as a 32 byte base64 string"))?;

		Key::from_base64(encoded.expose_secret())
	}
}

fn secret_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<SecretString>, D::Error> {
	Ok(Option::<String>::deserialize(d)?.map(SecretString::from))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::init;

	const ZERO_KEY: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=";

	#[test]
	fn minimal_config() {
		init();
		let opts: EncryptionOptions =
			serde_json::from_str(&format!(r#"{{"key": "{ZERO_KEY}"}}"#)).unwrap();

		assert_eq!(&[0u8; 32], opts.key().unwrap().expose_secret());
		assert_eq!(FieldSelection::default(), opts.selection);
	}

	#[test]
	fn selection_is_flattened() {
		init();
		let opts: EncryptionOptions = serde_json::from_str(&format!(
			r#"{{"key": "{ZERO_KEY}", "fields": ["ssn", "dob"], "exclude": ["name"]}}"#
		))
		.unwrap();

		assert_eq!(
			Some(vec!["ssn".to_string(), "dob".to_string()]),
			opts.selection.fields
		);
		assert_eq!(vec!["name".to_string()], opts.selection.exclude);
	}

	#[test]
	fn missing_key() {
		init();
		let opts: EncryptionOptions = serde_json::from_str(r#"{"exclude": []}"#).unwrap();

		let Err(e @ Error::Configuration(_)) = opts.key() else {
			panic!("missing key was accepted");
		};
		assert!(e.to_string().contains("options.key is required"));
	}

	#[test]
	fn short_key() {
		init();
		let opts = EncryptionOptions::new("AAAA");

		assert!(matches!(opts.key(), Err(Error::Configuration(_))));
	}

	#[test]
	fn builder() {
		init();
		let opts = EncryptionOptions::new(ZERO_KEY)
			.with_fields(["ssn"])
			.with_exclude(["ignored"]);

		assert_eq!(Some(vec!["ssn".to_string()]), opts.selection.fields);
		assert_eq!(vec!["ignored".to_string()], opts.selection.exclude);
		assert!(opts.key().is_ok());
	}

	#[test]
	fn debug_output_hides_key() {
		init();
		let opts = EncryptionOptions::new(ZERO_KEY);

		assert!(!format!("{opts:?}").contains(ZERO_KEY));
	}
}
