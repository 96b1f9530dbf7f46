use serde::Deserialize;
use std::collections::BTreeSet;

/// Name of the reserved attribute that holds a record's envelope.
pub const ENVELOPE_FIELD: &str = "_ct";

/// Identifier field name assumed when no descriptor is flagged as the identifier.
pub const DEFAULT_IDENTIFIER_FIELD: &str = "_id";

/// What the host's schema knows about one field of its records.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct FieldDescriptor {
	pub name: String,
	/// The store can look this field up (or enforce uniqueness on it), so it can't be ciphertext.
	#[serde(default)]
	pub indexed: bool,
	#[serde(default)]
	pub identifier: bool,
}

impl FieldDescriptor {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Self::default()
		}
	}

	pub fn indexed(mut self) -> Self {
		self.indexed = true;
		self
	}

	pub fn identifier(mut self) -> Self {
		self.identifier = true;
		self
	}
}

/// Which fields the host wants encrypted.
///
/// With an explicit `fields` list, exactly those fields are encrypted (minus the envelope
/// attribute), even the identifier or indexed fields, if you ask for them.  Without one, every
/// field the descriptors name is encrypted, except the identifier, indexed fields, and anything
/// listed in `exclude`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct FieldSelection {
	#[serde(default)]
	pub fields: Option<Vec<String>>,
	#[serde(default)]
	pub exclude: Vec<String>,
}

impl FieldSelection {
	pub fn explicit(fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
		Self {
			fields: Some(fields.into_iter().map(Into::into).collect()),
			exclude: Vec::new(),
		}
	}

	pub fn excluding(exclude: impl IntoIterator<Item = impl Into<String>>) -> Self {
		Self {
			fields: None,
			exclude: exclude.into_iter().map(Into::into).collect(),
		}
	}
}

/// The resolved set of fields an engine encrypts.  Iterates in name order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncryptedFieldSet(BTreeSet<String>);

impl EncryptedFieldSet {
	pub fn contains(&self, name: &str) -> bool {
		self.0.contains(name)
	}

	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl<'a> IntoIterator for &'a EncryptedFieldSet {
	type Item = &'a String;
	type IntoIter = std::collections::btree_set::Iter<'a, String>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

/// The name of the field that identifies records described by `descriptors`.
pub fn identifier_field(descriptors: &[FieldDescriptor]) -> &str {
	descriptors
		.iter()
		.find(|d| d.identifier)
		.map_or(DEFAULT_IDENTIFIER_FIELD, |d| d.name.as_str())
}

/// Work out which fields get encrypted.
#[tracing::instrument(level = "trace")]
pub fn resolve(descriptors: &[FieldDescriptor], selection: &FieldSelection) -> EncryptedFieldSet {
	if let Some(fields) = &selection.fields {
		return EncryptedFieldSet(
			fields
				.iter()
				.filter(|f| f.as_str() != ENVELOPE_FIELD)
				.cloned()
				.collect(),
		);
	}

	let identifier = identifier_field(descriptors);
	let excluded = |name: &str| {
		name == identifier
			|| name == ENVELOPE_FIELD
			|| selection.exclude.iter().any(|e| e == name)
	};

	EncryptedFieldSet(
		descriptors
			.iter()
			.filter(|d| !d.indexed && !d.identifier && !excluded(&d.name))
			.map(|d| d.name.clone())
			.collect(),
	)
}

/// The host's descriptors, with the envelope attribute added if it isn't there already.
///
/// Every record needs somewhere to keep its envelope, whether or not it has ever been encrypted.
pub fn with_envelope_field(descriptors: impl IntoIterator<Item = FieldDescriptor>) -> Vec<FieldDescriptor> {
	let mut descriptors: Vec<FieldDescriptor> = descriptors.into_iter().collect();

	if !descriptors.iter().any(|d| d.name == ENVELOPE_FIELD) {
		descriptors.push(FieldDescriptor::new(ENVELOPE_FIELD));
	}

	descriptors
}
