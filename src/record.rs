use serde_json::Value;
use std::collections::BTreeMap;

/// A document, as the engine sees it: named field values, plus the envelope attribute.
///
/// A field that isn't in the map is *absent*, which is not the same thing as being present with
/// a value of [`Value::Null`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
	fields: BTreeMap<String, Value>,
	envelope: Option<Vec<u8>>,
}

impl Record {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, name: &str) -> Option<&Value> {
		self.fields.get(name)
	}

	/// Set a field's value, returning whatever was there before.
	pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
		self.fields.insert(name.into(), value.into())
	}

	/// Make a field absent, returning whatever was there before.
	pub fn remove(&mut self, name: &str) -> Option<Value> {
		self.fields.remove(name)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.fields.contains_key(name)
	}

	pub fn fields(&self) -> &BTreeMap<String, Value> {
		&self.fields
	}

	pub fn envelope(&self) -> Option<&[u8]> {
		self.envelope.as_deref()
	}

	pub fn set_envelope(&mut self, envelope: impl Into<Vec<u8>>) {
		self.envelope = Some(envelope.into());
	}

	pub fn clear_envelope(&mut self) -> Option<Vec<u8>> {
		self.envelope.take()
	}

	pub fn is_sealed(&self) -> bool {
		self.envelope.is_some()
	}

	/// The value of `field`, rendered for humans; strings come out without their quotes.
	pub(crate) fn describe(&self, field: &str) -> Option<String> {
		self.fields.get(field).map(|v| match v {
			Value::String(s) => s.clone(),
			other => other.to_string(),
		})
	}
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self {
			fields: iter
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
			envelope: None,
		}
	}
}
