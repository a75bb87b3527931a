//! Ordered JSON request bodies.

// crates.io
use indexmap::IndexMap;
// self
use crate::_prelude::*;

/// Wire payload whose keys serialize in insertion order.
///
/// Daraja does not require a particular order, but stable output keeps request logs and
/// recorded fixtures diffable.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(IndexMap<String, Value>);
impl Payload {
	/// Creates an empty payload.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets `key`, replacing an earlier value in place.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
		self.0.insert(key.into(), value.into());
	}

	/// Returns the value stored under `key`.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	/// Returns the value under `key` when it is a string.
	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.get(key).and_then(Value::as_str)
	}

	/// Iterates entries in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v))
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when no entry is set.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Encodes the payload as a JSON byte vector.
	pub fn to_vec(&self) -> Vec<u8> {
		// String keys and JSON values always encode.
		serde_json::to_vec(self).unwrap_or_default()
	}
}
impl<K, V> FromIterator<(K, V)> for Payload
where
	K: Into<String>,
	V: Into<Value>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn keys_keep_insertion_order_and_replace_in_place() {
		let mut payload = Payload::new();

		payload.insert("ShortCode", "600000");
		payload.insert("Amount", 10);
		payload.insert("ShortCode", "600111");

		assert_eq!(payload.len(), 2);
		assert_eq!(payload.get_str("ShortCode"), Some("600111"));
		assert_eq!(
			String::from_utf8(payload.to_vec()).expect("Payload JSON should be UTF-8."),
			r#"{"ShortCode":"600111","Amount":10}"#
		);
	}

	#[test]
	fn runtime_keys_are_accepted() {
		let suffix = 2;
		let payload = [(format!("Field{suffix}"), "b"), ("Field1".to_owned(), "a")]
			.into_iter()
			.collect::<Payload>();

		assert_eq!(payload.get_str("Field2"), Some("b"));
		assert_eq!(
			String::from_utf8(payload.to_vec()).expect("Payload JSON should be UTF-8."),
			r#"{"Field2":"b","Field1":"a"}"#
		);
	}
}
