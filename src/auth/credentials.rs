//! Consumer key/secret pair and its HTTP Basic encoding.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
// self
use crate::_prelude::*;

/// Daraja app credentials exchanged for bearer tokens.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
	/// Consumer key.
	pub client_id: String,
	client_secret: String,
}
impl ClientCredentials {
	/// Builds a credential pair.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self { client_id: client_id.into(), client_secret: client_secret.into() }
	}

	/// Returns the consumer secret. Callers must avoid logging this string.
	pub fn expose_secret(&self) -> &str {
		&self.client_secret
	}

	/// Builds the `Authorization` header value: `Basic base64(id:secret)`.
	pub fn basic_header(&self) -> String {
		let encoded = STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret));

		format!("Basic {encoded}")
	}
}
impl Debug for ClientCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientCredentials")
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.finish()
	}
}
