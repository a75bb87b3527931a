//! Security credential strategies for initiator-signed operations.
//!
//! B2C, transaction status, account balance, and reversal requests carry a
//! `SecurityCredential`: the initiator password encrypted with the provider's public
//! certificate. Encryption is deployment-specific, so the client delegates it to a
//! [`SecurityCredentialProvider`].

// self
use crate::{_prelude::*, error::RequestError};

/// Produces the `SecurityCredential` wire value from the configured seed.
pub trait SecurityCredentialProvider
where
	Self: Send + Sync,
{
	/// Returns the encoded credential for `seed`.
	fn credential(&self, seed: &str) -> Result<String, RequestError>;
}

/// Passes through a credential the caller already encrypted with the provider certificate.
#[derive(Clone, Copy, Debug, Default)]
pub struct PreEncrypted;
impl SecurityCredentialProvider for PreEncrypted {
	fn credential(&self, seed: &str) -> Result<String, RequestError> {
		if seed.is_empty() {
			return Err(RequestError::MissingField { field: "SecurityCredential" });
		}

		Ok(seed.to_owned())
	}
}

impl<F> SecurityCredentialProvider for F
where
	F: Send + Sync + Fn(&str) -> Result<String, RequestError>,
{
	fn credential(&self, seed: &str) -> Result<String, RequestError> {
		self(seed)
	}
}

/// Shared handle used by the client and request builders.
pub type SharedCredentialProvider = Arc<dyn SecurityCredentialProvider>;
