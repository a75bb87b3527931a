//! Client-wide error types shared by the token cache, executor, and request builders.

// self
use crate::{_prelude::*, auth::AccessToken};

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Each variant maps to one failure category so callers can decide whether to retry,
/// alert, or abort.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure reaching the token endpoint or a business endpoint.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Token endpoint answered without a usable access token.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Cross-process refresh lock could not be acquired.
	#[error(transparent)]
	Lock(#[from] LockError),
	/// Request payload could not be assembled.
	#[error(transparent)]
	Request(#[from] RequestError),
	/// Cache store failure outside of the refresh path (e.g. invalidation).
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),

	/// A fresh token was acquired but could not be persisted.
	///
	/// The token is still valid for the immediate caller; the shared cache is not warm.
	#[error("Access token was acquired but could not be cached: {source}.")]
	Persistence {
		/// Underlying store failure.
		#[source]
		source: crate::store::StoreError,
		/// Freshly acquired token, usable for the current call.
		token: AccessToken,
	},
	/// Business endpoint rejected the request.
	#[error("M-Pesa API error ({status}): {message}.")]
	Api {
		/// HTTP status code returned by the endpoint.
		status: u16,
		/// Provider-supplied `errorMessage`, or a generic placeholder.
		message: String,
	},
	/// Business endpoint answered successfully but the body was not JSON.
	#[error("M-Pesa API returned an undecodable body (status {status}).")]
	InvalidResponse {
		/// HTTP status code returned by the endpoint.
		status: u16,
		/// Decoding failure.
		#[source]
		source: serde_json::Error,
	},
}
impl Error {
	/// Returns the HTTP status attached to API failures, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Api { status, .. } | Self::InvalidResponse { status, .. } => Some(*status),
			Self::Auth(AuthError::MissingAccessToken { status })
			| Self::Auth(AuthError::MalformedResponse { status, .. }) => Some(*status),
			_ => None,
		}
	}
}

/// Configuration and validation failures raised while building the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL or endpoint path does not form a valid URL.
	#[error("Endpoint URL `{url}` is invalid.")]
	InvalidUrl {
		/// Offending URL string.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A required configuration value is empty.
	#[error("Configuration value `{name}` is required.")]
	Missing {
		/// Configuration key.
		name: &'static str,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, timeout, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {url}.")]
	Network {
		/// Target URL.
		url: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request exceeded the configured timeout.
	#[error("Request to {url} timed out.")]
	Timeout {
		/// Target URL.
		url: String,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred during an HTTP exchange.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(url: impl Into<String>, src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { url: url.into(), source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		let url = e.url().map(ToString::to_string).unwrap_or_default();

		if e.is_timeout() { Self::Timeout { url } } else { Self::network(url, e) }
	}
}

/// Token endpoint failures that are not transport problems.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// Response parsed but carried no `access_token`.
	#[error("Token endpoint response (status {status}) did not contain an access token.")]
	MissingAccessToken {
		/// HTTP status code.
		status: u16,
	},
	/// Response body was not a JSON object.
	#[error("Token endpoint returned malformed JSON (status {status}).")]
	MalformedResponse {
		/// HTTP status code.
		status: u16,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Cross-process lock failures.
#[derive(Debug, ThisError)]
pub enum LockError {
	/// The lock stayed contended for the whole wait budget.
	#[error("Timed out after {waited:?} waiting for the token refresh lock at {}.", path.display())]
	Timeout {
		/// Lock file path.
		path: PathBuf,
		/// Time spent waiting.
		waited: StdDuration,
	},
	/// The lock file could not be opened or locked.
	#[error("Token refresh lock at {} failed.", path.display())]
	Io {
		/// Lock file path.
		path: PathBuf,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
}

/// Request assembly failures raised before any network call.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RequestError {
	/// A required wire field was not supplied or is empty.
	#[error("Field `{field}` is required.")]
	MissingField {
		/// Wire field name.
		field: &'static str,
	},
	/// A follow-up call needed a field from an earlier response that is absent.
	#[error("Response field `{field}` is not available.")]
	MissingResponseField {
		/// Response field name.
		field: &'static str,
	},
	/// Request timestamp could not be rendered.
	#[error("Request timestamp could not be formatted: {message}.")]
	Timestamp {
		/// Formatter-supplied reason.
		message: String,
	},
	/// Security credential provider failed.
	#[error("Security credential could not be produced: {message}.")]
	SecurityCredential {
		/// Provider-supplied reason.
		message: String,
	},
}
