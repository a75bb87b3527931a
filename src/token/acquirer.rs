//! Client-credentials exchange against the Daraja token endpoint.

// crates.io
use serde::Deserializer;
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ClientCredentials},
	error::AuthError,
	http::{HttpRequest, HttpTransport},
	obs::{self, ObsSpan, Outcome, Stage},
};

/// Lifetime assumed when the provider omits `expires_in`.
pub const DEFAULT_TTL: Duration = Duration::seconds(3600);
/// Margin subtracted from the provider TTL so cached tokens never expire mid-flight.
pub const EXPIRY_MARGIN: Duration = Duration::seconds(60);
/// Ceiling applied to the provider-reported lifetime.
pub const MAX_TTL: Duration = Duration::days(1);

/// Token returned by a successful exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenGrant {
	/// Bearer secret.
	pub token: AccessToken,
	/// Usable lifetime: provider TTL minus [`EXPIRY_MARGIN`], floored at zero.
	pub ttl: Duration,
}

/// Performs the network exchange `credentials → (token, ttl)`.
///
/// Failures are never retried here; the manager and executor own retry policy.
pub struct TokenAcquirer<T>
where
	T: ?Sized + HttpTransport,
{
	transport: Arc<T>,
	endpoint: Url,
	credentials: ClientCredentials,
}
impl<T> TokenAcquirer<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates an acquirer for `endpoint`.
	pub fn new(transport: Arc<T>, endpoint: Url, credentials: ClientCredentials) -> Self {
		Self { transport, endpoint, credentials }
	}

	/// Token endpoint URL.
	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}

	/// Exchanges the client credentials for a token.
	pub async fn acquire(&self) -> Result<TokenGrant> {
		const STAGE: Stage = Stage::Acquire;

		let span = ObsSpan::token(STAGE);

		obs::record_token_outcome(STAGE, Outcome::Attempt);

		let result = span
			.instrument(async move {
				let request = HttpRequest::get(self.endpoint.clone())
					.header("authorization", self.credentials.basic_header());
				let response = self.transport.send(request).await?;

				parse_token_response(response.status, &response.body)
			})
			.await;

		match &result {
			Ok(_) => obs::record_token_outcome(STAGE, Outcome::Success),
			Err(_) => obs::record_token_outcome(STAGE, Outcome::Failure),
		}

		result
	}
}
impl<T> Debug for TokenAcquirer<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenAcquirer")
			.field("endpoint", &self.endpoint.as_str())
			.field("credentials", &self.credentials)
			.finish()
	}
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
	#[serde(default)]
	access_token: Option<String>,
	#[serde(default, deserialize_with = "lenient_seconds")]
	expires_in: Option<i64>,
}

/// Parses a token endpoint body into a grant, applying the default TTL and expiry margin.
pub fn parse_token_response(status: u16, body: &[u8]) -> Result<TokenGrant> {
	let mut de = serde_json::Deserializer::from_slice(body);
	let parsed: TokenResponse = serde_path_to_error::deserialize(&mut de)
		.map_err(|source| AuthError::MalformedResponse { status, source })?;
	let token = parsed
		.access_token
		.filter(|token| !token.is_empty())
		.ok_or(AuthError::MissingAccessToken { status })?;
	let provider_ttl = parsed
		.expires_in
		.map(|seconds| Duration::seconds(seconds.clamp(0, MAX_TTL.whole_seconds())))
		.unwrap_or(DEFAULT_TTL);
	let ttl = provider_ttl - EXPIRY_MARGIN;

	Ok(TokenGrant {
		token: AccessToken::new(token),
		ttl: if ttl.is_negative() { Duration::ZERO } else { ttl },
	})
}

/// Daraja reports `expires_in` as a numeric string; accept numbers too.
fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Option::<Value>::deserialize(deserializer)?;

	Ok(match value {
		Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
		Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
		_ => None,
	})
}
