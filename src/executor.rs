//! Authenticated POSTs with a single retry after an authentication rejection.
//!
//! Each [`RequestExecutor::execute`] call runs a two-state machine:
//!
//! ```text
//! Initial ──401──▶ invalidate cache ─▶ AfterUnauthorized ──401──▶ Error::Api
//!    │                                       │
//!    └──other──▶ decode / Error::Api ◀───────┘
//! ```
//!
//! Transport failures are never retried.

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	config::MpesaConfig,
	http::{HttpRequest, HttpResponse, HttpTransport},
	obs::{self, ObsSpan, Outcome},
	payload::Payload,
	token::TokenManager,
};

/// Message reported when an error body carries no `errorMessage`.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error occurred";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Attempt {
	Initial,
	AfterUnauthorized,
}

/// Sends business requests with tokens from a shared [`TokenManager`].
pub struct RequestExecutor<T>
where
	T: ?Sized + HttpTransport,
{
	transport: Arc<T>,
	tokens: TokenManager<T>,
	config: Arc<MpesaConfig>,
}
impl<T> RequestExecutor<T>
where
	T: ?Sized + HttpTransport,
{
	/// Builds an executor and its token manager from `config`.
	pub fn new(config: Arc<MpesaConfig>, transport: Arc<T>) -> Result<Self> {
		let tokens = TokenManager::from_config(&config, transport.clone())?;

		Ok(Self::with_tokens(config, transport, tokens))
	}

	/// Builds an executor around an existing token manager.
	pub fn with_tokens(config: Arc<MpesaConfig>, transport: Arc<T>, tokens: TokenManager<T>) -> Self {
		Self { transport, tokens, config }
	}

	/// Configuration the executor was built with.
	pub fn config(&self) -> &MpesaConfig {
		&self.config
	}

	/// Token manager backing this executor.
	pub fn tokens(&self) -> &TokenManager<T> {
		&self.tokens
	}

	/// POSTs `payload` to `path` and decodes the JSON response.
	pub async fn execute(&self, path: &str, payload: &Payload) -> Result<Value> {
		let span = ObsSpan::request(path);

		obs::record_request_outcome(path, Outcome::Attempt);

		let result = span.instrument(self.run(path, payload)).await;

		match &result {
			Ok(_) => obs::record_request_outcome(path, Outcome::Success),
			Err(_) => obs::record_request_outcome(path, Outcome::Failure),
		}

		result
	}

	async fn run(&self, path: &str, payload: &Payload) -> Result<Value> {
		let url = self.config.endpoint(path)?;
		let body = payload.to_vec();
		let mut attempt = Attempt::Initial;

		loop {
			let token = self.token().await?;
			let request = HttpRequest::post_json(url.clone(), body.clone())
				.header("authorization", token.bearer_header());
			let response = self.transport.send(request).await?;

			obs::request_debug(self.config.debug, path, response.status, response.body.len());

			match (response.status, attempt) {
				(401, Attempt::Initial) => {
					obs::record_request_outcome(path, Outcome::Retry);
					self.tokens.invalidate().await?;

					attempt = Attempt::AfterUnauthorized;
				},
				_ => return decode(response),
			}
		}
	}

	async fn token(&self) -> Result<AccessToken> {
		match self.tokens.access_token().await {
			// The manager already reported the failed write; the token is still good.
			Err(Error::Persistence { token, .. }) => Ok(token),
			other => other,
		}
	}
}
impl<T> Debug for RequestExecutor<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestExecutor")
			.field("tokens", &self.tokens)
			.field("base_url", &self.config.base_url)
			.finish()
	}
}

/// Maps a response to its decoded body or an [`Error::Api`].
pub fn decode(response: HttpResponse) -> Result<Value> {
	if !response.is_success() {
		return Err(Error::Api { status: response.status, message: error_message(&response.body) });
	}

	let HttpResponse { status, body } = response;

	if body.iter().all(u8::is_ascii_whitespace) {
		return Ok(Value::Null);
	}

	serde_json::from_slice(&body).map_err(|source| Error::InvalidResponse { status, source })
}

fn error_message(body: &[u8]) -> String {
	serde_json::from_slice::<Value>(body)
		.ok()
		.and_then(|value| value.get("errorMessage").and_then(Value::as_str).map(ToOwned::to_owned))
		.filter(|message| !message.is_empty())
		.unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_owned())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn response(status: u16, body: &str) -> HttpResponse {
		HttpResponse { status, body: body.as_bytes().to_vec() }
	}

	#[test]
	fn provider_error_message_is_extracted() {
		let err = decode(response(
			400,
			r#"{"requestId":"1","errorCode":"400.002.02","errorMessage":"Bad Request - Invalid Amount"}"#,
		))
		.expect_err("4xx must fail.");

		assert!(matches!(
			err,
			Error::Api { status: 400, ref message } if message == "Bad Request - Invalid Amount"
		));
	}

	#[test]
	fn missing_message_falls_back_to_unknown() {
		for body in ["", "<html>", r#"{"errorCode":"500.001.1001"}"#, r#"{"errorMessage":""}"#] {
			let err = decode(response(500, body)).expect_err("5xx must fail.");

			assert!(
				matches!(err, Error::Api { status: 500, ref message } if message == UNKNOWN_ERROR_MESSAGE),
				"Body {body:?} should map to the generic message."
			);
		}
	}

	#[test]
	fn error_boundary_starts_at_400() {
		assert_eq!(
			decode(response(399, r#"{"ok":true}"#)).expect("Sub-400 statuses should decode."),
			serde_json::json!({ "ok": true })
		);
		assert!(matches!(
			decode(response(400, r#"{"ok":true}"#)),
			Err(Error::Api { status: 400, .. })
		));
	}

	#[test]
	fn success_bodies_decode_or_fail_typed() {
		let value = decode(response(200, r#"{"ResponseCode":"0"}"#)).expect("JSON body should decode.");

		assert_eq!(value["ResponseCode"], "0");
		assert_eq!(decode(response(200, "")).expect("Empty body should decode."), Value::Null);
		assert!(matches!(
			decode(response(200, "not json")),
			Err(Error::InvalidResponse { status: 200, .. })
		));
	}
}
