//! Transport primitives for token exchanges and business requests.
//!
//! [`HttpTransport`] is the client's only dependency on an HTTP stack: it sends one request
//! and returns the status plus raw body, or fails with a
//! [`TransportError`](crate::error::TransportError). Status interpretation (401 retry, API
//! errors) lives in the executor, never in the transport. The bundled
//! [`ReqwestTransport`] imposes connect and response timeouts so no call hangs unbounded.

// self
use crate::{_prelude::*, error::TransportError};

/// Default bound for a whole HTTP exchange.
pub const DEFAULT_REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// Boxed future returned by [`HttpTransport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP clients able to execute a single request.
///
/// Implementations must be `Send + Sync + 'static` so they can be shared behind `Arc`
/// between the token manager and the request executor.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and resolves with the response, whatever its status.
	fn send(&self, request: HttpRequest) -> TransportFuture<'_>;
}

/// HTTP methods used by the Daraja API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
	/// Token endpoint.
	Get,
	/// Business endpoints.
	Post,
}
impl HttpMethod {
	/// Returns the canonical method name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Get => "GET",
			Self::Post => "POST",
		}
	}
}

/// Outbound request.
#[derive(Clone, Debug)]
pub struct HttpRequest {
	/// Request method.
	pub method: HttpMethod,
	/// Absolute target URL.
	pub url: Url,
	/// Header name/value pairs.
	pub headers: Vec<(&'static str, String)>,
	/// Request body, if any.
	pub body: Option<Vec<u8>>,
}
impl HttpRequest {
	/// Builds a bodyless `GET`.
	pub fn get(url: Url) -> Self {
		Self { method: HttpMethod::Get, url, headers: Vec::new(), body: None }
	}

	/// Builds a `POST` carrying a JSON body.
	pub fn post_json(url: Url, body: Vec<u8>) -> Self {
		Self {
			method: HttpMethod::Post,
			url,
			headers: vec![("content-type", "application/json".into())],
			body: Some(body),
		}
	}

	/// Appends a header.
	pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
		self.headers.push((name, value.into()));

		self
	}
}

/// Inbound response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw body bytes.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Returns `true` for statuses below 400; anything else is an API error.
	pub fn is_success(&self) -> bool {
		self.status < 400
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`]. The caller owns its timeout policy.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client bounded by `timeout`, without redirect following.
	pub fn with_timeout(timeout: StdDuration) -> Result<Self, crate::error::ConfigError> {
		let client = ReqwestClient::builder()
			.timeout(timeout)
			.connect_timeout(timeout)
			.redirect(reqwest::redirect::Policy::none())
			.build()?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let method = match request.method {
				HttpMethod::Get => reqwest::Method::GET,
				HttpMethod::Post => reqwest::Method::POST,
			};
			let mut builder = self.0.request(method, request.url);

			for (name, value) in request.headers {
				builder = builder.header(name, value);
			}
			if let Some(body) = request.body {
				builder = builder.body(body);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(HttpResponse { status, body })
		})
	}
}
