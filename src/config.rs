//! Immutable client configuration and its builder.

// self
use crate::{
	_prelude::*,
	auth::ClientCredentials,
	error::ConfigError,
	http::DEFAULT_REQUEST_TIMEOUT,
	store::CacheLocation,
};

/// Token endpoint path appended to the base URL.
pub const DEFAULT_TOKEN_PATH: &str = "/oauth/v1/generate?grant_type=client_credentials";
/// Default wait budget for the cross-process refresh lock.
pub const DEFAULT_LOCK_TIMEOUT: StdDuration = StdDuration::from_secs(10);

/// Daraja deployment targeted by the client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
	/// `https://sandbox.safaricom.co.ke`.
	#[default]
	Sandbox,
	/// `https://api.safaricom.co.ke`.
	#[serde(alias = "live")]
	Production,
}
impl Environment {
	/// Base URL for the environment.
	pub const fn base_url(self) -> &'static str {
		match self {
			Self::Sandbox => "https://sandbox.safaricom.co.ke",
			Self::Production => "https://api.safaricom.co.ke",
		}
	}

	/// `live` (any case) selects production; every other value selects the sandbox.
	pub fn from_selector(selector: &str) -> Self {
		if selector.trim().eq_ignore_ascii_case("live") { Self::Production } else { Self::Sandbox }
	}
}
impl FromStr for Environment {
	type Err = std::convert::Infallible;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self::from_selector(s))
	}
}

/// Client configuration. Immutable once built; changing credentials or the cache location
/// requires building a new client.
#[derive(Clone, Serialize, Deserialize)]
pub struct MpesaConfig {
	/// Consumer key.
	pub client_id: String,
	/// Consumer secret.
	pub client_secret: String,
	/// Selected deployment.
	pub environment: Environment,
	/// Base URL; defaults to the environment's.
	pub base_url: String,
	/// Token endpoint path (including the grant-type query).
	pub token_path: String,
	/// Business short code (paybill/till).
	pub business_short_code: String,
	/// Lipa Na M-Pesa Online pass key.
	pub pass_key: String,
	/// Seed handed to the security-credential provider.
	pub security_credential: String,
	/// Queue-timeout callback URL.
	pub queue_timeout_url: String,
	/// Result callback URL.
	pub result_url: String,
	/// Configured cache path, resolved via [`CacheLocation::resolve`].
	pub cache_path: String,
	/// Emits request-level debug events when tracing is enabled.
	pub debug: bool,
	/// Bound for every HTTP exchange.
	pub request_timeout: StdDuration,
	/// Wait budget for the refresh lock.
	pub lock_timeout: StdDuration,
}
impl MpesaConfig {
	/// Returns a builder seeded with the consumer key/secret.
	pub fn builder(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> MpesaConfigBuilder {
		MpesaConfigBuilder::new(client_id, client_secret)
	}

	/// Credential pair for the token exchange.
	pub fn credentials(&self) -> ClientCredentials {
		ClientCredentials::new(&self.client_id, &self.client_secret)
	}

	/// Resolved cache destination.
	pub fn cache_location(&self) -> CacheLocation {
		CacheLocation::resolve(&self.cache_path)
	}

	/// Absolute URL for `path` (which may carry a query string).
	pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		let raw = format!("{}{path}", self.base_url.trim_end_matches('/'));

		Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl { url: raw, source })
	}

	/// Absolute token endpoint URL.
	pub fn token_endpoint(&self) -> Result<Url, ConfigError> {
		self.endpoint(&self.token_path)
	}
}
impl Debug for MpesaConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("MpesaConfig")
			.field("client_id", &self.client_id)
			.field("environment", &self.environment)
			.field("base_url", &self.base_url)
			.field("business_short_code", &self.business_short_code)
			.field("pass_key_set", &!self.pass_key.is_empty())
			.field("security_credential_set", &!self.security_credential.is_empty())
			.field("cache_path", &self.cache_path)
			.field("debug", &self.debug)
			.finish()
	}
}

/// Builder for [`MpesaConfig`].
#[derive(Clone, Debug)]
pub struct MpesaConfigBuilder {
	client_id: String,
	client_secret: String,
	environment: Environment,
	base_url: Option<String>,
	token_path: String,
	business_short_code: String,
	pass_key: String,
	security_credential: String,
	queue_timeout_url: String,
	result_url: String,
	cache_path: String,
	debug: bool,
	request_timeout: StdDuration,
	lock_timeout: StdDuration,
}
impl MpesaConfigBuilder {
	/// Creates a builder with sandbox defaults.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			environment: Environment::Sandbox,
			base_url: None,
			token_path: DEFAULT_TOKEN_PATH.into(),
			business_short_code: String::new(),
			pass_key: String::new(),
			security_credential: String::new(),
			queue_timeout_url: String::new(),
			result_url: String::new(),
			cache_path: String::new(),
			debug: false,
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
			lock_timeout: DEFAULT_LOCK_TIMEOUT,
		}
	}

	/// Selects the deployment.
	pub fn environment(mut self, environment: Environment) -> Self {
		self.environment = environment;

		self
	}

	/// Overrides the base URL (mock servers, proxies).
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = Some(url.into());

		self
	}

	/// Overrides the token endpoint path.
	pub fn token_path(mut self, path: impl Into<String>) -> Self {
		self.token_path = path.into();

		self
	}

	/// Sets the business short code.
	pub fn business_short_code(mut self, code: impl Into<String>) -> Self {
		self.business_short_code = code.into();

		self
	}

	/// Sets the STK pass key.
	pub fn pass_key(mut self, pass_key: impl Into<String>) -> Self {
		self.pass_key = pass_key.into();

		self
	}

	/// Sets the security-credential seed.
	pub fn security_credential(mut self, seed: impl Into<String>) -> Self {
		self.security_credential = seed.into();

		self
	}

	/// Sets the queue-timeout callback URL.
	pub fn queue_timeout_url(mut self, url: impl Into<String>) -> Self {
		self.queue_timeout_url = url.into();

		self
	}

	/// Sets the result callback URL.
	pub fn result_url(mut self, url: impl Into<String>) -> Self {
		self.result_url = url.into();

		self
	}

	/// Sets the token cache path.
	pub fn cache_path(mut self, path: impl Into<String>) -> Self {
		self.cache_path = path.into();

		self
	}

	/// Toggles request-level debug events.
	pub fn debug(mut self, debug: bool) -> Self {
		self.debug = debug;

		self
	}

	/// Overrides the HTTP timeout (defaults to 30 seconds).
	pub fn request_timeout(mut self, timeout: StdDuration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Overrides the refresh-lock wait budget (defaults to 10 seconds).
	pub fn lock_timeout(mut self, timeout: StdDuration) -> Self {
		self.lock_timeout = timeout;

		self
	}

	/// Validates and freezes the configuration.
	pub fn build(self) -> Result<MpesaConfig, ConfigError> {
		if self.client_id.trim().is_empty() {
			return Err(ConfigError::Missing { name: "client_id" });
		}
		if self.client_secret.trim().is_empty() {
			return Err(ConfigError::Missing { name: "client_secret" });
		}

		let base_url = self.base_url.unwrap_or_else(|| self.environment.base_url().to_owned());
		let config = MpesaConfig {
			client_id: self.client_id,
			client_secret: self.client_secret,
			environment: self.environment,
			base_url,
			token_path: self.token_path,
			business_short_code: self.business_short_code,
			pass_key: self.pass_key,
			security_credential: self.security_credential,
			queue_timeout_url: self.queue_timeout_url,
			result_url: self.result_url,
			cache_path: self.cache_path,
			debug: self.debug,
			request_timeout: self.request_timeout,
			lock_timeout: self.lock_timeout,
		};

		config.token_endpoint()?;

		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn live_selector_picks_production() {
		assert_eq!(Environment::from_selector("live"), Environment::Production);
		assert_eq!(Environment::from_selector("LIVE"), Environment::Production);
		assert_eq!(Environment::from_selector("production"), Environment::Sandbox);
		assert_eq!(Environment::from_selector(""), Environment::Sandbox);
	}

	#[test]
	fn builder_applies_environment_base_url() {
		let config = MpesaConfig::builder("key", "secret")
			.environment(Environment::Production)
			.build()
			.expect("Production config should build.");

		assert_eq!(config.base_url, "https://api.safaricom.co.ke");
		assert_eq!(
			config.token_endpoint().expect("Token endpoint should parse.").as_str(),
			"https://api.safaricom.co.ke/oauth/v1/generate?grant_type=client_credentials"
		);
	}

	#[test]
	fn builder_rejects_missing_credentials_and_bad_urls() {
		assert!(matches!(
			MpesaConfig::builder(" ", "secret").build(),
			Err(ConfigError::Missing { name: "client_id" })
		));
		assert!(matches!(
			MpesaConfig::builder("key", "").build(),
			Err(ConfigError::Missing { name: "client_secret" })
		));
		assert!(matches!(
			MpesaConfig::builder("key", "secret").base_url("not a url").build(),
			Err(ConfigError::InvalidUrl { .. })
		));
	}

	#[test]
	fn endpoint_joins_without_double_slash() {
		let config = MpesaConfig::builder("key", "secret")
			.base_url("http://127.0.0.1:8091/")
			.build()
			.expect("Override config should build.");

		assert_eq!(
			config.endpoint("/mpesa/c2b/v1/simulate").expect("Endpoint should parse.").as_str(),
			"http://127.0.0.1:8091/mpesa/c2b/v1/simulate"
		);
	}

	#[test]
	fn debug_output_hides_secrets() {
		let config = MpesaConfig::builder("key", "top-secret")
			.pass_key("pass-secret")
			.build()
			.expect("Config should build.");
		let rendered = format!("{config:?}");

		assert!(!rendered.contains("top-secret"));
		assert!(!rendered.contains("pass-secret"));
	}
}
