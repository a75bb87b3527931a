#![allow(dead_code)]

// std
use std::{
	env, fs,
	net::TcpListener,
	path::{Path, PathBuf},
	process,
};
// crates.io
use httpmock::{Mock, prelude::*};
use time::{Duration, OffsetDateTime};
// self
use mpesa_sdk::{MpesaConfig, ReqwestMpesa, auth::CachedToken};

pub const CLIENT_ID: &str = "key";
pub const CLIENT_SECRET: &str = "secret";
/// `base64("key:secret")`.
pub const BASIC_AUTH: &str = "Basic a2V5OnNlY3JldA==";
pub const TOKEN_PATH: &str = "/oauth/v1/generate";
pub const SHORT_CODE: &str = "600000";

/// Returns a cache file path inside a fresh per-test directory.
pub fn scratch_cache(tag: &str) -> PathBuf {
	let dir = env::temp_dir().join(format!(
		"mpesa_sdk_it_{tag}_{}_{:016x}",
		process::id(),
		rand::random::<u64>()
	));

	fs::create_dir_all(&dir).expect("Scratch directory should be creatable.");

	dir.join("token.json")
}

/// Returns a loopback address nothing listens on.
pub fn closed_port_url() -> String {
	let listener = TcpListener::bind("127.0.0.1:0").expect("Ephemeral port should bind.");
	let addr = listener.local_addr().expect("Bound listener should report its address.");

	drop(listener);

	format!("http://{addr}")
}

pub fn config_for(base_url: &str, cache: &Path) -> MpesaConfig {
	MpesaConfig::builder(CLIENT_ID, CLIENT_SECRET)
		.base_url(base_url)
		.business_short_code(SHORT_CODE)
		.pass_key("passkey")
		.security_credential("pre-encrypted-credential")
		.result_url("https://example.com/result")
		.queue_timeout_url("https://example.com/timeout")
		.cache_path(cache.to_string_lossy())
		.build()
		.expect("Test configuration should build.")
}

pub fn client_for(server: &MockServer, cache: &Path) -> ReqwestMpesa {
	ReqwestMpesa::new(config_for(&server.base_url(), cache)).expect("Test client should build.")
}

pub fn token_body(token: &str, expires_in: &str) -> String {
	format!("{{\"access_token\":\"{token}\",\"expires_in\":\"{expires_in}\"}}")
}

/// Mocks the token endpoint, requiring Basic credentials and the grant-type query.
pub async fn mock_token<'a>(server: &'a MockServer, token: &str, expires_in: &str) -> Mock<'a> {
	let body = token_body(token, expires_in);

	server
		.mock_async(|when, then| {
			when.method(GET)
				.path(TOKEN_PATH)
				.query_param("grant_type", "client_credentials")
				.header("authorization", BASIC_AUTH);
			then.status(200)
				.header("content-type", "application/json")
				.delay(std::time::Duration::from_millis(100))
				.body(body);
		})
		.await
}

/// Writes a record straight to the cache file, as a peer process would.
pub fn seed_cache(cache: &Path, token: &str, ttl: Duration, created_at: OffsetDateTime) {
	let record = CachedToken::issued(mpesa_sdk::auth::AccessToken::new(token), ttl, created_at);

	fs::write(cache, serde_json::to_vec(&record).expect("Record should serialize."))
		.expect("Seeding the cache file should succeed.");
}

pub fn read_cache(cache: &Path) -> CachedToken {
	let bytes = fs::read(cache).expect("Cache file should exist.");

	serde_json::from_slice(&bytes).expect("Cache file should hold a valid record.")
}
