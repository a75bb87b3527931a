mod common;

// std
use std::fs;
// crates.io
use httpmock::prelude::*;
use time::{Duration, OffsetDateTime};
// self
use common::*;
use mpesa_sdk::{ReqwestMpesa, store::DEFAULT_CACHE_FILE};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_clients_on_one_cache_fetch_once() {
	let server = MockServer::start_async().await;
	let cache = scratch_cache("stampede");
	let mock = mock_token(&server, "shared-token", "3599").await;
	let handles = (0..10)
		.map(|_| {
			let client = client_for(&server, &cache);

			tokio::spawn(async move { client.access_token().await })
		})
		.collect::<Vec<_>>();

	for handle in handles {
		let token = handle
			.await
			.expect("Client task should not panic.")
			.expect("Every client should receive a token.");

		assert_eq!(token.expose(), "shared-token");
	}

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn warm_cache_serves_fresh_clients_without_network() {
	let server = MockServer::start_async().await;
	let cache = scratch_cache("warm");
	let mock = mock_token(&server, "warm-token", "3599").await;
	let first = client_for(&server, &cache)
		.access_token()
		.await
		.expect("Cold cache should refresh.");

	for _ in 0..3 {
		let token = client_for(&server, &cache)
			.access_token()
			.await
			.expect("Warm cache should serve the token.");

		assert_eq!(token, first);
	}

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn refresh_persists_expiry_with_margin() {
	let server = MockServer::start_async().await;
	let cache = scratch_cache("expiry");
	let mock = mock_token(&server, "timed-token", "3599").await;
	let before = OffsetDateTime::now_utc().unix_timestamp();

	client_for(&server, &cache).access_token().await.expect("Refresh should succeed.");

	let after = OffsetDateTime::now_utc().unix_timestamp();
	let record = read_cache(&cache);
	let expires_at = record.expires_at.unix_timestamp();

	assert_eq!(record.token.expose(), "timed-token");
	assert!(expires_at >= before + 3539 && expires_at <= after + 3539);
	assert_eq!(expires_at - record.created_at.unix_timestamp(), 3539);

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn expired_record_is_replaced() {
	let server = MockServer::start_async().await;
	let cache = scratch_cache("expired");
	let mock = mock_token(&server, "replacement", "3599").await;

	seed_cache(&cache, "expired", Duration::minutes(5), OffsetDateTime::now_utc() - Duration::hours(1));

	let token = client_for(&server, &cache).access_token().await.expect("Refresh should succeed.");

	assert_eq!(token.expose(), "replacement");
	assert_eq!(read_cache(&cache).token.expose(), "replacement");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn corrupt_or_tampered_cache_is_a_miss() {
	let server = MockServer::start_async().await;
	let mock = mock_token(&server, "recovered", "3599").await;
	let tampered: [&[u8]; 4] = [
		b"{not json",
		b"[]",
		br#"{"token":"","expires_at":4102444800,"created_at":1700000000}"#,
		br#"{"token":"x","expires_at":"tomorrow","created_at":1700000000}"#,
	];

	for (i, contents) in tampered.iter().enumerate() {
		let cache = scratch_cache(&format!("tamper{i}"));

		fs::write(&cache, contents).expect("Tampering with the cache file should succeed.");

		let token = client_for(&server, &cache)
			.access_token()
			.await
			.expect("Corrupt cache should fall back to a refresh.");

		assert_eq!(token.expose(), "recovered");
		assert_eq!(read_cache(&cache).token.expose(), "recovered");
	}

	mock.assert_calls_async(tampered.len()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn tamper_during_concurrent_reads_costs_at_most_one_refresh() {
	let server = MockServer::start_async().await;
	let cache = scratch_cache("tamper-race");
	let mock = mock_token(&server, "steady-token", "3599").await;

	async fn burst(server: &MockServer, cache: &std::path::Path) -> Vec<String> {
		let handles = (0..10)
			.map(|_| {
				let client = client_for(server, cache);

				tokio::spawn(async move {
					let mut seen = Vec::with_capacity(5);

					for _ in 0..5 {
						let token =
							client.access_token().await.expect("No peer may fail under tamper.");

						seen.push(token.expose().to_owned());
						tokio::time::sleep(std::time::Duration::from_millis(2)).await;
					}

					seen
				})
			})
			.collect::<Vec<_>>();
		let mut tokens = Vec::new();

		for handle in handles {
			tokens.extend(handle.await.expect("Client task should not panic."));
		}

		tokens
	}

	let warm = burst(&server, &cache).await;

	assert!(warm.iter().all(|token| token == "steady-token"));

	mock.assert_calls_async(1).await;

	let tamper = {
		let cache = cache.clone();

		tokio::spawn(async move {
			tokio::time::sleep(std::time::Duration::from_millis(5)).await;
			fs::write(&cache, b"}{garbage").expect("Tampering with the cache file should succeed.");
		})
	};
	let raced = burst(&server, &cache).await;

	tamper.await.expect("Tamper task should not panic.");

	assert!(raced.iter().all(|token| token == "steady-token"));

	let settled = burst(&server, &cache).await;

	assert!(settled.iter().all(|token| token == "steady-token"));
	assert_eq!(read_cache(&cache).token.expose(), "steady-token");
	assert!(mock.calls_async().await <= 2);
}

#[tokio::test]
async fn missing_cache_directory_is_created() {
	let server = MockServer::start_async().await;
	let cache = scratch_cache("nested");
	let nested = cache
		.parent()
		.expect("Scratch cache should have a parent.")
		.join("deeper/still/token.json");
	let _mock = mock_token(&server, "nested-token", "3599").await;

	client_for(&server, &nested).access_token().await.expect("Refresh should succeed.");

	assert_eq!(read_cache(&nested).token.expose(), "nested-token");
}

#[tokio::test]
async fn clearing_the_cache_forces_a_refresh() {
	let server = MockServer::start_async().await;
	let cache = scratch_cache("clear");
	let mock = mock_token(&server, "cleared", "3599").await;
	let client = client_for(&server, &cache);

	client.access_token().await.expect("First refresh should succeed.");
	client.clear_token_cache().await.expect("Clearing should succeed.");

	assert!(!cache.exists());

	client.clear_token_cache().await.expect("Clearing an empty cache is a no-op.");
	client.access_token().await.expect("Second refresh should succeed.");

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn locator_clients_share_an_in_process_record() {
	let server = MockServer::start_async().await;
	let mock = mock_token(&server, "locator-token", "3599").await;
	let locator = format!("memory://it-{:016x}", rand::random::<u64>());
	let config = || {
		mpesa_sdk::MpesaConfig::builder(CLIENT_ID, CLIENT_SECRET)
			.base_url(server.base_url())
			.cache_path(locator.clone())
			.build()
			.expect("Locator configuration should build.")
	};
	let first = ReqwestMpesa::new(config()).expect("First locator client should build.");
	let second = ReqwestMpesa::new(config()).expect("Second locator client should build.");

	assert_eq!(first.tokens().location().to_string(), locator);

	first.access_token().await.expect("Locator refresh should succeed.");
	second.access_token().await.expect("Locator peer should hit the shared record.");

	mock.assert_calls_async(1).await;
}

#[test]
fn default_cache_path_lands_in_temp_dir() {
	let config = mpesa_sdk::MpesaConfig::builder(CLIENT_ID, CLIENT_SECRET)
		.build()
		.expect("Default configuration should build.");

	assert_eq!(
		config.cache_location().to_string(),
		std::env::temp_dir().join(DEFAULT_CACHE_FILE).display().to_string()
	);
}

#[tokio::test]
async fn token_endpoint_without_token_is_an_auth_error() {
	let server = MockServer::start_async().await;
	let cache = scratch_cache("no-token");
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(TOKEN_PATH);
			then.status(400)
				.header("content-type", "application/json")
				.body(r#"{"errorCode":"400.008.01","errorMessage":"Invalid Authentication passed"}"#);
		})
		.await;
	let err = client_for(&server, &cache)
		.access_token()
		.await
		.expect_err("Missing access_token must fail.");

	assert!(matches!(
		err,
		mpesa_sdk::Error::Auth(mpesa_sdk::error::AuthError::MissingAccessToken { status: 400 })
	));
	assert!(!cache.exists());

	mock.assert_calls_async(1).await;
}
