//! Demonstrates many independent clients sharing one cache file: a burst of concurrent
//! callers triggers exactly one token request.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use mpesa_sdk::{MpesaConfig, ReqwestMpesa};

const CLIENTS: usize = 16;

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/oauth/v1/generate");
			then.status(200)
				.header("content-type", "application/json")
				.delay(std::time::Duration::from_millis(250))
				.body("{\"access_token\":\"shared-access\",\"expires_in\":\"3599\"}");
		})
		.await;
	let cache = std::env::temp_dir().join(format!("mpesa_shared_demo_{}.json", std::process::id()));
	let mut tasks = Vec::with_capacity(CLIENTS);

	for _ in 0..CLIENTS {
		let config = MpesaConfig::builder("demo-key", "demo-secret")
			.base_url(server.base_url())
			.cache_path(cache.to_string_lossy())
			.build()?;
		let client = ReqwestMpesa::new(config)?;

		tasks.push(tokio::spawn(async move { client.access_token().await }));
	}

	for task in tasks {
		let token = task.await??;

		println!("Client received token {}.", token.expose());
	}

	token_mock.assert_async().await;

	println!("{CLIENTS} clients shared a single token request.");

	Ok(())
}
