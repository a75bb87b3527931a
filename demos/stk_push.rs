//! Demonstrates an STK push followed by a status query against a local mock of the Daraja
//! API, with the access token cached in a file shared by every process on the host.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use mpesa_sdk::{MpesaConfig, ReqwestMpesa, services::StkPush};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/oauth/v1/generate");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"demo-access\",\"expires_in\":\"3599\"}");
		})
		.await;
	let push_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/mpesa/stkpush/v1/processrequest");
			then.status(200).header("content-type", "application/json").body(
				"{\"MerchantRequestID\":\"29115-1\",\"CheckoutRequestID\":\"ws_CO_demo\",\"ResponseCode\":\"0\"}",
			);
		})
		.await;
	let query_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/mpesa/stkpushquery/v1/query");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"ResultCode\":\"1032\",\"ResultDesc\":\"Request cancelled by user.\"}");
		})
		.await;
	let cache = std::env::temp_dir().join(format!("mpesa_demo_{}.json", std::process::id()));
	let config = MpesaConfig::builder("demo-key", "demo-secret")
		.base_url(server.base_url())
		.business_short_code("174379")
		.pass_key("demo-pass-key")
		.cache_path(cache.to_string_lossy())
		.build()?;
	let client = ReqwestMpesa::new(config)?;
	let mut stk = client.stk();
	let pushed = stk
		.push(
			&StkPush::new(1, "0712345678", "https://example.com/mpesa/callback")
				.account_reference("INV-001"),
		)
		.await?;

	println!("Push accepted: {pushed}.");

	let status = stk.query(None).await?;

	println!("Push status: {status}.");

	client.clear_token_cache().await?;
	token_mock.assert_async().await;
	push_mock.assert_async().await;
	query_mock.assert_async().await;

	Ok(())
}
