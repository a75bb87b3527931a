mod common;

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use common::*;
use mpesa_sdk::services::{
	B2cPayment, RegisterUrls, ReversalRequest, StkPush, TransactionStatusQuery,
};

#[tokio::test]
async fn c2b_register_sends_exact_wire_body() {
	let server = MockServer::start_async().await;
	let cache = scratch_cache("register");
	let _token = mock_token(&server, "ops-token", "3599").await;
	let register = server
		.mock_async(|when, then| {
			when.method(POST).path("/mpesa/c2b/v2/registerurl").json_body(json!({
				"ShortCode": SHORT_CODE,
				"ResponseType": "Completed",
				"ConfirmationURL": "https://example.com/confirm",
				"ValidationURL": "https://example.com/validate",
			}));
			then.status(200).header("content-type", "application/json").body(
				r#"{"OriginatorCoversationID":"7619-37765134-1","ResponseCode":"0","ResponseDescription":"success"}"#,
			);
		})
		.await;
	let response = client_for(&server, &cache)
		.customer_to_business()
		.register(&RegisterUrls::new("https://example.com/confirm", "https://example.com/validate"))
		.await
		.expect("Registration should succeed.");

	assert_eq!(response["ResponseDescription"], "success");

	register.assert_calls_async(1).await;
}

#[tokio::test]
async fn b2c_sends_integer_amount_and_misspelled_occasion() {
	let server = MockServer::start_async().await;
	let cache = scratch_cache("b2c");
	let _token = mock_token(&server, "ops-token", "3599").await;
	let payment = server
		.mock_async(|when, then| {
			when.method(POST).path("/mpesa/b2c/v1/paymentrequest").json_body(json!({
				"InitiatorName": "api-user",
				"SecurityCredential": "pre-encrypted-credential",
				"CommandID": "SalaryPayment",
				"Amount": 1500,
				"PartyA": SHORT_CODE,
				"PartyB": "254712345678",
				"Remarks": "March salary",
				"QueueTimeOutURL": "https://example.com/timeout",
				"ResultURL": "https://example.com/result",
				"Occassion": "",
			}));
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"ConversationID":"AG_1","ResponseCode":"0"}"#);
		})
		.await;
	let request = B2cPayment::new("api-user", 1500, "+254712345678")
		.command_id("SalaryPayment")
		.remarks("March salary");

	client_for(&server, &cache)
		.business_to_customer()
		.pay(&request)
		.await
		.expect("Payment request should succeed.");

	payment.assert_calls_async(1).await;
}

#[tokio::test]
async fn status_and_reversal_use_fixed_command_ids() {
	let server = MockServer::start_async().await;
	let cache = scratch_cache("status-reversal");
	let _token = mock_token(&server, "ops-token", "3599").await;
	let status = server
		.mock_async(|when, then| {
			when.method(POST).path("/mpesa/transactionstatus/v1/query").json_body(json!({
				"Initiator": "api-user",
				"SecurityCredential": "pre-encrypted-credential",
				"CommandID": "TransactionStatusQuery",
				"TransactionID": "OEI2AK4Q16",
				"PartyA": SHORT_CODE,
				"IdentifierType": "4",
				"ResultURL": "https://example.com/result",
				"QueueTimeOutURL": "https://example.com/timeout",
				"Remarks": "",
				"Occassion": "",
			}));
			then.status(200).body(r#"{"ResponseCode":"0"}"#);
		})
		.await;
	let reversal = server
		.mock_async(|when, then| {
			when.method(POST).path("/mpesa/reversal/v1/request").json_body(json!({
				"Initiator": "api-user",
				"SecurityCredential": "pre-encrypted-credential",
				"CommandID": "TransactionReversal",
				"TransactionID": "OEI2AK4Q16",
				"ReceiverParty": SHORT_CODE,
				"ReceiverIdentifierType": "11",
				"ResultURL": "https://example.com/result",
				"QueueTimeOutURL": "https://example.com/timeout",
				"Remarks": "Duplicate",
				"Occassion": "",
			}));
			then.status(200).body(r#"{"ResponseCode":"0"}"#);
		})
		.await;
	let client = client_for(&server, &cache);

	client
		.transaction_status()
		.query(&TransactionStatusQuery::new("api-user", "OEI2AK4Q16"))
		.await
		.expect("Status query should succeed.");
	client
		.reversal()
		.reverse(&ReversalRequest::new("api-user", "OEI2AK4Q16").remarks("Duplicate"))
		.await
		.expect("Reversal should succeed.");

	status.assert_calls_async(1).await;
	reversal.assert_calls_async(1).await;
}

#[tokio::test]
async fn stk_query_reuses_checkout_id_from_last_push() {
	let server = MockServer::start_async().await;
	let cache = scratch_cache("stk");
	let token = mock_token(&server, "ops-token", "3599").await;
	let push = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/mpesa/stkpush/v1/processrequest")
				.header("authorization", "Bearer ops-token");
			then.status(200).header("content-type", "application/json").body(
				r#"{"MerchantRequestID":"29115-34620561-1","CheckoutRequestID":"ws_CO_191220191020363925","ResponseCode":"0"}"#,
			);
		})
		.await;
	let query = server
		.mock_async(|when, then| {
			when.method(POST).path("/mpesa/stkpushquery/v1/query");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"ResponseCode":"0","ResultCode":"0","ResultDesc":"The service request is processed successfully."}"#);
		})
		.await;
	let client = client_for(&server, &cache);
	let mut stk = client.stk();

	stk.push(&StkPush::new(1, "0712345678", "https://example.com/cb"))
		.await
		.expect("STK push should succeed.");

	assert_eq!(
		stk.checkout_request_id().expect("Push response should carry a checkout id."),
		"ws_CO_191220191020363925"
	);

	let result = stk.query(None).await.expect("STK query should succeed.");

	assert_eq!(result["ResultCode"], "0");

	token.assert_calls_async(1).await;
	push.assert_calls_async(1).await;
	query.assert_calls_async(1).await;
}
