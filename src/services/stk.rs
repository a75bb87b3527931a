//! Lipa Na M-Pesa Online (STK push) and its status query.

// self
use crate::{
	_prelude::*,
	client::Mpesa,
	error::RequestError,
	http::HttpTransport,
	msisdn,
	operations::{self, Operation, keys},
	payload::Payload,
	services::{OperationRequest, insert_amount, insert_opt},
};

/// STK push request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StkPush {
	/// Whole-unit amount.
	pub amount: u64,
	/// Customer phone, normalized to `2547XXXXXXXX`.
	pub phone: String,
	/// Callback receiving the payment result.
	pub callback_url: String,
	/// Overrides `CustomerPayBillOnline`.
	pub transaction_type: Option<String>,
	/// Account reference shown to the customer; defaults to `Account`.
	pub account_reference: Option<String>,
	/// Description; defaults to `Transaction`.
	pub transaction_desc: Option<String>,
}
impl StkPush {
	/// Creates a push request; `phone` is normalized.
	pub fn new(amount: u64, phone: impl AsRef<str>, callback_url: impl Into<String>) -> Self {
		Self {
			amount,
			phone: msisdn::normalize(phone.as_ref()),
			callback_url: callback_url.into(),
			transaction_type: None,
			account_reference: None,
			transaction_desc: None,
		}
	}

	/// Sets the transaction type (`CustomerBuyGoodsOnline` for tills).
	pub fn transaction_type(mut self, value: impl Into<String>) -> Self {
		self.transaction_type = Some(value.into());

		self
	}

	/// Sets the account reference.
	pub fn account_reference(mut self, value: impl Into<String>) -> Self {
		self.account_reference = Some(value.into());

		self
	}

	/// Sets the transaction description.
	pub fn transaction_desc(mut self, value: impl Into<String>) -> Self {
		self.transaction_desc = Some(value.into());

		self
	}
}
impl OperationRequest for StkPush {
	const OPERATION: Operation = operations::STK_PUSH;

	fn to_input(&self) -> Payload {
		let mut input = Payload::new();

		insert_opt(&mut input, keys::TRANSACTION_TYPE, &self.transaction_type);
		insert_amount(&mut input, keys::AMOUNT, self.amount);
		input.insert(keys::PARTY_A, self.phone.as_str());
		input.insert(keys::CALLBACK_URL, self.callback_url.as_str());
		insert_opt(&mut input, keys::ACCOUNT_REFERENCE, &self.account_reference);
		insert_opt(&mut input, keys::TRANSACTION_DESC, &self.transaction_desc);

		input
	}
}

/// STK push status query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StkQuery {
	/// `CheckoutRequestID` returned by the push.
	pub checkout_request_id: String,
}
impl OperationRequest for StkQuery {
	const OPERATION: Operation = operations::STK_QUERY;

	fn to_input(&self) -> Payload {
		let mut input = Payload::new();

		input.insert(keys::CHECKOUT_REQUEST_ID, self.checkout_request_id.as_str());

		input
	}
}

/// Handle for STK push; remembers the last push response so it can be queried.
#[derive(Debug)]
pub struct StkService<'a, T>
where
	T: ?Sized + HttpTransport,
{
	client: &'a Mpesa<T>,
	last_response: Option<Value>,
}
impl<'a, T> StkService<'a, T>
where
	T: ?Sized + HttpTransport,
{
	pub(crate) fn new(client: &'a Mpesa<T>) -> Self {
		Self { client, last_response: None }
	}

	/// Prompts the customer's handset and records the response.
	pub async fn push(&mut self, request: &StkPush) -> Result<Value> {
		let response = self.client.send(request).await?;

		self.last_response = Some(response.clone());

		Ok(response)
	}

	/// Queries a push by `checkout_request_id`, or the last push when `None`.
	pub async fn query(&self, checkout_request_id: Option<&str>) -> Result<Value> {
		let checkout_request_id = match checkout_request_id {
			Some(id) => id.to_owned(),
			None => self.checkout_request_id()?.to_owned(),
		};

		self.client.send(&StkQuery { checkout_request_id }).await
	}

	/// `CheckoutRequestID` of the last successful push.
	pub fn checkout_request_id(&self) -> Result<&str, RequestError> {
		self.last_response
			.as_ref()
			.and_then(|response| response.get(keys::CHECKOUT_REQUEST_ID))
			.and_then(Value::as_str)
			.ok_or(RequestError::MissingResponseField { field: keys::CHECKOUT_REQUEST_ID })
	}

	/// Last push response, if any.
	pub fn last_response(&self) -> Option<&Value> {
		self.last_response.as_ref()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn push_input_normalizes_phone_and_omits_unset_optionals() {
		let input = StkPush::new(1, "0712345678", "https://example.com/cb")
			.account_reference("INV-7")
			.to_input();

		assert_eq!(input.get_str(keys::PARTY_A), Some("254712345678"));
		assert_eq!(input.get(keys::AMOUNT), Some(&Value::from(1)));
		assert_eq!(input.get_str(keys::ACCOUNT_REFERENCE), Some("INV-7"));
		assert!(input.get(keys::TRANSACTION_DESC).is_none());
		assert!(input.get(keys::TRANSACTION_TYPE).is_none());
	}
}
