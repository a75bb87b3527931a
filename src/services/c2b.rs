//! Customer-to-business URL registration and payment simulation.

// self
use crate::{
	_prelude::*,
	client::Mpesa,
	http::HttpTransport,
	msisdn,
	operations::{self, Operation, keys},
	payload::Payload,
	services::{OperationRequest, insert_amount, insert_opt},
};

/// Registers the confirmation and validation callbacks for the short code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterUrls {
	/// Confirmation callback.
	pub confirmation_url: String,
	/// Validation callback.
	pub validation_url: String,
	/// `Completed` (default) or `Cancelled` when validation is unreachable.
	pub response_type: Option<String>,
}
impl RegisterUrls {
	/// Creates a registration with the default response type.
	pub fn new(confirmation_url: impl Into<String>, validation_url: impl Into<String>) -> Self {
		Self {
			confirmation_url: confirmation_url.into(),
			validation_url: validation_url.into(),
			response_type: None,
		}
	}

	/// Overrides the response type.
	pub fn response_type(mut self, value: impl Into<String>) -> Self {
		self.response_type = Some(value.into());

		self
	}
}
impl OperationRequest for RegisterUrls {
	const OPERATION: Operation = operations::C2B_REGISTER;

	fn to_input(&self) -> Payload {
		let mut input = Payload::new();

		insert_opt(&mut input, keys::RESPONSE_TYPE, &self.response_type);
		input.insert(keys::CONFIRMATION_URL, self.confirmation_url.as_str());
		input.insert(keys::VALIDATION_URL, self.validation_url.as_str());

		input
	}
}

/// Simulates a customer payment (sandbox only).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulatePayment {
	/// Whole-unit amount.
	pub amount: u64,
	/// Paying customer, normalized.
	pub phone: String,
	/// Account number for paybills.
	pub bill_ref_number: Option<String>,
	/// Overrides `CustomerPayBillOnline`.
	pub command_id: Option<String>,
}
impl SimulatePayment {
	/// Creates a simulation; `phone` is normalized.
	pub fn new(amount: u64, phone: impl AsRef<str>) -> Self {
		Self {
			amount,
			phone: msisdn::normalize(phone.as_ref()),
			bill_ref_number: None,
			command_id: None,
		}
	}

	/// Sets the bill reference.
	pub fn bill_ref_number(mut self, value: impl Into<String>) -> Self {
		self.bill_ref_number = Some(value.into());

		self
	}

	/// Sets the command (`CustomerBuyGoodsOnline` for tills).
	pub fn command_id(mut self, value: impl Into<String>) -> Self {
		self.command_id = Some(value.into());

		self
	}
}
impl OperationRequest for SimulatePayment {
	const OPERATION: Operation = operations::C2B_SIMULATE;

	fn to_input(&self) -> Payload {
		let mut input = Payload::new();

		insert_opt(&mut input, keys::COMMAND_ID, &self.command_id);
		insert_amount(&mut input, keys::AMOUNT, self.amount);
		input.insert(keys::MSISDN, self.phone.as_str());
		insert_opt(&mut input, keys::BILL_REF_NUMBER, &self.bill_ref_number);

		input
	}
}

/// Handle for C2B operations.
#[derive(Debug)]
pub struct CustomerToBusinessService<'a, T>
where
	T: ?Sized + HttpTransport,
{
	client: &'a Mpesa<T>,
}
impl<'a, T> CustomerToBusinessService<'a, T>
where
	T: ?Sized + HttpTransport,
{
	pub(crate) fn new(client: &'a Mpesa<T>) -> Self {
		Self { client }
	}

	/// Registers the callback URLs.
	pub async fn register(&self, request: &RegisterUrls) -> Result<Value> {
		self.client.send(request).await
	}

	/// Simulates a payment.
	pub async fn simulate(&self, request: &SimulatePayment) -> Result<Value> {
		self.client.send(request).await
	}
}
