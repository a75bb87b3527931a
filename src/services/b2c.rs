//! Business-to-customer payments.

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

/// B2C payment request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct B2cPayment {
	/// API operator username.
	pub initiator_name: String,
	/// Whole-unit amount.
	pub amount: u64,
	/// Receiving customer, normalized.
	pub phone: String,
	/// `BusinessPayment` (default), `SalaryPayment`, or `PromotionPayment`.
	pub command_id: Option<String>,
	/// Free-text remarks.
	pub remarks: Option<String>,
	/// Free-text occasion.
	pub occasion: Option<String>,
}
impl B2cPayment {
	/// Creates a payment; `phone` is normalized.
	pub fn new(initiator_name: impl Into<String>, amount: u64, phone: impl AsRef<str>) -> Self {
		Self {
			initiator_name: initiator_name.into(),
			amount,
			phone: msisdn::normalize(phone.as_ref()),
			command_id: None,
			remarks: None,
			occasion: None,
		}
	}

	/// Sets the command.
	pub fn command_id(mut self, value: impl Into<String>) -> Self {
		self.command_id = Some(value.into());

		self
	}

	/// Sets the remarks.
	pub fn remarks(mut self, value: impl Into<String>) -> Self {
		self.remarks = Some(value.into());

		self
	}

	/// Sets the occasion.
	pub fn occasion(mut self, value: impl Into<String>) -> Self {
		self.occasion = Some(value.into());

		self
	}
}
impl OperationRequest for B2cPayment {
	const OPERATION: Operation = operations::B2C_PAYMENT;

	fn to_input(&self) -> Payload {
		let mut input = Payload::new();

		input.insert(keys::INITIATOR_NAME, self.initiator_name.as_str());
		insert_opt(&mut input, keys::COMMAND_ID, &self.command_id);
		insert_amount(&mut input, keys::AMOUNT, self.amount);
		input.insert(keys::PARTY_B, self.phone.as_str());
		insert_opt(&mut input, keys::REMARKS, &self.remarks);
		insert_opt(&mut input, keys::OCCASION, &self.occasion);

		input
	}
}

/// Handle for B2C payments.
#[derive(Debug)]
pub struct BusinessToCustomerService<'a, T>
where
	T: ?Sized + HttpTransport,
{
	client: &'a Mpesa<T>,
}
impl<'a, T> BusinessToCustomerService<'a, T>
where
	T: ?Sized + HttpTransport,
{
	pub(crate) fn new(client: &'a Mpesa<T>) -> Self {
		Self { client }
	}

	/// Sends the payment request.
	pub async fn pay(&self, request: &B2cPayment) -> Result<Value> {
		self.client.send(request).await
	}
}
