//! Transaction status queries.

// self
use crate::{
	_prelude::*,
	client::Mpesa,
	http::HttpTransport,
	operations::{self, Operation, keys},
	payload::Payload,
	services::{OperationRequest, insert_opt},
};

/// Transaction status query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionStatusQuery {
	/// API operator username.
	pub initiator: String,
	/// M-Pesa receipt number.
	pub transaction_id: String,
	/// Identifier type of the short code; defaults to `4`.
	pub identifier_type: Option<String>,
	/// Free-text remarks.
	pub remarks: Option<String>,
	/// Free-text occasion.
	pub occasion: Option<String>,
}
impl TransactionStatusQuery {
	/// Creates a query for `transaction_id`.
	pub fn new(initiator: impl Into<String>, transaction_id: impl Into<String>) -> Self {
		Self {
			initiator: initiator.into(),
			transaction_id: transaction_id.into(),
			identifier_type: None,
			remarks: None,
			occasion: None,
		}
	}

	/// Sets the identifier type.
	pub fn identifier_type(mut self, value: impl Into<String>) -> Self {
		self.identifier_type = Some(value.into());

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
impl OperationRequest for TransactionStatusQuery {
	const OPERATION: Operation = operations::TRANSACTION_STATUS;

	fn to_input(&self) -> Payload {
		let mut input = Payload::new();

		input.insert(keys::INITIATOR, self.initiator.as_str());
		input.insert(keys::TRANSACTION_ID, self.transaction_id.as_str());
		insert_opt(&mut input, keys::IDENTIFIER_TYPE, &self.identifier_type);
		insert_opt(&mut input, keys::REMARKS, &self.remarks);
		insert_opt(&mut input, keys::OCCASION, &self.occasion);

		input
	}
}

/// Handle for status queries.
#[derive(Debug)]
pub struct TransactionStatusService<'a, T>
where
	T: ?Sized + HttpTransport,
{
	client: &'a Mpesa<T>,
}
impl<'a, T> TransactionStatusService<'a, T>
where
	T: ?Sized + HttpTransport,
{
	pub(crate) fn new(client: &'a Mpesa<T>) -> Self {
		Self { client }
	}

	/// Requests the status; the result arrives on the configured result URL.
	pub async fn query(&self, request: &TransactionStatusQuery) -> Result<Value> {
		self.client.send(request).await
	}
}
