//! Transaction reversals.

// self
use crate::{
	_prelude::*,
	client::Mpesa,
	http::HttpTransport,
	operations::{self, Operation, keys},
	payload::Payload,
	services::{OperationRequest, insert_opt},
};

/// Reversal request for a completed transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReversalRequest {
	/// API operator username.
	pub initiator: String,
	/// Receipt number to reverse.
	pub transaction_id: String,
	/// Identifier type of the receiving short code; defaults to `11`.
	pub receiver_identifier_type: Option<String>,
	/// Free-text remarks.
	pub remarks: Option<String>,
	/// Free-text occasion.
	pub occasion: Option<String>,
}
impl ReversalRequest {
	/// Creates a reversal of `transaction_id`.
	pub fn new(initiator: impl Into<String>, transaction_id: impl Into<String>) -> Self {
		Self {
			initiator: initiator.into(),
			transaction_id: transaction_id.into(),
			receiver_identifier_type: None,
			remarks: None,
			occasion: None,
		}
	}

	/// Sets the receiver identifier type.
	pub fn receiver_identifier_type(mut self, value: impl Into<String>) -> Self {
		self.receiver_identifier_type = Some(value.into());

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
impl OperationRequest for ReversalRequest {
	const OPERATION: Operation = operations::REVERSAL;

	fn to_input(&self) -> Payload {
		let mut input = Payload::new();

		input.insert(keys::INITIATOR, self.initiator.as_str());
		input.insert(keys::TRANSACTION_ID, self.transaction_id.as_str());
		insert_opt(&mut input, keys::RECEIVER_IDENTIFIER_TYPE, &self.receiver_identifier_type);
		insert_opt(&mut input, keys::REMARKS, &self.remarks);
		insert_opt(&mut input, keys::OCCASION, &self.occasion);

		input
	}
}

/// Handle for reversals.
#[derive(Debug)]
pub struct ReversalService<'a, T>
where
	T: ?Sized + HttpTransport,
{
	client: &'a Mpesa<T>,
}
impl<'a, T> ReversalService<'a, T>
where
	T: ?Sized + HttpTransport,
{
	pub(crate) fn new(client: &'a Mpesa<T>) -> Self {
		Self { client }
	}

	/// Requests the reversal; the result arrives on the configured result URL.
	pub async fn reverse(&self, request: &ReversalRequest) -> Result<Value> {
		self.client.send(request).await
	}
}
