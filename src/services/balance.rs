//! Account balance queries.

// self
use crate::{
	_prelude::*,
	client::Mpesa,
	http::HttpTransport,
	operations::{self, Operation, keys},
	payload::Payload,
	services::{OperationRequest, insert_opt},
};

/// Account balance query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountBalanceQuery {
	/// API operator username.
	pub initiator: String,
	/// Identifier type of the short code; defaults to `4`.
	pub identifier_type: Option<String>,
	/// Free-text remarks.
	pub remarks: Option<String>,
}
impl AccountBalanceQuery {
	/// Creates a query for the configured short code.
	pub fn new(initiator: impl Into<String>) -> Self {
		Self { initiator: initiator.into(), identifier_type: None, remarks: None }
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
}
impl OperationRequest for AccountBalanceQuery {
	const OPERATION: Operation = operations::ACCOUNT_BALANCE;

	fn to_input(&self) -> Payload {
		let mut input = Payload::new();

		input.insert(keys::INITIATOR, self.initiator.as_str());
		insert_opt(&mut input, keys::IDENTIFIER_TYPE, &self.identifier_type);
		insert_opt(&mut input, keys::REMARKS, &self.remarks);

		input
	}
}

/// Handle for balance queries.
#[derive(Debug)]
pub struct AccountBalanceService<'a, T>
where
	T: ?Sized + HttpTransport,
{
	client: &'a Mpesa<T>,
}
impl<'a, T> AccountBalanceService<'a, T>
where
	T: ?Sized + HttpTransport,
{
	pub(crate) fn new(client: &'a Mpesa<T>) -> Self {
		Self { client }
	}

	/// Requests the balance; the result arrives on the configured result URL.
	pub async fn query(&self, request: &AccountBalanceQuery) -> Result<Value> {
		self.client.send(request).await
	}
}
