//! Table-driven request definitions for the Daraja business endpoints.
//!
//! Each [`Operation`] lists its wire fields in order together with where each value comes
//! from. [`Operation::build`] turns caller-supplied values plus the client configuration into
//! a [`Payload`], failing with [`RequestError::MissingField`] before any network call when a
//! required value is absent or empty. Only presence is checked; amounts, phone numbers, and
//! URLs are not validated beyond that.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use time::{
	UtcOffset,
	format_description::BorrowedFormatItem,
	macros::{format_description, offset},
};
// self
use crate::{
	_prelude::*, config::MpesaConfig, error::RequestError, payload::Payload,
	security::SecurityCredentialProvider,
};

/// Daraja timestamps are read on East Africa Time.
pub const PROVIDER_OFFSET: UtcOffset = offset!(+3);

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
	format_description!("[year][month][day][hour][minute][second]");

/// Wire keys shared by the request builders.
pub mod keys {
	#![allow(missing_docs)]

	pub const ACCOUNT_REFERENCE: &str = "AccountReference";
	pub const AMOUNT: &str = "Amount";
	pub const BILL_REF_NUMBER: &str = "BillRefNumber";
	pub const BUSINESS_SHORT_CODE: &str = "BusinessShortCode";
	pub const CALLBACK_URL: &str = "CallBackURL";
	pub const CHECKOUT_REQUEST_ID: &str = "CheckoutRequestID";
	pub const COMMAND_ID: &str = "CommandID";
	pub const CONFIRMATION_URL: &str = "ConfirmationURL";
	pub const IDENTIFIER_TYPE: &str = "IdentifierType";
	pub const INITIATOR: &str = "Initiator";
	pub const INITIATOR_NAME: &str = "InitiatorName";
	pub const MSISDN: &str = "Msisdn";
	/// Misspelled on the wire; Daraja expects exactly this key.
	pub const OCCASION: &str = "Occassion";
	pub const PARTY_A: &str = "PartyA";
	pub const PARTY_B: &str = "PartyB";
	pub const PASSWORD: &str = "Password";
	pub const PHONE_NUMBER: &str = "PhoneNumber";
	pub const QUEUE_TIMEOUT_URL: &str = "QueueTimeOutURL";
	pub const RECEIVER_IDENTIFIER_TYPE: &str = "ReceiverIdentifierType";
	pub const RECEIVER_PARTY: &str = "ReceiverParty";
	pub const REMARKS: &str = "Remarks";
	pub const RESPONSE_TYPE: &str = "ResponseType";
	pub const RESULT_URL: &str = "ResultURL";
	pub const SECURITY_CREDENTIAL: &str = "SecurityCredential";
	pub const SHORT_CODE: &str = "ShortCode";
	pub const TIMESTAMP: &str = "Timestamp";
	pub const TRANSACTION_DESC: &str = "TransactionDesc";
	pub const TRANSACTION_ID: &str = "TransactionID";
	pub const TRANSACTION_TYPE: &str = "TransactionType";
	pub const VALIDATION_URL: &str = "ValidationURL";
}

use keys::*;

/// Configuration value a field falls back to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigKey {
	/// [`MpesaConfig::business_short_code`].
	ShortCode,
	/// [`MpesaConfig::result_url`].
	ResultUrl,
	/// [`MpesaConfig::queue_timeout_url`].
	QueueTimeoutUrl,
}
impl ConfigKey {
	fn lookup(self, config: &MpesaConfig) -> &str {
		match self {
			Self::ShortCode => &config.business_short_code,
			Self::ResultUrl => &config.result_url,
			Self::QueueTimeoutUrl => &config.queue_timeout_url,
		}
	}
}

/// Where a wire field's value comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
	/// Caller must supply a non-empty value.
	Required,
	/// Caller value, or the given default when absent or empty.
	Default(&'static str),
	/// Constant; caller values are ignored.
	Fixed(&'static str),
	/// Caller value, or the configuration value; one of them must be non-empty.
	Config(ConfigKey),
	/// Caller value, or a copy of an earlier field in the same payload.
	Mirror(&'static str),
	/// `base64(short code + pass key + timestamp)`.
	Password,
	/// `YYYYMMDDHHMMSS` on [`PROVIDER_OFFSET`]; shared with [`Source::Password`].
	Timestamp,
	/// Caller value, or the configured seed run through the credential provider.
	SecurityCredential,
}

/// One wire field of an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
	/// Wire key.
	pub key: &'static str,
	/// Value source.
	pub source: Source,
}
impl Field {
	const fn new(key: &'static str, source: Source) -> Self {
		Self { key, source }
	}
}

/// Inputs shared by every field while a payload is assembled.
#[derive(Clone, Copy)]
pub struct BuildContext<'a> {
	/// Client configuration.
	pub config: &'a MpesaConfig,
	/// Security credential strategy.
	pub credentials: &'a dyn SecurityCredentialProvider,
	/// Instant the timestamp and password are derived from.
	pub now: OffsetDateTime,
}
impl Debug for BuildContext<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BuildContext").field("config", self.config).field("now", &self.now).finish()
	}
}

/// A Daraja business endpoint and its payload layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Operation {
	/// Stable operation name.
	pub name: &'static str,
	/// Endpoint path appended to the base URL.
	pub path: &'static str,
	/// Wire fields in payload order.
	pub fields: &'static [Field],
}
impl Operation {
	/// Assembles the payload from caller `input` and `ctx`.
	///
	/// Caller keys that the table does not list are appended after the table fields.
	pub fn build(&self, input: &Payload, ctx: &BuildContext) -> Result<Payload, RequestError> {
		let timestamp = format_timestamp(ctx.now)?;
		let mut payload = Payload::new();

		for field in self.fields {
			let value = match field.source {
				Source::Required => caller(input, field.key)
					.cloned()
					.ok_or(RequestError::MissingField { field: field.key })?,
				Source::Default(default) =>
					caller(input, field.key).cloned().unwrap_or_else(|| default.into()),
				Source::Fixed(value) => value.into(),
				Source::Config(key) => match caller(input, field.key) {
					Some(value) => value.clone(),
					None => non_empty(key.lookup(ctx.config), field.key)?.into(),
				},
				Source::Mirror(from) => caller(input, field.key)
					.or_else(|| payload.get(from))
					.cloned()
					.ok_or(RequestError::MissingField { field: field.key })?,
				Source::Password => {
					let short_code = payload
						.get_str(BUSINESS_SHORT_CODE)
						.map(ToOwned::to_owned)
						.unwrap_or_else(|| ctx.config.business_short_code.clone());
					let short_code = non_empty(&short_code, BUSINESS_SHORT_CODE)?;
					let pass_key = non_empty(&ctx.config.pass_key, field.key)?;

					stk_password(short_code, pass_key, &timestamp).into()
				},
				Source::Timestamp => timestamp.clone().into(),
				Source::SecurityCredential => match caller(input, field.key) {
					Some(value) => value.clone(),
					None => ctx.credentials.credential(&ctx.config.security_credential)?.into(),
				},
			};

			payload.insert(field.key, value);
		}
		for (key, value) in input.iter() {
			if payload.get(key).is_none() {
				payload.insert(key, value.clone());
			}
		}

		Ok(payload)
	}
}

/// STK push: prompts the customer's handset for their PIN.
pub const STK_PUSH: Operation = Operation {
	name: "stk_push",
	path: "/mpesa/stkpush/v1/processrequest",
	fields: &[
		Field::new(BUSINESS_SHORT_CODE, Source::Config(ConfigKey::ShortCode)),
		Field::new(PASSWORD, Source::Password),
		Field::new(TIMESTAMP, Source::Timestamp),
		Field::new(TRANSACTION_TYPE, Source::Default("CustomerPayBillOnline")),
		Field::new(AMOUNT, Source::Required),
		Field::new(PARTY_A, Source::Required),
		Field::new(PARTY_B, Source::Mirror(BUSINESS_SHORT_CODE)),
		Field::new(PHONE_NUMBER, Source::Mirror(PARTY_A)),
		Field::new(CALLBACK_URL, Source::Required),
		Field::new(ACCOUNT_REFERENCE, Source::Default("Account")),
		Field::new(TRANSACTION_DESC, Source::Default("Transaction")),
	],
};
/// STK push status query.
pub const STK_QUERY: Operation = Operation {
	name: "stk_query",
	path: "/mpesa/stkpushquery/v1/query",
	fields: &[
		Field::new(BUSINESS_SHORT_CODE, Source::Config(ConfigKey::ShortCode)),
		Field::new(PASSWORD, Source::Password),
		Field::new(TIMESTAMP, Source::Timestamp),
		Field::new(CHECKOUT_REQUEST_ID, Source::Required),
	],
};
/// C2B confirmation/validation URL registration.
pub const C2B_REGISTER: Operation = Operation {
	name: "c2b_register",
	path: "/mpesa/c2b/v2/registerurl",
	fields: &[
		Field::new(SHORT_CODE, Source::Config(ConfigKey::ShortCode)),
		Field::new(RESPONSE_TYPE, Source::Default("Completed")),
		Field::new(CONFIRMATION_URL, Source::Required),
		Field::new(VALIDATION_URL, Source::Required),
	],
};
/// C2B payment simulation (sandbox).
pub const C2B_SIMULATE: Operation = Operation {
	name: "c2b_simulate",
	path: "/mpesa/c2b/v1/simulate",
	fields: &[
		Field::new(SHORT_CODE, Source::Config(ConfigKey::ShortCode)),
		Field::new(COMMAND_ID, Source::Default("CustomerPayBillOnline")),
		Field::new(AMOUNT, Source::Required),
		Field::new(MSISDN, Source::Required),
		Field::new(BILL_REF_NUMBER, Source::Default("")),
	],
};
/// B2C payment request.
pub const B2C_PAYMENT: Operation = Operation {
	name: "b2c_payment",
	path: "/mpesa/b2c/v1/paymentrequest",
	fields: &[
		Field::new(INITIATOR_NAME, Source::Required),
		Field::new(SECURITY_CREDENTIAL, Source::SecurityCredential),
		Field::new(COMMAND_ID, Source::Default("BusinessPayment")),
		Field::new(AMOUNT, Source::Required),
		Field::new(PARTY_A, Source::Config(ConfigKey::ShortCode)),
		Field::new(PARTY_B, Source::Required),
		Field::new(REMARKS, Source::Default("")),
		Field::new(QUEUE_TIMEOUT_URL, Source::Config(ConfigKey::QueueTimeoutUrl)),
		Field::new(RESULT_URL, Source::Config(ConfigKey::ResultUrl)),
		Field::new(OCCASION, Source::Default("")),
	],
};
/// Transaction status query.
pub const TRANSACTION_STATUS: Operation = Operation {
	name: "transaction_status",
	path: "/mpesa/transactionstatus/v1/query",
	fields: &[
		Field::new(INITIATOR, Source::Required),
		Field::new(SECURITY_CREDENTIAL, Source::SecurityCredential),
		Field::new(COMMAND_ID, Source::Fixed("TransactionStatusQuery")),
		Field::new(TRANSACTION_ID, Source::Required),
		Field::new(PARTY_A, Source::Config(ConfigKey::ShortCode)),
		Field::new(IDENTIFIER_TYPE, Source::Default("4")),
		Field::new(RESULT_URL, Source::Config(ConfigKey::ResultUrl)),
		Field::new(QUEUE_TIMEOUT_URL, Source::Config(ConfigKey::QueueTimeoutUrl)),
		Field::new(REMARKS, Source::Default("")),
		Field::new(OCCASION, Source::Default("")),
	],
};
/// Account balance query.
pub const ACCOUNT_BALANCE: Operation = Operation {
	name: "account_balance",
	path: "/mpesa/accountbalance/v1/query",
	fields: &[
		Field::new(INITIATOR, Source::Required),
		Field::new(SECURITY_CREDENTIAL, Source::SecurityCredential),
		Field::new(COMMAND_ID, Source::Fixed("AccountBalance")),
		Field::new(PARTY_A, Source::Config(ConfigKey::ShortCode)),
		Field::new(IDENTIFIER_TYPE, Source::Default("4")),
		Field::new(REMARKS, Source::Default("")),
		Field::new(QUEUE_TIMEOUT_URL, Source::Config(ConfigKey::QueueTimeoutUrl)),
		Field::new(RESULT_URL, Source::Config(ConfigKey::ResultUrl)),
	],
};
/// Transaction reversal request.
pub const REVERSAL: Operation = Operation {
	name: "reversal",
	path: "/mpesa/reversal/v1/request",
	fields: &[
		Field::new(INITIATOR, Source::Required),
		Field::new(SECURITY_CREDENTIAL, Source::SecurityCredential),
		Field::new(COMMAND_ID, Source::Fixed("TransactionReversal")),
		Field::new(TRANSACTION_ID, Source::Required),
		Field::new(RECEIVER_PARTY, Source::Config(ConfigKey::ShortCode)),
		Field::new(RECEIVER_IDENTIFIER_TYPE, Source::Default("11")),
		Field::new(RESULT_URL, Source::Config(ConfigKey::ResultUrl)),
		Field::new(QUEUE_TIMEOUT_URL, Source::Config(ConfigKey::QueueTimeoutUrl)),
		Field::new(REMARKS, Source::Default("")),
		Field::new(OCCASION, Source::Default("")),
	],
};

/// Every operation the client knows, in documentation order.
pub const ALL: [Operation; 8] = [
	STK_PUSH,
	STK_QUERY,
	C2B_REGISTER,
	C2B_SIMULATE,
	B2C_PAYMENT,
	TRANSACTION_STATUS,
	ACCOUNT_BALANCE,
	REVERSAL,
];

/// Formats `now` as the provider's `YYYYMMDDHHMMSS` timestamp.
pub fn format_timestamp(now: OffsetDateTime) -> Result<String, RequestError> {
	now.to_offset(PROVIDER_OFFSET)
		.format(TIMESTAMP_FORMAT)
		.map_err(|e| RequestError::Timestamp { message: e.to_string() })
}

/// Computes the Lipa Na M-Pesa Online password.
pub fn stk_password(short_code: &str, pass_key: &str, timestamp: &str) -> String {
	STANDARD.encode(format!("{short_code}{pass_key}{timestamp}"))
}

fn caller<'a>(input: &'a Payload, key: &str) -> Option<&'a Value> {
	input.get(key).filter(|value| !is_blank(value))
}

fn is_blank(value: &Value) -> bool {
	match value {
		Value::Null => true,
		Value::String(s) => s.trim().is_empty(),
		_ => false,
	}
}

fn non_empty<'a>(value: &'a str, field: &'static str) -> Result<&'a str, RequestError> {
	if value.trim().is_empty() { Err(RequestError::MissingField { field }) } else { Ok(value) }
}
