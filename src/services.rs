//! Typed request builders and per-product service handles.
//!
//! Every request type lowers to caller input for one [`Operation`]; the handle returned by
//! the matching [`Mpesa`](crate::Mpesa) accessor sends it through the shared executor.

pub mod b2c;
pub mod balance;
pub mod c2b;
pub mod reversal;
pub mod status;
pub mod stk;

pub use b2c::*;
pub use balance::*;
pub use c2b::*;
pub use reversal::*;
pub use status::*;
pub use stk::*;

// self
use crate::{_prelude::*, operations::Operation, payload::Payload};

/// A request bound to one Daraja operation.
pub trait OperationRequest {
	/// Operation the request targets.
	const OPERATION: Operation;

	/// Lowers the request to caller input keyed by wire names.
	fn to_input(&self) -> Payload;
}

/// Inserts `value` under `key` unless it is `None`.
pub(crate) fn insert_opt(input: &mut Payload, key: &'static str, value: &Option<String>) {
	if let Some(value) = value {
		input.insert(key, value.as_str());
	}
}

/// Inserts a Daraja amount as a JSON number.
pub(crate) fn insert_amount(input: &mut Payload, key: &'static str, amount: u64) {
	input.insert(key, Value::from(amount));
}
