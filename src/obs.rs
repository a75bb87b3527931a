//! Optional observability helpers for token and request handling.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit spans named `mpesa_sdk.token` (with a `stage` field) and
//!   `mpesa_sdk.request` (with a `path` field), plus warning events when the cache degrades.
//! - Enable `metrics` to increment `mpesa_sdk_token_total` (labeled by `stage` + `outcome`)
//!   and `mpesa_sdk_request_total` (labeled by `path` + `outcome`).

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Stages of token handling observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
	/// Lock-free cache read.
	FastPath,
	/// Cache re-read after winning the refresh lock.
	Recheck,
	/// Network exchange with the token endpoint.
	Acquire,
	/// Cache write after a successful exchange.
	Persist,
	/// Cache removal after an authentication rejection.
	Invalidate,
}
impl Stage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Stage::FastPath => "fast_path",
			Stage::Recheck => "recheck",
			Stage::Acquire => "acquire",
			Stage::Persist => "persist",
			Stage::Invalidate => "invalidate",
		}
	}
}
impl Display for Stage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each stage or request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// Entry to a helper.
	Attempt,
	/// Cache produced a valid token.
	Hit,
	/// Cache was empty, stale, or corrupt.
	Miss,
	/// Request answered 401 and is being retried.
	Retry,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Attempt => "attempt",
			Outcome::Hit => "hit",
			Outcome::Miss => "miss",
			Outcome::Retry => "retry",
			Outcome::Success => "success",
			Outcome::Failure => "failure",
		}
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
