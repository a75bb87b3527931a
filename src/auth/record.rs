//! Persisted access-token record shared by every peer using the same cache location.

// self
use crate::{_prelude::*, auth::AccessToken};

/// Cached bearer token with its absolute expiry.
///
/// `expires_at` already includes the safety margin subtracted from the provider TTL, so a
/// record read as valid does not expire mid-flight. Timestamps are stored as whole epoch
/// seconds, which is the on-disk format:
/// `{"token": "...", "expires_at": 1700000000, "created_at": 1699996460}`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedToken {
	/// Bearer secret.
	pub token: AccessToken,
	/// Instant after which the record must not be used.
	#[serde(with = "time::serde::timestamp")]
	pub expires_at: OffsetDateTime,
	/// Instant the record was created.
	#[serde(with = "time::serde::timestamp")]
	pub created_at: OffsetDateTime,
}
impl CachedToken {
	/// Builds a record issued at `created_at` that stays valid for `ttl`.
	///
	/// Both instants are truncated to whole seconds so a persisted record reads back equal.
	pub fn issued(token: AccessToken, ttl: Duration, created_at: OffsetDateTime) -> Self {
		let created_at = truncate_to_seconds(created_at);
		let ttl = if ttl.is_negative() { Duration::ZERO } else { ttl };

		let expires_at = created_at.saturating_add(Duration::seconds(ttl.whole_seconds()));

		Self { token, expires_at, created_at }
	}

	/// Returns `true` when the record can be handed out at `now` (`now < expires_at`).
	pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
		!self.token.is_empty() && now < self.expires_at
	}

	/// Convenience helper that checks validity against the current UTC instant.
	pub fn is_valid(&self) -> bool {
		self.is_valid_at(OffsetDateTime::now_utc())
	}

	/// Remaining lifetime at `now`, clamped at zero.
	pub fn remaining_at(&self, now: OffsetDateTime) -> Duration {
		let remaining = self.expires_at - now;

		if remaining.is_negative() { Duration::ZERO } else { remaining }
	}
}
impl Debug for CachedToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CachedToken")
			.field("token", &"<redacted>")
			.field("expires_at", &self.expires_at)
			.field("created_at", &self.created_at)
			.finish()
	}
}

fn truncate_to_seconds(instant: OffsetDateTime) -> OffsetDateTime {
	instant - Duration::nanoseconds(i64::from(instant.nanosecond()))
}
