//! Access-token orchestration over a shared cache.
//!
//! [`TokenManager::access_token`] walks a small state machine per call:
//!
//! ```text
//! FastPath ──valid──▶ return
//!    │ miss / stale / corrupt
//!    ▼
//! Lock (bounded wait) ──timeout──▶ LockError::Timeout
//!    ▼
//! Recheck ──valid──▶ release, return      (another peer refreshed while we waited)
//!    │ miss
//!    ▼
//! Acquire ─▶ Persist ─▶ release, return
//! ```
//!
//! The fast path never touches the lock, so warm caches serve any number of readers in
//! parallel. Only the first of N waiters to win the lock calls the token endpoint; the rest
//! observe the record it wrote during their recheck.

pub mod acquirer;

pub use acquirer::*;

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, CachedToken},
	config::MpesaConfig,
	http::HttpTransport,
	lock::{FileLock, RefreshLock},
	obs::{self, ObsSpan, Outcome, Stage},
	store::{self, CacheLocation, CacheRead, TokenStore},
};

/// Composes the cache store, refresh lock, and acquirer.
pub struct TokenManager<T>
where
	T: ?Sized + HttpTransport,
{
	acquirer: TokenAcquirer<T>,
	store: Arc<dyn TokenStore>,
	lock: Arc<dyn RefreshLock>,
	lock_timeout: StdDuration,
}
impl<T> TokenManager<T>
where
	T: ?Sized + HttpTransport,
{
	/// Builds a manager whose store and lock are derived from the configured cache path.
	pub fn from_config(config: &MpesaConfig, transport: Arc<T>) -> Result<Self> {
		let location = config.cache_location();
		let lock: Arc<dyn RefreshLock> = Arc::new(FileLock::for_location(&location));
		let acquirer =
			TokenAcquirer::new(transport, config.token_endpoint()?, config.credentials());

		Ok(Self::with_parts(acquirer, store::open(location), lock, config.lock_timeout))
	}

	/// Builds a manager from explicit parts (custom stores, in-memory fakes).
	pub fn with_parts(
		acquirer: TokenAcquirer<T>,
		store: Arc<dyn TokenStore>,
		lock: Arc<dyn RefreshLock>,
		lock_timeout: StdDuration,
	) -> Self {
		Self { acquirer, store, lock, lock_timeout }
	}

	/// Resolved cache location shared with peers.
	pub fn location(&self) -> &CacheLocation {
		self.store.location()
	}

	/// Returns a valid access token, refreshing it under the lock when needed.
	///
	/// A refresh whose result cannot be persisted fails with [`Error::Persistence`], which
	/// still carries the fresh token for the immediate caller.
	pub async fn access_token(&self) -> Result<AccessToken> {
		if let Some(record) = self.probe(Stage::FastPath).await {
			return Ok(record.token);
		}

		self.lock.serialize(self.lock_timeout, Box::pin(self.refresh_locked())).await
	}

	/// Forces a refresh under the lock, skipping the cache checks.
	pub async fn refresh(&self) -> Result<AccessToken> {
		self.lock.serialize(self.lock_timeout, Box::pin(self.acquire_and_persist())).await
	}

	/// Removes the cached record so the next call refreshes.
	///
	/// Does not take the lock: writers replace the record atomically, so racing a writer
	/// at worst discards a token that the next caller refreshes again.
	pub async fn invalidate(&self) -> Result<()> {
		const STAGE: Stage = Stage::Invalidate;

		let result = self.store.clear().await.map_err(Error::from);

		match &result {
			Ok(()) => obs::record_token_outcome(STAGE, Outcome::Success),
			Err(_) => obs::record_token_outcome(STAGE, Outcome::Failure),
		}

		result
	}

	async fn refresh_locked(&self) -> Result<AccessToken> {
		if let Some(record) = self.probe(Stage::Recheck).await {
			return Ok(record.token);
		}

		self.acquire_and_persist().await
	}

	async fn acquire_and_persist(&self) -> Result<AccessToken> {
		let issued_at = OffsetDateTime::now_utc();
		let grant = self.acquirer.acquire().await?;
		let record = CachedToken::issued(grant.token, grant.ttl, issued_at);
		let span = ObsSpan::token(Stage::Persist);

		match span.instrument(self.store.write(record.clone())).await {
			Ok(()) => {
				obs::record_token_outcome(Stage::Persist, Outcome::Success);

				Ok(record.token)
			},
			Err(source) => {
				obs::record_token_outcome(Stage::Persist, Outcome::Failure);
				obs::persistence_failed(self.store.location(), &source);

				Err(Error::Persistence { source, token: record.token })
			},
		}
	}

	async fn probe(&self, stage: Stage) -> Option<CachedToken> {
		let read = ObsSpan::token(stage).instrument(self.store.read()).await;

		if let CacheRead::Corrupt { reason } = &read {
			obs::cache_degraded(self.store.location(), reason);
		}

		match read.valid_at(OffsetDateTime::now_utc()) {
			Some(record) => {
				obs::record_token_outcome(stage, Outcome::Hit);

				Some(record)
			},
			None => {
				obs::record_token_outcome(stage, Outcome::Miss);

				None
			},
		}
	}
}
impl<T> Debug for TokenManager<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenManager")
			.field("acquirer", &self.acquirer)
			.field("location", self.store.location())
			.field("lock_timeout", &self.lock_timeout)
			.finish()
	}
}
