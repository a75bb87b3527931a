//! Cross-process refresh lock contracts.
//!
//! A [`RefreshLock`] serializes token refreshes between every peer configured with the same
//! cache location. Acquisition polls at a short fixed interval until it wins or the wait
//! budget runs out; the lock is always released before control returns to the caller, even
//! when the critical section fails.

pub mod file;
pub mod memory;

pub use file::FileLock;
pub use memory::MemoryLock;

// self
use crate::{_prelude::*, auth::AccessToken};

/// Interval between acquisition attempts.
pub const DEFAULT_POLL_INTERVAL: StdDuration = StdDuration::from_millis(50);

/// Work executed while the refresh lock is held.
pub type CriticalSection<'a> = Pin<Box<dyn Future<Output = Result<AccessToken>> + 'a + Send>>;
/// Boxed future returned by [`RefreshLock::serialize`].
pub type LockFuture<'a> = Pin<Box<dyn Future<Output = Result<AccessToken>> + 'a + Send>>;

/// Advisory mutual exclusion keyed by the cache location.
pub trait RefreshLock
where
	Self: Send + Sync,
{
	/// Waits up to `timeout` for exclusive ownership, runs `section`, then releases.
	///
	/// Fails with [`LockError::Timeout`](crate::error::LockError::Timeout) without running
	/// `section` when the lock stays contended for the whole budget.
	fn serialize<'a>(
		&'a self,
		timeout: StdDuration,
		section: CriticalSection<'a>,
	) -> LockFuture<'a>;
}
