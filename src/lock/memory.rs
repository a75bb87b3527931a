//! In-process [`RefreshLock`] for tests and single-process embeddings.

// self
use crate::{
	_prelude::*,
	error::LockError,
	lock::{CriticalSection, DEFAULT_POLL_INTERVAL, LockFuture, RefreshLock},
};

/// Async mutex polled with the same timeout semantics as [`FileLock`](super::FileLock).
#[derive(Clone, Debug, Default)]
pub struct MemoryLock(Arc<AsyncMutex<()>>);
impl RefreshLock for MemoryLock {
	fn serialize<'a>(
		&'a self,
		timeout: StdDuration,
		section: CriticalSection<'a>,
	) -> LockFuture<'a> {
		Box::pin(async move {
			let started = Instant::now();
			let _guard = loop {
				if let Some(guard) = self.0.try_lock() {
					break guard;
				}

				let waited = started.elapsed();

				if waited >= timeout {
					return Err(LockError::Timeout { path: PathBuf::from("memory"), waited }.into());
				}

				tokio::time::sleep(DEFAULT_POLL_INTERVAL.min(timeout - waited)).await;
			};

			section.await
		})
	}
}
