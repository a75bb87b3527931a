//! Advisory file lock shared across processes.

// std
use std::fs::{self, File, OpenOptions};
// crates.io
use fd_lock::RwLock as FdLock;
// self
use crate::{
	_prelude::*,
	error::LockError,
	lock::{CriticalSection, DEFAULT_POLL_INTERVAL, LockFuture, RefreshLock},
	store::CacheLocation,
};

/// Exclusive advisory lock on an empty sentinel file.
///
/// Every acquisition opens its own handle, so peers in the same process contend exactly
/// like peers in different processes.
#[derive(Clone, Debug)]
pub struct FileLock {
	path: PathBuf,
	poll_interval: StdDuration,
}
impl FileLock {
	/// Creates a lock on the sentinel file at `path`.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into(), poll_interval: DEFAULT_POLL_INTERVAL }
	}

	/// Creates the lock that guards `location`.
	pub fn for_location(location: &CacheLocation) -> Self {
		Self::new(location.lock_path())
	}

	/// Overrides the polling interval (defaults to 50 ms).
	pub fn with_poll_interval(mut self, interval: StdDuration) -> Self {
		self.poll_interval = interval;

		self
	}

	/// Path of the sentinel file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn open(&self) -> Result<File, LockError> {
		if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
			let _ = fs::create_dir_all(parent);
		}

		OpenOptions::new()
			.create(true)
			.truncate(false)
			.write(true)
			.open(&self.path)
			.map_err(|source| LockError::Io { path: self.path.clone(), source })
	}
}
impl RefreshLock for FileLock {
	fn serialize<'a>(
		&'a self,
		timeout: StdDuration,
		section: CriticalSection<'a>,
	) -> LockFuture<'a> {
		Box::pin(async move {
			let mut lock = FdLock::new(self.open()?);
			let started = Instant::now();
			let _guard = loop {
				match lock.try_write() {
					Ok(guard) => break guard,
					Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {},
					Err(source) =>
						return Err(LockError::Io { path: self.path.clone(), source }.into()),
				}

				let waited = started.elapsed();

				if waited >= timeout {
					return Err(LockError::Timeout { path: self.path.clone(), waited }.into());
				}

				tokio::time::sleep(self.poll_interval.min(timeout - waited)).await;
			};

			section.await
		})
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// self
	use super::*;
	use crate::{auth::AccessToken, error::Error};

	fn lock_path(tag: &str) -> PathBuf {
		env::temp_dir().join(format!(
			"mpesa_sdk_file_lock_{tag}_{}_{}.lock",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		))
	}

	#[tokio::test]
	async fn contended_lock_times_out_without_running_section() {
		let path = lock_path("timeout");
		let holder = FileLock::new(&path);
		let waiter = FileLock::new(&path).with_poll_interval(StdDuration::from_millis(5));
		let (entered_tx, entered_rx) = tokio::sync::oneshot::channel::<()>();
		let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
		let held = tokio::spawn(async move {
			holder
				.serialize(
					StdDuration::from_secs(1),
					Box::pin(async move {
						let _ = entered_tx.send(());
						let _ = release_rx.await;

						Ok(AccessToken::new("holder"))
					}),
				)
				.await
		});

		entered_rx.await.expect("Holder should enter its critical section.");

		let ran = Arc::new(Mutex::new(false));
		let ran_flag = ran.clone();
		let err = waiter
			.serialize(
				StdDuration::from_millis(60),
				Box::pin(async move {
					*ran_flag.lock() = true;

					Ok(AccessToken::new("waiter"))
				}),
			)
			.await
			.expect_err("Contended lock should time out.");

		assert!(matches!(err, Error::Lock(LockError::Timeout { .. })));
		assert!(!*ran.lock());

		let _ = release_tx.send(());
		let token = held
			.await
			.expect("Holder task should not panic.")
			.expect("Holder should finish its critical section.");

		assert_eq!(token.expose(), "holder");

		let token = waiter
			.serialize(StdDuration::from_millis(200), Box::pin(async { Ok(AccessToken::new("next")) }))
			.await
			.expect("Released lock should be acquirable.");

		assert_eq!(token.expose(), "next");
	}

	#[tokio::test]
	async fn lock_is_released_when_section_fails() {
		let lock = FileLock::new(lock_path("release"));
		let err = lock
			.serialize(
				StdDuration::from_millis(100),
				Box::pin(async {
					Err(crate::error::RequestError::MissingField { field: "Amount" }.into())
				}),
			)
			.await
			.expect_err("Section failure should propagate.");

		assert!(matches!(err, Error::Request(_)));

		lock.serialize(StdDuration::from_millis(100), Box::pin(async { Ok(AccessToken::new("ok")) }))
			.await
			.expect("Lock should be free after a failed section.");
	}
}
