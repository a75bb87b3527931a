//! Token cache storage contract, cache-location resolution, and built-in stores.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// std
use std::env;
// crates.io
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, auth::CachedToken};

/// File name used when no cache location is configured, or for bare file names.
pub const DEFAULT_CACHE_FILE: &str = "mpesa_api_token_cache.json";

/// Boxed future returned by fallible [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;
/// Boxed future returned by [`TokenStore::read`], which never fails.
pub type ReadFuture<'a> = Pin<Box<dyn Future<Output = CacheRead> + 'a + Send>>;

/// Storage backend holding at most one cached token record.
///
/// Stores are shared external resources: every peer configured with the same
/// [`CacheLocation`] reads and writes the same record.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Location this store persists to; peers with equal locations share a record.
	fn location(&self) -> &CacheLocation;

	/// Loads the persisted record. Unreadable or unparsable content is never an error.
	fn read(&self) -> ReadFuture<'_>;

	/// Persists `record` so concurrent readers never observe a partial write.
	fn write(&self, record: CachedToken) -> StoreFuture<'_, ()>;

	/// Removes the persisted record; a missing record is not an error.
	fn clear(&self) -> StoreFuture<'_, ()>;
}

/// Result of reading the cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheRead {
	/// A well-formed record was found (it may already be expired).
	Hit(CachedToken),
	/// Nothing is persisted, or the record could not be read.
	NotFound,
	/// The record exists but could not be parsed.
	Corrupt {
		/// Parser or validation message.
		reason: String,
	},
}
impl CacheRead {
	/// Returns the record when it is valid at `now`.
	pub fn valid_at(self, now: OffsetDateTime) -> Option<CachedToken> {
		match self {
			Self::Hit(record) if record.is_valid_at(now) => Some(record),
			_ => None,
		}
	}
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Record could not be serialized.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure (permissions, disk full, rename failure).
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Resolved destination of the token cache.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CacheLocation {
	/// Real filesystem path; written via temp file + atomic rename.
	Path(PathBuf),
	/// Non-filesystem locator (`scheme://...`); kept in process under an exclusive lock.
	Locator(String),
}
impl CacheLocation {
	/// Resolves a configured cache path against the process temp and working directories.
	///
	/// - empty → `<temp>/mpesa_api_token_cache.json`
	/// - `scheme://...` → locator, verbatim
	/// - absolute path → verbatim
	/// - bare file name → `<temp>/<name>`
	/// - any other relative path → `<cwd>/<path>`
	pub fn resolve(configured: &str) -> Self {
		let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

		Self::resolve_in(configured, &env::temp_dir(), &cwd)
	}

	/// Same as [`resolve`](Self::resolve) with explicit temp and working directories.
	pub fn resolve_in(configured: &str, temp_dir: &Path, cwd: &Path) -> Self {
		if configured.trim().is_empty() {
			return Self::Path(temp_dir.join(DEFAULT_CACHE_FILE));
		}
		if is_locator(configured) {
			return Self::Locator(configured.to_owned());
		}

		let path = Path::new(configured);

		if path.is_absolute() {
			return Self::Path(path.to_path_buf());
		}

		let has_directory = path.parent().is_some_and(|parent| !parent.as_os_str().is_empty());

		if has_directory { Self::Path(cwd.join(path)) } else { Self::Path(temp_dir.join(path)) }
	}

	/// Path of the companion lock file peers contend on.
	///
	/// Filesystem caches lock `<path>.lock`; locators lock a temp-directory file named after
	/// the SHA-256 of the locator so peers agree on its identity.
	pub fn lock_path(&self) -> PathBuf {
		match self {
			Self::Path(path) => {
				let mut raw = path.as_os_str().to_owned();

				raw.push(".lock");

				PathBuf::from(raw)
			},
			Self::Locator(locator) => {
				let digest = Sha256::digest(locator.as_bytes());
				let name = digest.iter().take(16).fold(String::with_capacity(32), |mut acc, b| {
					acc.push_str(&format!("{b:02x}"));

					acc
				});

				env::temp_dir().join(format!("mpesa_token_{name}.lock"))
			},
		}
	}
}
impl Display for CacheLocation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Path(path) => write!(f, "{}", path.display()),
			Self::Locator(locator) => f.write_str(locator),
		}
	}
}

fn is_locator(value: &str) -> bool {
	match value.split_once("://") {
		Some((scheme, _)) =>
			scheme.len() > 1
				&& scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')),
		None => false,
	}
}

/// Opens the store matching `location`: a [`FileStore`] for paths, the process-wide
/// [`MemoryStore`] of the locator otherwise.
pub fn open(location: CacheLocation) -> Arc<dyn TokenStore> {
	match location {
		CacheLocation::Path(path) => Arc::new(FileStore::new(path)),
		CacheLocation::Locator(locator) => Arc::new(MemoryStore::shared(&locator)),
	}
}
