//! File-backed [`TokenStore`] shared by every process pointed at the same path.

// std
use std::{
	fs::{self, File},
	io::{ErrorKind, Write},
};
// self
use crate::{
	_prelude::*,
	auth::CachedToken,
	store::{CacheLocation, CacheRead, ReadFuture, StoreError, StoreFuture, TokenStore},
};

/// Persists the cached token as JSON, replacing it via temp file + atomic rename.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	location: CacheLocation,
}
impl FileStore {
	/// Creates a store at `path`. Nothing is touched on disk until the first write.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		let path = path.into();

		Self { location: CacheLocation::Path(path.clone()), path }
	}

	/// Path of the cache file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn read_now(&self) -> CacheRead {
		let bytes = match fs::read(&self.path) {
			Ok(bytes) => bytes,
			// Missing and unreadable files both degrade to "no cache".
			Err(_) => return CacheRead::NotFound,
		};

		if bytes.is_empty() {
			return CacheRead::NotFound;
		}

		match serde_json::from_slice::<CachedToken>(&bytes) {
			Ok(record) if record.token.is_empty() =>
				CacheRead::Corrupt { reason: "cached token is empty".into() },
			Ok(record) => CacheRead::Hit(record),
			Err(e) => CacheRead::Corrupt { reason: e.to_string() },
		}
	}

	fn ensure_parent_exists(&self) {
		if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
			// Best effort: a real failure surfaces when the temp file is created.
			let _ = fs::create_dir_all(parent);
		}
	}

	fn temp_path(&self) -> PathBuf {
		let name = self.path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
		let unique = format!(".{name}.{}.{:016x}.tmp", std::process::id(), rand::random::<u64>());

		self.path.with_file_name(unique)
	}

	fn write_now(&self, record: &CachedToken) -> Result<(), StoreError> {
		let serialized = serde_json::to_vec(record).map_err(|e| StoreError::Serialization {
			message: format!("Failed to serialize cached token: {e}"),
		})?;

		self.ensure_parent_exists();

		let tmp_path = self.temp_path();
		let result = Self::write_file(&tmp_path, &serialized).and_then(|()| {
			fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
				message: format!("Failed to replace {}: {e}", self.path.display()),
			})
		});

		if result.is_err() {
			let _ = fs::remove_file(&tmp_path);
		}

		result
	}

	fn write_file(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
		let mut file = File::create(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to create {}: {e}", path.display()),
		})?;

		file.write_all(bytes).map_err(|e| StoreError::Backend {
			message: format!("Failed to write {}: {e}", path.display()),
		})?;
		file.sync_all().map_err(|e| StoreError::Backend {
			message: format!("Failed to sync {}: {e}", path.display()),
		})
	}

	fn clear_now(&self) -> Result<(), StoreError> {
		match fs::remove_file(&self.path) {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StoreError::Backend {
				message: format!("Failed to remove {}: {e}", self.path.display()),
			}),
		}
	}
}
impl TokenStore for FileStore {
	fn location(&self) -> &CacheLocation {
		&self.location
	}

	fn read(&self) -> ReadFuture<'_> {
		Box::pin(async move { self.read_now() })
	}

	fn write(&self, record: CachedToken) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.write_now(&record) })
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.clear_now() })
	}
}
