//! In-process [`TokenStore`] for locator destinations, local development, and tests.

// std
use std::{collections::HashMap, sync::LazyLock};
// self
use crate::{
	_prelude::*,
	auth::CachedToken,
	store::{CacheLocation, CacheRead, ReadFuture, StoreFuture, TokenStore},
};

type Slot = Arc<RwLock<Option<CachedToken>>>;

static LOCATOR_SLOTS: LazyLock<Mutex<HashMap<String, Slot>>> = LazyLock::new(Default::default);

/// Keeps the record behind an exclusive lock; clones share the same slot.
#[derive(Clone, Debug)]
pub struct MemoryStore {
	location: CacheLocation,
	slot: Slot,
}
impl MemoryStore {
	/// Creates an empty, private store identified by `location`.
	pub fn new(location: CacheLocation) -> Self {
		Self { location, slot: Default::default() }
	}

	/// Returns the process-wide store for `locator`; every store opened with the same
	/// locator shares one record.
	pub fn shared(locator: &str) -> Self {
		let slot = LOCATOR_SLOTS.lock().entry(locator.to_owned()).or_default().clone();

		Self { location: CacheLocation::Locator(locator.to_owned()), slot }
	}

	/// Returns a copy of the stored record without validity checks.
	pub fn snapshot(&self) -> Option<CachedToken> {
		self.slot.read().clone()
	}
}
impl Default for MemoryStore {
	fn default() -> Self {
		Self::new(CacheLocation::Locator("memory://default".into()))
	}
}
impl TokenStore for MemoryStore {
	fn location(&self) -> &CacheLocation {
		&self.location
	}

	fn read(&self) -> ReadFuture<'_> {
		let slot = self.slot.clone();

		Box::pin(async move {
			match slot.read().clone() {
				Some(record) => CacheRead::Hit(record),
				None => CacheRead::NotFound,
			}
		})
	}

	fn write(&self, record: CachedToken) -> StoreFuture<'_, ()> {
		let slot = self.slot.clone();

		Box::pin(async move {
			*slot.write() = Some(record);

			Ok(())
		})
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		let slot = self.slot.clone();

		Box::pin(async move {
			slot.write().take();

			Ok(())
		})
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use tokio::runtime::Runtime;
	// self
	use super::*;
	use crate::auth::AccessToken;

	#[test]
	fn clones_share_the_same_record() {
		let rt = Runtime::new().expect("Failed to build Tokio runtime for memory store test.");
		let store = MemoryStore::default();
		let peer = store.clone();
		let record = CachedToken::issued(
			AccessToken::new("shared"),
			Duration::minutes(5),
			OffsetDateTime::now_utc(),
		);

		rt.block_on(store.write(record.clone())).expect("Memory writes should succeed.");

		assert_eq!(rt.block_on(peer.read()), CacheRead::Hit(record));

		rt.block_on(peer.clear()).expect("Memory clears should succeed.");

		assert_eq!(store.snapshot(), None);
	}

	#[test]
	fn shared_stores_follow_the_locator() {
		let a = MemoryStore::shared("memory://shared-test-a");
		let b = MemoryStore::shared("memory://shared-test-a");
		let other = MemoryStore::shared("memory://shared-test-b");
		let record = CachedToken::issued(
			AccessToken::new("locator"),
			Duration::minutes(5),
			OffsetDateTime::now_utc(),
		);

		*a.slot.write() = Some(record.clone());

		assert_eq!(b.snapshot(), Some(record));
		assert_eq!(other.snapshot(), None);
	}
}
