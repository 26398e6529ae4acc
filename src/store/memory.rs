//! Thread-safe in-memory [`KeyValueStore`] for session-scoped data and tests.

// self
use crate::{
	_prelude::*,
	store::{KeyValueStore, StoreError, StoreFuture},
};

type StoreMap = Arc<RwLock<HashMap<String, String>>>;

/// Storage backend that keeps entries in-process; contents die with the process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Synchronous read used by tests and diagnostics.
	pub fn peek(&self, key: &str) -> Option<String> {
		self.0.read().get(key).cloned()
	}

	/// Sorted list of the keys currently present.
	pub fn keys(&self) -> Vec<String> {
		let mut keys = self.0.read().keys().cloned().collect::<Vec<_>>();

		keys.sort();

		keys
	}

	fn set_now(map: StoreMap, entries: Vec<(String, String)>) -> Result<(), StoreError> {
		let mut guard = map.write();

		for (key, value) in entries {
			guard.insert(key, value);
		}

		Ok(())
	}

	fn remove_now(map: StoreMap, keys: &[&str]) -> Result<(), StoreError> {
		let mut guard = map.write();

		for key in keys {
			guard.remove(*key);
		}

		Ok(())
	}
}
impl KeyValueStore for MemoryStore {
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().get(key).cloned()) })
	}

	fn set_many(&self, entries: Vec<(String, String)>) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::set_now(map, entries) })
	}

	fn remove_many<'a>(&'a self, keys: &'a [&'a str]) -> StoreFuture<'a, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::remove_now(map, keys) })
	}
}
