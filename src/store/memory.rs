//! Thread-safe in-memory [`CredentialStore`] for embedding and tests.

// self
use crate::{
	_prelude::*,
	auth::{CachedCredentials, ConsumerKey},
	store::{CredentialStore, StoreFuture},
};

type StoreMap = Arc<RwLock<HashMap<ConsumerKey, CachedCredentials>>>;

/// Keeps cached credentials in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryCredentialStore(StoreMap);
impl MemoryCredentialStore {
	/// Returns the entry for `key` without going through the async contract.
	pub fn snapshot(&self, key: &str) -> Option<CachedCredentials> {
		self.0.read().get(key).cloned()
	}
}
impl CredentialStore for MemoryCredentialStore {
	fn load<'a>(&'a self, key: &'a ConsumerKey) -> StoreFuture<'a, CachedCredentials> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().get(key).cloned().unwrap_or_default()) })
	}

	fn save<'a>(
		&'a self,
		key: &'a ConsumerKey,
		credentials: CachedCredentials,
	) -> StoreFuture<'a, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().insert(key.clone(), credentials);

			Ok(())
		})
	}

	fn remove<'a>(&'a self, key: &'a ConsumerKey) -> StoreFuture<'a, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().remove(key);

			Ok(())
		})
	}
}
