//! Credential cache contract and built-in implementations.

pub mod file;
pub mod memory;

pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;

// self
use crate::{
	_prelude::*,
	auth::{CachedCredentials, ConsumerKey},
};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Per-consumer-key credential cache.
///
/// Entries are keyed by consumer key rather than customer id so that rotating a key also
/// rotates the cache location.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Loads cached credentials.
	///
	/// A missing entry yields [`CachedCredentials::empty`]. Implementations that can observe a
	/// corrupt entry also return the empty form and log one warning instead of failing.
	fn load<'a>(&'a self, key: &'a ConsumerKey) -> StoreFuture<'a, CachedCredentials>;

	/// Atomically replaces the entry for `key`.
	fn save<'a>(
		&'a self,
		key: &'a ConsumerKey,
		credentials: CachedCredentials,
	) -> StoreFuture<'a, ()>;

	/// Removes the entry for `key`; removing a missing entry succeeds.
	fn remove<'a>(&'a self, key: &'a ConsumerKey) -> StoreFuture<'a, ()>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
