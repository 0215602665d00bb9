//! Process-lifetime memo of authorized clients, keyed by customer id.

// self
use crate::{_prelude::*, auth::CustomerId, client::AuthorizedClient};

/// Mutex-guarded map from customer id to its authorized client.
///
/// The map itself is never handed out; callers only get clones of the stored clients.
/// Insertions and logouts for one customer are serialized by the session manager's
/// per-customer guard, not by this map.
#[derive(Clone, Debug, Default)]
pub struct ClientRegistry(Arc<Mutex<HashMap<CustomerId, AuthorizedClient>>>);
impl ClientRegistry {
	/// Client memoized for `customer_id`, if any.
	pub fn get(&self, customer_id: &str) -> Option<AuthorizedClient> {
		self.0.lock().get(customer_id).cloned()
	}

	/// Drops the entry for `customer_id`, returning it.
	pub fn release(&self, customer_id: &str) -> Option<AuthorizedClient> {
		self.0.lock().remove(customer_id)
	}

	/// Number of memoized clients.
	pub fn len(&self) -> usize {
		self.0.lock().len()
	}

	/// Returns `true` when nothing is memoized.
	pub fn is_empty(&self) -> bool {
		self.0.lock().is_empty()
	}

	/// Stores `client`, replacing any previous entry.
	pub(crate) fn insert(&self, customer_id: CustomerId, client: AuthorizedClient) {
		self.0.lock().insert(customer_id, client);
	}
}
