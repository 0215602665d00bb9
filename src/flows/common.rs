//! Shared helpers for flow implementations.

// self
use crate::{_prelude::*, auth::CustomerId};

/// Per-customer async locks used to collapse concurrent first authentications.
#[derive(Clone, Debug, Default)]
pub(crate) struct FlowGuards(Arc<Mutex<HashMap<CustomerId, Arc<AsyncMutex<()>>>>>);
impl FlowGuards {
	/// Returns (and creates on demand) the singleflight guard for a customer.
	pub(crate) fn guard(&self, customer_id: &CustomerId) -> Arc<AsyncMutex<()>> {
		let mut guards = self.0.lock();

		guards.entry(customer_id.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
	}
}
