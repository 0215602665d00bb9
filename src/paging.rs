//! Marker-driven pagination shared by the listing adapters.

// std
use std::collections::HashSet;
// self
use crate::_prelude::*;

/// One upstream page: its items plus the cursor of the page that follows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
	/// Items in upstream order.
	pub items: Vec<T>,
	/// Cursor for the next request; `None` once the upstream stops providing one.
	pub next: Option<String>,
}
impl<T> Page<T> {
	/// Builds a page, treating an empty or blank cursor as "no more pages".
	pub fn new(items: Vec<T>, next: Option<String>) -> Self {
		let next = next.filter(|cursor| !cursor.trim().is_empty());

		Self { items, next }
	}
}

/// Requests pages until the upstream stops returning a cursor and concatenates their items.
///
/// The first call receives `None`; each following call receives the previous page's cursor.
/// Any page failure aborts the whole sequence. A cursor that comes back a second time is
/// reported as an upstream error instead of looping forever.
pub async fn collect_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>>
where
	F: FnMut(Option<String>) -> Fut,
	Fut: Future<Output = Result<Page<T>>>,
{
	let mut items = Vec::new();
	let mut seen = HashSet::new();
	let mut cursor = None;

	loop {
		let page = fetch(cursor.take()).await?;

		items.extend(page.items);

		let Some(next) = page.next else {
			return Ok(items);
		};

		if !seen.insert(next.clone()) {
			return Err(Error::Upstream {
				status: None,
				message: format!("pagination cursor `{next}` was returned twice"),
			});
		}

		tracing::debug!(cursor = %next, collected = items.len(), "Fetching next page.");

		cursor = Some(next);
	}
}

/// Per-request item count, bounded by the upstream's documented cap for the listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PageSize(u32);
impl PageSize {
	/// Documented cap for account transactions.
	pub const TRANSACTIONS_CAP: u32 = 50;
	/// Documented cap for order listings.
	pub const ORDERS_CAP: u32 = 100;
	/// Documented cap for portfolio positions.
	pub const PORTFOLIO_CAP: u32 = 65535;
	/// Documented cap for alert listings.
	pub const ALERTS_CAP: u32 = 300;

	/// Clamps `requested` into `1..=cap`; `None` selects the cap itself.
	pub fn new(requested: Option<u32>, cap: u32) -> Self {
		let cap = cap.max(1);

		Self(requested.unwrap_or(cap).clamp(1, cap))
	}

	/// Count sent upstream.
	pub fn get(self) -> u32 {
		self.0
	}
}
impl Display for PageSize {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		write!(f, "{}", self.0)
	}
}
