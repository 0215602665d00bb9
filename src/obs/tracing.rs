// crates.io
use tracing::{Instrument, Span, field, instrument::Instrumented};
// self
use crate::{_prelude::*, obs::FlowKind};

/// `etrade.flow` span for one session flow.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	kind: FlowKind,
	span: Span,
}
impl FlowSpan {
	/// Creates a span tagged with `kind` and `stage`; the customer is filled in later.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		let span = tracing::info_span!(
			"etrade.flow",
			flow = kind.as_str(),
			stage,
			customer = field::Empty
		);

		Self { kind, span }
	}

	/// Records the customer the flow runs for.
	pub fn with_customer(self, customer_id: &str) -> Self {
		self.span.record("customer", customer_id);

		self
	}

	/// Flow the span was opened for.
	pub fn kind(&self) -> FlowKind {
		self.kind
	}

	/// Instruments a future without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		fut.instrument(self.span.clone())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn customer_can_be_attached_after_creation() {
		let span = FlowSpan::new(FlowKind::Obtain, "obtain_client").with_customer("C1");

		assert_eq!(span.kind(), FlowKind::Obtain);
		assert_eq!(FlowSpan::instrument(&span, async { 42 }).await, 42);
	}
}
