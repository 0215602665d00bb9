// self
use crate::{
	_prelude::*,
	obs::{FlowKind, FlowOutcome},
};

/// Bumps `etrade_flow_total{flow,outcome}` (no-op without the `metrics` feature).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!("etrade_flow_total", "flow" => kind.as_str(), "outcome" => outcome.as_str())
		.increment(1);
	#[cfg(not(feature = "metrics"))]
	let _ = (kind, outcome);
}

/// Bumps `etrade_flow_failures_total{flow,error}` with the [`Error::kind`] label.
pub fn record_flow_failure(kind: FlowKind, error: &Error) {
	#[cfg(feature = "metrics")]
	metrics::counter!("etrade_flow_failures_total", "flow" => kind.as_str(), "error" => error.kind())
		.increment(1);
	#[cfg(not(feature = "metrics"))]
	let _ = (kind, error);
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recording_without_a_recorder_is_silent() {
		record_flow_outcome(FlowKind::Obtain, FlowOutcome::Failure);
		record_flow_failure(FlowKind::Renew, &Error::Cancelled);
	}
}
