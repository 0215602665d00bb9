//! Observability helpers for session flows.
//!
//! Every flow runs inside a span named `etrade.flow` carrying the `flow`, `stage`, and (when
//! known) `customer` fields. With the `metrics` feature enabled, `etrade_flow_total` counts every
//! attempt/success/failure by `flow` + `outcome`, and `etrade_flow_failures_total` breaks failures
//! down by `flow` + `error`.

mod metrics;
mod tracing;

pub use self::{metrics::*, tracing::*};

// self
use crate::_prelude::*;

/// Session flows observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Request token issuance.
	Begin,
	/// Verification code exchange.
	Verify,
	/// Access token reactivation.
	Renew,
	/// Full renew-or-reauthorize flow for a customer.
	Obtain,
	/// Logout.
	Release,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Begin => "begin",
			FlowKind::Verify => "verify",
			FlowKind::Renew => "renew",
			FlowKind::Obtain => "obtain",
			FlowKind::Release => "release",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a flow.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}

	/// Terminal outcome of `result`.
	pub fn of<T>(result: &Result<T>) -> Self {
		if result.is_ok() { Self::Success } else { Self::Failure }
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside `span`, counting the attempt and its outcome.
///
/// Failures are also logged at `debug` with their [`Error::kind`] so renewal fallbacks stay
/// visible without raising the log level.
pub(crate) async fn observe<F, T>(span: FlowSpan, fut: F) -> Result<T>
where
	F: Future<Output = Result<T>>,
{
	let kind = span.kind();

	record_flow_outcome(kind, FlowOutcome::Attempt);

	let result = span.instrument(fut).await;

	record_flow_outcome(kind, FlowOutcome::of(&result));

	if let Err(e) = &result {
		record_flow_failure(kind, e);

		::tracing::debug!(flow = %kind, error.kind = e.kind(), error = %e, "Flow failed.");
	}

	result
}
