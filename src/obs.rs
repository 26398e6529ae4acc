//! Optional observability helpers for sign-in flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit spans named `oidc_pkce_client.flow` with the `flow` and `stage`
//!   fields, plus warnings for fail-soft paths such as unreadable identity tokens.
//! - Enable `metrics` to increment the `oidc_pkce_client_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`, record per-flow wall time in the
//!   `oidc_pkce_client_flow_duration_seconds` histogram, and publish the session gate's verdict
//!   on the `oidc_pkce_client_signed_in` gauge.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// std
use std::time::Instant;
// self
use crate::_prelude::*;

/// Flow kinds observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Authorization request construction.
	Authorize,
	/// Redirect callback processing.
	Callback,
	/// Token endpoint exchange.
	Exchange,
	/// Local sign-out.
	Logout,
	/// Session gate recomputation.
	SessionCheck,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Authorize => "authorize",
			FlowKind::Callback => "callback",
			FlowKind::Exchange => "exchange",
			FlowKind::Logout => "logout",
			FlowKind::SessionCheck => "session_check",
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
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records the attempt, runs `fut` inside a flow span, and records its outcome.
pub(crate) async fn observe<T, Fut>(kind: FlowKind, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	record_flow_outcome(kind, FlowOutcome::Attempt);

	let started = Instant::now();
	let result = FlowSpan::new(kind, stage).instrument(fut).await;

	record_flow_duration(kind, started.elapsed());
	record_flow_outcome(
		kind,
		if result.is_ok() { FlowOutcome::Success } else { FlowOutcome::Failure },
	);

	result
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn observe_passes_results_through() {
		let ok = observe(FlowKind::Logout, "test", async { Ok::<_, Error>(7) }).await;

		assert_eq!(ok.expect("Successful futures should pass through."), 7);

		let err = observe(FlowKind::Callback, "test", async {
			Err::<(), _>(Error::MissingAuthorizationCode)
		})
		.await;

		assert!(matches!(err, Err(Error::MissingAuthorizationCode)));
	}

	#[test]
	fn labels_are_stable() {
		assert_eq!(FlowKind::SessionCheck.to_string(), "session_check");
		assert_eq!(FlowOutcome::Failure.as_str(), "failure");
	}
}
