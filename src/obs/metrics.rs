// std
use std::time::Duration;
// self
use crate::obs::{FlowKind, FlowOutcome};

/// Increments `oidc_pkce_client_flow_total{flow, outcome}` (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(
		"oidc_pkce_client_flow_total",
		"flow" => kind.as_str(),
		"outcome" => outcome.as_str()
	)
	.increment(1);
	#[cfg(not(feature = "metrics"))]
	let _ = (kind, outcome);
}

/// Records wall time spent in a finished flow as `oidc_pkce_client_flow_duration_seconds{flow}`.
pub fn record_flow_duration(kind: FlowKind, elapsed: Duration) {
	#[cfg(feature = "metrics")]
	metrics::histogram!("oidc_pkce_client_flow_duration_seconds", "flow" => kind.as_str())
		.record(elapsed.as_secs_f64());
	#[cfg(not(feature = "metrics"))]
	let _ = (kind, elapsed);
}

/// Publishes the session gate's latest verdict as `oidc_pkce_client_signed_in` (1 or 0).
pub fn record_signed_in(signed_in: bool) {
	#[cfg(feature = "metrics")]
	metrics::gauge!("oidc_pkce_client_signed_in").set(if signed_in { 1.0 } else { 0.0 });
	#[cfg(not(feature = "metrics"))]
	let _ = signed_in;
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_are_inert_without_a_global_recorder() {
		record_flow_outcome(FlowKind::Exchange, FlowOutcome::Failure);
		record_flow_duration(FlowKind::Callback, Duration::from_millis(12));
		record_signed_in(true);
	}
}
