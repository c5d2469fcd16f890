// self
use crate::obs::{OpKind, OpOutcome};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_op_outcome(kind: OpKind, outcome: OpOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"caplink_op_total",
			"op" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Counts a refused operation by its specific reason, which bearers never see.
///
/// `reason` must come from a closed set of static labels (`LinkError::reason`,
/// `Verification::as_str`) so the label stays low-cardinality.
pub fn record_denial(kind: OpKind, reason: &'static str) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"caplink_denial_total",
			"op" => kind.as_str(),
			"reason" => reason
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, reason);
	}
}
