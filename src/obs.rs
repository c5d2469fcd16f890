//! Optional observability helpers for link operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `caplink.op` with the `op` (mint, verify,
//!   render) and `stage` (call site) fields, plus `debug` events that name the specific reason a
//!   link was refused. Secrets and tokens are never recorded.
//! - Enable `metrics` to increment the `caplink_op_total` counter for every
//!   attempt/success/failure, labeled by `op` + `outcome`, and `caplink_denial_total` for every
//!   refusal, labeled by `op` + `reason` (for example `expired` or `loopback_host`).

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Link operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Minting a capability link.
	Mint,
	/// Opening (verifying) a presented link.
	Verify,
	/// Rendering the artifact behind a verified link.
	Render,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::Mint => "mint",
			OpKind::Verify => "verify",
			OpKind::Render => "render",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
