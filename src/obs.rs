//! Optional observability helpers for client flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (default) to emit structured spans named
//!   `snoo_client.flow` with the `flow` (pipeline stage) and `stage` (call
//!   site) fields, plus debug events at the points the pipeline makes a
//!   decision.
//! - Enable `metrics` to increment the `snoo_client_flow_total` counter for
//!   every attempt/success/failure, labeled by `flow` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Pipeline flows observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Password login against the identity provider.
	Login,
	/// Refresh-token exchange.
	Refresh,
	/// Authenticated request through the gateway.
	Request,
	/// Device registry refresh cycle.
	DeviceUpdate,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Login => "login",
			FlowKind::Refresh => "refresh",
			FlowKind::Request => "request",
			FlowKind::DeviceUpdate => "device_update",
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
	/// Entry to a pipeline helper.
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

/// Emits a flow-tagged debug event when tracing is enabled.
pub(crate) fn debug_event(kind: FlowKind, message: &str) {
	#[cfg(feature = "tracing")]
	::tracing::debug!(flow = kind.as_str(), "{message}");
	#[cfg(not(feature = "tracing"))]
	let _ = (kind, message);
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn debug_event_is_safe_without_a_subscriber() {
		debug_event(FlowKind::Login, "no-op without a subscriber");
	}
}
