//! Client-level error types shared across the request pipeline, registry, and journal.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credentials are missing or were previously rejected; retrying is pointless until the
	/// caller supplies new ones.
	#[error("Invalid credentials: {reason}.")]
	InvalidCredentials {
		/// Human-readable explanation of why authentication cannot be attempted.
		reason: String,
	},
	/// A (re)authentication attempt against the identity provider failed.
	#[error("Authentication failed: {reason}.")]
	Authentication {
		/// Provider- or client-supplied reason string.
		reason: String,
	},
	/// Network, HTTP, or payload-parsing failure.
	#[error(transparent)]
	Request(#[from] RequestError),
	/// Caller-supplied argument rejected before any network call.
	#[error(transparent)]
	Value(#[from] ValueError),
}
impl Error {
	/// Returns `true` when the underlying failure is an HTTP 401 rejection.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Request(request) if request.is_unauthorized())
	}

	pub(crate) fn authentication(reason: impl Into<String>) -> Self {
		Self::Authentication { reason: reason.into() }
	}

	pub(crate) fn invalid_credentials(reason: impl Into<String>) -> Self {
		Self::InvalidCredentials { reason: reason.into() }
	}
}

/// Transport and payload failures surfaced by [`ReqwestTransport`](crate::http::ReqwestTransport).
#[derive(Debug, ThisError)]
pub enum RequestError {
	/// The service answered with a non-success HTTP status.
	#[error("Request to {url} failed with status {status}.")]
	Status {
		/// Requested URL.
		url: String,
		/// HTTP status code returned by the service.
		status: u16,
	},
	/// The underlying HTTP client reported a network failure.
	#[error("Network error while requesting {url}.")]
	Network {
		/// Requested URL.
		url: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The response body could not be parsed as JSON.
	#[error("Invalid JSON at line {line} column {column} in response from {url}.")]
	Json {
		/// Requested URL.
		url: String,
		/// Line of the offending byte within the response document.
		line: usize,
		/// Column of the offending byte within the response document.
		column: usize,
		/// Raw response document that failed to parse.
		document: String,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// A request path could not be joined onto the configured endpoint.
	#[error("Invalid request URL for path {path}.")]
	InvalidUrl {
		/// Offending path fragment.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Every retry attempt failed without capturing a concrete error.
	#[error("All request attempts to {url} failed.")]
	Exhausted {
		/// Requested URL.
		url: String,
	},
}
impl RequestError {
	/// Returns `true` for an HTTP 401 rejection, which the gateway recovers via
	/// re-authentication instead of transport-level retry.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Status { status: 401, .. })
	}

	/// Wraps a transport-specific network error.
	pub fn network(url: impl Into<String>, src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { url: url.into(), source: Box::new(src) }
	}
}

/// Argument validation failures raised before any network call.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ValueError {
	/// Unknown journal kind label.
	#[error("Invalid journal type: {value}.")]
	InvalidJournalKind {
		/// Rejected label.
		value: String,
	},
	/// Unknown diaper kind label.
	#[error("Invalid diaper type: {value}.")]
	InvalidDiaperKind {
		/// Rejected label.
		value: String,
	},
	/// Feeding label outside bottle/breast feeding.
	#[error("Invalid feeding type: {value}.")]
	InvalidFeedingKind {
		/// Rejected label.
		value: String,
	},
	/// Unknown milk kind label.
	#[error("Invalid milk type: {value}.")]
	InvalidMilkKind {
		/// Rejected label.
		value: String,
	},
	/// Breast side outside left/right.
	#[error("Invalid breast side: {value}.")]
	InvalidBreastSide {
		/// Rejected label.
		value: String,
	},
	/// Neither the imperial nor the metric measurement was supplied.
	#[error("Either the imperial or the metric {quantity} must be provided.")]
	MissingMeasurement {
		/// Quantity label, e.g. `amount` or `weight`.
		quantity: &'static str,
	},
	/// The account has no baby to scope the requested operation to.
	#[error("No baby is associated with the account.")]
	MissingBaby,
	/// Whole-object journal update is missing a required field.
	#[error("Journal entry update is missing required field `{field}`.")]
	IncompleteEntry {
		/// Name of the missing field.
		field: &'static str,
	},
	/// No user id was supplied and none could be borrowed from recent entries.
	#[error("Could not auto-detect a user id: {reason}. Provide user_id explicitly.")]
	UserIdUndetected {
		/// Why detection failed.
		reason: String,
	},
}
