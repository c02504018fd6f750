//! Service coordinates: endpoint paths, identity-provider constants, and the
//! per-endpoint timestamp formats.
//!
//! Timestamp precision is bit-exact per endpoint, not uniform: journal create
//! and typed-tracking calls use second precision, grouped/pumping tracking and
//! the session-stats calls use millisecond precision, and the v11 daily
//! session endpoint wants a space-separated local stamp without a zone suffix.

// self
use crate::{_prelude::*, error::RequestError};

/// Production REST endpoint.
pub const BASE_ENDPOINT: &str = "https://api-us-east-1-prod.happiestbaby.com";
/// Production identity provider (AWS Cognito, us-east-1).
pub const IDENTITY_ENDPOINT: &str = "https://cognito-idp.us-east-1.amazonaws.com/";
/// Cognito app client id used by the vendor's mobile application.
pub const IDENTITY_CLIENT_ID: &str = "6kqofhc8hm394ielqdkvli0oea";
/// User agent presented to the identity provider.
pub(crate) const IDENTITY_USER_AGENT: &str =
	"Happiest Baby/2.6.1 (com.happiestbaby.hbapp; build:114; iOS 18.5.0) Alamofire/5.9.1";
/// User agent presented to the refresh endpoint.
pub(crate) const REFRESH_USER_AGENT: &str =
	"SNOO/2.4.0 (com.happiestbaby.snooapp;) Alamofire/5.3.0";

/// Token refresh exchange.
pub const REFRESH: &str = "/us/v2/refresh";
/// Legacy device list.
pub const DEVICES: &str = "/me/devices";
/// Current device list.
pub const DEVICES_V11: &str = "/hds/me/v11/devices";
/// Legacy account details.
pub const ACCOUNT: &str = "/us/me";
/// Current account details.
pub const ACCOUNT_V10: &str = "/us/me/v10/me";
/// Legacy single-baby details.
pub const BABY: &str = "/us/v3/me/baby";
/// Current babies collection.
pub const BABIES_V10: &str = "/us/me/v10/babies";
/// Account-level last session.
pub const SESSION_LAST: &str = "/analytics/sessions/last";
/// Journal create collection; entry operations append `/{id}`.
pub const JOURNALS: &str = "/cs/me/v11/journals";
/// Most recent pumping journal entry.
pub const LAST_PUMPING_JOURNAL: &str = "/cs/me/v11/journals/last-pumping-journal";
/// Account-level pumping tracking.
pub const PUMPING_TRACKING: &str = "/cs/me/v11/pumping-journals/tracking";

/// Per-device configuration.
pub fn device_configs(serial_number: &str) -> String {
	format!("/ds/devices/{serial_number}/configs")
}

/// Last session for a baby.
pub fn session_last_v10(baby_id: &str) -> String {
	format!("/ss/me/v10/babies/{baby_id}/sessions/last")
}

/// Daily session detail for a baby.
pub fn session_daily_v11(baby_id: &str) -> String {
	format!("/ss/me/v11/babies/{baby_id}/sessions/daily")
}

/// Aggregated daily session statistics.
pub fn session_stats_daily(baby_id: &str) -> String {
	format!("/ss/v2/babies/{baby_id}/sessions/aggregated/daily")
}

/// Aggregated average session statistics.
pub fn session_stats_avg(baby_id: &str) -> String {
	format!("/ss/v2/babies/{baby_id}/sessions/aggregated/avg")
}

/// Grouped journal tracking for a baby.
pub fn journals_grouped_tracking(baby_id: &str) -> String {
	format!("/cs/me/v11/babies/{baby_id}/journals/grouped-tracking")
}

/// Typed journal tracking for a baby.
pub fn journals_tracking(baby_id: &str) -> String {
	format!("/cs/me/v11/babies/{baby_id}/journals/tracking")
}

/// Most recent journal entries for a baby.
pub fn last_journals(baby_id: &str) -> String {
	format!("/cs/me/v12/babies/{baby_id}/last-journals")
}

/// Single journal entry, for replace/delete.
pub fn journal_entry(entry_id: &str) -> String {
	format!("{JOURNALS}/{entry_id}")
}

/// Interval gating full device-detail refresh cycles.
pub const DEFAULT_DEVICE_UPDATE_INTERVAL: Duration = Duration::seconds(120);
/// Fallback bearer lifetime when the provider omits `ExpiresIn`, in seconds.
pub(crate) const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 60 * 60;

/// Service coordinates and tunables for one client instance.
///
/// Defaults point at production; tests and self-hosted mirrors override the
/// endpoints through the `with_*` helpers.
#[derive(Clone, Debug)]
pub struct ServiceDescriptor {
	/// REST API origin.
	pub base_endpoint: Url,
	/// Identity provider endpoint receiving password logins.
	pub identity_endpoint: Url,
	/// Identity provider app client id.
	pub identity_client_id: String,
	/// Minimum interval between full device-detail refresh cycles.
	pub device_refresh_interval: Duration,
}
impl ServiceDescriptor {
	/// Overrides the REST API origin.
	pub fn with_base_endpoint(mut self, url: Url) -> Self {
		self.base_endpoint = url;

		self
	}

	/// Overrides the identity provider endpoint.
	pub fn with_identity_endpoint(mut self, url: Url) -> Self {
		self.identity_endpoint = url;

		self
	}

	/// Overrides the identity provider client id.
	pub fn with_identity_client_id(mut self, client_id: impl Into<String>) -> Self {
		self.identity_client_id = client_id.into();

		self
	}

	/// Overrides the device refresh throttle window.
	pub fn with_device_refresh_interval(mut self, interval: Duration) -> Self {
		self.device_refresh_interval = interval;

		self
	}

	/// Joins an API path onto the base endpoint.
	pub fn api_url(&self, path: &str) -> Result<Url> {
		self.base_endpoint.join(path).map_err(|err| {
			RequestError::InvalidUrl { path: path.to_owned(), source: err }.into()
		})
	}
}
impl Default for ServiceDescriptor {
	fn default() -> Self {
		Self {
			base_endpoint: Url::parse(BASE_ENDPOINT).expect("hardcoded production endpoint is valid"),
			identity_endpoint: Url::parse(IDENTITY_ENDPOINT)
				.expect("hardcoded identity endpoint is valid"),
			identity_client_id: IDENTITY_CLIENT_ID.into(),
			device_refresh_interval: DEFAULT_DEVICE_UPDATE_INTERVAL,
		}
	}
}

/// Formats a UTC instant with second precision, e.g. `2024-01-01T10:00:00Z`.
pub(crate) fn fmt_seconds(instant: OffsetDateTime) -> String {
	let utc = instant.to_offset(time::UtcOffset::UTC);

	format!(
		"{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
		utc.year(),
		u8::from(utc.month()),
		utc.day(),
		utc.hour(),
		utc.minute(),
		utc.second()
	)
}

/// Formats a UTC instant with millisecond precision, e.g.
/// `2024-01-01T10:00:00.000Z`.
pub(crate) fn fmt_millis(instant: OffsetDateTime) -> String {
	let utc = instant.to_offset(time::UtcOffset::UTC);

	format!(
		"{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
		utc.year(),
		u8::from(utc.month()),
		utc.day(),
		utc.hour(),
		utc.minute(),
		utc.second(),
		utc.millisecond()
	)
}

/// Formats a wall-clock stamp for the v11 daily session endpoint, which takes
/// the zone as a separate query parameter, e.g. `2024-01-01 10:00:00.000`.
pub(crate) fn fmt_daily_local(instant: OffsetDateTime) -> String {
	format!(
		"{:04}-{:02}-{:02} {:02}:{:02}:{:02}.000",
		instant.year(),
		u8::from(instant.month()),
		instant.day(),
		instant.hour(),
		instant.minute(),
		instant.second()
	)
}
