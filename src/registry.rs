//! Per-account device registry refreshed on a throttled interval, plus the
//! account/baby/session lookups that feed it.
//!
//! A full refresh re-fetches the device list, per-device configuration, and
//! the account-level last session. Calls landing inside the throttle window
//! only re-attach the latest session blob to the known devices; the
//! last-full-update timestamp advances on the full path alone.

// crates.io
use reqwest::Method;
// self
use crate::{
	_prelude::*,
	client::Client,
	endpoint::{self, fmt_daily_local, fmt_millis},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// Snapshot of one bassinet tracked by the registry.
///
/// Created on first sighting during a registry refresh, updated in place
/// thereafter, never removed within a session's lifetime.
#[derive(Clone, Debug, Default)]
pub struct Device {
	/// Vendor serial number; the registry identity key.
	pub serial_number: String,
	/// Display name, when the vendor payload carries one.
	pub name: Option<String>,
	/// Whether the device is currently reachable.
	pub online: Option<bool>,
	/// Whether the device is currently running.
	pub on: Option<bool>,
	/// Installed firmware version.
	pub firmware_version: Option<String>,
	/// Baby associated with the device, as reported by the vendor.
	pub baby: Option<Value>,
	/// Per-device configuration blob.
	pub config: Option<Value>,
	/// Account-level last session blob.
	pub session: Option<Value>,
	/// Vendor-side modification stamp (`updatedAt`).
	pub updated_at: Option<String>,
	/// Instant of the refresh cycle that last touched this entry.
	pub state_refreshed_at: Option<OffsetDateTime>,
	/// Full vendor device payload.
	pub raw: Value,
}
impl Device {
	fn apply(&mut self, device_json: &Value) {
		self.name = device_json.get("name").and_then(Value::as_str).map(str::to_owned);
		self.online = device_json.get("online").and_then(Value::as_bool);
		self.on = device_json.get("on").and_then(Value::as_bool);
		self.firmware_version =
			device_json.get("firmwareVersion").and_then(Value::as_str).map(str::to_owned);
		self.baby = device_json.get("baby").cloned();
		self.updated_at =
			device_json.get("updatedAt").and_then(Value::as_str).map(str::to_owned);
		self.raw = device_json.clone();
	}
}

/// Shared device map plus the throttle state gating full refresh cycles.
#[derive(Clone, Debug, Default)]
pub(crate) struct DeviceRegistry {
	devices: Arc<RwLock<HashMap<String, Device>>>,
	last_state_update: Arc<Mutex<Option<OffsetDateTime>>>,
	gate: Arc<AsyncMutex<()>>,
}
impl DeviceRegistry {
	fn snapshot(&self) -> HashMap<String, Device> {
		self.devices.read().clone()
	}

	fn attach_session(&self, session: Option<Value>) {
		for device in self.devices.write().values_mut() {
			device.session = session.clone();
		}
	}

	fn upsert(
		&self,
		serial_number: &str,
		device_json: &Value,
		config: Option<Value>,
		session: Option<Value>,
		cycle: OffsetDateTime,
	) {
		let mut devices = self.devices.write();
		let device = devices.entry(serial_number.to_owned()).or_insert_with(|| {
			obs::debug_event(
				FlowKind::DeviceUpdate,
				&format!("adding new device with serial number {serial_number}"),
			);

			Device { serial_number: serial_number.to_owned(), ..Device::default() }
		});
		let previous_update = device.updated_at.clone();

		device.apply(device_json);
		device.config = config;
		device.session = session;
		device.state_refreshed_at = Some(cycle);

		if device.updated_at.is_some() && device.updated_at != previous_update {
			obs::debug_event(
				FlowKind::DeviceUpdate,
				&format!("state for device {serial_number} was updated"),
			);
		}
	}
}

/// Query parameters for the v11 daily session endpoint.
#[derive(Clone, Debug)]
pub struct SessionDailyQuery {
	/// Baby whose sessions are queried.
	pub baby_id: String,
	/// Start of the queried day, wall-clock in `timezone`.
	pub start_time: OffsetDateTime,
	/// IANA zone name the vendor uses to cut the day.
	pub timezone: String,
	/// Whether to include detailed level transitions.
	pub detailed_levels: bool,
	/// Whether to include level summaries.
	pub levels: bool,
}
impl SessionDailyQuery {
	/// Creates a query with the vendor defaults.
	pub fn new(baby_id: impl Into<String>, start_time: OffsetDateTime) -> Self {
		Self {
			baby_id: baby_id.into(),
			start_time,
			timezone: "America/New_York".into(),
			detailed_levels: true,
			levels: true,
		}
	}

	/// Overrides the zone used to cut the day.
	pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
		self.timezone = timezone.into();

		self
	}

	/// Overrides the level-detail flags.
	pub fn with_levels(mut self, detailed_levels: bool, levels: bool) -> Self {
		self.detailed_levels = detailed_levels;
		self.levels = levels;

		self
	}
}

impl Client {
	/// Refreshes the device registry and returns a snapshot keyed by serial
	/// number.
	///
	/// Within the throttle window only the latest session blob is re-attached
	/// to the known devices; outside it, a full device/config/session re-fetch
	/// runs and the last-full-update timestamp advances.
	pub async fn update_device_info(&self) -> Result<HashMap<String, Device>> {
		const KIND: FlowKind = FlowKind::DeviceUpdate;

		let span = FlowSpan::new(KIND, "update_device_info");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let _gate = self.registry.gate.lock().await;
				let interval = self.descriptor.device_refresh_interval;
				let call_instant = OffsetDateTime::now_utc();
				let last_update = {
					let mut last = self.registry.last_state_update.lock();

					*last.get_or_insert(call_instant - interval)
				};

				if call_instant < last_update + interval {
					obs::debug_event(
						KIND,
						"ignoring device update request inside the throttle window",
					);

					let session = self.get_session_for_account().await?;

					self.registry.attach_session(session);

					return Ok(self.devices());
				}

				obs::debug_event(KIND, "updating device information");
				self.ensure_account().await?;
				self.ensure_baby().await?;
				self.refresh_device_details().await?;

				*self.registry.last_state_update.lock() = Some(OffsetDateTime::now_utc());

				Ok(self.devices())
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Returns the current device snapshot without touching the network.
	pub fn devices(&self) -> HashMap<String, Device> {
		self.registry.snapshot()
	}

	/// Returns the instant of the last full device refresh, if any ran yet.
	pub fn last_state_update(&self) -> Option<OffsetDateTime> {
		*self.registry.last_state_update.lock()
	}

	/// Fetches the account details, preferring the v10 endpoint and falling
	/// back to the legacy path.
	///
	/// Returns `None` when the response carries no `userId`.
	pub async fn get_account(&self) -> Result<Option<Value>> {
		let account = match self.get_api(endpoint::ACCOUNT_V10).await {
			Ok(value) => value,
			Err(err) => {
				obs::debug_event(
					FlowKind::Request,
					&format!("v10 account endpoint failed, trying legacy: {err}"),
				);

				self.get_api(endpoint::ACCOUNT).await?
			},
		};

		if account.get("userId").is_some_and(|id| !id.is_null()) {
			Ok(Some(account))
		} else {
			obs::debug_event(FlowKind::Request, "no accounts found");

			Ok(None)
		}
	}

	/// Fetches the babies collection from the v10 endpoint.
	pub async fn get_babies(&self) -> Result<Value> {
		self.get_api(endpoint::BABIES_V10).await
	}

	/// Fetches the first baby on the account, preferring the v10 collection
	/// and falling back to the legacy single-baby path.
	pub async fn get_baby_for_account(&self) -> Result<Option<Value>> {
		match self.get_babies().await {
			Ok(babies) => match babies.as_array().and_then(|list| list.first()) {
				Some(baby) => Ok(Some(baby.clone())),
				None => {
					obs::debug_event(FlowKind::Request, "no babies found using the v10 endpoint");

					Ok(None)
				},
			},
			Err(err) => {
				obs::debug_event(
					FlowKind::Request,
					&format!("v10 babies endpoint failed, trying legacy: {err}"),
				);

				let baby = self.get_api(endpoint::BABY).await?;

				Ok((!baby.is_null()).then_some(baby))
			},
		}
	}

	/// Fetches the account-level last session blob.
	///
	/// Session information is scoped to the account, not to a device.
	pub async fn get_session_for_account(&self) -> Result<Option<Value>> {
		let session = self.get_api(endpoint::SESSION_LAST).await?;

		Ok((!session.is_null()).then_some(session))
	}

	/// Fetches the configuration blob for a device.
	pub async fn get_configs_for_device(&self, serial_number: &str) -> Result<Option<Value>> {
		let configs = self.get_api(&endpoint::device_configs(serial_number)).await?;

		if configs.is_null() {
			obs::debug_event(
				FlowKind::DeviceUpdate,
				&format!("no configs found for device with serial number {serial_number}"),
			);

			return Ok(None);
		}

		Ok(Some(configs))
	}

	/// Fetches the raw device list, preferring the v11 endpoint and falling
	/// back to the legacy path.
	pub async fn get_devices(&self) -> Result<Value> {
		match self.get_api(endpoint::DEVICES_V11).await {
			Ok(devices) => Ok(devices),
			Err(err) => {
				obs::debug_event(
					FlowKind::DeviceUpdate,
					&format!("v11 devices endpoint failed, trying legacy: {err}"),
				);

				self.get_api(endpoint::DEVICES).await
			},
		}
	}

	/// Fetches the last session for a baby from the v10 endpoint.
	pub async fn get_session_last(&self, baby_id: &str) -> Result<Value> {
		self.get_api(&endpoint::session_last_v10(baby_id)).await
	}

	/// Fetches daily session detail from the v11 endpoint.
	pub async fn get_session_daily(&self, query: SessionDailyQuery) -> Result<Value> {
		let url = self.descriptor.api_url(&endpoint::session_daily_v11(&query.baby_id))?;
		let params = [
			("detailedLevels", query.detailed_levels.to_string()),
			("levels", query.levels.to_string()),
			("startTime", fmt_daily_local(query.start_time)),
			("timezone", query.timezone.clone()),
		];

		Ok(self.request(Method::GET, url, Some(&params), None).await?.1)
	}

	/// Fetches aggregated daily session statistics for the account's baby.
	pub async fn get_session_stats_daily(
		&self,
		start_time: OffsetDateTime,
		detailed_levels: bool,
		levels: bool,
	) -> Result<Value> {
		let baby_id = self.require_baby_id().await?;
		let url = self.descriptor.api_url(&endpoint::session_stats_daily(&baby_id))?;
		let params = [
			("detailedLevels", detailed_levels.to_string()),
			("levels", levels.to_string()),
			("startTime", fmt_millis(start_time)),
		];

		Ok(self.request(Method::GET, url, Some(&params), None).await?.1)
	}

	/// Fetches aggregated average session statistics for the account's baby.
	pub async fn get_session_stats_avg(
		&self,
		start_time: OffsetDateTime,
		days: bool,
		interval: &str,
	) -> Result<Value> {
		let baby_id = self.require_baby_id().await?;
		let url = self.descriptor.api_url(&endpoint::session_stats_avg(&baby_id))?;
		let params = [
			("days", days.to_string()),
			("interval", interval.to_owned()),
			("startTime", fmt_millis(start_time)),
		];

		Ok(self.request(Method::GET, url, Some(&params), None).await?.1)
	}

	pub(crate) async fn ensure_account(&self) -> Result<()> {
		if self.account.read().is_none() {
			let account = self.get_account().await?;

			*self.account.write() = account;
		}

		Ok(())
	}

	pub(crate) async fn ensure_baby(&self) -> Result<()> {
		if self.baby.read().is_none() {
			let baby = self.get_baby_for_account().await?;

			*self.baby.write() = baby;
		}

		Ok(())
	}

	async fn require_baby_id(&self) -> Result<String> {
		self.ensure_baby().await?;

		self.baby
			.read()
			.as_ref()
			.and_then(|baby| baby.get("_id"))
			.and_then(Value::as_str)
			.map(str::to_owned)
			.ok_or_else(|| crate::error::ValueError::MissingBaby.into())
	}

	async fn refresh_device_details(&self) -> Result<()> {
		let devices_resp = self.get_devices().await?;
		let cycle = OffsetDateTime::now_utc();
		let Some(list) = devices_resp.as_array() else {
			obs::debug_event(FlowKind::DeviceUpdate, "no devices found for the account");

			return Ok(());
		};

		for device_json in list {
			let Some(serial_number) = device_json.get("serialNumber").and_then(Value::as_str)
			else {
				obs::debug_event(
					FlowKind::DeviceUpdate,
					"skipping a device entry without a serial number",
				);

				continue;
			};
			let config = self.get_configs_for_device(serial_number).await?;
			let session = self.get_session_for_account().await?;

			self.registry.upsert(serial_number, device_json, config, session, cycle);
		}

		Ok(())
	}
}
