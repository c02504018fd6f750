//! Typed operations over the eight baby-care journal kinds.
//!
//! Reads cover grouped and per-kind tracking windows plus the last-N
//! conveniences; writes go through the request builders in [`entry`], which
//! validate caller arguments before any network call. Updates replace the
//! whole entry because the service PUT semantics do the same; partial
//! payloads are rejected up front.

pub mod entry;
pub mod units;

pub use entry::{
	NewBreastFeedingEntry, NewDiaperEntry, NewFeedingEntry, NewHeadEntry, NewHeightEntry,
	NewWeightEntry,
};

// crates.io
use reqwest::Method;
// self
use crate::{
	_prelude::*,
	client::Client,
	endpoint::{self, fmt_millis, fmt_seconds},
	error::ValueError,
	obs::{self, FlowKind},
};

/// The eight journal record kinds understood by the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JournalKind {
	/// Diaper change.
	Diaper,
	/// Bottle feeding.
	BottleFeeding,
	/// Breast feeding.
	BreastFeeding,
	/// Solid food.
	SolidFood,
	/// Weight measurement.
	Weight,
	/// Height measurement.
	Height,
	/// Head circumference measurement.
	Head,
	/// Pumping session.
	Pumping,
}
impl JournalKind {
	/// Returns the wire label used in request bodies and query parameters.
	pub const fn as_str(self) -> &'static str {
		match self {
			JournalKind::Diaper => "diaper",
			JournalKind::BottleFeeding => "bottlefeeding",
			JournalKind::BreastFeeding => "breastfeeding",
			JournalKind::SolidFood => "solidfood",
			JournalKind::Weight => "weight",
			JournalKind::Height => "height",
			JournalKind::Head => "head",
			JournalKind::Pumping => "pumping",
		}
	}
}
impl Display for JournalKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for JournalKind {
	type Err = ValueError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"diaper" => Ok(Self::Diaper),
			"bottlefeeding" => Ok(Self::BottleFeeding),
			"breastfeeding" => Ok(Self::BreastFeeding),
			"solidfood" => Ok(Self::SolidFood),
			"weight" => Ok(Self::Weight),
			"height" => Ok(Self::Height),
			"head" => Ok(Self::Head),
			"pumping" => Ok(Self::Pumping),
			_ => Err(ValueError::InvalidJournalKind { value: s.into() }),
		}
	}
}

/// Diaper change contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiaperKind {
	/// Wet diaper.
	Pee,
	/// Soiled diaper.
	Poo,
}
impl DiaperKind {
	/// Returns the wire label.
	pub const fn as_str(self) -> &'static str {
		match self {
			DiaperKind::Pee => "pee",
			DiaperKind::Poo => "poo",
		}
	}
}
impl Display for DiaperKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for DiaperKind {
	type Err = ValueError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"pee" => Ok(Self::Pee),
			"poo" => Ok(Self::Poo),
			_ => Err(ValueError::InvalidDiaperKind { value: s.into() }),
		}
	}
}

/// Feeding kinds accepted by the feeding create/read operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeedingKind {
	/// Bottle feeding; carries dual-unit amounts.
	Bottle,
	/// Breast feeding.
	Breast,
}
impl FeedingKind {
	/// Returns the wire label.
	pub const fn as_str(self) -> &'static str {
		self.journal_kind().as_str()
	}

	/// Returns the corresponding journal kind.
	pub const fn journal_kind(self) -> JournalKind {
		match self {
			FeedingKind::Bottle => JournalKind::BottleFeeding,
			FeedingKind::Breast => JournalKind::BreastFeeding,
		}
	}
}
impl Display for FeedingKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for FeedingKind {
	type Err = ValueError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"bottlefeeding" => Ok(Self::Bottle),
			"breastfeeding" => Ok(Self::Breast),
			_ => Err(ValueError::InvalidFeedingKind { value: s.into() }),
		}
	}
}

/// Milk kinds accepted by feeding entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MilkKind {
	/// Breast milk.
	Breastmilk,
	/// Formula.
	Formula,
}
impl MilkKind {
	/// Returns the wire label.
	pub const fn as_str(self) -> &'static str {
		match self {
			MilkKind::Breastmilk => "breastmilk",
			MilkKind::Formula => "formula",
		}
	}
}
impl Display for MilkKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for MilkKind {
	type Err = ValueError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"breastmilk" => Ok(Self::Breastmilk),
			"formula" => Ok(Self::Formula),
			_ => Err(ValueError::InvalidMilkKind { value: s.into() }),
		}
	}
}

/// Breast side labels for breast-feeding entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BreastSide {
	/// Left breast.
	Left,
	/// Right breast.
	Right,
}
impl BreastSide {
	/// Returns the wire label.
	pub const fn as_str(self) -> &'static str {
		match self {
			BreastSide::Left => "left",
			BreastSide::Right => "right",
		}
	}
}
impl Display for BreastSide {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for BreastSide {
	type Err = ValueError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"left" => Ok(Self::Left),
			"right" => Ok(Self::Right),
			_ => Err(ValueError::InvalidBreastSide { value: s.into() }),
		}
	}
}

/// Fields a whole-object journal update must carry.
const REQUIRED_UPDATE_FIELDS: [&str; 5] = ["type", "startTime", "babyId", "userId", "data"];
/// How far back user-id auto-detection looks for diaper entries.
const USER_ID_LOOKBACK: Duration = Duration::days(7);

impl Client {
	/// Fetches grouped tracking data for a date range.
	pub async fn get_grouped_tracking(
		&self,
		baby_id: &str,
		from: OffsetDateTime,
		to: OffsetDateTime,
		group: &str,
	) -> Result<Value> {
		let url = self.descriptor.api_url(&endpoint::journals_grouped_tracking(baby_id))?;
		let params = [
			("fromDateTime", fmt_millis(from)),
			("toDateTime", fmt_millis(to)),
			("group", group.to_owned()),
		];

		obs::debug_event(
			FlowKind::Request,
			&format!("getting grouped tracking for baby {baby_id}"),
		);

		Ok(self.request(Method::GET, url, Some(&params), None).await?.1)
	}

	/// Fetches tracking data of one journal kind for a date range.
	pub async fn get_journal_tracking(
		&self,
		baby_id: &str,
		from: OffsetDateTime,
		to: OffsetDateTime,
		kind: JournalKind,
	) -> Result<Value> {
		let url = self.descriptor.api_url(&endpoint::journals_tracking(baby_id))?;
		let params = [
			("fromDateTime", fmt_seconds(from)),
			("toDateTime", fmt_seconds(to)),
			("journalType", kind.as_str().to_owned()),
		];

		obs::debug_event(FlowKind::Request, &format!("getting {kind} tracking for baby {baby_id}"));

		Ok(self.request(Method::GET, url, Some(&params), None).await?.1)
	}

	/// Fetches diaper change tracking data.
	pub async fn get_diaper_tracking(
		&self,
		baby_id: &str,
		from: OffsetDateTime,
		to: OffsetDateTime,
	) -> Result<Value> {
		self.get_journal_tracking(baby_id, from, to, JournalKind::Diaper).await
	}

	/// Fetches feeding tracking data for the provided feeding kind.
	pub async fn get_feeding_tracking(
		&self,
		baby_id: &str,
		from: OffsetDateTime,
		to: OffsetDateTime,
		kind: FeedingKind,
	) -> Result<Value> {
		self.get_journal_tracking(baby_id, from, to, kind.journal_kind()).await
	}

	/// Fetches weight tracking data.
	pub async fn get_weight_tracking(
		&self,
		baby_id: &str,
		from: OffsetDateTime,
		to: OffsetDateTime,
	) -> Result<Value> {
		self.get_journal_tracking(baby_id, from, to, JournalKind::Weight).await
	}

	/// Fetches height tracking data.
	pub async fn get_height_tracking(
		&self,
		baby_id: &str,
		from: OffsetDateTime,
		to: OffsetDateTime,
	) -> Result<Value> {
		self.get_journal_tracking(baby_id, from, to, JournalKind::Height).await
	}

	/// Fetches head circumference tracking data.
	pub async fn get_head_tracking(
		&self,
		baby_id: &str,
		from: OffsetDateTime,
		to: OffsetDateTime,
	) -> Result<Value> {
		self.get_journal_tracking(baby_id, from, to, JournalKind::Head).await
	}

	/// Fetches solid food tracking data.
	pub async fn get_solid_food_tracking(
		&self,
		baby_id: &str,
		from: OffsetDateTime,
		to: OffsetDateTime,
	) -> Result<Value> {
		self.get_journal_tracking(baby_id, from, to, JournalKind::SolidFood).await
	}

	/// Fetches pumping session tracking data; the endpoint is account-scoped.
	pub async fn get_pumping_tracking(
		&self,
		from: OffsetDateTime,
		to: OffsetDateTime,
	) -> Result<Value> {
		let url = self.descriptor.api_url(endpoint::PUMPING_TRACKING)?;
		let params = [("fromDateTime", fmt_millis(from)), ("toDateTime", fmt_millis(to))];

		Ok(self.request(Method::GET, url, Some(&params), None).await?.1)
	}

	/// Fetches the most recent pumping journal entry.
	pub async fn get_last_pumping_journal(&self) -> Result<Value> {
		self.get_api(endpoint::LAST_PUMPING_JOURNAL).await
	}

	/// Fetches the most recent journal entries for a baby.
	pub async fn get_last_journals(&self, baby_id: &str) -> Result<Value> {
		self.get_api(&endpoint::last_journals(baby_id)).await
	}

	/// Creates a diaper change entry.
	pub async fn create_diaper_entry(&self, entry: NewDiaperEntry) -> Result<Value> {
		entry.validate()?;

		let user_id = self.resolve_user_id(entry.user_id.as_deref(), &entry.baby_id).await?;

		self.create_entry(entry.payload(&user_id)?).await
	}

	/// Creates a bottle- or breast-feeding entry.
	pub async fn create_feeding_entry(&self, entry: NewFeedingEntry) -> Result<Value> {
		entry.validate()?;

		let user_id = self.resolve_user_id(entry.user_id.as_deref(), &entry.baby_id).await?;

		self.create_entry(entry.payload(&user_id)?).await
	}

	/// Creates a weight measurement entry.
	pub async fn create_weight_entry(&self, entry: NewWeightEntry) -> Result<Value> {
		entry.validate()?;

		let user_id = self.resolve_user_id(entry.user_id.as_deref(), &entry.baby_id).await?;

		self.create_entry(entry.payload(&user_id)?).await
	}

	/// Creates a height measurement entry.
	pub async fn create_height_entry(&self, entry: NewHeightEntry) -> Result<Value> {
		entry.validate()?;

		let user_id = self.resolve_user_id(entry.user_id.as_deref(), &entry.baby_id).await?;

		self.create_entry(entry.payload(&user_id)?).await
	}

	/// Creates a head circumference entry.
	pub async fn create_head_entry(&self, entry: NewHeadEntry) -> Result<Value> {
		entry.validate()?;

		let user_id = self.resolve_user_id(entry.user_id.as_deref(), &entry.baby_id).await?;

		self.create_entry(entry.payload(&user_id)?).await
	}

	/// Creates a breast feeding entry with per-side durations.
	pub async fn create_breast_feeding_entry(
		&self,
		entry: NewBreastFeedingEntry,
	) -> Result<Value> {
		entry.validate()?;

		let user_id = self.resolve_user_id(entry.user_id.as_deref(), &entry.baby_id).await?;

		self.create_entry(entry.payload(&user_id)?).await
	}

	/// Replaces a journal entry wholesale.
	///
	/// The service PUT semantics replace the entire object, so the payload
	/// must carry `type`, `startTime`, `babyId`, `userId`, and `data`; a
	/// partial payload is rejected with a [`ValueError`] before any network
	/// call instead of being silently merged.
	pub async fn update_journal_entry(&self, entry_id: &str, entry: Value) -> Result<Value> {
		for field in REQUIRED_UPDATE_FIELDS {
			if entry.get(field).is_none() {
				return Err(ValueError::IncompleteEntry { field }.into());
			}
		}

		let url = self.descriptor.api_url(&endpoint::journal_entry(entry_id))?;

		obs::debug_event(FlowKind::Request, &format!("updating journal entry {entry_id}"));

		Ok(self.request(Method::PUT, url, None, Some(&entry)).await?.1)
	}

	/// Deletes a journal entry, returning `true` when the service confirmed.
	pub async fn delete_journal_entry(&self, entry_id: &str) -> Result<bool> {
		let url = self.descriptor.api_url(&endpoint::journal_entry(entry_id))?;

		obs::debug_event(FlowKind::Request, &format!("deleting journal entry {entry_id}"));

		let (_, value) = self.request(Method::DELETE, url, None, None).await?;

		Ok(!value.is_null())
	}

	async fn create_entry(&self, payload: Value) -> Result<Value> {
		let url = self.descriptor.api_url(endpoint::JOURNALS)?;

		Ok(self.request(Method::POST, url, None, Some(&payload)).await?.1)
	}

	async fn resolve_user_id(&self, provided: Option<&str>, baby_id: &str) -> Result<String> {
		match provided {
			Some(user_id) => Ok(user_id.to_owned()),
			None => self.detect_user_id(baby_id).await,
		}
	}

	/// Borrows the user id from the most recent week of diaper entries.
	async fn detect_user_id(&self, baby_id: &str) -> Result<String> {
		let to = OffsetDateTime::now_utc();
		let entries = match self.get_diaper_tracking(baby_id, to - USER_ID_LOOKBACK, to).await {
			Ok(entries) => entries,
			Err(err) =>
				return Err(ValueError::UserIdUndetected { reason: err.to_string() }.into()),
		};

		entries
			.as_array()
			.and_then(|list| list.first())
			.and_then(|entry| entry.get("userId"))
			.and_then(Value::as_str)
			.map(str::to_owned)
			.ok_or_else(|| {
				ValueError::UserIdUndetected {
					reason: "no recent diaper entries carried one".into(),
				}
				.into()
			})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn kind_labels_round_trip() {
		for kind in [
			JournalKind::Diaper,
			JournalKind::BottleFeeding,
			JournalKind::BreastFeeding,
			JournalKind::SolidFood,
			JournalKind::Weight,
			JournalKind::Height,
			JournalKind::Head,
			JournalKind::Pumping,
		] {
			assert_eq!(kind.as_str().parse::<JournalKind>().unwrap(), kind);
		}
	}

	#[test]
	fn unknown_labels_fail_fast() {
		assert_eq!(
			"nap".parse::<JournalKind>(),
			Err(ValueError::InvalidJournalKind { value: "nap".into() })
		);
		assert_eq!(
			"wet".parse::<DiaperKind>(),
			Err(ValueError::InvalidDiaperKind { value: "wet".into() })
		);
		assert_eq!(
			"solidfood".parse::<FeedingKind>(),
			Err(ValueError::InvalidFeedingKind { value: "solidfood".into() })
		);
		assert_eq!(
			"oat".parse::<MilkKind>(),
			Err(ValueError::InvalidMilkKind { value: "oat".into() })
		);
		assert_eq!(
			"both".parse::<BreastSide>(),
			Err(ValueError::InvalidBreastSide { value: "both".into() })
		);
	}

	#[test]
	fn feeding_kinds_map_onto_journal_kinds() {
		assert_eq!(FeedingKind::Bottle.journal_kind(), JournalKind::BottleFeeding);
		assert_eq!(FeedingKind::Breast.journal_kind(), JournalKind::BreastFeeding);
		assert_eq!("bottlefeeding".parse::<FeedingKind>().unwrap(), FeedingKind::Bottle);
	}
}
