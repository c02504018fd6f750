//! Request builders for journal create operations.
//!
//! Each builder captures the caller-facing arguments of one create call,
//! validates them before any network traffic, and renders the flat camelCase
//! body the journal endpoint expects (`type`, `startTime`, `babyId`,
//! `userId`, `data`, optional `note`/`endTime`).

// crates.io
use serde_json::json;
// self
use crate::{
	_prelude::*,
	endpoint::fmt_seconds,
	error::ValueError,
	journal::{
		BreastSide, DiaperKind, FeedingKind, JournalKind, MilkKind,
		units::{self, INCHES_TO_CENTIMETERS, OUNCES_TO_GRAMS, OUNCES_TO_MILLILITERS},
	},
};

fn render(
	kind: JournalKind,
	start_time: OffsetDateTime,
	baby_id: &str,
	user_id: &str,
	data: Value,
	note: Option<&str>,
) -> Value {
	let mut body = json!({
		"type": kind.as_str(),
		"startTime": fmt_seconds(start_time),
		"babyId": baby_id,
		"userId": user_id,
		"data": data,
	});

	if let (Some(note), Some(map)) = (note, body.as_object_mut()) {
		map.insert("note".into(), Value::from(note));
	}

	body
}

/// A new diaper change entry.
#[derive(Clone, Debug)]
pub struct NewDiaperEntry {
	pub(crate) baby_id: String,
	start_time: OffsetDateTime,
	kinds: Vec<DiaperKind>,
	note: Option<String>,
	pub(crate) user_id: Option<String>,
}
impl NewDiaperEntry {
	/// Creates an entry for the provided baby, instant, and diaper kinds.
	pub fn new(
		baby_id: impl Into<String>,
		start_time: OffsetDateTime,
		kinds: impl IntoIterator<Item = DiaperKind>,
	) -> Self {
		Self {
			baby_id: baby_id.into(),
			start_time,
			kinds: kinds.into_iter().collect(),
			note: None,
			user_id: None,
		}
	}

	/// Attaches a free-form note.
	pub fn with_note(mut self, note: impl Into<String>) -> Self {
		self.note = Some(note.into());

		self
	}

	/// Supplies the user id explicitly, skipping auto-detection.
	pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
		self.user_id = Some(user_id.into());

		self
	}

	pub(crate) fn validate(&self) -> Result<(), ValueError> {
		Ok(())
	}

	pub(crate) fn payload(&self, user_id: &str) -> Result<Value, ValueError> {
		let kinds = self.kinds.iter().map(|kind| kind.as_str()).collect::<Vec<_>>();

		Ok(render(
			JournalKind::Diaper,
			self.start_time,
			&self.baby_id,
			user_id,
			json!({ "types": kinds }),
			self.note.as_deref(),
		))
	}
}

/// A new bottle- or breast-feeding entry.
#[derive(Clone, Debug)]
pub struct NewFeedingEntry {
	pub(crate) baby_id: String,
	start_time: OffsetDateTime,
	kind: FeedingKind,
	milk: MilkKind,
	amount_imperial: Option<f64>,
	amount_metric: Option<f64>,
	note: Option<String>,
	pub(crate) user_id: Option<String>,
}
impl NewFeedingEntry {
	/// Creates an entry for the provided baby, instant, and feeding kind.
	///
	/// Milk defaults to breast milk; bottle feedings must supply at least one
	/// of the amount fields, the other is derived (oz ↔ ml).
	pub fn new(baby_id: impl Into<String>, start_time: OffsetDateTime, kind: FeedingKind) -> Self {
		Self {
			baby_id: baby_id.into(),
			start_time,
			kind,
			milk: MilkKind::Breastmilk,
			amount_imperial: None,
			amount_metric: None,
			note: None,
			user_id: None,
		}
	}

	/// Overrides the milk kind.
	pub fn with_milk(mut self, milk: MilkKind) -> Self {
		self.milk = milk;

		self
	}

	/// Supplies the amount in fluid ounces.
	pub fn with_amount_imperial(mut self, ounces: f64) -> Self {
		self.amount_imperial = Some(ounces);

		self
	}

	/// Supplies the amount in milliliters.
	pub fn with_amount_metric(mut self, milliliters: f64) -> Self {
		self.amount_metric = Some(milliliters);

		self
	}

	/// Attaches a free-form note.
	pub fn with_note(mut self, note: impl Into<String>) -> Self {
		self.note = Some(note.into());

		self
	}

	/// Supplies the user id explicitly, skipping auto-detection.
	pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
		self.user_id = Some(user_id.into());

		self
	}

	pub(crate) fn validate(&self) -> Result<(), ValueError> {
		if self.kind == FeedingKind::Bottle {
			units::complete_pair(
				self.amount_imperial,
				self.amount_metric,
				OUNCES_TO_MILLILITERS,
				"amount",
			)?;
		}

		Ok(())
	}

	pub(crate) fn payload(&self, user_id: &str) -> Result<Value, ValueError> {
		let mut data = json!({ "type": self.milk.as_str() });

		if self.kind == FeedingKind::Bottle {
			let (imperial, metric) = units::complete_pair(
				self.amount_imperial,
				self.amount_metric,
				OUNCES_TO_MILLILITERS,
				"amount",
			)?;

			if let Some(map) = data.as_object_mut() {
				map.insert("amountImperial".into(), Value::from(imperial));
				map.insert("amountMetric".into(), Value::from(metric));
			}
		}

		Ok(render(
			self.kind.journal_kind(),
			self.start_time,
			&self.baby_id,
			user_id,
			data,
			self.note.as_deref(),
		))
	}
}

/// A new weight measurement entry (oz ↔ g).
#[derive(Clone, Debug)]
pub struct NewWeightEntry {
	pub(crate) baby_id: String,
	start_time: OffsetDateTime,
	weight_imperial: Option<f64>,
	weight_metric: Option<f64>,
	note: Option<String>,
	pub(crate) user_id: Option<String>,
}
impl NewWeightEntry {
	/// Creates an entry for the provided baby and instant; at least one of the
	/// weight fields must be supplied.
	pub fn new(baby_id: impl Into<String>, start_time: OffsetDateTime) -> Self {
		Self {
			baby_id: baby_id.into(),
			start_time,
			weight_imperial: None,
			weight_metric: None,
			note: None,
			user_id: None,
		}
	}

	/// Supplies the weight in ounces.
	pub fn with_weight_imperial(mut self, ounces: f64) -> Self {
		self.weight_imperial = Some(ounces);

		self
	}

	/// Supplies the weight in grams.
	pub fn with_weight_metric(mut self, grams: f64) -> Self {
		self.weight_metric = Some(grams);

		self
	}

	/// Attaches a free-form note.
	pub fn with_note(mut self, note: impl Into<String>) -> Self {
		self.note = Some(note.into());

		self
	}

	/// Supplies the user id explicitly, skipping auto-detection.
	pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
		self.user_id = Some(user_id.into());

		self
	}

	pub(crate) fn validate(&self) -> Result<(), ValueError> {
		units::complete_pair(self.weight_imperial, self.weight_metric, OUNCES_TO_GRAMS, "weight")
			.map(|_| ())
	}

	pub(crate) fn payload(&self, user_id: &str) -> Result<Value, ValueError> {
		let (imperial, metric) = units::complete_pair(
			self.weight_imperial,
			self.weight_metric,
			OUNCES_TO_GRAMS,
			"weight",
		)?;

		Ok(render(
			JournalKind::Weight,
			self.start_time,
			&self.baby_id,
			user_id,
			json!({ "weightImperial": imperial, "weightMetric": metric }),
			self.note.as_deref(),
		))
	}
}

/// A new height measurement entry (in ↔ cm).
#[derive(Clone, Debug)]
pub struct NewHeightEntry {
	pub(crate) baby_id: String,
	start_time: OffsetDateTime,
	height_imperial: Option<f64>,
	height_metric: Option<f64>,
	note: Option<String>,
	pub(crate) user_id: Option<String>,
}
impl NewHeightEntry {
	/// Creates an entry for the provided baby and instant; at least one of the
	/// height fields must be supplied.
	pub fn new(baby_id: impl Into<String>, start_time: OffsetDateTime) -> Self {
		Self {
			baby_id: baby_id.into(),
			start_time,
			height_imperial: None,
			height_metric: None,
			note: None,
			user_id: None,
		}
	}

	/// Supplies the height in inches.
	pub fn with_height_imperial(mut self, inches: f64) -> Self {
		self.height_imperial = Some(inches);

		self
	}

	/// Supplies the height in centimeters.
	pub fn with_height_metric(mut self, centimeters: f64) -> Self {
		self.height_metric = Some(centimeters);

		self
	}

	/// Attaches a free-form note.
	pub fn with_note(mut self, note: impl Into<String>) -> Self {
		self.note = Some(note.into());

		self
	}

	/// Supplies the user id explicitly, skipping auto-detection.
	pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
		self.user_id = Some(user_id.into());

		self
	}

	pub(crate) fn validate(&self) -> Result<(), ValueError> {
		units::complete_pair(
			self.height_imperial,
			self.height_metric,
			INCHES_TO_CENTIMETERS,
			"height",
		)
		.map(|_| ())
	}

	pub(crate) fn payload(&self, user_id: &str) -> Result<Value, ValueError> {
		let (imperial, metric) = units::complete_pair(
			self.height_imperial,
			self.height_metric,
			INCHES_TO_CENTIMETERS,
			"height",
		)?;

		Ok(render(
			JournalKind::Height,
			self.start_time,
			&self.baby_id,
			user_id,
			json!({ "heightImperial": imperial, "heightMetric": metric }),
			self.note.as_deref(),
		))
	}
}

/// A new head circumference entry (in ↔ cm).
#[derive(Clone, Debug)]
pub struct NewHeadEntry {
	pub(crate) baby_id: String,
	start_time: OffsetDateTime,
	circumference_imperial: Option<f64>,
	circumference_metric: Option<f64>,
	note: Option<String>,
	pub(crate) user_id: Option<String>,
}
impl NewHeadEntry {
	/// Creates an entry for the provided baby and instant; at least one of the
	/// circumference fields must be supplied.
	pub fn new(baby_id: impl Into<String>, start_time: OffsetDateTime) -> Self {
		Self {
			baby_id: baby_id.into(),
			start_time,
			circumference_imperial: None,
			circumference_metric: None,
			note: None,
			user_id: None,
		}
	}

	/// Supplies the circumference in inches.
	pub fn with_circumference_imperial(mut self, inches: f64) -> Self {
		self.circumference_imperial = Some(inches);

		self
	}

	/// Supplies the circumference in centimeters.
	pub fn with_circumference_metric(mut self, centimeters: f64) -> Self {
		self.circumference_metric = Some(centimeters);

		self
	}

	/// Attaches a free-form note.
	pub fn with_note(mut self, note: impl Into<String>) -> Self {
		self.note = Some(note.into());

		self
	}

	/// Supplies the user id explicitly, skipping auto-detection.
	pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
		self.user_id = Some(user_id.into());

		self
	}

	pub(crate) fn validate(&self) -> Result<(), ValueError> {
		units::complete_pair(
			self.circumference_imperial,
			self.circumference_metric,
			INCHES_TO_CENTIMETERS,
			"circumference",
		)
		.map(|_| ())
	}

	pub(crate) fn payload(&self, user_id: &str) -> Result<Value, ValueError> {
		let (imperial, metric) = units::complete_pair(
			self.circumference_imperial,
			self.circumference_metric,
			INCHES_TO_CENTIMETERS,
			"circumference",
		)?;

		Ok(render(
			JournalKind::Head,
			self.start_time,
			&self.baby_id,
			user_id,
			json!({ "circumferenceImperial": imperial, "circumferenceMetric": metric }),
			self.note.as_deref(),
		))
	}
}

/// A new breast feeding entry with per-side durations.
#[derive(Clone, Debug)]
pub struct NewBreastFeedingEntry {
	pub(crate) baby_id: String,
	start_time: OffsetDateTime,
	end_time: OffsetDateTime,
	left_duration_secs: Option<i64>,
	right_duration_secs: Option<i64>,
	last_used: BreastSide,
	note: Option<String>,
	pub(crate) user_id: Option<String>,
}
impl NewBreastFeedingEntry {
	/// Creates an entry covering the provided feeding window. The last used
	/// side defaults to left.
	pub fn new(
		baby_id: impl Into<String>,
		start_time: OffsetDateTime,
		end_time: OffsetDateTime,
	) -> Self {
		Self {
			baby_id: baby_id.into(),
			start_time,
			end_time,
			left_duration_secs: None,
			right_duration_secs: None,
			last_used: BreastSide::Left,
			note: None,
			user_id: None,
		}
	}

	/// Supplies the duration on the left breast, in seconds.
	pub fn with_left_duration(mut self, secs: i64) -> Self {
		self.left_duration_secs = Some(secs);

		self
	}

	/// Supplies the duration on the right breast, in seconds.
	pub fn with_right_duration(mut self, secs: i64) -> Self {
		self.right_duration_secs = Some(secs);

		self
	}

	/// Overrides which side was used last.
	pub fn with_last_used(mut self, side: BreastSide) -> Self {
		self.last_used = side;

		self
	}

	/// Attaches a free-form note.
	pub fn with_note(mut self, note: impl Into<String>) -> Self {
		self.note = Some(note.into());

		self
	}

	/// Supplies the user id explicitly, skipping auto-detection.
	pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
		self.user_id = Some(user_id.into());

		self
	}

	pub(crate) fn validate(&self) -> Result<(), ValueError> {
		Ok(())
	}

	pub(crate) fn payload(&self, user_id: &str) -> Result<Value, ValueError> {
		let total = self.left_duration_secs.unwrap_or(0) + self.right_duration_secs.unwrap_or(0);
		let mut data = json!({
			"lastUsedBreast": self.last_used.as_str(),
			"totalDuration": total,
		});

		if let Some(map) = data.as_object_mut() {
			if let Some(left) = self.left_duration_secs {
				map.insert("left".into(), json!({ "duration": left }));
			}
			if let Some(right) = self.right_duration_secs {
				map.insert("right".into(), json!({ "duration": right }));
			}
		}

		let mut body = render(
			JournalKind::BreastFeeding,
			self.start_time,
			&self.baby_id,
			user_id,
			data,
			self.note.as_deref(),
		);

		if let Some(map) = body.as_object_mut() {
			map.insert("endTime".into(), Value::from(fmt_seconds(self.end_time)));
		}

		Ok(body)
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	#[test]
	fn diaper_payload_matches_the_wire_shape() {
		let entry = NewDiaperEntry::new(
			"b1",
			datetime!(2024-01-01 10:00 UTC),
			[DiaperKind::Pee, DiaperKind::Poo],
		);
		let body = entry.payload("u1").unwrap();

		assert_eq!(
			body,
			json!({
				"type": "diaper",
				"startTime": "2024-01-01T10:00:00Z",
				"babyId": "b1",
				"userId": "u1",
				"data": { "types": ["pee", "poo"] },
			})
		);
	}

	#[test]
	fn bottle_feeding_derives_the_metric_amount() {
		let entry =
			NewFeedingEntry::new("b1", datetime!(2024-01-01 08:30 UTC), FeedingKind::Bottle)
				.with_milk(MilkKind::Formula)
				.with_amount_imperial(4.5)
				.with_note("after nap");
		let body = entry.payload("u1").unwrap();

		assert_eq!(body["type"], "bottlefeeding");
		assert_eq!(body["data"]["type"], "formula");
		assert_eq!(body["data"]["amountImperial"], 4.5);
		assert_eq!(body["data"]["amountMetric"], 133.08);
		assert_eq!(body["note"], "after nap");
	}

	#[test]
	fn bottle_feeding_without_amounts_is_rejected() {
		let entry = NewFeedingEntry::new("b1", datetime!(2024-01-01 08:30 UTC), FeedingKind::Bottle);

		assert_eq!(
			entry.validate(),
			Err(ValueError::MissingMeasurement { quantity: "amount" })
		);
	}

	#[test]
	fn breast_feeding_without_amounts_needs_no_measurement() {
		let entry = NewFeedingEntry::new("b1", datetime!(2024-01-01 08:30 UTC), FeedingKind::Breast);

		assert_eq!(entry.validate(), Ok(()));
		assert_eq!(entry.payload("u1").unwrap()["data"], json!({ "type": "breastmilk" }));
	}

	#[test]
	fn weight_payload_derives_the_imperial_side() {
		let entry = NewWeightEntry::new("b1", datetime!(2024-01-02 09:00 UTC))
			.with_weight_metric(212.62)
			.with_user_id("u9");
		let body = entry.payload("u9").unwrap();

		assert_eq!(body["data"], json!({ "weightImperial": 7.5, "weightMetric": 212.62 }));
	}

	#[test]
	fn breast_feeding_payload_totals_both_sides() {
		let entry = NewBreastFeedingEntry::new(
			"b1",
			datetime!(2024-01-01 10:00 UTC),
			datetime!(2024-01-01 10:20 UTC),
		)
		.with_left_duration(600)
		.with_right_duration(600)
		.with_last_used(BreastSide::Right);
		let body = entry.payload("u1").unwrap();

		assert_eq!(body["endTime"], "2024-01-01T10:20:00Z");
		assert_eq!(body["data"]["totalDuration"], 1200);
		assert_eq!(body["data"]["lastUsedBreast"], "right");
		assert_eq!(body["data"]["left"], json!({ "duration": 600 }));
		assert_eq!(body["data"]["right"], json!({ "duration": 600 }));
	}
}
