//! Dual-unit conversion helpers for journal measurements.
//!
//! Imperial and metric fields are mutually derivable: when only one side of a
//! pair is supplied, the other is computed with a fixed constant and rounded
//! to two decimal places, in either direction.

// self
use crate::error::ValueError;

/// Fluid ounces to milliliters.
pub const OUNCES_TO_MILLILITERS: f64 = 29.5735;
/// Ounces to grams.
pub const OUNCES_TO_GRAMS: f64 = 28.3495;
/// Inches to centimeters.
pub const INCHES_TO_CENTIMETERS: f64 = 2.54;

/// Rounds a measurement to two decimal places.
pub fn round2(value: f64) -> f64 {
	(value * 100.).round() / 100.
}

/// Converts fluid ounces to milliliters, rounded to two decimals.
pub fn ounces_to_milliliters(ounces: f64) -> f64 {
	round2(ounces * OUNCES_TO_MILLILITERS)
}

/// Converts milliliters to fluid ounces, rounded to two decimals.
pub fn milliliters_to_ounces(milliliters: f64) -> f64 {
	round2(milliliters / OUNCES_TO_MILLILITERS)
}

/// Converts ounces to grams, rounded to two decimals.
pub fn ounces_to_grams(ounces: f64) -> f64 {
	round2(ounces * OUNCES_TO_GRAMS)
}

/// Converts grams to ounces, rounded to two decimals.
pub fn grams_to_ounces(grams: f64) -> f64 {
	round2(grams / OUNCES_TO_GRAMS)
}

/// Converts inches to centimeters, rounded to two decimals.
pub fn inches_to_centimeters(inches: f64) -> f64 {
	round2(inches * INCHES_TO_CENTIMETERS)
}

/// Converts centimeters to inches, rounded to two decimals.
pub fn centimeters_to_inches(centimeters: f64) -> f64 {
	round2(centimeters / INCHES_TO_CENTIMETERS)
}

/// Completes an imperial/metric pair from whichever side was provided.
pub(crate) fn complete_pair(
	imperial: Option<f64>,
	metric: Option<f64>,
	factor: f64,
	quantity: &'static str,
) -> Result<(f64, f64), ValueError> {
	match (imperial, metric) {
		(Some(imperial), Some(metric)) => Ok((imperial, metric)),
		(Some(imperial), None) => Ok((imperial, round2(imperial * factor))),
		(None, Some(metric)) => Ok((round2(metric / factor), metric)),
		(None, None) => Err(ValueError::MissingMeasurement { quantity }),
	}
}
