use std::ops::RangeInclusive;

use serde_json::Value;
use thiserror::Error;

use super::record::Reading;

/// Accepted altitude range, feet. Bounds are inclusive.
pub const ALTITUDE_RANGE: RangeInclusive<f64> = 0.0..=3000.0;
/// Accepted heading indicator range, degrees. Bounds are inclusive.
pub const HEADING_RANGE: RangeInclusive<f64> = 0.0..=360.0;
/// Accepted attitude indicator range. Bounds are inclusive.
pub const ATTITUDE_RANGE: RangeInclusive<f64> = -100.0..=100.0;

/// Rejection naming the first field that failed validation.
///
/// The display strings are the exact messages returned on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid altitude value")]
    Altitude,
    #[error("Invalid HIS value")]
    Heading,
    #[error("Invalid ADI value")]
    Attitude,
}

/// Check an untyped candidate against the field bounds and produce the
/// typed [`Reading`].
///
/// Fields are checked in order (altitude, HIS, ADI) and the first failure
/// wins. Missing fields and non-numeric values are rejected, never coerced.
/// Pure: no side effects, no I/O.
pub fn validate(candidate: &Value) -> Result<Reading, ValidationError> {
    let altitude = numeric_field(candidate, "altitude")
        .filter(|value| ALTITUDE_RANGE.contains(value))
        .ok_or(ValidationError::Altitude)?;
    let heading = numeric_field(candidate, "HIS")
        .filter(|value| HEADING_RANGE.contains(value))
        .ok_or(ValidationError::Heading)?;
    let attitude = numeric_field(candidate, "ADI")
        .filter(|value| ATTITUDE_RANGE.contains(value))
        .ok_or(ValidationError::Attitude)?;
    Ok(Reading {
        altitude,
        heading,
        attitude,
    })
}

fn numeric_field(candidate: &Value, key: &str) -> Option<f64> {
    candidate.get(key)?.as_f64()
}
