//! The ten-field flight record accepted by the predict route.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Request payload rejected before reaching the model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The body could not be decoded into a flight record at all
    /// (missing field, wrong JSON type, syntax error).
    #[error("malformed request: {0}")]
    Malformed(String),

    #[error("field `{field}` {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl ValidationError {
    fn field(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// Scheduling and route attributes of one flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightFeatures {
    /// Month of the year, 1–12.
    pub month: i32,
    /// Day of the month, 1–31.
    pub day: i32,
    /// Scheduled departure hour, 0–23.
    pub hour: i32,
    /// Scheduled departure time, HHMM.
    pub sched_dep_time: i32,
    /// Scheduled arrival time, HHMM.
    pub sched_arr_time: i32,
    /// Origin airport code.
    pub origin: String,
    /// Destination airport code.
    pub dest: String,
    /// Airline carrier code.
    pub carrier: String,
    /// Route distance.
    pub distance: f64,
    /// Departure delay in minutes; negative for early departures.
    pub dep_delay: f64,
}

impl FlightFeatures {
    /// Check ranges and normalize codes to upper case.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        check_range("month", self.month, 1, 12)?;
        check_range("day", self.day, 1, 31)?;
        check_range("hour", self.hour, 0, 23)?;
        check_hhmm("sched_dep_time", self.sched_dep_time)?;
        check_hhmm("sched_arr_time", self.sched_arr_time)?;

        self.origin = airport_code("origin", &self.origin)?;
        self.dest = airport_code("dest", &self.dest)?;
        self.carrier = carrier_code(&self.carrier)?;

        if !self.distance.is_finite() || self.distance < 0.0 {
            return Err(ValidationError::field(
                "distance",
                format!("must be a non-negative number, got {}", self.distance),
            ));
        }
        if !self.dep_delay.is_finite() {
            return Err(ValidationError::field("dep_delay", "must be a finite number"));
        }

        Ok(self)
    }
}

fn check_range(field: &'static str, value: i32, min: i32, max: i32) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::field(
            field,
            format!("must be between {min} and {max}, got {value}"),
        ));
    }
    Ok(())
}

fn check_hhmm(field: &'static str, value: i32) -> Result<(), ValidationError> {
    check_range(field, value, 0, 2359)?;
    if value % 100 >= 60 {
        return Err(ValidationError::field(
            field,
            format!("must be an HHMM time, got {value}"),
        ));
    }
    Ok(())
}

fn airport_code(field: &'static str, code: &str) -> Result<String, ValidationError> {
    let code = code.trim();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::field(
            field,
            format!("must be a 3-letter airport code, got {code:?}"),
        ));
    }
    Ok(code.to_ascii_uppercase())
}

fn carrier_code(code: &str) -> Result<String, ValidationError> {
    let code = code.trim();
    if code.is_empty() || code.len() > 3 || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::field(
            "carrier",
            format!("must be a 1-3 character airline code, got {code:?}"),
        ));
    }
    Ok(code.to_ascii_uppercase())
}
