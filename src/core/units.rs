use crate::errors::InvalidInputError;
use serde::{Deserialize, Serialize};

pub const PENCE_PER_POUND: f64 = 100.;
pub const MONTHS_PER_YEAR: u32 = 12;
/// Divisor turning a percentage into a fraction.
pub const PERCENT: f64 = 100.;

pub(crate) fn non_negative(value: f64, field: &str) -> Result<f64, InvalidInputError> {
    if !value.is_finite() || value < 0. {
        return Err(InvalidInputError::new(format!(
            "{field} must be a finite, non-negative number (got {value})"
        )));
    }

    Ok(value)
}

pub(crate) fn positive(value: f64, field: &str) -> Result<f64, InvalidInputError> {
    if !value.is_finite() || value <= 0. {
        return Err(InvalidInputError::new(format!(
            "{field} must be a finite, positive number (got {value})"
        )));
    }

    Ok(value)
}

/// A fuel unit price as tariffs quote it, in pence per kWh of delivered fuel.
///
/// Prices only ever enter the model in this unit and are converted to pounds once, when
/// fuel pricing is assembled.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct PencePerKwh(f64);

impl PencePerKwh {
    pub fn new(pence: f64) -> Result<Self, InvalidInputError> {
        Ok(Self(non_negative(pence, "unit price (p/kWh)")?))
    }

    pub fn to_pounds_per_kwh(self) -> PoundsPerKwh {
        PoundsPerKwh(self.0 / PENCE_PER_POUND)
    }
}

/// A unit price in pounds per kWh. This is the unit every cost calculation works in.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct PoundsPerKwh(f64);

impl PoundsPerKwh {
    pub fn pounds(&self) -> f64 {
        self.0
    }
}

/// A fixed annual charge in pounds per year, e.g. a standing charge.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct PoundsPerYear(f64);

impl PoundsPerYear {
    pub fn new(pounds: f64) -> Result<Self, InvalidInputError> {
        Ok(Self(non_negative(pounds, "annual charge (£/yr)")?))
    }

    pub fn pounds(&self) -> f64 {
        self.0
    }
}
