use crate::core::units::MONTHS_PER_YEAR;
use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// A payback time in whole years plus remaining months, months always in 0..=11.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct PaybackPeriod {
    pub years: u64,
    pub months: u32,
}

impl PaybackPeriod {
    pub fn new(years: u64, months: u32) -> Self {
        Self { years, months }
    }

    /// Split fractional years into whole years and rounded months, carrying a month count that
    /// rounds up to 12 into the year.
    ///
    /// Only called with finite, non-negative years. Year counts beyond `u64::MAX` saturate.
    pub fn from_years(payback_years: f64) -> Self {
        let years = payback_years.floor();
        let months = ((payback_years - years) * MONTHS_PER_YEAR as f64).round() as u32;
        let years = years as u64;

        if months >= MONTHS_PER_YEAR {
            Self::new(years.saturating_add(1), 0)
        } else {
            Self::new(years, months)
        }
    }

    pub fn as_years(&self) -> f64 {
        self.years as f64 + self.months as f64 / MONTHS_PER_YEAR as f64
    }
}

impl Display for PaybackPeriod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}y {}m", self.years, self.months)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PaybackLabel {
    Immediate,
    NoPayback,
    Years(PaybackPeriod),
}

impl PaybackLabel {
    /// Classify a technology's payback against the baseline.
    ///
    /// Rules apply in priority order:
    /// 1. no extra capex over the baseline pays back immediately, whatever the running costs
    /// 2. extra capex with no running cost saving never pays back
    /// 3. extra capex fully offset by a grant pays back immediately
    /// 4. otherwise the effective extra capex is divided by the annual saving
    ///
    /// A saving so small that the division overflows to infinity is treated as no saving.
    pub(crate) fn classify(
        extra_capex_vs_baseline: f64,
        annual_savings_vs_baseline: f64,
        effective_extra_capex: f64,
    ) -> Self {
        if extra_capex_vs_baseline <= 0. {
            return PaybackLabel::Immediate;
        }
        if annual_savings_vs_baseline <= 0. {
            return PaybackLabel::NoPayback;
        }
        if effective_extra_capex <= 0. {
            return PaybackLabel::Immediate;
        }

        let payback_years = effective_extra_capex / annual_savings_vs_baseline;
        if payback_years.is_finite() {
            PaybackLabel::Years(PaybackPeriod::from_years(payback_years))
        } else {
            PaybackLabel::NoPayback
        }
    }

    pub fn payback_years(&self) -> Option<f64> {
        match self {
            PaybackLabel::Immediate => Some(0.),
            PaybackLabel::NoPayback => None,
            PaybackLabel::Years(period) => Some(period.as_years()),
        }
    }
}

impl Display for PaybackLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PaybackLabel::Immediate => write!(f, "Immediate"),
            PaybackLabel::NoPayback => write!(f, "No payback"),
            PaybackLabel::Years(period) => write!(f, "{period}"),
        }
    }
}

impl Serialize for PaybackLabel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
