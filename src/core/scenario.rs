use crate::core::catalogue::{TechnologyCatalogue, TechnologyId};
use crate::core::units::{non_negative, positive, PERCENT};
use crate::errors::{InvalidInputError, ModelError, NotFoundError};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

pub const MAX_DISCOUNT_FRACTION: f64 = 0.5;

/// Housing archetypes, each with a fixed annual heat demand.
#[derive(Clone, Copy, Debug, Deserialize, Display, EnumIter, Eq, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub enum Archetype {
    #[serde(rename = "Smaller Mid-Terrace On-Gas")]
    #[strum(to_string = "Smaller Mid-Terrace On-Gas")]
    SmallerMidTerraceOnGas,
    #[serde(rename = "Larger Detached On-Gas")]
    #[strum(to_string = "Larger Detached On-Gas")]
    LargerDetachedOnGas,
    #[serde(rename = "Larger Detached Off-Gas")]
    #[strum(to_string = "Larger Detached Off-Gas")]
    LargerDetachedOffGas,
}

impl Archetype {
    /// Annual heat demand in kWh
    pub fn heat_demand_kwh(&self) -> f64 {
        match self {
            Archetype::SmallerMidTerraceOnGas => 6400.,
            Archetype::LargerDetachedOnGas => 17600.,
            Archetype::LargerDetachedOffGas => 21800.,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum GrantMode {
    /// A fixed amount in pounds.
    Flat,
    /// A percentage (0-100) of the technology's extra capex over the baseline.
    PercentOfExtraCapex,
}

/// What a grant is deducted from.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum GrantBasis {
    /// Deduct from the target's capex over and above the baseline. Only technologies that
    /// cost more upfront than the baseline receive anything.
    #[default]
    ExtraCapex,
    /// Deduct from the target's own capex before the baseline comparison. Under this basis a
    /// grant on the baseline technology raises every other technology's effective extra capex.
    AbsoluteCapex,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct Grant {
    pub target_id: TechnologyId,
    pub mode: GrantMode,
    pub value: f64,
}

/// The parameters of one scenario, held by the caller between evaluations.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScenarioInput {
    pub name: String,
    /// annual, in kWh
    pub heat_demand_kwh: f64,
    /// applied to the electricity unit price only, 0 to 0.5
    pub discount_fraction: f64,
    pub efficiency_multiplier: f64,
    pub baseline_id: TechnologyId,
    pub grant: Option<Grant>,
}

impl ScenarioInput {
    pub fn new(
        name: impl Into<String>,
        heat_demand_kwh: f64,
        baseline_id: impl Into<TechnologyId>,
    ) -> Self {
        Self {
            name: name.into(),
            heat_demand_kwh,
            discount_fraction: 0.,
            efficiency_multiplier: 1.,
            baseline_id: baseline_id.into(),
            grant: None,
        }
    }

    pub fn for_archetype(
        name: impl Into<String>,
        archetype: Archetype,
        baseline_id: impl Into<TechnologyId>,
    ) -> Self {
        Self::new(name, archetype.heat_demand_kwh(), baseline_id)
    }

    pub fn with_discount(mut self, discount_fraction: f64) -> Self {
        self.discount_fraction = discount_fraction;
        self
    }

    pub fn with_efficiency_multiplier(mut self, efficiency_multiplier: f64) -> Self {
        self.efficiency_multiplier = efficiency_multiplier;
        self
    }

    pub fn with_grant(mut self, grant: Grant) -> Self {
        self.grant = Some(grant);
        self
    }

    /// Check numeric invariants and resolve every referenced technology id, so that
    /// evaluation never discovers a bad reference part way through.
    pub fn validate(&self, catalogue: &TechnologyCatalogue) -> Result<(), ModelError> {
        positive(self.heat_demand_kwh, "heat demand (kWh)")?;
        non_negative(self.discount_fraction, "discount fraction")?;
        if self.discount_fraction > MAX_DISCOUNT_FRACTION {
            return Err(InvalidInputError::new(format!(
                "discount fraction must be at most {MAX_DISCOUNT_FRACTION} (got {})",
                self.discount_fraction
            ))
            .into());
        }
        positive(self.efficiency_multiplier, "efficiency multiplier")?;

        if !catalogue.contains(&self.baseline_id) {
            return Err(NotFoundError::new(&self.baseline_id, "baseline").into());
        }
        if let Some(grant) = &self.grant {
            non_negative(grant.value, "grant value")?;
            if grant.mode == GrantMode::PercentOfExtraCapex && grant.value > PERCENT {
                return Err(InvalidInputError::new(format!(
                    "percentage grant must be at most {PERCENT}% (got {})",
                    grant.value
                ))
                .into());
            }
            if !catalogue.contains(&grant.target_id) {
                return Err(NotFoundError::new(&grant.target_id, "grant target").into());
            }
        }

        Ok(())
    }
}
