use crate::core::catalogue::{FuelType, TechnologyCatalogue, TechnologyId, TechnologyProfile};
use crate::core::payback::PaybackLabel;
use crate::core::pricing::FuelPricing;
use crate::core::scenario::{Grant, GrantBasis, GrantMode, ScenarioInput};
use crate::core::units::PERCENT;
use crate::errors::{InvalidInputError, ModelError, NotFoundError};
use serde::Serialize;
use tracing::debug;

/// This module evaluates a scenario over every technology in a catalogue, producing running
/// costs, emissions, capex and payback against the scenario's baseline.

/// Switches between the variants of the model.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EvaluationOptions {
    /// When false, electric technologies never incur a standing charge.
    pub electric_standing_charge: bool,
    pub grant_basis: GrantBasis,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            electric_standing_charge: true,
            grant_basis: GrantBasis::ExtraCapex,
        }
    }
}

/// One technology's results within a scenario. All money values are in pounds.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScenarioResultRow {
    pub technology_id: TechnologyId,
    pub fuel_type: FuelType,
    pub effective_efficiency: f64,
    pub fuel_demand_kwh: f64,
    /// £/kWh after any discount
    pub unit_cost: f64,
    /// £/yr
    pub fuel_cost: f64,
    /// £/yr
    pub standing_charge: f64,
    /// £/yr
    pub annual_cost: f64,
    /// kg/yr
    pub co2_kg: f64,
    pub capex: f64,
    pub extra_capex_vs_baseline: f64,
    pub grant_amount: f64,
    pub effective_extra_capex: f64,
    /// £/yr
    pub annual_savings_vs_baseline: f64,
    pub payback_label: PaybackLabel,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScenarioResult {
    scenario_name: String,
    baseline_id: TechnologyId,
    #[serde(skip)]
    baseline_index: usize,
    rows: Vec<ScenarioResultRow>,
}

impl ScenarioResult {
    pub fn scenario_name(&self) -> &str {
        &self.scenario_name
    }

    pub fn baseline_id(&self) -> &str {
        &self.baseline_id
    }

    /// Rows in canonical catalogue order.
    pub fn rows(&self) -> &[ScenarioResultRow] {
        &self.rows
    }

    pub fn row(&self, technology_id: &str) -> Option<&ScenarioResultRow> {
        self.rows
            .iter()
            .find(|row| row.technology_id == technology_id)
    }

    pub fn baseline_row(&self) -> &ScenarioResultRow {
        &self.rows[self.baseline_index]
    }
}

/// Evaluate a scenario with the default model options.
pub fn evaluate(
    catalogue: &TechnologyCatalogue,
    pricing: &FuelPricing,
    scenario: &ScenarioInput,
) -> Result<ScenarioResult, ModelError> {
    evaluate_with_options(catalogue, pricing, scenario, &EvaluationOptions::default())
}

pub fn evaluate_with_options(
    catalogue: &TechnologyCatalogue,
    pricing: &FuelPricing,
    scenario: &ScenarioInput,
    options: &EvaluationOptions,
) -> Result<ScenarioResult, ModelError> {
    scenario.validate(catalogue)?;
    pricing.validate()?;

    let running_costs = catalogue
        .profiles()
        .map(|profile| RunningCosts::calculate(profile, pricing, scenario, options))
        .collect::<Result<Vec<_>, _>>()?;

    let baseline_index = running_costs
        .iter()
        .position(|costs| costs.technology_id == scenario.baseline_id)
        .ok_or_else(|| NotFoundError::new(&scenario.baseline_id, "baseline"))?;
    let baseline = &running_costs[baseline_index];

    let grant_allocation =
        GrantAllocation::new(scenario.grant.as_ref(), options.grant_basis, baseline.capex);

    let rows: Vec<ScenarioResultRow> = running_costs
        .iter()
        .map(|costs| {
            let annual_savings_vs_baseline = baseline.annual_cost - costs.annual_cost;
            let extra_capex_vs_baseline = costs.capex - baseline.capex;
            let GrantedCapex {
                grant_amount,
                effective_extra_capex,
                payback_capex_difference,
            } = grant_allocation.apply(
                &costs.technology_id,
                costs.capex,
                extra_capex_vs_baseline,
            );

            ScenarioResultRow {
                technology_id: costs.technology_id.clone(),
                fuel_type: costs.fuel_type,
                effective_efficiency: costs.effective_efficiency,
                fuel_demand_kwh: costs.fuel_demand_kwh,
                unit_cost: costs.unit_cost,
                fuel_cost: costs.fuel_cost,
                standing_charge: costs.standing_charge,
                annual_cost: costs.annual_cost,
                co2_kg: costs.co2_kg,
                capex: costs.capex,
                extra_capex_vs_baseline,
                grant_amount,
                effective_extra_capex,
                annual_savings_vs_baseline,
                payback_label: PaybackLabel::classify(
                    payback_capex_difference,
                    annual_savings_vs_baseline,
                    effective_extra_capex,
                ),
            }
        })
        .collect();

    debug!(
        scenario = scenario.name.as_str(),
        baseline = scenario.baseline_id.as_str(),
        rows = rows.len(),
        "evaluated scenario"
    );

    Ok(ScenarioResult {
        scenario_name: scenario.name.clone(),
        baseline_id: scenario.baseline_id.clone(),
        baseline_index,
        rows,
    })
}

/// The per-technology quantities that do not depend on the baseline.
#[derive(Debug)]
struct RunningCosts {
    technology_id: TechnologyId,
    fuel_type: FuelType,
    effective_efficiency: f64,
    fuel_demand_kwh: f64,
    unit_cost: f64,
    fuel_cost: f64,
    standing_charge: f64,
    annual_cost: f64,
    co2_kg: f64,
    capex: f64,
}

impl RunningCosts {
    fn calculate(
        profile: &TechnologyProfile,
        pricing: &FuelPricing,
        scenario: &ScenarioInput,
        options: &EvaluationOptions,
    ) -> Result<Self, InvalidInputError> {
        let effective_efficiency = profile.efficiency * scenario.efficiency_multiplier;
        if !effective_efficiency.is_finite() || effective_efficiency <= 0. {
            return Err(InvalidInputError::new(format!(
                "effective efficiency of '{}' must be positive (got {effective_efficiency})",
                profile.id
            )));
        }

        let fuel_demand_kwh = scenario.heat_demand_kwh / effective_efficiency;
        let unit_cost = pricing.unit_price(profile.fuel_type, scenario.discount_fraction);
        let standing_charge =
            pricing.standing_charge(profile.fuel_type, options.electric_standing_charge);
        let fuel_cost = fuel_demand_kwh * unit_cost;

        Ok(Self {
            technology_id: profile.id.clone(),
            fuel_type: profile.fuel_type,
            effective_efficiency,
            fuel_demand_kwh,
            unit_cost,
            fuel_cost,
            standing_charge,
            annual_cost: fuel_cost + standing_charge,
            co2_kg: fuel_demand_kwh * profile.co2_factor,
            capex: profile.install_cost,
        })
    }
}

/// One technology's capex figures once the scenario's grant has been allocated.
struct GrantedCapex {
    grant_amount: f64,
    effective_extra_capex: f64,
    /// Unclipped capex difference that decides between immediate payback and the other rules.
    payback_capex_difference: f64,
}

/// How a scenario's grant (if any) turns extra capex into effective extra capex.
enum GrantAllocation<'a> {
    None,
    ExtraCapex(&'a Grant),
    AbsoluteCapex {
        grant: &'a Grant,
        baseline_effective_capex: f64,
    },
}

impl<'a> GrantAllocation<'a> {
    fn new(grant: Option<&'a Grant>, basis: GrantBasis, baseline_capex: f64) -> Self {
        match (grant, basis) {
            (None, _) => GrantAllocation::None,
            (Some(grant), GrantBasis::ExtraCapex) => GrantAllocation::ExtraCapex(grant),
            (Some(grant), GrantBasis::AbsoluteCapex) => GrantAllocation::AbsoluteCapex {
                grant,
                // the baseline itself may be the grant target under this basis
                baseline_effective_capex: grant.reduced_capex_for(baseline_capex),
            },
        }
    }

    fn apply(
        &self,
        technology_id: &str,
        capex: f64,
        extra_capex_vs_baseline: f64,
    ) -> GrantedCapex {
        match self {
            GrantAllocation::ExtraCapex(grant)
                if grant.target_id == technology_id && extra_capex_vs_baseline > 0. =>
            {
                let grant_amount = match grant.mode {
                    GrantMode::Flat => grant.value,
                    GrantMode::PercentOfExtraCapex => {
                        extra_capex_vs_baseline * grant.value / PERCENT
                    }
                };
                GrantedCapex {
                    grant_amount,
                    effective_extra_capex: (extra_capex_vs_baseline - grant_amount).max(0.),
                    payback_capex_difference: extra_capex_vs_baseline,
                }
            }
            GrantAllocation::AbsoluteCapex {
                grant,
                baseline_effective_capex,
            } => {
                let effective_capex = if grant.target_id == technology_id {
                    grant.reduced_capex_for(capex)
                } else {
                    capex
                };
                // both sides of the comparison carry their grant under this basis
                let effective_difference = effective_capex - baseline_effective_capex;
                GrantedCapex {
                    grant_amount: capex - effective_capex,
                    effective_extra_capex: effective_difference.max(0.),
                    payback_capex_difference: effective_difference,
                }
            }
            _ => GrantedCapex {
                grant_amount: 0.,
                effective_extra_capex: extra_capex_vs_baseline.max(0.),
                payback_capex_difference: extra_capex_vs_baseline,
            },
        }
    }
}

impl Grant {
    /// A technology's own capex after this grant, floored at zero.
    fn reduced_capex_for(&self, capex: f64) -> f64 {
        let reduced = match self.mode {
            GrantMode::Flat => capex - self.value,
            GrantMode::PercentOfExtraCapex => capex * (1. - self.value / PERCENT),
        };
        reduced.max(0.)
    }
}
