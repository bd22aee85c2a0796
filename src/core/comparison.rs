use crate::core::catalogue::TechnologyId;
use crate::core::evaluator::{ScenarioResult, ScenarioResultRow};
use crate::core::payback::PaybackLabel;
use crate::errors::NotFoundError;
use ordered_float::OrderedFloat;
use serde::Serialize;

/// Headline figures for one evaluated scenario.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScenarioSummary {
    pub scenario_name: String,
    pub baseline_id: TechnologyId,
    pub cheapest_annual_cost: TechnologyId,
    pub lowest_co2: TechnologyId,
}

impl ScenarioSummary {
    /// Ties go to whichever technology comes first in catalogue order.
    pub fn from_result(result: &ScenarioResult) -> Self {
        Self {
            scenario_name: result.scenario_name().to_string(),
            baseline_id: result.baseline_id().to_string(),
            cheapest_annual_cost: min_row_by(result, |row| row.annual_cost),
            lowest_co2: min_row_by(result, |row| row.co2_kg),
        }
    }
}

fn min_row_by(result: &ScenarioResult, key: impl Fn(&ScenarioResultRow) -> f64) -> TechnologyId {
    // a result always holds at least its baseline row
    result
        .rows()
        .iter()
        .min_by_key(|row| OrderedFloat(key(row)))
        .unwrap_or_else(|| result.baseline_row())
        .technology_id
        .clone()
}

/// How one technology's figures move from scenario A to scenario B.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TechnologyDelta {
    pub technology_id: TechnologyId,
    /// B minus A, in £/yr
    pub annual_cost_delta: f64,
    /// B minus A, in kg/yr
    pub co2_kg_delta: f64,
    /// B minus A, in £/yr
    pub annual_savings_delta: f64,
    /// B minus A, in years. None when either scenario never pays back.
    pub payback_years_delta: Option<f64>,
    pub payback_a: PaybackLabel,
    pub payback_b: PaybackLabel,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScenarioComparison {
    pub scenario_a: String,
    pub scenario_b: String,
    pub deltas: Vec<TechnologyDelta>,
}

/// Diff scenario B against scenario A, in A's technology order.
pub fn compare(a: &ScenarioResult, b: &ScenarioResult) -> Result<ScenarioComparison, NotFoundError> {
    let deltas = a
        .rows()
        .iter()
        .map(|row_a| {
            let row_b = b
                .row(&row_a.technology_id)
                .ok_or_else(|| NotFoundError::new(&row_a.technology_id, "compared technology"))?;

            Ok(TechnologyDelta {
                technology_id: row_a.technology_id.clone(),
                annual_cost_delta: row_b.annual_cost - row_a.annual_cost,
                co2_kg_delta: row_b.co2_kg - row_a.co2_kg,
                annual_savings_delta: row_b.annual_savings_vs_baseline
                    - row_a.annual_savings_vs_baseline,
                payback_years_delta: row_b
                    .payback_label
                    .payback_years()
                    .zip(row_a.payback_label.payback_years())
                    .map(|(years_b, years_a)| years_b - years_a),
                payback_a: row_a.payback_label,
                payback_b: row_b.payback_label,
            })
        })
        .collect::<Result<Vec<_>, NotFoundError>>()?;

    Ok(ScenarioComparison {
        scenario_a: a.scenario_name().to_string(),
        scenario_b: b.scenario_name().to_string(),
        deltas,
    })
}
