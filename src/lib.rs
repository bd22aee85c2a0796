pub mod core;
pub mod errors;
pub mod input;
pub mod output;

use crate::core::comparison::{compare, ScenarioComparison, ScenarioSummary};
use crate::core::evaluator::{evaluate_with_options, ScenarioResult, ScenarioResultRow};
use crate::errors::{HeatingModelError, ModelError, OutputError};
use crate::input::ingest_for_processing;
use crate::output::Output;
use bitflags::bitflags;
use csv::WriterBuilder;
use indexmap::IndexMap;
use serde::Serialize;
use anyhow::Context;
use std::io::{Read, Write};
use tracing::{debug, info, instrument, warn};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct ProjectFlags: u32 {
        /// Write a results table per evaluated scenario.
        const WRITE_CSV = 0b1;
        /// Write every scenario outcome and the A/B comparison as JSON.
        const WRITE_SUMMARY = 0b10;
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScenarioOutcome {
    Evaluated {
        result: ScenarioResult,
        summary: ScenarioSummary,
    },
    Failed {
        error: ModelError,
    },
}

impl ScenarioOutcome {
    pub fn result(&self) -> Option<&ScenarioResult> {
        match self {
            ScenarioOutcome::Evaluated { result, .. } => Some(result),
            ScenarioOutcome::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectResults {
    /// Keyed by scenario name, in input order.
    pub scenarios: IndexMap<String, ScenarioOutcome>,
    /// Second evaluated scenario against the first, when there are at least two.
    pub comparison: Option<ScenarioComparison>,
}

/// Evaluate every scenario in a project input file.
///
/// A scenario that fails evaluation is recorded as failed without affecting the others. Errors
/// that stop the whole project are unparsable input, a catalogue that cannot be built, or
/// outputs that cannot be written.
#[instrument(skip_all)]
pub fn run_project(
    input: impl Read,
    output: impl Output,
    flags: &ProjectFlags,
) -> Result<ProjectResults, HeatingModelError> {
    let input = ingest_for_processing(input)?;

    let catalogue = input.catalogue()?.snapshot();
    let pricing = input.pricing().map_err(ModelError::from)?;
    let options = input.evaluation_options();

    let mut scenarios: IndexMap<String, ScenarioOutcome> = Default::default();
    for scenario in input.scenarios() {
        let outcome = match evaluate_with_options(&catalogue, &pricing, &scenario, &options) {
            Ok(result) => {
                let summary = ScenarioSummary::from_result(&result);
                debug!(
                    scenario = scenario.name.as_str(),
                    cheapest = summary.cheapest_annual_cost.as_str(),
                    lowest_co2 = summary.lowest_co2.as_str(),
                    "scenario summary"
                );
                ScenarioOutcome::Evaluated { result, summary }
            }
            Err(error) => {
                warn!(
                    scenario = scenario.name.as_str(),
                    %error,
                    "scenario could not be evaluated"
                );
                ScenarioOutcome::Failed { error }
            }
        };
        scenarios.insert(scenario.name, outcome);
    }

    let evaluated: Vec<&ScenarioResult> = scenarios
        .values()
        .filter_map(ScenarioOutcome::result)
        .collect();
    let comparison = match evaluated.as_slice() {
        [a, b, ..] => Some(compare(a, b).map_err(ModelError::from)?),
        _ => None,
    };

    let results = ProjectResults {
        scenarios,
        comparison,
    };

    if !output.is_noop() {
        write_outputs(&output, &results, flags)
            .map_err(|err| HeatingModelError::ErrorInOutput(OutputError::new(err)))?;
    }

    Ok(results)
}

fn write_outputs(
    output: &impl Output,
    results: &ProjectResults,
    flags: &ProjectFlags,
) -> anyhow::Result<()> {
    if flags.contains(ProjectFlags::WRITE_CSV) {
        for result in results.scenarios.values().filter_map(ScenarioOutcome::result) {
            write_results_file(output, result)?;
        }
    }
    if flags.contains(ProjectFlags::WRITE_SUMMARY) {
        info!("writing out to summary");
        let writer = output
            .writer_for_location_key("summary", "json")
            .context("could not open summary for writing")?;
        serde_json::to_writer_pretty(writer, results).context("could not write summary")?;
    }

    Ok(())
}

/// Column headings and units of the results table, in column order.
const RESULTS_COLUMNS: [(&str, &str); 15] = [
    ("Technology", ""),
    ("Fuel type", ""),
    ("Efficiency", "[ratio]"),
    ("Fuel demand", "[kWh]"),
    ("Unit cost", "[£/kWh]"),
    ("Fuel cost", "[£/yr]"),
    ("Standing charge", "[£/yr]"),
    ("Annual cost", "[£/yr]"),
    ("CO2", "[kg/yr]"),
    ("Capex", "[£]"),
    ("Extra capex vs baseline", "[£]"),
    ("Grant", "[£]"),
    ("Effective extra capex", "[£]"),
    ("Annual savings vs baseline", "[£/yr]"),
    ("Payback", ""),
];

fn results_record(row: &ScenarioResultRow) -> [String; 15] {
    let two_dp = |value: f64| format!("{value:.2}");

    [
        row.technology_id.clone(),
        row.fuel_type.to_string(),
        two_dp(row.effective_efficiency),
        two_dp(row.fuel_demand_kwh),
        two_dp(row.unit_cost),
        two_dp(row.fuel_cost),
        two_dp(row.standing_charge),
        two_dp(row.annual_cost),
        two_dp(row.co2_kg),
        two_dp(row.capex),
        two_dp(row.extra_capex_vs_baseline),
        two_dp(row.grant_amount),
        two_dp(row.effective_extra_capex),
        two_dp(row.annual_savings_vs_baseline),
        row.payback_label.to_string(),
    ]
}

fn write_results_file(output: &impl Output, result: &ScenarioResult) -> anyhow::Result<()> {
    let location_key = format!("results_{}", result.scenario_name());
    info!("writing out to {location_key}");
    let writer = output
        .writer_for_location_key(&location_key, "csv")
        .with_context(|| format!("could not open {location_key} for writing"))?;

    write_results_table(writer, result).with_context(|| format!("could not write {location_key}"))
}

fn write_results_table(writer: impl Write, result: &ScenarioResult) -> anyhow::Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);

    writer.write_record(RESULTS_COLUMNS.iter().map(|(heading, _)| *heading))?;
    writer.write_record(RESULTS_COLUMNS.iter().map(|(_, units)| *units))?;
    for row in result.rows() {
        writer.write_record(&results_record(row))?;
    }

    debug!("flushing out CSV");
    writer.flush()?;

    Ok(())
}
