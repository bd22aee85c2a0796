use crate::core::catalogue::{
    SharedCatalogue, TechnologyCatalogue, TechnologyEdit, TechnologyProfile,
};
use crate::core::evaluator::EvaluationOptions;
use crate::core::pricing::FuelPricing;
use crate::core::scenario::{Archetype, Grant, GrantBasis, ScenarioInput};
use crate::core::units::{PencePerKwh, PoundsPerYear, PERCENT};
use crate::errors::{InvalidInputError, ModelError};
use anyhow::{anyhow, bail, Context};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_valid::Validate;
use std::collections::HashSet;
use std::io::Read;

pub fn ingest_for_processing(json: impl Read) -> anyhow::Result<ProjectInput> {
    let input: ProjectInput =
        serde_json::from_reader(json).context("could not parse project input")?;

    input
        .validate()
        .map_err(|errors| anyhow!("project input is out of range: {errors}"))?;
    input
        .fuel_prices
        .validate()
        .map_err(|errors| anyhow!("fuel prices are out of range: {errors}"))?;

    let mut names: HashSet<&str> = Default::default();
    for scenario in &input.scenarios {
        scenario
            .validate()
            .map_err(|errors| anyhow!("scenario '{}' is out of range: {errors}", scenario.name))?;
        check_scenario_name(&scenario.name)?;
        if !names.insert(scenario.name.as_str()) {
            bail!("scenario name '{}' is used more than once", scenario.name);
        }
    }

    Ok(input)
}

/// Scenario names end up in output file names, so they must stay within one path component.
fn check_scenario_name(name: &str) -> anyhow::Result<()> {
    if name.trim().is_empty() {
        bail!("scenario names must not be empty");
    }
    if name.contains(['/', '\\']) || name.contains("..") {
        bail!("scenario name '{name}' must not contain path separators or '..'");
    }

    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ProjectInput {
    /// Replaces the built-in technology catalogue when given.
    pub technologies: Option<Vec<TechnologyProfile>>,
    #[serde(default)]
    pub technology_edits: IndexMap<String, TechnologyEdit>,
    pub fuel_prices: FuelPricesInput,
    #[validate(min_items = 1)]
    pub scenarios: Vec<ScenarioInputDetails>,
    #[serde(default = "default_electric_standing_charge")]
    pub electric_standing_charge: bool,
    #[serde(default)]
    pub grant_basis: GrantBasis,
}

fn default_electric_standing_charge() -> bool {
    true
}

#[derive(Clone, Copy, Debug, Deserialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct FuelPricesInput {
    /// in p/kWh, before any smart tariff discount
    #[validate(minimum = 0.)]
    pub electricity_unit_price: f64,
    /// in p/kWh
    #[validate(minimum = 0.)]
    pub gas_unit_price: f64,
    /// in £/yr
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub electricity_standing_charge: f64,
    /// in £/yr
    #[validate(minimum = 0.)]
    pub gas_standing_charge: f64,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(untagged)]
pub enum HeatDemand {
    Archetype(Archetype),
    /// annual, in kWh
    Kwh(f64),
}

impl HeatDemand {
    pub fn kwh(&self) -> f64 {
        match self {
            HeatDemand::Archetype(archetype) => archetype.heat_demand_kwh(),
            HeatDemand::Kwh(kwh) => *kwh,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct ScenarioInputDetails {
    pub name: String,
    pub heat_demand: HeatDemand,
    /// Smart tariff discount on the electricity unit price, as a percentage.
    #[serde(default)]
    #[validate(minimum = 0.)]
    #[validate(maximum = 50.)]
    pub discount_percent: f64,
    #[serde(default = "default_efficiency_multiplier")]
    pub efficiency_multiplier: f64,
    pub baseline: String,
    pub grant: Option<Grant>,
}

fn default_efficiency_multiplier() -> f64 {
    1.
}

impl From<&ScenarioInputDetails> for ScenarioInput {
    fn from(details: &ScenarioInputDetails) -> Self {
        let scenario = ScenarioInput::new(
            details.name.clone(),
            details.heat_demand.kwh(),
            details.baseline.clone(),
        )
        .with_discount(details.discount_percent / PERCENT)
        .with_efficiency_multiplier(details.efficiency_multiplier);

        match &details.grant {
            Some(grant) => scenario.with_grant(grant.clone()),
            None => scenario,
        }
    }
}

impl ProjectInput {
    /// Build the catalogue this project runs against, with its edits applied in file order.
    pub fn catalogue(&self) -> Result<SharedCatalogue, ModelError> {
        let catalogue = match &self.technologies {
            Some(profiles) => TechnologyCatalogue::from_profiles(profiles.iter().cloned())?,
            None => TechnologyCatalogue::default(),
        };
        let shared = SharedCatalogue::new(catalogue);
        for (id, edit) in &self.technology_edits {
            shared.apply_edit(id, edit)?;
        }

        Ok(shared)
    }

    pub fn pricing(&self) -> Result<FuelPricing, InvalidInputError> {
        let prices = &self.fuel_prices;

        Ok(FuelPricing::from_pence(
            PencePerKwh::new(prices.electricity_unit_price)?,
            PencePerKwh::new(prices.gas_unit_price)?,
            PoundsPerYear::new(prices.electricity_standing_charge)?,
            PoundsPerYear::new(prices.gas_standing_charge)?,
        ))
    }

    pub fn scenarios(&self) -> Vec<ScenarioInput> {
        self.scenarios.iter().map(ScenarioInput::from).collect()
    }

    pub fn evaluation_options(&self) -> EvaluationOptions {
        EvaluationOptions {
            electric_standing_charge: self.electric_standing_charge,
            grant_basis: self.grant_basis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scenario::GrantMode;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::json;
    use std::fs::File;
    use walkdir::WalkDir;

    fn ingest(value: serde_json::Value) -> anyhow::Result<ProjectInput> {
        ingest_for_processing(value.to_string().as_bytes())
    }

    #[fixture]
    fn project_json() -> serde_json::Value {
        json!({
            "TechnologyEdits": {
                "LTASHP": {"install_cost": 11000.0}
            },
            "FuelPrices": {
                "electricity_unit_price": 30.0,
                "gas_unit_price": 10.0,
                "gas_standing_charge": 300.0
            },
            "Scenarios": [
                {
                    "name": "A",
                    "heat_demand": "Smaller Mid-Terrace On-Gas",
                    "discount_percent": 10.0,
                    "baseline": "Gas Condensing Boiler",
                    "grant": {"target_id": "LTASHP", "mode": "flat", "value": 7500.0}
                },
                {
                    "name": "B",
                    "heat_demand": 12000.0,
                    "efficiency_multiplier": 1.1,
                    "baseline": "Gas Condensing Boiler"
                }
            ]
        })
    }

    #[rstest]
    fn test_ingest_project(project_json: serde_json::Value) {
        let input = ingest(project_json).unwrap();
        let scenarios = input.scenarios();

        assert_eq!(scenarios.len(), 2);
        assert_eq!(scenarios[0].heat_demand_kwh, 6400.);
        assert_relative_eq!(scenarios[0].discount_fraction, 0.1);
        assert_eq!(
            scenarios[0].grant,
            Some(Grant {
                target_id: "LTASHP".to_string(),
                mode: GrantMode::Flat,
                value: 7500.,
            })
        );
        assert_eq!(scenarios[1].heat_demand_kwh, 12000.);
        assert_eq!(scenarios[1].discount_fraction, 0.);
        assert_eq!(scenarios[1].efficiency_multiplier, 1.1);

        assert_eq!(input.evaluation_options(), EvaluationOptions::default());
    }

    #[rstest]
    fn test_catalogue_edits_are_applied(project_json: serde_json::Value) {
        let catalogue = ingest(project_json).unwrap().catalogue().unwrap().snapshot();
        assert_eq!(catalogue.get("LTASHP").unwrap().install_cost, 11000.);
        assert_eq!(catalogue.len(), 9);
    }

    #[rstest]
    fn test_edit_of_unknown_technology_fails(mut project_json: serde_json::Value) {
        project_json["TechnologyEdits"] = json!({"Oil Boiler": {"efficiency": 0.85}});
        let result = ingest(project_json).unwrap().catalogue();
        assert!(matches!(result, Err(ModelError::NotFound(_))));
    }

    #[rstest]
    fn test_pricing_is_converted_from_pence(project_json: serde_json::Value) {
        let pricing = ingest(project_json).unwrap().pricing().unwrap();
        let expected = FuelPricing::from_pence(
            PencePerKwh::new(30.).unwrap(),
            PencePerKwh::new(10.).unwrap(),
            PoundsPerYear::new(0.).unwrap(),
            PoundsPerYear::new(300.).unwrap(),
        );
        assert_eq!(pricing, expected);
    }

    #[rstest]
    #[case("/Scenarios/0/discount_percent", json!(60.0))]
    #[case("/Scenarios/0/discount_percent", json!(-5.0))]
    #[case("/FuelPrices/gas_unit_price", json!(-1.0))]
    #[case("/Scenarios", json!([]))]
    #[case("/Scenarios/1/name", json!("A"))]
    #[case("/Scenarios/0/heat_demand", json!("Bungalow"))]
    #[case("/Scenarios/1/name", json!("B/heat pump"))]
    #[case("/Scenarios/1/name", json!("a\\b"))]
    #[case("/Scenarios/1/name", json!("../x"))]
    #[case("/Scenarios/1/name", json!(" "))]
    fn test_rejects_bad_input(
        mut project_json: serde_json::Value,
        #[case] pointer: &str,
        #[case] value: serde_json::Value,
    ) {
        *project_json.pointer_mut(pointer).unwrap() = value;
        assert!(ingest(project_json).is_err());
    }

    #[rstest]
    fn test_rejects_unknown_fields(mut project_json: serde_json::Value) {
        project_json["Archetype"] = json!("Larger Detached On-Gas");
        assert!(ingest(project_json).is_err());
    }

    #[rstest]
    fn should_successfully_parse_all_demo_files() {
        for entry in WalkDir::new("./demos")
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| {
                !e.file_type().is_dir() && e.file_name().to_str().unwrap().ends_with("json")
            })
        {
            let parsed = ingest_for_processing(File::open(entry.path()).unwrap());
            assert!(
                parsed.is_ok(),
                "error was {:?} when parsing file {}",
                parsed.err().unwrap(),
                entry.file_name().to_str().unwrap()
            );
        }
    }
}
