use crate::errors::{ModelError, NotFoundError, ValidationError};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::Display;

/// This module contains the reference data for the heating technologies that scenarios are
/// evaluated over.

pub type TechnologyId = String;

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FuelType {
    Electric,
    Gas,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct TechnologyProfile {
    pub id: TechnologyId,
    pub fuel_type: FuelType,
    /// COP or thermal efficiency ratio
    pub efficiency: f64,
    /// in kg CO2 per kWh of delivered fuel
    pub co2_factor: f64,
    /// in pounds
    pub install_cost: f64,
}

impl TechnologyProfile {
    pub fn new(
        id: impl Into<TechnologyId>,
        fuel_type: FuelType,
        efficiency: f64,
        co2_factor: f64,
        install_cost: f64,
    ) -> Self {
        Self {
            id: id.into(),
            fuel_type,
            efficiency,
            co2_factor,
            install_cost,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::new(&self.id, "id must not be empty"));
        }
        if !self.efficiency.is_finite() || self.efficiency <= 0. {
            return Err(ValidationError::new(
                &self.id,
                format!("efficiency must be positive (got {})", self.efficiency),
            ));
        }
        if !self.co2_factor.is_finite() || self.co2_factor < 0. {
            return Err(ValidationError::new(
                &self.id,
                format!("CO2 factor must not be negative (got {})", self.co2_factor),
            ));
        }
        if !self.install_cost.is_finite() || self.install_cost < 0. {
            return Err(ValidationError::new(
                &self.id,
                format!(
                    "installation cost must not be negative (got {})",
                    self.install_cost
                ),
            ));
        }

        Ok(())
    }
}

/// A partial edit to one technology profile. Unset fields keep their current value.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct TechnologyEdit {
    pub efficiency: Option<f64>,
    pub co2_factor: Option<f64>,
    pub install_cost: Option<f64>,
}

impl TechnologyEdit {
    fn merged_into(&self, profile: &TechnologyProfile) -> TechnologyProfile {
        TechnologyProfile {
            efficiency: self.efficiency.unwrap_or(profile.efficiency),
            co2_factor: self.co2_factor.unwrap_or(profile.co2_factor),
            install_cost: self.install_cost.unwrap_or(profile.install_cost),
            ..profile.clone()
        }
    }
}

/// The ordered set of technology profiles. Iteration order is the canonical display order.
#[derive(Clone, Debug, PartialEq)]
pub struct TechnologyCatalogue {
    profiles: IndexMap<TechnologyId, TechnologyProfile>,
}

impl TechnologyCatalogue {
    pub fn from_profiles(
        profiles: impl IntoIterator<Item = TechnologyProfile>,
    ) -> Result<Self, ValidationError> {
        let mut by_id: IndexMap<TechnologyId, TechnologyProfile> = Default::default();
        for profile in profiles {
            profile.validate()?;
            if by_id.contains_key(&profile.id) {
                return Err(ValidationError::new(
                    &profile.id,
                    "id appears more than once in the catalogue",
                ));
            }
            by_id.insert(profile.id.clone(), profile);
        }
        if by_id.is_empty() {
            return Err(ValidationError::new(
                "",
                "a catalogue needs at least one technology",
            ));
        }

        Ok(Self { profiles: by_id })
    }

    pub fn get(&self, id: &str) -> Result<&TechnologyProfile, NotFoundError> {
        self.profiles
            .get(id)
            .ok_or_else(|| NotFoundError::new(id, "catalogue lookup"))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.profiles.contains_key(id)
    }

    pub fn all_ids(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }

    pub fn profiles(&self) -> impl Iterator<Item = &TechnologyProfile> {
        self.profiles.values()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Replace the profile stored under `id`. On error the catalogue is left untouched.
    pub fn update(&mut self, id: &str, profile: TechnologyProfile) -> Result<(), ModelError> {
        let slot = self
            .profiles
            .get_mut(id)
            .ok_or_else(|| NotFoundError::new(id, "catalogue update"))?;
        if profile.id != id {
            return Err(ValidationError::new(
                id,
                format!("profile id '{}' does not match the id being updated", profile.id),
            )
            .into());
        }
        profile.validate()?;
        *slot = profile;

        Ok(())
    }

    pub fn apply_edit(&mut self, id: &str, edit: &TechnologyEdit) -> Result<(), ModelError> {
        let edited = edit.merged_into(self.get(id)?);
        self.update(id, edited)
    }
}

impl Default for TechnologyCatalogue {
    fn default() -> Self {
        use FuelType::*;

        let profiles = [
            TechnologyProfile::new("LTASHP", Electric, 2.86, 0.074, 12000.),
            TechnologyProfile::new("HTASHP", Electric, 2.73, 0.077, 14000.),
            TechnologyProfile::new("LTGSHP", Electric, 3.53, 0.060, 20000.),
            TechnologyProfile::new("AAHP", Electric, 2.04, 0.103, 6800.),
            TechnologyProfile::new("Storage Heater", Electric, 1.00, 0.222, 4500.),
            TechnologyProfile::new("Electric Boiler", Electric, 1.00, 0.211, 5000.),
            TechnologyProfile::new("Infrared Heater", Electric, 1.00, 0.211, 6500.),
            TechnologyProfile::new("Gas Condensing Boiler", Gas, 0.895, 0.184, 3500.),
            TechnologyProfile::new("Gas Non-Condensing Boiler", Gas, 0.60, 0.184, 3000.),
        ];

        Self {
            profiles: profiles
                .into_iter()
                .map(|profile| (profile.id.clone(), profile))
                .collect(),
        }
    }
}

/// Process-wide handle on a catalogue that may be edited while scenarios are evaluated.
///
/// Edits take the write lock; evaluation works on a cloned snapshot so it never holds the
/// lock while computing.
#[derive(Clone, Debug, Default)]
pub struct SharedCatalogue(Arc<RwLock<TechnologyCatalogue>>);

impl SharedCatalogue {
    pub fn new(catalogue: TechnologyCatalogue) -> Self {
        Self(Arc::new(RwLock::new(catalogue)))
    }

    pub fn snapshot(&self) -> TechnologyCatalogue {
        self.0.read().clone()
    }

    pub fn update(&self, id: &str, profile: TechnologyProfile) -> Result<(), ModelError> {
        self.0.write().update(id, profile)
    }

    pub fn apply_edit(&self, id: &str, edit: &TechnologyEdit) -> Result<(), ModelError> {
        self.0.write().apply_edit(id, edit)
    }
}
