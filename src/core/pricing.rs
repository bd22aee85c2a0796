use crate::core::catalogue::FuelType;
use crate::core::units::{non_negative, PencePerKwh, PoundsPerKwh, PoundsPerYear};
use crate::errors::InvalidInputError;
use serde::Serialize;

/// This module contains the fuel prices a scenario is costed against.

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FuelPricing {
    electricity_unit_price: PoundsPerKwh,
    gas_unit_price: PoundsPerKwh,
    electricity_standing_charge: PoundsPerYear,
    gas_standing_charge: PoundsPerYear,
}

impl FuelPricing {
    /// Arguments
    /// * `electricity_unit_price` - pre-discount, in p/kWh
    /// * `gas_unit_price` - in p/kWh
    /// * `electricity_standing_charge` - in £/yr
    /// * `gas_standing_charge` - in £/yr
    pub fn from_pence(
        electricity_unit_price: PencePerKwh,
        gas_unit_price: PencePerKwh,
        electricity_standing_charge: PoundsPerYear,
        gas_standing_charge: PoundsPerYear,
    ) -> Self {
        Self {
            electricity_unit_price: electricity_unit_price.to_pounds_per_kwh(),
            gas_unit_price: gas_unit_price.to_pounds_per_kwh(),
            electricity_standing_charge,
            gas_standing_charge,
        }
    }

    /// Unit types are non-negative when built through their constructors, but deserialized
    /// values skip those checks, so evaluation re-checks them here.
    pub fn validate(&self) -> Result<(), InvalidInputError> {
        non_negative(self.electricity_unit_price.pounds(), "electricity unit price")?;
        non_negative(self.gas_unit_price.pounds(), "gas unit price")?;
        non_negative(
            self.electricity_standing_charge.pounds(),
            "electricity standing charge",
        )?;
        non_negative(self.gas_standing_charge.pounds(), "gas standing charge")?;

        Ok(())
    }

    /// Price per kWh in pounds for the given fuel. The discount only ever applies to
    /// electricity.
    pub(crate) fn unit_price(&self, fuel_type: FuelType, discount_fraction: f64) -> f64 {
        match fuel_type {
            FuelType::Electric => {
                self.electricity_unit_price.pounds() * (1. - discount_fraction)
            }
            FuelType::Gas => self.gas_unit_price.pounds(),
        }
    }

    pub(crate) fn standing_charge(
        &self,
        fuel_type: FuelType,
        model_electric_standing_charge: bool,
    ) -> f64 {
        match fuel_type {
            FuelType::Electric if model_electric_standing_charge => {
                self.electricity_standing_charge.pounds()
            }
            FuelType::Electric => 0.,
            FuelType::Gas => self.gas_standing_charge.pounds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::*;

    #[fixture]
    fn pricing() -> FuelPricing {
        FuelPricing::from_pence(
            PencePerKwh::new(30.).unwrap(),
            PencePerKwh::new(10.).unwrap(),
            PoundsPerYear::new(50.).unwrap(),
            PoundsPerYear::new(300.).unwrap(),
        )
    }

    #[rstest]
    fn test_unit_price(pricing: FuelPricing) {
        assert_relative_eq!(pricing.unit_price(FuelType::Electric, 0.), 0.3);
        assert_relative_eq!(pricing.unit_price(FuelType::Electric, 0.1), 0.27);
        assert_relative_eq!(pricing.unit_price(FuelType::Gas, 0.), 0.1);
        assert_relative_eq!(pricing.unit_price(FuelType::Gas, 0.5), 0.1);
    }

    #[rstest]
    fn test_validate(pricing: FuelPricing) {
        assert!(pricing.validate().is_ok());

        let negative_gas: PencePerKwh = serde_json::from_str("-2.0").unwrap();
        let pricing = FuelPricing::from_pence(
            PencePerKwh::new(30.).unwrap(),
            negative_gas,
            PoundsPerYear::default(),
            PoundsPerYear::default(),
        );
        assert!(pricing.validate().is_err());
    }

    #[rstest]
    fn test_standing_charge(pricing: FuelPricing) {
        assert_eq!(pricing.standing_charge(FuelType::Electric, true), 50.);
        assert_eq!(pricing.standing_charge(FuelType::Electric, false), 0.);
        assert_eq!(pricing.standing_charge(FuelType::Gas, true), 300.);
        assert_eq!(pricing.standing_charge(FuelType::Gas, false), 300.);
    }
}
