//! Measurement-based emission sources (continuous emission monitoring).

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::CalculationConfig;
use crate::error::ensure_finite;
use crate::validation::{
    require_non_negative, require_percentage, CompletenessTally, ValidationStatus,
};

/// Hours in a leap year; a source cannot operate longer in one reporting year.
const MAX_OPERATING_HOURS: f64 = 8784.0;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, uniffi::Enum,
)]
#[serde(rename_all = "camelCase")]
pub enum MeasuredGas {
    #[default]
    Co2,
    N2o,
}

impl MeasuredGas {
    pub fn label(&self) -> &'static str {
        match self {
            MeasuredGas::Co2 => "CO2",
            MeasuredGas::N2o => "N2O",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "co2" | "co₂" => Some(MeasuredGas::Co2),
            "n2o" | "n₂o" => Some(MeasuredGas::N2o),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct MeasurementSource {
    pub id: String,
    pub name: String,
    pub gas: MeasuredGas,
    /// g/Nm³, annual hourly average.
    pub average_concentration: f64,
    /// Nm³/h, annual hourly average.
    pub flue_gas_flow: f64,
    pub operating_hours: f64,
    /// Percent of measured CO2 of biomass origin.
    pub biomass_content: f64,
    /// Percent.
    pub uncertainty: Option<f64>,

    /// Tonnes of the measured gas.
    pub annual_emissions: f64,
    pub co2e_fossil: f64,
    pub co2e_biomass: f64,
    pub total_co2e: f64,
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl MeasurementSource {
    pub fn label(&self) -> String {
        if self.name.trim().is_empty() {
            format!("Measurement source {}", self.id)
        } else {
            format!("Measurement source '{}'", self.name.trim())
        }
    }

    pub fn status(&self) -> ValidationStatus {
        ValidationStatus {
            is_valid: self.is_valid,
            errors: self.errors.clone(),
            warnings: self.warnings.clone(),
            ..ValidationStatus::default()
        }
    }
}

pub(crate) fn completeness(source: &MeasurementSource) -> CompletenessTally {
    let mut tally = CompletenessTally::default();
    tally.check(!source.name.trim().is_empty());
    tally.check(source.average_concentration > 0.0);
    tally.check(source.flue_gas_flow > 0.0);
    tally.check(source.operating_hours > 0.0);
    tally
}

pub fn calculate_measurement_source(
    source: &MeasurementSource,
    config: &CalculationConfig,
) -> MeasurementSource {
    let mut out = source.clone();
    let mut status = ValidationStatus::new();

    if source.name.trim().is_empty() {
        status.error("name is required");
    }
    require_non_negative(&mut status, "average concentration", source.average_concentration);
    require_non_negative(&mut status, "flue gas flow", source.flue_gas_flow);
    require_non_negative(&mut status, "operating hours", source.operating_hours);
    if source.operating_hours > MAX_OPERATING_HOURS {
        status.warning(format!(
            "operating hours {} exceed the hours in a year",
            source.operating_hours
        ));
    }
    require_percentage(&mut status, "biomass content", source.biomass_content);
    if source.gas == MeasuredGas::N2o && source.biomass_content > 0.0 {
        status.warning("biomass content is ignored for N2O");
    }
    if let Some(u) = source.uncertainty {
        require_percentage(&mut status, "uncertainty", u);
    }

    let emissions = source.average_concentration * source.flue_gas_flow * source.operating_hours
        / 1_000_000.0;
    let emissions = match ensure_finite("annual emissions", emissions) {
        Ok(v) => v,
        Err(err) => {
            warn!(source = %source.id, error = %err, "measurement calculation failed");
            status.error(err.to_string());
            0.0
        }
    };

    out.annual_emissions = emissions;
    match source.gas {
        MeasuredGas::Co2 => {
            out.co2e_biomass = emissions * source.biomass_content / 100.0;
            out.co2e_fossil = emissions - out.co2e_biomass;
            out.total_co2e = emissions;
        }
        MeasuredGas::N2o => {
            out.co2e_biomass = 0.0;
            out.co2e_fossil = emissions * config.gwp.n2o;
            out.total_co2e = out.co2e_fossil;
        }
    }
    out.is_valid = !status.has_errors();
    out.errors = status.errors;
    out.warnings = status.warnings;
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack() -> MeasurementSource {
        MeasurementSource {
            id: "m1".to_string(),
            name: "Kiln stack".to_string(),
            gas: MeasuredGas::Co2,
            average_concentration: 250.0,
            flue_gas_flow: 40_000.0,
            operating_hours: 8000.0,
            biomass_content: 10.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_co2_measurement() {
        let out = calculate_measurement_source(&stack(), &CalculationConfig::default());
        assert!((out.annual_emissions - 80_000.0).abs() < 1e-6);
        assert!((out.co2e_biomass - 8_000.0).abs() < 1e-6);
        assert!((out.co2e_fossil - 72_000.0).abs() < 1e-6);
        assert!(out.is_valid);
    }

    #[test]
    fn test_n2o_measurement_uses_gwp() {
        let source = MeasurementSource {
            gas: MeasuredGas::N2o,
            biomass_content: 0.0,
            average_concentration: 0.5,
            ..stack()
        };
        let out = calculate_measurement_source(&source, &CalculationConfig::default());
        assert!((out.annual_emissions - 160.0).abs() < 1e-9);
        assert!((out.total_co2e - 160.0 * 298.0).abs() < 1e-6);
    }

    #[test]
    fn test_excess_hours_warns() {
        let source = MeasurementSource {
            operating_hours: 9000.0,
            ..stack()
        };
        let out = calculate_measurement_source(&source, &CalculationConfig::default());
        assert!(out.is_valid);
        assert_eq!(out.warnings.len(), 1);
    }
}
