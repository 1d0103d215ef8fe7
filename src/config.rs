//! Methodology constants and tolerance bands.
//!
//! The defaults reproduce the reference template. Hosts may load overrides
//! from JSON; any key left out keeps its default.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::validation::{Severity, ToleranceBand};

/// Global warming potentials (100-year horizon) used by the template.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct GwpTable {
    pub n2o: f64,
    pub cf4: f64,
    pub c2f6: f64,
}

impl Default for GwpTable {
    fn default() -> Self {
        GwpTable {
            n2o: 298.0,
            cf4: 6630.0,
            c2f6: 11100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct CalculationConfig {
    /// C direct emissions against B total CO2e.
    pub direct_band: ToleranceBand,
    /// C biomass CO2 against B biomass CO2e.
    pub biomass_band: ToleranceBand,
    /// C fuel input against B energy content.
    pub fuel_band: ToleranceBand,
    /// C total emissions against B total CO2e.
    pub total_band: ToleranceBand,
    /// Implied emission factor plausibility range (tCO2e/TJ).
    pub implied_factor_min: f64,
    pub implied_factor_max: f64,
    /// Manual totals may deviate this much from their components before a warning.
    pub manual_total_tolerance_percent: f64,
    /// Seed zero-valued automatic balance fields from the source-stream totals.
    pub import_balance_from_streams: bool,

    /// E allocations against D external precursor consumption.
    pub precursor_band: ToleranceBand,
    /// Sum of allocations against total precursor quantity.
    pub allocation_tolerance_percent: f64,

    /// F CO2 above this share of C direct emissions is flagged.
    pub additional_co2_share_warning_percent: f64,
    /// F CO2e exceeding C total emissions.
    pub additional_co2e_band: ToleranceBand,
    /// Reported CO2 against activity x factor.
    pub plausibility_tolerance_percent: f64,
    pub max_average_uncertainty_percent: f64,

    pub gwp: GwpTable,
    /// CO2/C mass ratio applied when a mass-balance stream has no conversion factor.
    pub default_mass_balance_conversion_factor: f64,
}

impl Default for CalculationConfig {
    fn default() -> Self {
        CalculationConfig {
            direct_band: ToleranceBand::warning_error(30.0, 60.0),
            biomass_band: ToleranceBand::warning_error(30.0, 60.0),
            fuel_band: ToleranceBand {
                lower_percent: 30.0,
                lower_severity: Severity::Info,
                upper_percent: 50.0,
                upper_severity: Severity::Warning,
            },
            total_band: ToleranceBand::warning_error(30.0, 60.0),
            implied_factor_min: 10.0,
            implied_factor_max: 100.0,
            manual_total_tolerance_percent: 1.0,
            import_balance_from_streams: true,
            precursor_band: ToleranceBand::warning_error(30.0, 60.0),
            allocation_tolerance_percent: 15.0,
            additional_co2_share_warning_percent: 50.0,
            additional_co2e_band: ToleranceBand::warning_error(20.0, 50.0),
            plausibility_tolerance_percent: 10.0,
            max_average_uncertainty_percent: 50.0,
            gwp: GwpTable::default(),
            default_mass_balance_conversion_factor: 3.667,
        }
    }
}

impl CalculationConfig {
    /// Parses a (possibly partial) JSON document over the defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: CalculationConfig = serde_json::from_str(json)?;
        config.check()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn check(&self) -> Result<(), ConfigError> {
        let bands = [
            ("direct", &self.direct_band),
            ("biomass", &self.biomass_band),
            ("fuel", &self.fuel_band),
            ("total", &self.total_band),
            ("precursor", &self.precursor_band),
            ("additional co2e", &self.additional_co2e_band),
        ];
        for (name, band) in bands {
            if band.lower_percent > band.upper_percent {
                return Err(ConfigError::InvertedBand {
                    name: name.to_string(),
                    warning: band.lower_percent,
                    error: band.upper_percent,
                });
            }
        }
        Ok(())
    }
}

#[uniffi::export]
pub fn default_calculation_config() -> CalculationConfig {
    CalculationConfig::default()
}

#[uniffi::export]
pub fn parse_calculation_config(json: String) -> Result<CalculationConfig, ConfigError> {
    CalculationConfig::from_json(&json)
}
