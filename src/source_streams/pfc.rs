//! Perfluorocarbon emissions from primary aluminium electrolysis.
//!
//! Tier 2 slope and overvoltage methods. When a recognized cell technology
//! is given, missing coefficients fall back to the IPCC technology defaults.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::CalculationConfig;
use crate::error::{ensure_finite, require_input, CalculationError};
use crate::validation::{require_non_negative, CompletenessTally, ValidationStatus};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, uniffi::Enum,
)]
#[serde(rename_all = "camelCase")]
pub enum PfcMethod {
    #[default]
    Slope,
    Overvoltage,
    Other,
}

impl PfcMethod {
    pub fn label(&self) -> &'static str {
        match self {
            PfcMethod::Slope => "Slope",
            PfcMethod::Overvoltage => "Overvoltage",
            PfcMethod::Other => "Other",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        let key = text.trim().to_lowercase();
        if key.starts_with("slope") {
            Some(PfcMethod::Slope)
        } else if key.starts_with("overvoltage") || key.starts_with("over-voltage") {
            Some(PfcMethod::Overvoltage)
        } else if key == "other" {
            Some(PfcMethod::Other)
        } else {
            None
        }
    }
}

/// Default coefficients per cell technology.
struct TechnologyDefaults {
    /// kg CF4/t Al per (AE-minutes/cell-day)
    slope_cf4: f64,
    /// kg CF4/t Al per mV
    overvoltage: Option<f64>,
    /// kg C2F6 per kg CF4
    c2f6_fraction: f64,
}

fn technology_defaults(technology: &str) -> Option<TechnologyDefaults> {
    let key: String = technology
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_lowercase();
    let defaults = match key.as_str() {
        "cwpb" | "centreworkedprebake" | "centerworkedprebake" => TechnologyDefaults {
            slope_cf4: 0.143,
            overvoltage: Some(1.16),
            c2f6_fraction: 0.121,
        },
        "swpb" | "sideworkedprebake" => TechnologyDefaults {
            slope_cf4: 0.272,
            overvoltage: Some(3.65),
            c2f6_fraction: 0.252,
        },
        "vss" | "verticalstudsoderberg" => TechnologyDefaults {
            slope_cf4: 0.092,
            overvoltage: None,
            c2f6_fraction: 0.053,
        },
        "hss" | "horizontalstudsoderberg" => TechnologyDefaults {
            slope_cf4: 0.099,
            overvoltage: None,
            c2f6_fraction: 0.085,
        },
        _ => return None,
    };
    Some(defaults)
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct PfcSource {
    pub id: String,
    pub name: String,
    pub method: PfcMethod,
    pub technology_type: String,
    /// Tonnes of primary aluminium.
    pub activity_data: f64,
    /// Anode effects per cell-day.
    pub anode_effect_frequency: Option<f64>,
    /// Minutes per anode effect.
    pub anode_effect_duration: Option<f64>,
    pub slope_coefficient_cf4: Option<f64>,
    pub overvoltage_coefficient: Option<f64>,
    /// mV
    pub anode_effect_overvoltage: Option<f64>,
    /// Fraction, or percent when greater than 1.
    pub current_efficiency: Option<f64>,
    pub c2f6_weight_fraction: Option<f64>,
    /// Tonnes CF4, used by the Other method.
    pub reported_cf4: Option<f64>,
    /// Tonnes C2F6, used by the Other method.
    pub reported_c2f6: Option<f64>,
    /// Percent.
    pub uncertainty: Option<f64>,

    pub cf4_emissions: f64,
    pub c2f6_emissions: f64,
    pub co2e_cf4: f64,
    pub co2e_c2f6: f64,
    pub total_co2e: f64,
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl PfcSource {
    pub fn label(&self) -> String {
        if self.name.trim().is_empty() {
            format!("PFC source {}", self.id)
        } else {
            format!("PFC source '{}'", self.name.trim())
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

/// Current efficiency as a fraction; values above 1 are read as percent.
pub fn normalize_current_efficiency(ce: f64) -> f64 {
    if ce > 1.0 {
        ce / 100.0
    } else {
        ce
    }
}

/// Uses the entered coefficient, else the technology default with a warning.
fn coefficient(
    entered: Option<f64>,
    default: Option<f64>,
    field: &str,
    technology: &str,
    status: &mut ValidationStatus,
) -> Result<f64, CalculationError> {
    match (entered, default) {
        (Some(v), _) => Ok(v),
        (None, Some(d)) => {
            status.warning(format!("{field} not entered, {technology} default {d} applied"));
            Ok(d)
        }
        (None, None) => Err(CalculationError::missing(field)),
    }
}

/// (CF4, C2F6) in tonnes.
fn pfc_masses(
    source: &PfcSource,
    status: &mut ValidationStatus,
) -> Result<(f64, f64), CalculationError> {
    let defaults = technology_defaults(&source.technology_type);
    let technology = source.technology_type.trim();
    let default_fraction = defaults.as_ref().map(|d| d.c2f6_fraction);

    match source.method {
        PfcMethod::Slope => {
            let frequency = require_input("anode effect frequency", source.anode_effect_frequency)?;
            let duration = require_input("anode effect duration", source.anode_effect_duration)?;
            let slope = coefficient(
                source.slope_coefficient_cf4,
                defaults.as_ref().map(|d| d.slope_cf4),
                "slope coefficient",
                technology,
                status,
            )?;
            let fraction = coefficient(
                source.c2f6_weight_fraction,
                default_fraction,
                "C2F6 weight fraction",
                technology,
                status,
            )?;
            let anode_effect_minutes = frequency * duration;
            let cf4 = anode_effect_minutes * (slope / 1000.0) * source.activity_data;
            Ok((cf4, fraction * cf4))
        }
        PfcMethod::Overvoltage => {
            let ovc = coefficient(
                source.overvoltage_coefficient,
                defaults.as_ref().and_then(|d| d.overvoltage),
                "overvoltage coefficient",
                technology,
                status,
            )?;
            let overvoltage =
                require_input("anode effect overvoltage", source.anode_effect_overvoltage)?;
            let ce = normalize_current_efficiency(require_input(
                "current efficiency",
                source.current_efficiency,
            )?);
            if ce <= 0.0 {
                return Err(CalculationError::NotPositive {
                    field: "current efficiency".to_string(),
                });
            }
            let fraction = coefficient(
                source.c2f6_weight_fraction,
                default_fraction,
                "C2F6 weight fraction",
                technology,
                status,
            )?;
            let cf4 = ovc * (overvoltage / ce) * source.activity_data * 0.001;
            Ok((cf4, fraction * cf4))
        }
        PfcMethod::Other => {
            if source.reported_cf4.is_none() && source.reported_c2f6.is_none() {
                status.warning("no CF4 or C2F6 emissions reported");
            }
            Ok((
                source.reported_cf4.unwrap_or(0.0),
                source.reported_c2f6.unwrap_or(0.0),
            ))
        }
    }
}

fn validate(source: &PfcSource, status: &mut ValidationStatus) {
    if source.name.trim().is_empty() {
        status.error("name is required");
    }
    require_non_negative(status, "activity data", source.activity_data);
    let optional = [
        ("anode effect frequency", source.anode_effect_frequency),
        ("anode effect duration", source.anode_effect_duration),
        ("slope coefficient", source.slope_coefficient_cf4),
        ("overvoltage coefficient", source.overvoltage_coefficient),
        ("C2F6 weight fraction", source.c2f6_weight_fraction),
        ("reported CF4", source.reported_cf4),
        ("reported C2F6", source.reported_c2f6),
    ];
    for (field, value) in optional {
        if let Some(v) = value {
            require_non_negative(status, field, v);
        }
    }
    if let Some(u) = source.uncertainty {
        if !(0.0..=100.0).contains(&u) {
            status.error(format!("uncertainty must be between 0 and 100% (got {u})"));
        }
    }
}

pub(crate) fn completeness(source: &PfcSource) -> CompletenessTally {
    let mut tally = CompletenessTally::default();
    tally.check(!source.name.trim().is_empty());
    match source.method {
        PfcMethod::Slope => {
            tally.check(source.activity_data > 0.0);
            tally.check(source.anode_effect_frequency.is_some());
            tally.check(source.anode_effect_duration.is_some());
        }
        PfcMethod::Overvoltage => {
            tally.check(source.activity_data > 0.0);
            tally.check(source.anode_effect_overvoltage.is_some());
            tally.check(source.current_efficiency.is_some());
        }
        PfcMethod::Other => {
            tally.check(source.reported_cf4.is_some() || source.reported_c2f6.is_some());
        }
    }
    tally
}

pub fn calculate_pfc_source(source: &PfcSource, config: &CalculationConfig) -> PfcSource {
    let mut out = source.clone();
    let mut status = ValidationStatus::new();
    validate(source, &mut status);

    let result = pfc_masses(source, &mut status).and_then(|(cf4, c2f6)| {
        Ok((
            ensure_finite("CF4 emissions", cf4)?,
            ensure_finite("C2F6 emissions", c2f6)?,
        ))
    });

    let (cf4, c2f6) = match result {
        Ok(masses) => masses,
        Err(err) => {
            warn!(source = %source.id, error = %err, "PFC calculation failed");
            status.error(err.to_string());
            (0.0, 0.0)
        }
    };

    out.cf4_emissions = cf4;
    out.c2f6_emissions = c2f6;
    out.co2e_cf4 = cf4 * config.gwp.cf4;
    out.co2e_c2f6 = c2f6 * config.gwp.c2f6;
    out.total_co2e = out.co2e_cf4 + out.co2e_c2f6;
    out.is_valid = !status.has_errors();
    out.errors = status.errors;
    out.warnings = status.warnings;
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slope_source() -> PfcSource {
        PfcSource {
            id: "pfc1".to_string(),
            name: "Potline 1".to_string(),
            method: PfcMethod::Slope,
            technology_type: "CWPB".to_string(),
            activity_data: 500_000.0,
            anode_effect_frequency: Some(2.17),
            anode_effect_duration: Some(1.23),
            slope_coefficient_cf4: Some(0.146),
            c2f6_weight_fraction: Some(0.121),
            ..Default::default()
        }
    }

    #[test]
    fn test_slope_boundary_scenario() {
        let config = CalculationConfig::default();
        let out = calculate_pfc_source(&slope_source(), &config);

        let cf4 = 2.17 * 1.23 * (0.146 / 1000.0) * 500_000.0;
        assert!((out.cf4_emissions - cf4).abs() < 1e-9);
        assert!((out.c2f6_emissions - 0.121 * cf4).abs() < 1e-9);
        assert!((out.co2e_cf4 - cf4 * 6630.0).abs() < 1e-6);
        assert!((out.total_co2e - (cf4 * 6630.0 + 0.121 * cf4 * 11100.0)).abs() < 1e-6);
        assert!(out.is_valid);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_overvoltage_percent_efficiency() {
        let config = CalculationConfig::default();
        let source = PfcSource {
            id: "ov".to_string(),
            name: "Potline 2".to_string(),
            method: PfcMethod::Overvoltage,
            activity_data: 1000.0,
            overvoltage_coefficient: Some(1.16),
            anode_effect_overvoltage: Some(2.0),
            current_efficiency: Some(95.0),
            c2f6_weight_fraction: Some(0.1),
            ..Default::default()
        };
        let as_percent = calculate_pfc_source(&source, &config);
        let as_fraction = calculate_pfc_source(
            &PfcSource {
                current_efficiency: Some(0.95),
                ..source
            },
            &config,
        );

        let expected = 1.16 * (2.0 / 0.95) * 1000.0 * 0.001;
        assert!((as_percent.cf4_emissions - expected).abs() < 1e-9);
        assert!((as_fraction.cf4_emissions - expected).abs() < 1e-9);
    }

    #[test]
    fn test_zero_current_efficiency_is_error() {
        let config = CalculationConfig::default();
        let source = PfcSource {
            id: "ov".to_string(),
            name: "Potline".to_string(),
            method: PfcMethod::Overvoltage,
            activity_data: 1000.0,
            overvoltage_coefficient: Some(1.16),
            anode_effect_overvoltage: Some(2.0),
            current_efficiency: Some(0.0),
            ..Default::default()
        };
        let out = calculate_pfc_source(&source, &config);
        assert!(!out.is_valid);
        assert_eq!(out.total_co2e, 0.0);
    }

    #[test]
    fn test_technology_defaults_fill_gaps() {
        let config = CalculationConfig::default();
        let source = PfcSource {
            slope_coefficient_cf4: None,
            c2f6_weight_fraction: None,
            ..slope_source()
        };
        let out = calculate_pfc_source(&source, &config);
        let cf4 = 2.17 * 1.23 * (0.143 / 1000.0) * 500_000.0;
        assert!((out.cf4_emissions - cf4).abs() < 1e-9);
        assert_eq!(out.warnings.len(), 2);
        assert!(out.is_valid);
    }

    #[test]
    fn test_uncertainty_range_is_percent() {
        let config = CalculationConfig::default();
        let ok = calculate_pfc_source(
            &PfcSource {
                uncertainty: Some(7.5),
                ..slope_source()
            },
            &config,
        );
        assert!(ok.is_valid);

        let bad = calculate_pfc_source(
            &PfcSource {
                uncertainty: Some(150.0),
                ..slope_source()
            },
            &config,
        );
        assert!(!bad.is_valid);
    }

    #[test]
    fn test_method_parse() {
        assert_eq!(PfcMethod::parse("Slope method"), Some(PfcMethod::Slope));
        assert_eq!(PfcMethod::parse("overvoltage"), Some(PfcMethod::Overvoltage));
        assert_eq!(PfcMethod::parse("other"), Some(PfcMethod::Other));
        assert_eq!(PfcMethod::parse("?"), None);
    }
}
