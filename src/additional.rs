//! Additional emissions (section F).
//!
//! Sources that fall outside the source-stream table (flaring, fugitive
//! releases, small emitters) are reported here gas by gas. The section
//! carries its own self-checks and is cross-checked against the balance
//! and the source streams.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::balance::GhgBalance;
use crate::config::{CalculationConfig, GwpTable};
use crate::error::{ensure_finite, CalculationError};
use crate::source_streams::SourceStreamTotals;
use crate::units;
use crate::validation::{
    relative_difference_percent, require_non_negative, require_percentage, CompletenessTally,
    CrossCheck, DataQuality, Severity, ValidationStatus, VerificationStatus,
};

/// Self-check results differ by less than this before they count as a mismatch.
const RECOMPUTATION_TOLERANCE: f64 = 1e-6;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, uniffi::Enum,
)]
#[serde(rename_all = "camelCase")]
pub enum DeterminationMethod {
    #[default]
    Calculation,
    Measurement,
    MassBalance,
    Estimation,
}

impl DeterminationMethod {
    pub fn label(&self) -> &'static str {
        match self {
            DeterminationMethod::Calculation => "Calculation",
            DeterminationMethod::Measurement => "Measurement",
            DeterminationMethod::MassBalance => "Mass balance",
            DeterminationMethod::Estimation => "Estimation",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        let key: String = text
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "calculation" | "calculationbased" => Some(DeterminationMethod::Calculation),
            "measurement" | "measurementbased" => Some(DeterminationMethod::Measurement),
            "massbalance" => Some(DeterminationMethod::MassBalance),
            "estimation" | "estimate" => Some(DeterminationMethod::Estimation),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityData {
    pub value: f64,
    pub unit: String,
    pub source: String,
    /// Percent.
    pub uncertainty: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct EmissionFactor {
    pub value: f64,
    pub unit: String,
    pub source: String,
    /// Percent.
    pub uncertainty: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct AdditionalEmission {
    pub id: String,
    pub name: String,
    pub source_category: String,
    /// Tonnes of each gas.
    pub co2: f64,
    pub n2o: f64,
    pub pfc: f64,
    pub biomass_co2: f64,
    pub method: DeterminationMethod,
    pub activity_data: ActivityData,
    pub emission_factor: EmissionFactor,
    /// Percent.
    pub biomass_fraction: f64,
    /// Percent.
    pub overall_uncertainty: Option<f64>,
    pub data_quality: DataQuality,
    pub verification_status: VerificationStatus,

    pub fossil_co2: f64,
    pub co2_equivalent: f64,
    pub validation: ValidationStatus,
}

impl AdditionalEmission {
    pub fn label(&self) -> String {
        if self.name.trim().is_empty() {
            format!("Additional emission {}", self.id)
        } else {
            format!("Additional emission '{}'", self.name.trim())
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, uniffi::Enum,
)]
#[serde(rename_all = "camelCase")]
pub enum CheckOutcome {
    #[default]
    Pass,
    Warning,
    Fail,
}

impl CheckOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            CheckOutcome::Pass => "Pass",
            CheckOutcome::Warning => "Warning",
            CheckOutcome::Fail => "Fail",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct SelfCheck {
    pub name: String,
    pub outcome: CheckOutcome,
    pub message: String,
}

impl SelfCheck {
    fn new(name: &str, outcome: CheckOutcome, message: String) -> Self {
        SelfCheck {
            name: name.to_string(),
            outcome,
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct AdditionalSummary {
    pub total_co2: f64,
    pub total_n2o: f64,
    pub total_pfc: f64,
    pub total_biomass_co2: f64,
    pub fossil_co2: f64,
    pub co2_equivalent: f64,
    /// CO2 + N2O + PFC by mass, not GWP-weighted.
    pub total_ghg: f64,
    pub entry_count: u32,
    pub average_uncertainty: Option<f64>,
    pub poor_quality_count: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct AdditionalCalculation {
    pub emissions: Vec<AdditionalEmission>,
    pub summary: AdditionalSummary,
    pub self_checks: Vec<SelfCheck>,
    pub cross_checks: Vec<CrossCheck>,
    pub validation: ValidationStatus,
    pub calculated_fields: Vec<String>,
}

/// CO2 + N2O × GWP(N2O) + PFC × GWP(CF4).
pub fn co2_equivalent(co2: f64, n2o: f64, pfc: f64, gwp: &GwpTable) -> f64 {
    co2 + n2o * gwp.n2o + pfc * gwp.cf4
}

fn equivalents(
    entry: &AdditionalEmission,
    gwp: &GwpTable,
) -> Result<(f64, f64), CalculationError> {
    let fossil = ensure_finite("fossil CO2", entry.co2 - entry.biomass_co2)?;
    let co2e = ensure_finite(
        "CO2 equivalent",
        co2_equivalent(entry.co2, entry.n2o, entry.pfc, gwp),
    )?;
    Ok((fossil, co2e))
}

/// CO2 the activity data and emission factor imply, when both are given.
fn expected_co2(entry: &AdditionalEmission) -> Option<f64> {
    let activity = &entry.activity_data;
    let factor = &entry.emission_factor;
    if activity.value <= 0.0 || factor.value <= 0.0 {
        return None;
    }
    let gross = if factor.unit.trim().is_empty() {
        activity.value * factor.value
    } else {
        units::activity_in_factor_unit(activity.value, &activity.unit, &factor.unit).value
            * units::factor_in_tonnes(factor.value, &factor.unit).value
    };
    Some(gross * (1.0 - entry.biomass_fraction / 100.0))
}

fn validate_entry(
    entry: &AdditionalEmission,
    config: &CalculationConfig,
    status: &mut ValidationStatus,
) {
    if entry.name.trim().is_empty() {
        status.error("name is required");
    }
    require_non_negative(status, "CO2", entry.co2);
    require_non_negative(status, "N2O", entry.n2o);
    require_non_negative(status, "PFC", entry.pfc);
    require_non_negative(status, "biomass CO2", entry.biomass_co2);
    if entry.biomass_co2 > entry.co2 {
        status.error(format!(
            "biomass CO2 {} exceeds total CO2 {}",
            entry.biomass_co2, entry.co2
        ));
    }
    require_percentage(status, "biomass fraction", entry.biomass_fraction);
    for (field, value) in [
        ("overall uncertainty", entry.overall_uncertainty),
        ("activity data uncertainty", entry.activity_data.uncertainty),
        ("emission factor uncertainty", entry.emission_factor.uncertainty),
    ] {
        if let Some(v) = value {
            require_percentage(status, field, v);
        }
    }
    require_non_negative(status, "activity data", entry.activity_data.value);
    require_non_negative(status, "emission factor", entry.emission_factor.value);

    let compatibility =
        units::check_compatibility(&entry.activity_data.unit, &entry.emission_factor.unit);
    if let Some(message) = compatibility.message {
        status.warning(message);
    }

    if let Some(expected) = expected_co2(entry) {
        if let Some(d) = relative_difference_percent(entry.co2, expected) {
            if d > config.plausibility_tolerance_percent {
                status.warning(format!(
                    "reported CO2 {} differs from activity data x emission factor {expected:.3} by {d:.1}%",
                    entry.co2
                ));
            }
        }
    }
}

fn completeness(entry: &AdditionalEmission) -> CompletenessTally {
    let mut tally = CompletenessTally::default();
    tally.check(!entry.name.trim().is_empty());
    tally.check(!entry.source_category.trim().is_empty());
    tally.check(entry.co2 > 0.0 || entry.n2o > 0.0 || entry.pfc > 0.0);
    if entry.method == DeterminationMethod::Calculation {
        tally.check(entry.activity_data.value > 0.0);
        tally.check(entry.emission_factor.value > 0.0);
    }
    tally
}

/// Recomputes one entry's derived fields.
pub fn calculate_entry(entry: &AdditionalEmission, config: &CalculationConfig) -> AdditionalEmission {
    let mut out = entry.clone();
    let mut status = ValidationStatus::new();
    validate_entry(entry, config, &mut status);

    match equivalents(entry, &config.gwp) {
        Ok((fossil, co2e)) => {
            out.fossil_co2 = fossil;
            out.co2_equivalent = co2e;
        }
        Err(err) => {
            warn!(entry = %entry.id, error = %err, "additional emission calculation failed");
            out.fossil_co2 = 0.0;
            out.co2_equivalent = 0.0;
            status.error(err.to_string());
        }
    }

    out.validation = status.with_completeness(completeness(entry).percent());
    out
}

fn summarize(entries: &[AdditionalEmission], gwp: &GwpTable) -> AdditionalSummary {
    let mut summary = AdditionalSummary::default();
    let mut uncertainties = Vec::new();
    for e in entries {
        summary.total_co2 += e.co2;
        summary.total_n2o += e.n2o;
        summary.total_pfc += e.pfc;
        summary.total_biomass_co2 += e.biomass_co2;
        summary.entry_count += 1;
        if e.data_quality.is_poor() {
            summary.poor_quality_count += 1;
        }
        if let Some(u) = e.overall_uncertainty {
            uncertainties.push(u);
        }
    }
    summary.fossil_co2 = summary.total_co2 - summary.total_biomass_co2;
    summary.co2_equivalent =
        co2_equivalent(summary.total_co2, summary.total_n2o, summary.total_pfc, gwp);
    summary.total_ghg = summary.total_co2 + summary.total_n2o + summary.total_pfc;
    if !uncertainties.is_empty() {
        summary.average_uncertainty =
            Some(uncertainties.iter().sum::<f64>() / uncertainties.len() as f64);
    }
    summary
}

fn close(a: f64, b: f64) -> bool {
    a.is_finite()
        && b.is_finite()
        && (a - b).abs() <= RECOMPUTATION_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

fn self_checks(
    entries: &[AdditionalEmission],
    summary: &AdditionalSummary,
    config: &CalculationConfig,
) -> Vec<SelfCheck> {
    let mut checks = Vec::new();

    // fossil + biomass per entry rebuilds the CO2 the totals were taken from
    let ghg: f64 = entries
        .iter()
        .map(|e| e.fossil_co2 + e.biomass_co2 + e.n2o + e.pfc)
        .sum();
    checks.push(if close(ghg, summary.total_ghg) {
        SelfCheck::new(
            "Total GHG",
            CheckOutcome::Pass,
            format!("gas totals add up to {:.3} t", summary.total_ghg),
        )
    } else {
        SelfCheck::new(
            "Total GHG",
            CheckOutcome::Fail,
            format!(
                "entries add up to {ghg:.3} t but the total is {:.3} t",
                summary.total_ghg
            ),
        )
    });

    checks.push(if summary.total_biomass_co2 <= summary.total_co2 {
        SelfCheck::new(
            "Biomass CO2",
            CheckOutcome::Pass,
            "biomass CO2 does not exceed total CO2".to_string(),
        )
    } else {
        SelfCheck::new(
            "Biomass CO2",
            CheckOutcome::Fail,
            format!(
                "biomass CO2 {:.3} t exceeds total CO2 {:.3} t",
                summary.total_biomass_co2, summary.total_co2
            ),
        )
    });

    checks.push(match summary.average_uncertainty {
        Some(u) if u > config.max_average_uncertainty_percent => SelfCheck::new(
            "Average uncertainty",
            CheckOutcome::Warning,
            format!(
                "average uncertainty {u:.1}% exceeds {:.0}%",
                config.max_average_uncertainty_percent
            ),
        ),
        Some(u) => SelfCheck::new(
            "Average uncertainty",
            CheckOutcome::Pass,
            format!("average uncertainty {u:.1}%"),
        ),
        None => SelfCheck::new(
            "Average uncertainty",
            CheckOutcome::Pass,
            "no uncertainty reported".to_string(),
        ),
    });

    checks.push(if summary.poor_quality_count > 0 {
        SelfCheck::new(
            "Data quality",
            CheckOutcome::Warning,
            format!("{} entries have poor data quality", summary.poor_quality_count),
        )
    } else {
        SelfCheck::new(
            "Data quality",
            CheckOutcome::Pass,
            "no entries with poor data quality".to_string(),
        )
    });

    let co2e: f64 = entries.iter().map(|e| e.co2_equivalent).sum();
    checks.push(if close(co2e, summary.co2_equivalent) {
        SelfCheck::new(
            "CO2 equivalent",
            CheckOutcome::Pass,
            format!("CO2 equivalent {:.3} t", summary.co2_equivalent),
        )
    } else {
        SelfCheck::new(
            "CO2 equivalent",
            CheckOutcome::Fail,
            format!(
                "entries add up to {co2e:.3} tCO2e but the gas totals give {:.3} tCO2e",
                summary.co2_equivalent
            ),
        )
    });

    checks
}

fn record(
    status: &mut ValidationStatus,
    name: &str,
    value: f64,
    reference: f64,
    severity: Option<Severity>,
    message: String,
) -> CrossCheck {
    if let Some(s) = severity {
        status.push(s, message.clone());
    }
    CrossCheck {
        name: name.to_string(),
        value,
        reference,
        difference_percent: relative_difference_percent(value, reference),
        severity,
        message,
    }
}

fn cross_validate(
    summary: &AdditionalSummary,
    balance: Option<&GhgBalance>,
    streams: Option<&SourceStreamTotals>,
    config: &CalculationConfig,
    status: &mut ValidationStatus,
) -> Vec<CrossCheck> {
    let mut checks = Vec::new();

    if let Some(balance) = balance {
        let direct = balance.total_direct.value();
        if direct > 0.0 {
            let name = "Additional CO2 vs balance direct emissions";
            let share = summary.total_co2 * 100.0 / direct;
            let (severity, message) = if summary.total_co2 > direct {
                (
                    Some(Severity::Error),
                    format!(
                        "{name}: additional CO2 {:.3} exceeds direct emissions {direct:.3}",
                        summary.total_co2
                    ),
                )
            } else if share > config.additional_co2_share_warning_percent {
                (
                    Some(Severity::Warning),
                    format!("{name}: additional CO2 is {share:.1}% of direct emissions"),
                )
            } else {
                (None, format!("{name}: {share:.1}% of direct emissions"))
            };
            checks.push(record(status, name, summary.total_co2, direct, severity, message));
        }

        let total = balance.total_emissions.value();
        if total > 0.0 {
            let name = "Additional CO2e vs balance total emissions";
            let excess = (summary.co2_equivalent - total).max(0.0) * 100.0 / total;
            let severity = config.additional_co2e_band.classify(excess);
            let message = match severity {
                Some(_) => format!(
                    "{name}: additional CO2e {:.3} exceeds total emissions {total:.3} by {excess:.1}%",
                    summary.co2_equivalent
                ),
                None => format!("{name}: within tolerance"),
            };
            checks.push(record(
                status,
                name,
                summary.co2_equivalent,
                total,
                severity,
                message,
            ));
        }
    }

    if let Some(streams) = streams {
        let biomass = streams.total_biomass_co2e();
        if biomass > 0.0 {
            let name = "Additional biomass CO2 vs source streams";
            let (severity, message) = if summary.total_biomass_co2 > biomass {
                (
                    Some(Severity::Warning),
                    format!(
                        "{name}: additional biomass CO2 {:.3} exceeds source stream biomass {biomass:.3}",
                        summary.total_biomass_co2
                    ),
                )
            } else {
                (None, format!("{name}: within source stream biomass"))
            };
            checks.push(record(
                status,
                name,
                summary.total_biomass_co2,
                biomass,
                severity,
                message,
            ));
        }
    }

    checks
}

/// Calculates section F. Balance and source-stream checks run only for the
/// references that are given.
pub fn calculate(
    emissions: &[AdditionalEmission],
    balance: Option<&GhgBalance>,
    streams: Option<&SourceStreamTotals>,
    config: &CalculationConfig,
) -> AdditionalCalculation {
    let mut validation = ValidationStatus::new();
    let mut tally = CompletenessTally::default();
    let mut calculated_fields = Vec::new();

    let emissions: Vec<AdditionalEmission> = emissions
        .iter()
        .map(|e| calculate_entry(e, config))
        .collect();
    for entry in &emissions {
        tally.merge(completeness(entry));
        validation.absorb(&entry.label(), &entry.validation);
        calculated_fields.extend(
            ["fossilCo2", "co2Equivalent"]
                .iter()
                .map(|f| format!("additionalEmissions.{}.{}", entry.id, f)),
        );
    }

    let summary = summarize(&emissions, &config.gwp);
    let self_checks = self_checks(&emissions, &summary, config);
    let cross_checks = cross_validate(&summary, balance, streams, config, &mut validation);
    validation.completeness = tally.percent();

    debug!(
        entries = emissions.len(),
        co2e = summary.co2_equivalent,
        checks = cross_checks.len(),
        errors = validation.errors.len(),
        "calculated additional emissions"
    );

    AdditionalCalculation {
        emissions,
        summary,
        self_checks,
        cross_checks,
        validation,
        calculated_fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::FieldValue;

    fn flare() -> AdditionalEmission {
        AdditionalEmission {
            id: "f1".to_string(),
            name: "Flare".to_string(),
            source_category: "Flaring".to_string(),
            co2: 100.0,
            n2o: 0.1,
            pfc: 0.001,
            biomass_co2: 10.0,
            method: DeterminationMethod::Calculation,
            activity_data: ActivityData {
                value: 2.0,
                unit: "TJ".to_string(),
                ..Default::default()
            },
            emission_factor: EmissionFactor {
                value: 55.0,
                unit: "tCO2/TJ".to_string(),
                ..Default::default()
            },
            biomass_fraction: 10.0,
            overall_uncertainty: Some(5.0),
            ..Default::default()
        }
    }

    fn balance(direct: f64, total: f64) -> GhgBalance {
        GhgBalance {
            total_direct: FieldValue::manual(direct),
            total_emissions: FieldValue::manual(total),
            ..Default::default()
        }
    }

    #[test]
    fn test_co2_equivalent_and_total_ghg() {
        let result = calculate(&[flare()], None, None, &CalculationConfig::default());
        let summary = &result.summary;
        assert!((summary.co2_equivalent - (100.0 + 29.8 + 6.63)).abs() < 1e-9);
        assert!((summary.total_ghg - 100.101).abs() < 1e-9);
        assert!((summary.fossil_co2 - 90.0).abs() < 1e-9);
        assert!(result
            .self_checks
            .iter()
            .all(|c| c.outcome == CheckOutcome::Pass));
    }

    #[test]
    fn test_plausibility_warning() {
        let result = calculate(&[flare()], None, None, &CalculationConfig::default());
        // 2 TJ x 55 x 0.9 = 99
        assert!(result.validation.warnings.is_empty());

        let entry = AdditionalEmission {
            co2: 150.0,
            ..flare()
        };
        let out = calculate_entry(&entry, &CalculationConfig::default());
        assert!(out.validation.warnings[0].contains("differs from activity data"));
    }

    #[test]
    fn test_plausibility_applies_to_measured_entries() {
        let entry = AdditionalEmission {
            method: DeterminationMethod::Measurement,
            co2: 400.0,
            ..flare()
        };
        let out = calculate_entry(&entry, &CalculationConfig::default());
        assert!(out.validation.is_valid);
        assert!(out
            .validation
            .warnings
            .iter()
            .any(|w| w.contains("differs from activity data")));

        let entry = AdditionalEmission {
            method: DeterminationMethod::Measurement,
            activity_data: ActivityData::default(),
            ..entry
        };
        let out = calculate_entry(&entry, &CalculationConfig::default());
        assert!(out.validation.warnings.is_empty());
    }

    #[test]
    fn test_self_checks_catch_stale_entries() {
        let config = CalculationConfig::default();
        let fresh = calculate_entry(&flare(), &config);
        let summary = summarize(std::slice::from_ref(&fresh), &config.gwp);

        let stale = AdditionalEmission {
            fossil_co2: 0.0,
            co2_equivalent: 0.0,
            ..fresh.clone()
        };
        let checks = self_checks(&[stale], &summary, &config);
        assert_eq!(checks[0].name, "Total GHG");
        assert_eq!(checks[0].outcome, CheckOutcome::Fail);
        assert_eq!(checks[4].name, "CO2 equivalent");
        assert_eq!(checks[4].outcome, CheckOutcome::Fail);

        let checks = self_checks(&[fresh], &summary, &config);
        assert_eq!(checks[0].outcome, CheckOutcome::Pass);
        assert_eq!(checks[4].outcome, CheckOutcome::Pass);
    }

    #[test]
    fn test_biomass_above_co2_is_error() {
        let entry = AdditionalEmission {
            biomass_co2: 120.0,
            ..flare()
        };
        let result = calculate(&[entry], None, None, &CalculationConfig::default());
        assert!(!result.validation.is_valid);
        assert_eq!(result.self_checks[1].outcome, CheckOutcome::Fail);
    }

    #[test]
    fn test_incompatible_units_warn() {
        let entry = AdditionalEmission {
            method: DeterminationMethod::Estimation,
            activity_data: ActivityData {
                value: 5.0,
                unit: "m3".to_string(),
                ..Default::default()
            },
            ..flare()
        };
        let out = calculate_entry(&entry, &CalculationConfig::default());
        assert!(out.validation.is_valid);
        assert!(out.validation.warnings[0].contains("does not match"));
    }

    #[test]
    fn test_quality_and_uncertainty_self_checks() {
        let entry = AdditionalEmission {
            overall_uncertainty: Some(80.0),
            data_quality: DataQuality::VeryPoor,
            ..flare()
        };
        let result = calculate(&[entry], None, None, &CalculationConfig::default());
        assert_eq!(result.self_checks[2].outcome, CheckOutcome::Warning);
        assert_eq!(result.self_checks[3].outcome, CheckOutcome::Warning);
        assert!(result.validation.is_valid);
    }

    #[test]
    fn test_cross_checks_against_balance() {
        let config = CalculationConfig::default();

        let result = calculate(&[flare()], Some(&balance(1000.0, 1000.0)), None, &config);
        assert!(result.cross_checks.iter().all(|c| c.severity.is_none()));

        let result = calculate(&[flare()], Some(&balance(150.0, 1000.0)), None, &config);
        assert_eq!(result.cross_checks[0].severity, Some(Severity::Warning));

        let result = calculate(&[flare()], Some(&balance(80.0, 1000.0)), None, &config);
        assert_eq!(result.cross_checks[0].severity, Some(Severity::Error));

        // 136.43 tCO2e against 110 is 24% above, 80 is 70% above
        let result = calculate(&[flare()], Some(&balance(1000.0, 110.0)), None, &config);
        assert_eq!(result.cross_checks[1].severity, Some(Severity::Warning));
        let result = calculate(&[flare()], Some(&balance(1000.0, 80.0)), None, &config);
        assert_eq!(result.cross_checks[1].severity, Some(Severity::Error));
    }

    #[test]
    fn test_checks_skip_zero_references() {
        let result = calculate(
            &[flare()],
            Some(&balance(0.0, 0.0)),
            Some(&SourceStreamTotals::default()),
            &CalculationConfig::default(),
        );
        assert!(result.cross_checks.is_empty());
    }

    #[test]
    fn test_biomass_against_streams() {
        let streams = SourceStreamTotals {
            biomass_co2e: 5.0,
            ..Default::default()
        };
        let result = calculate(&[flare()], None, Some(&streams), &CalculationConfig::default());
        assert_eq!(result.cross_checks[0].severity, Some(Severity::Warning));
    }

    #[test]
    fn test_method_parse() {
        assert_eq!(
            DeterminationMethod::parse("Mass balance"),
            Some(DeterminationMethod::MassBalance)
        );
        assert_eq!(DeterminationMethod::parse("guess"), None);
    }
}
