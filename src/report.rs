//! The installation report and the ordered recalculation of its sections.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::additional::{self, AdditionalEmission, AdditionalSummary, SelfCheck};
use crate::balance::{self, FuelBalance, GhgBalance};
use crate::config::CalculationConfig;
use crate::precursors::{self, PrecursorSummary, PurchasedPrecursor};
use crate::processes::{self, ProcessTotals, ProductionProcess};
use crate::source_streams::{self, MeasurementSource, PfcSource, SourceStream, SourceStreamTotals};
use crate::validation::{CompletenessTally, CrossCheck, ValidationStatus};

/// Installation identity (sheet A).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct Installation {
    pub name: String,
    pub installation_id: String,
    pub operator_name: String,
    pub street: String,
    pub city: String,
    pub post_code: String,
    /// ISO 3166 alpha-2.
    pub country_code: String,
    pub economic_activity: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// `YYYY-MM-DD`.
    pub reporting_period_start: String,
    pub reporting_period_end: String,
    pub contact_name: String,
    pub contact_email: String,
}

impl Installation {
    pub fn validate(&self) -> ValidationStatus {
        let mut status = ValidationStatus::new();
        let mut tally = CompletenessTally::default();

        for (field, value, required) in [
            ("installation name", &self.name, true),
            ("installation id", &self.installation_id, true),
            ("operator name", &self.operator_name, false),
            ("city", &self.city, false),
            ("country code", &self.country_code, true),
            ("reporting period start", &self.reporting_period_start, true),
            ("reporting period end", &self.reporting_period_end, true),
        ] {
            let present = !value.trim().is_empty();
            tally.check(present);
            if required && !present {
                status.error(format!("{field} is required"));
            }
        }

        let country = self.country_code.trim();
        if !country.is_empty()
            && !(country.len() == 2 && country.chars().all(|c| c.is_ascii_alphabetic()))
        {
            status.warning(format!("country code '{country}' is not a two-letter code"));
        }
        if let Some(lat) = self.latitude {
            if !(-90.0..=90.0).contains(&lat) {
                status.error(format!("latitude {lat} is out of range"));
            }
        }
        if let Some(lon) = self.longitude {
            if !(-180.0..=180.0).contains(&lon) {
                status.error(format!("longitude {lon} is out of range"));
            }
        }

        let (start, end) = (
            self.reporting_period_start.trim(),
            self.reporting_period_end.trim(),
        );
        if !start.is_empty() && !end.is_empty() {
            if is_iso_date(start) && is_iso_date(end) {
                if start > end {
                    status.error("reporting period ends before it starts");
                }
            } else {
                status.warning("reporting period dates should be written as YYYY-MM-DD");
            }
        }

        let email = self.contact_email.trim();
        if !email.is_empty() && !email.contains('@') {
            status.warning(format!("contact email '{email}' looks invalid"));
        }

        status.with_completeness(tally.percent())
    }
}

fn is_iso_date(text: &str) -> bool {
    let parts: Vec<&str> = text.split('-').collect();
    matches!(parts.as_slice(), [y, m, d]
        if y.len() == 4 && m.len() == 2 && d.len() == 2
            && parts.iter().all(|p| p.chars().all(|c| c.is_ascii_digit())))
}

/// Everything the user has entered for one installation. Derived fields on
/// the entities are rewritten by [`recalculate`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct InstallationReport {
    pub installation: Installation,
    pub source_streams: Vec<SourceStream>,
    pub pfc_sources: Vec<PfcSource>,
    pub measurement_sources: Vec<MeasurementSource>,
    pub fuel_balance: FuelBalance,
    pub ghg_balance: GhgBalance,
    pub processes: Vec<ProductionProcess>,
    pub precursors: Vec<PurchasedPrecursor>,
    pub additional_emissions: Vec<AdditionalEmission>,
}

impl InstallationReport {
    pub fn has_source_streams(&self) -> bool {
        !(self.source_streams.is_empty()
            && self.pfc_sources.is_empty()
            && self.measurement_sources.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionStatus {
    /// Sheet name of the section.
    pub section: String,
    pub validation: ValidationStatus,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct CalculatedReport {
    pub report: InstallationReport,
    pub source_stream_totals: SourceStreamTotals,
    pub balance_checks: Vec<CrossCheck>,
    pub implied_emission_factor: Option<f64>,
    pub process_totals: ProcessTotals,
    pub precursor_summary: PrecursorSummary,
    pub precursor_checks: Vec<CrossCheck>,
    pub additional_summary: AdditionalSummary,
    pub additional_self_checks: Vec<SelfCheck>,
    pub additional_checks: Vec<CrossCheck>,
    pub sections: Vec<SectionStatus>,
    pub calculated_fields: Vec<String>,
    /// No section reports an error.
    pub is_export_ready: bool,
}

impl CalculatedReport {
    pub fn section(&self, name: &str) -> Option<&ValidationStatus> {
        self.sections
            .iter()
            .find(|s| s.section == name)
            .map(|s| &s.validation)
    }
}

/// Recomputes every section in dependency order: source streams, balance,
/// processes, precursors, additional emissions.
pub fn recalculate(report: &InstallationReport, config: &CalculationConfig) -> CalculatedReport {
    let installation = report.installation.validate();

    let b = source_streams::calculate(
        &report.source_streams,
        &report.pfc_sources,
        &report.measurement_sources,
        config,
    );
    let totals = report.has_source_streams().then_some(&b.totals);

    let c = balance::calculate(&report.fuel_balance, &report.ghg_balance, totals, config);
    let d = processes::calculate(&report.processes);
    let process_refs = (!d.processes.is_empty()).then_some(d.processes.as_slice());
    let e = precursors::calculate(&report.precursors, process_refs, config);
    let f = additional::calculate(
        &report.additional_emissions,
        Some(&c.ghg_balance),
        totals,
        config,
    );

    let sections = vec![
        SectionStatus {
            section: "A_InstData".to_string(),
            validation: installation,
        },
        SectionStatus {
            section: "B_EmInst".to_string(),
            validation: b.validation,
        },
        SectionStatus {
            section: "C_Emissions&Energy".to_string(),
            validation: c.validation,
        },
        SectionStatus {
            section: "D_Processes".to_string(),
            validation: d.validation,
        },
        SectionStatus {
            section: "E_PurchPrec".to_string(),
            validation: e.validation,
        },
        SectionStatus {
            section: "F_AddEmissions".to_string(),
            validation: f.validation,
        },
    ];
    let is_export_ready = sections.iter().all(|s| s.validation.is_valid);

    let mut calculated_fields = b.calculated_fields;
    calculated_fields.extend(c.calculated_fields);
    calculated_fields.extend(d.calculated_fields);
    calculated_fields.extend(e.calculated_fields);
    calculated_fields.extend(f.calculated_fields);

    let errors: usize = sections.iter().map(|s| s.validation.errors.len()).sum();
    debug!(
        errors,
        fields = calculated_fields.len(),
        "recalculated installation report"
    );
    if !is_export_ready {
        info!(errors, "report has blocking validation errors");
    }

    CalculatedReport {
        report: InstallationReport {
            installation: report.installation.clone(),
            source_streams: b.streams,
            pfc_sources: b.pfc_sources,
            measurement_sources: b.measurement_sources,
            fuel_balance: c.fuel_balance,
            ghg_balance: c.ghg_balance,
            processes: d.processes,
            precursors: e.precursors,
            additional_emissions: f.emissions,
        },
        source_stream_totals: b.totals,
        balance_checks: c.cross_checks,
        implied_emission_factor: c.implied_emission_factor,
        process_totals: d.totals,
        precursor_summary: e.summary,
        precursor_checks: e.cross_checks,
        additional_summary: f.summary,
        additional_self_checks: f.self_checks,
        additional_checks: f.cross_checks,
        sections,
        calculated_fields,
        is_export_ready,
    }
}

#[uniffi::export]
pub fn recalculate_report(report: InstallationReport, config: CalculationConfig) -> CalculatedReport {
    recalculate(&report, &config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::FieldValue;
    use crate::source_streams::CalculationMethod;

    fn installation() -> Installation {
        Installation {
            name: "Works".to_string(),
            installation_id: "INST-1".to_string(),
            country_code: "DE".to_string(),
            reporting_period_start: "2025-01-01".to_string(),
            reporting_period_end: "2025-12-31".to_string(),
            ..Default::default()
        }
    }

    fn report() -> InstallationReport {
        InstallationReport {
            installation: installation(),
            source_streams: vec![SourceStream {
                id: "s1".to_string(),
                name: "Coke".to_string(),
                method: CalculationMethod::Process,
                activity_data: 100.0,
                activity_data_unit: "t".to_string(),
                emission_factor: Some(3.0),
                emission_factor_unit: "tCO2/t".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_installation_validation() {
        assert!(installation().validate().is_valid);

        let bad = Installation {
            latitude: Some(120.0),
            reporting_period_end: "2024-12-31".to_string(),
            contact_email: "nobody".to_string(),
            ..installation()
        };
        let status = bad.validate();
        assert_eq!(status.errors.len(), 2);
        assert_eq!(status.warnings.len(), 1);

        let empty = Installation::default().validate();
        assert!(!empty.is_valid);
        assert_eq!(empty.completeness, 0.0);
    }

    #[test]
    fn test_balance_is_seeded_from_streams() {
        let result = recalculate(&report(), &CalculationConfig::default());
        assert!((result.source_stream_totals.total_co2e - 300.0).abs() < 1e-9);
        assert_eq!(result.report.ghg_balance.co2, FieldValue::auto(300.0));
        assert_eq!(result.report.ghg_balance.total_direct, FieldValue::auto(300.0));
        assert!(result.balance_checks.iter().all(|c| c.severity.is_none()));
        assert!(result.is_export_ready);
        assert_eq!(result.sections.len(), 6);
    }

    #[test]
    fn test_errors_block_export() {
        let mut input = report();
        input.source_streams[0].activity_data = -1.0;
        let result = recalculate(&input, &CalculationConfig::default());
        assert!(!result.is_export_ready);
        assert!(!result.section("B_EmInst").map(|s| s.is_valid).unwrap_or(true));
        assert!(result.section("A_InstData").map(|s| s.is_valid).unwrap_or(false));
    }

    #[test]
    fn test_recalculation_is_fixed_point() {
        let config = CalculationConfig::default();
        let first = recalculate(&report(), &config);
        let second = recalculate(&first.report, &config);
        assert_eq!(first, second);
    }
}
