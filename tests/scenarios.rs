//! End-to-end scenarios through the public entry points.

use proptest::prelude::*;

use cbam_compute::balance::{FieldValue, GhgBalance};
use cbam_compute::codec::{
    coerce_input_number, export_report_workbook, import_report_workbook, layout, Cell, Workbook,
};
use cbam_compute::config::CalculationConfig;
use cbam_compute::precursors::{ProcessAllocation, PurchasedPrecursor};
use cbam_compute::processes::{
    DirectEmissions, InputOutputMatrix, MeasurableHeat, PrecursorConsumption, ProcessFlow,
    ProductFlow, ProductionProcess,
};
use cbam_compute::report::{recalculate, Installation, InstallationReport};
use cbam_compute::source_streams::{
    calculate_pfc_source, CalculationMethod, PfcMethod, PfcSource, SourceStream,
};
use cbam_compute::validation::{DataQuality, Severity};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn installation() -> Installation {
    Installation {
        name: "Steelworks".into(),
        installation_id: "PL-77".into(),
        operator_name: "Huta SA".into(),
        city: "Katowice".into(),
        country_code: "PL".into(),
        latitude: Some(50.25),
        longitude: Some(19.0),
        reporting_period_start: "2026-01-01".into(),
        reporting_period_end: "2026-12-31".into(),
        contact_email: "ops@example.com".into(),
        ..Installation::default()
    }
}

#[test]
fn pfc_slope_scenario() {
    let source = PfcSource {
        id: "pot-1".into(),
        name: "Potline 1".into(),
        method: PfcMethod::Slope,
        activity_data: 500_000.0,
        anode_effect_frequency: Some(2.17),
        anode_effect_duration: Some(1.23),
        slope_coefficient_cf4: Some(0.146),
        c2f6_weight_fraction: Some(0.1),
        ..PfcSource::default()
    };
    let out = calculate_pfc_source(&source, &CalculationConfig::default());
    let cf4 = 2.17 * 1.23 * (0.146 / 1000.0) * 500_000.0;
    assert!((out.cf4_emissions - cf4).abs() < 1e-9);
    assert!((out.c2f6_emissions - 0.1 * cf4).abs() < 1e-9);
    assert!((out.total_co2e - (cf4 * 6630.0 + 0.1 * cf4 * 11100.0)).abs() < 1e-6);
}

/// One process stream whose total is `b_total`, and a manual direct total.
fn balance_report(direct: f64, b_total: f64) -> InstallationReport {
    InstallationReport {
        installation: installation(),
        source_streams: vec![SourceStream {
            id: "s1".into(),
            name: "Limestone".into(),
            method: CalculationMethod::Process,
            activity_data: b_total,
            activity_data_unit: "t".into(),
            emission_factor: Some(1.0),
            ..SourceStream::default()
        }],
        ghg_balance: GhgBalance {
            total_direct: FieldValue::manual(direct),
            ..GhgBalance::default()
        },
        ..InstallationReport::default()
    }
}

#[test]
fn direct_emissions_cross_check_bands() {
    let config = CalculationConfig {
        import_balance_from_streams: false,
        ..CalculationConfig::default()
    };
    let severity = |direct: f64| {
        recalculate(&balance_report(direct, 1000.0), &config).balance_checks[0].severity
    };

    // C = 1000 against B = 1500 is a 33% difference
    let report = recalculate(&balance_report(1000.0, 1500.0), &config);
    assert_eq!(report.balance_checks[0].severity, Some(Severity::Warning));
    assert!(report.is_export_ready);

    assert_eq!(severity(700.0), None);
    assert_eq!(severity(699.0), Some(Severity::Warning));
    assert_eq!(severity(400.0), Some(Severity::Warning));
    assert_eq!(severity(399.0), Some(Severity::Error));
}

#[test]
fn non_cbam_above_total_blocks_export() {
    for unit in ["t", "kg", "m3", "pieces"] {
        let report = InstallationReport {
            installation: installation(),
            precursors: vec![PurchasedPrecursor {
                id: "e1".into(),
                name: "Scrap".into(),
                total_quantity: 10.0,
                non_cbam_quantity: 12.0,
                unit: unit.into(),
                ..PurchasedPrecursor::default()
            }],
            ..InstallationReport::default()
        };
        let calculated = recalculate(&report, &CalculationConfig::default());
        assert!(!calculated.report.precursors[0].validation.is_valid, "{unit}");
        assert!(!calculated.is_export_ready);
    }
}

fn full_report() -> InstallationReport {
    InstallationReport {
        installation: installation(),
        source_streams: vec![SourceStream {
            id: "s1".into(),
            name: "Coking coal".into(),
            activity_data: 1200.0,
            activity_data_unit: "t".into(),
            net_calorific_value: Some(28.2),
            ncv_unit: "GJ/t".into(),
            emission_factor: Some(94.6),
            emission_factor_unit: "tCO2/TJ".into(),
            biomass_content: 5.0,
            ..SourceStream::default()
        }],
        ghg_balance: GhgBalance {
            total_indirect: FieldValue::manual(320.0),
            ..GhgBalance::default()
        },
        processes: vec![
            ProductionProcess {
                id: "bf".into(),
                name: "Blast furnace".into(),
                production_amount: 900.0,
                production_unit: "t".into(),
                direct: DirectEmissions {
                    applicable: true,
                    amount: 2500.0,
                    unit: "t".into(),
                },
                measurable_heat: MeasurableHeat {
                    applicable: true,
                    net_amount: 12.0,
                    unit: "TJ".into(),
                    emission_factor: 56.1,
                    emission_factor_unit: "tCO2/TJ".into(),
                    share: Some(75.0),
                    ..MeasurableHeat::default()
                },
                matrix: InputOutputMatrix {
                    process_to_process: vec![ProcessFlow {
                        to_process_id: "bof".into(),
                        share: 100.0,
                        amount: 900.0,
                        unit: "t".into(),
                        calculation_method: "Mass".into(),
                    }],
                    precursor_consumption: vec![PrecursorConsumption {
                        precursor_id: "e1".into(),
                        precursor_name: "Sinter".into(),
                        amount: 1400.0,
                        unit: "t".into(),
                        ..PrecursorConsumption::default()
                    }],
                    ..InputOutputMatrix::default()
                },
                ..ProductionProcess::default()
            },
            ProductionProcess {
                id: "bof".into(),
                name: "Converter".into(),
                production_amount: 850.0,
                production_unit: "t".into(),
                matrix: InputOutputMatrix {
                    process_to_product: vec![ProductFlow {
                        product_name: "Crude steel".into(),
                        cn_code: "7206".into(),
                        share: 100.0,
                        amount: 850.0,
                        unit: "t".into(),
                    }],
                    ..InputOutputMatrix::default()
                },
                ..ProductionProcess::default()
            },
        ],
        precursors: vec![PurchasedPrecursor {
            id: "e1".into(),
            name: "Sinter".into(),
            cn_code: "2601".into(),
            total_quantity: 1400.0,
            unit: "t".into(),
            direct_embedded_emissions: 420.0,
            electricity_consumption: Some(70.0),
            electricity_emission_factor: Some(0.6),
            electricity_factor_source: "National grid".into(),
            uses_default_values: true,
            default_value_justification: "Supplier data pending".into(),
            allocations: vec![ProcessAllocation {
                process_id: "bf".into(),
                quantity: 1400.0,
            }],
            data_quality: DataQuality::Fair,
            ..PurchasedPrecursor::default()
        }],
        ..InstallationReport::default()
    }
}

#[test]
fn workbook_round_trip_reproduces_report() {
    init_tracing();
    let config = CalculationConfig::default();
    let calculated = recalculate(&full_report(), &config);

    let workbook = export_report_workbook(full_report(), config.clone());
    let names: Vec<String> = layout::ALL_SHEETS.iter().map(|s| s.to_string()).collect();
    assert_eq!(workbook.sheet_names(), names);

    let outcome = import_report_workbook(workbook);
    assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);
    assert!(!outcome.used_legacy_layout);

    let imported = &outcome.report;
    assert_eq!(imported.installation, calculated.report.installation);
    assert_eq!(
        imported.processes[0].matrix,
        calculated.report.processes[0].matrix
    );
    assert_eq!(imported.precursors[0].allocations, calculated.report.precursors[0].allocations);

    let again = recalculate(imported, &config);
    assert_eq!(again, calculated);

    let summary = outcome.precursor_summary.expect("precursor summary");
    assert_eq!(summary.total_embedded_emissions, calculated.precursor_summary.total_embedded_emissions);
}

#[test]
fn legacy_precursor_block_is_read_when_table_is_absent() {
    let config = CalculationConfig::default();
    let mut workbook = export_report_workbook(full_report(), config);
    let sheet = workbook
        .sheets
        .iter_mut()
        .find(|s| s.name == layout::SHEET_PRECURSORS)
        .expect("precursor sheet");
    // blank out the detail table header so only the legacy blocks remain
    for row in &mut sheet.rows {
        if row.first() == Some(&Cell::text(layout::precursors::ID)) {
            row.clear();
        }
    }

    let outcome = import_report_workbook(workbook);
    assert!(outcome.used_legacy_layout);
    let p = &outcome.report.precursors[0];
    assert_eq!(p.name, "Sinter");
    assert_eq!(p.total_quantity, 1400.0);
    assert!((p.direct_embedded_emissions - 420.0).abs() < 1e-9);
    assert!((p.electricity_consumption.unwrap_or_default() - 70.0).abs() < 1e-9);
    assert!(p.uses_default_values);
    assert_eq!(p.default_value_justification, "Supplier data pending");
}

#[test]
fn import_of_unrelated_workbook_is_partial() {
    let mut workbook = Workbook::default();
    workbook.push(cbam_compute::codec::Sheet::new("Summary"));
    let outcome = import_report_workbook(workbook);
    assert!(outcome.sheets_found.is_empty());
    assert_eq!(outcome.report, InstallationReport::default());
    assert!(!outcome.warnings.is_empty());
}

proptest! {
    #[test]
    fn coerce_never_fails(text in ".{0,20}") {
        let value = coerce_input_number(text);
        prop_assert!(value.is_finite());
    }

    #[test]
    fn coerce_reads_plain_decimals(whole in 0u32..1_000_000, frac in 0u32..100) {
        let text = format!("{whole}.{frac:02}");
        let expected: f64 = text.parse().unwrap();
        prop_assert_eq!(coerce_input_number(text), expected);
    }
}
