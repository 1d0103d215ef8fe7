//! Writes a calculated report into the current workbook layout.

use tracing::debug;

use super::layout::{self, *};
use super::workbook::{Cell, Sheet, Workbook};
use crate::balance::FieldValue;
use crate::processes::ProductionProcess;
use crate::report::{CalculatedReport, Installation};

fn text(value: &str) -> Cell {
    if value.is_empty() {
        Cell::Empty
    } else {
        Cell::text(value)
    }
}

fn header(columns: &[&str]) -> Vec<Cell> {
    columns.iter().map(|c| Cell::text(*c)).collect()
}

fn title(sheet: &mut Sheet, title: &str) {
    sheet.push_row(vec![Cell::text(title)]);
}

fn installation_sheet(installation: &Installation) -> Sheet {
    use layout::installation::*;

    let mut sheet = Sheet::new(SHEET_INSTALLATION);
    title(&mut sheet, "A. Installation data");
    for (label, value) in [
        (NAME, &installation.name),
        (ID, &installation.installation_id),
        (OPERATOR, &installation.operator_name),
        (STREET, &installation.street),
        (CITY, &installation.city),
        (POST_CODE, &installation.post_code),
        (COUNTRY, &installation.country_code),
        (ACTIVITY, &installation.economic_activity),
    ] {
        sheet.push_labeled(label, text(value));
    }
    sheet.push_labeled(LATITUDE, Cell::optional(installation.latitude));
    sheet.push_labeled(LONGITUDE, Cell::optional(installation.longitude));
    for (label, value) in [
        (PERIOD_START, &installation.reporting_period_start),
        (PERIOD_END, &installation.reporting_period_end),
        (CONTACT_NAME, &installation.contact_name),
        (CONTACT_EMAIL, &installation.contact_email),
    ] {
        sheet.push_labeled(label, text(value));
    }
    sheet
}

fn source_stream_sheet(calculated: &CalculatedReport) -> Sheet {
    let report = &calculated.report;
    let totals = &calculated.source_stream_totals;
    let mut sheet = Sheet::new(SHEET_SOURCE_STREAMS);

    title(&mut sheet, streams::TITLE);
    sheet.push_row(header(&streams::HEADER));
    for s in &report.source_streams {
        sheet.push_row(vec![
            text(&s.id),
            text(&s.name),
            Cell::text(s.method.label()),
            Cell::number(s.activity_data),
            text(&s.activity_data_unit),
            Cell::optional(s.net_calorific_value),
            text(&s.ncv_unit),
            Cell::optional(s.emission_factor),
            text(&s.emission_factor_unit),
            Cell::optional(s.carbon_content),
            Cell::optional(s.oxidation_factor),
            Cell::optional(s.conversion_factor),
            Cell::number(s.biomass_content),
            Cell::number(s.non_sustainable_biomass_content),
            Cell::optional(s.uncertainty),
            Cell::number(s.co2e_fossil),
            Cell::number(s.co2e_biomass),
            Cell::number(s.co2e_non_sustainable_biomass),
            Cell::number(s.total_emissions),
            Cell::number(s.energy_content_fossil),
            Cell::number(s.energy_content_biomass),
        ]);
    }
    let mut total = vec![Cell::text(TOTAL_ROW)];
    total.resize(15, Cell::Empty);
    total.extend([
        Cell::number(totals.fossil_co2e),
        Cell::number(totals.biomass_co2e),
        Cell::number(totals.non_sustainable_biomass_co2e),
        Cell::number(totals.stream_co2e),
        Cell::number(totals.energy_content_fossil),
        Cell::number(totals.energy_content_biomass),
    ]);
    sheet.push_row(total);
    sheet.push_blank();

    title(&mut sheet, pfc::TITLE);
    sheet.push_row(header(&pfc::HEADER));
    for p in &report.pfc_sources {
        sheet.push_row(vec![
            text(&p.id),
            text(&p.name),
            Cell::text(p.method.label()),
            text(&p.technology_type),
            Cell::number(p.activity_data),
            Cell::optional(p.anode_effect_frequency),
            Cell::optional(p.anode_effect_duration),
            Cell::optional(p.slope_coefficient_cf4),
            Cell::optional(p.overvoltage_coefficient),
            Cell::optional(p.anode_effect_overvoltage),
            Cell::optional(p.current_efficiency),
            Cell::optional(p.c2f6_weight_fraction),
            Cell::optional(p.reported_cf4),
            Cell::optional(p.reported_c2f6),
            Cell::optional(p.uncertainty),
            Cell::number(p.cf4_emissions),
            Cell::number(p.c2f6_emissions),
            Cell::number(p.total_co2e),
        ]);
    }
    let mut total = vec![Cell::text(TOTAL_ROW)];
    total.resize(17, Cell::Empty);
    total.push(Cell::number(totals.pfc_co2e));
    sheet.push_row(total);
    sheet.push_blank();

    title(&mut sheet, measurement::TITLE);
    sheet.push_row(header(&measurement::HEADER));
    for m in &report.measurement_sources {
        sheet.push_row(vec![
            text(&m.id),
            text(&m.name),
            Cell::text(m.gas.label()),
            Cell::number(m.average_concentration),
            Cell::number(m.flue_gas_flow),
            Cell::number(m.operating_hours),
            Cell::number(m.biomass_content),
            Cell::optional(m.uncertainty),
            Cell::number(m.annual_emissions),
            Cell::number(m.total_co2e),
        ]);
    }
    sheet.push_row(vec![Cell::text(END_ROW)]);
    sheet
}

fn balance_row(sheet: &mut Sheet, label: &str, field: FieldValue) {
    sheet.push_row(vec![
        Cell::text(label),
        Cell::number(field.value()),
        Cell::text(field.mode_label()),
    ]);
}

fn balance_sheet(calculated: &CalculatedReport) -> Sheet {
    use layout::balance::*;

    let fuel = &calculated.report.fuel_balance;
    let ghg = &calculated.report.ghg_balance;
    let mut sheet = Sheet::new(SHEET_BALANCE);
    title(&mut sheet, TITLE);
    sheet.push_row(header(&HEADER));
    balance_row(&mut sheet, DIRECT_CBAM_GOODS, fuel.direct_cbam_goods);
    balance_row(&mut sheet, FOR_ELECTRICITY, fuel.for_electricity);
    balance_row(&mut sheet, DIRECT_NON_CBAM, fuel.direct_non_cbam);
    balance_row(&mut sheet, TOTAL_FUEL, fuel.total_fuel_input);
    sheet.push_blank();
    balance_row(&mut sheet, CO2, ghg.co2);
    balance_row(&mut sheet, BIOMASS_CO2, ghg.biomass_co2);
    balance_row(&mut sheet, N2O, ghg.n2o);
    balance_row(&mut sheet, PFC, ghg.pfc);
    balance_row(&mut sheet, TOTAL_DIRECT, ghg.total_direct);
    balance_row(&mut sheet, TOTAL_INDIRECT, ghg.total_indirect);
    balance_row(&mut sheet, TOTAL_EMISSIONS, ghg.total_emissions);

    if !calculated.balance_checks.is_empty() {
        sheet.push_blank();
        sheet.push_row(header(&["Cross-check", "Value", "Reference", "Difference %", "Result"]));
        for check in &calculated.balance_checks {
            sheet.push_row(vec![
                Cell::text(check.name.as_str()),
                Cell::number(check.value),
                Cell::number(check.reference),
                Cell::optional(check.difference_percent),
                Cell::text(check.severity.map_or("OK", |s| s.label())),
            ]);
        }
    }
    sheet
}

fn process_row(p: &ProductionProcess) -> Vec<Cell> {
    let heat = &p.measurable_heat;
    let gas = &p.waste_gases;
    let el = &p.indirect_electricity;
    let ex = &p.electricity_export;
    vec![
        text(&p.id),
        text(&p.name),
        Cell::number(p.production_amount),
        text(&p.production_unit),
        Cell::number(p.produced_for_market),
        Cell::number(p.market_share),
        Cell::flag(p.direct.applicable),
        Cell::number(p.direct.amount),
        text(&p.direct.unit),
        Cell::flag(heat.applicable),
        Cell::number(heat.net_amount),
        Cell::number(heat.imported),
        Cell::number(heat.exported),
        text(&heat.unit),
        Cell::number(heat.emission_factor),
        text(&heat.emission_factor_unit),
        Cell::optional(heat.share),
        Cell::flag(gas.applicable),
        Cell::number(gas.net_amount),
        Cell::number(gas.imported),
        Cell::number(gas.exported),
        text(&gas.unit),
        Cell::number(gas.reused_share),
        Cell::number(gas.emission_factor),
        text(&gas.emission_factor_unit),
        Cell::flag(el.applicable),
        Cell::number(el.consumption),
        text(&el.unit),
        Cell::number(el.emission_factor),
        text(&el.emission_factor_unit),
        Cell::flag(ex.applicable),
        Cell::number(ex.exported_amount),
        text(&ex.unit),
        Cell::number(ex.emission_factor),
        text(&ex.emission_factor_unit),
        Cell::number(p.net_attributed_emissions),
        Cell::number(p.specific_embedded_emissions),
    ]
}

fn process_sheet(calculated: &CalculatedReport) -> Sheet {
    let processes = &calculated.report.processes;
    let mut sheet = Sheet::new(SHEET_PROCESSES);

    title(&mut sheet, layout::processes::TITLE);
    sheet.push_row(header(&layout::processes::HEADER));
    for p in processes {
        sheet.push_row(process_row(p));
    }
    let mut total = vec![Cell::text(TOTAL_ROW)];
    total.resize(2, Cell::Empty);
    total.push(Cell::number(calculated.process_totals.production_amount));
    total.resize(35, Cell::Empty);
    total.push(Cell::number(calculated.process_totals.net_attributed_emissions));
    sheet.push_row(total);
    sheet.push_blank();

    title(&mut sheet, flows::TITLE);
    sheet.push_row(header(&flows::HEADER));
    for p in processes {
        for f in &p.matrix.process_to_process {
            sheet.push_row(vec![
                text(&p.id),
                text(&f.to_process_id),
                Cell::number(f.share),
                Cell::number(f.amount),
                text(&f.unit),
                text(&f.calculation_method),
            ]);
        }
    }
    sheet.push_blank();

    title(&mut sheet, products::TITLE);
    sheet.push_row(header(&products::HEADER));
    for p in processes {
        for f in &p.matrix.process_to_product {
            sheet.push_row(vec![
                text(&p.id),
                text(&f.product_name),
                text(&f.cn_code),
                Cell::number(f.share),
                Cell::number(f.amount),
                text(&f.unit),
            ]);
        }
    }
    sheet.push_blank();

    title(&mut sheet, consumption::TITLE);
    sheet.push_row(header(&consumption::HEADER));
    for p in processes {
        for c in &p.matrix.precursor_consumption {
            sheet.push_row(vec![
                text(&p.id),
                text(&c.precursor_id),
                text(&c.precursor_name),
                Cell::number(c.amount),
                text(&c.unit),
                Cell::text(c.origin.label()),
            ]);
        }
    }
    sheet.push_row(vec![Cell::text(END_ROW)]);
    sheet
}

fn precursor_sheet(calculated: &CalculatedReport) -> Sheet {
    let summary = &calculated.precursor_summary;
    let precursors = &calculated.report.precursors;
    let mut sheet = Sheet::new(SHEET_PRECURSORS);

    {
        use layout::precursor_summary::*;
        title(&mut sheet, TITLE);
        sheet.push_labeled(QUANTITY, Cell::number(summary.total_quantity));
        sheet.push_labeled(DIRECT, Cell::number(summary.total_direct_emissions));
        sheet.push_labeled(INDIRECT, Cell::number(summary.total_indirect_emissions));
        sheet.push_labeled(EMBEDDED, Cell::number(summary.total_embedded_emissions));
        sheet.push_labeled(COUNT, Cell::number(summary.precursor_count as f64));
        sheet.push_labeled(VERIFIED, Cell::number(summary.verified_count as f64));
        sheet.push_labeled(DEFAULTS, Cell::number(summary.default_values_count as f64));
        sheet.push_labeled(COMPLETENESS, Cell::number(summary.average_completeness));
        sheet.push_labeled(QUALITY, Cell::text(summary.overall_quality.label()));
        sheet.push_blank();
    }

    title(&mut sheet, layout::precursors::TITLE);
    sheet.push_row(header(&layout::precursors::HEADER));
    for p in precursors {
        sheet.push_row(vec![
            text(&p.id),
            text(&p.name),
            text(&p.cn_code),
            Cell::number(p.total_quantity),
            text(&p.unit),
            Cell::number(p.non_cbam_quantity),
            text(&p.supplier.name),
            text(&p.supplier.installation_id),
            text(&p.supplier.country_code),
            text(&p.production_route),
            Cell::number(p.direct_embedded_emissions),
            Cell::optional(p.indirect_embedded_emissions),
            Cell::optional(p.electricity_consumption),
            Cell::optional(p.electricity_emission_factor),
            text(&p.electricity_factor_source),
            Cell::flag(p.uses_default_values),
            text(&p.default_value_justification),
            Cell::text(p.data_quality.label()),
            Cell::text(p.verification_status.label()),
            Cell::number(p.total_embedded_emissions),
            Cell::number(p.total_specific_embedded_emissions),
        ]);
    }
    sheet.push_row(vec![Cell::text(END_ROW)]);
    sheet.push_blank();

    title(&mut sheet, allocations::TITLE);
    sheet.push_row(header(&allocations::HEADER));
    for p in precursors {
        for a in &p.allocations {
            sheet.push_row(vec![
                text(&p.id),
                text(&a.process_id),
                Cell::number(a.quantity),
            ]);
        }
    }
    sheet.push_row(vec![Cell::text(END_ROW)]);
    sheet.push_blank();

    // Two-section block per precursor, readable by the legacy marker scan.
    use layout::legacy as marker;
    title(&mut sheet, marker::TITLE);
    for (i, p) in precursors.iter().enumerate() {
        sheet.push_row(vec![Cell::text(format!("{} {}", marker::PRECURSOR, i + 1))]);
        sheet.push_labeled(marker::NAME, text(&p.name));
        sheet.push_row(vec![
            Cell::text(marker::QUANTITY),
            Cell::number(p.total_quantity),
            text(&p.unit),
        ]);
        sheet.push_labeled(marker::SPECIFIC_DIRECT, Cell::number(p.specific_direct_emissions));
        sheet.push_labeled(marker::SPECIFIC_INDIRECT, Cell::number(p.specific_indirect_emissions));
        sheet.push_labeled(marker::SUPPLIER_INSTALLATION, text(&p.supplier.installation_id));
        sheet.push_blank();
        let specific_electricity = match (p.electricity_consumption, p.total_quantity > 0.0) {
            (Some(mwh), true) => Some(mwh / p.total_quantity),
            _ => None,
        };
        sheet.push_labeled(marker::ELECTRICITY, Cell::optional(specific_electricity));
        sheet.push_labeled(marker::ELECTRICITY_EF, Cell::optional(p.electricity_emission_factor));
        sheet.push_labeled(marker::ELECTRICITY_SOURCE, text(&p.electricity_factor_source));
        let justification = if p.uses_default_values {
            text(&p.default_value_justification)
        } else {
            Cell::text(marker::NOT_APPLICABLE)
        };
        sheet.push_labeled(marker::JUSTIFICATION, justification);
        sheet.push_blank();
    }
    sheet
}

fn additional_sheet(calculated: &CalculatedReport) -> Sheet {
    let summary = &calculated.additional_summary;
    let mut sheet = Sheet::new(SHEET_ADDITIONAL);

    {
        use layout::additional_summary::*;
        title(&mut sheet, TITLE);
        sheet.push_labeled(CO2, Cell::number(summary.total_co2));
        sheet.push_labeled(N2O, Cell::number(summary.total_n2o));
        sheet.push_labeled(PFC, Cell::number(summary.total_pfc));
        sheet.push_labeled(BIOMASS, Cell::number(summary.total_biomass_co2));
        sheet.push_labeled(FOSSIL, Cell::number(summary.fossil_co2));
        sheet.push_labeled(CO2E, Cell::number(summary.co2_equivalent));
        sheet.push_labeled(GHG, Cell::number(summary.total_ghg));
        sheet.push_blank();
    }

    title(&mut sheet, layout::additional::TITLE);
    sheet.push_row(header(&layout::additional::HEADER));
    for e in &calculated.report.additional_emissions {
        sheet.push_row(vec![
            text(&e.id),
            text(&e.name),
            text(&e.source_category),
            Cell::number(e.co2),
            Cell::number(e.n2o),
            Cell::number(e.pfc),
            Cell::number(e.biomass_co2),
            Cell::text(e.method.label()),
            Cell::number(e.activity_data.value),
            text(&e.activity_data.unit),
            text(&e.activity_data.source),
            Cell::optional(e.activity_data.uncertainty),
            Cell::number(e.emission_factor.value),
            text(&e.emission_factor.unit),
            text(&e.emission_factor.source),
            Cell::optional(e.emission_factor.uncertainty),
            Cell::number(e.biomass_fraction),
            Cell::optional(e.overall_uncertainty),
            Cell::text(e.data_quality.label()),
            Cell::text(e.verification_status.label()),
            Cell::number(e.co2_equivalent),
        ]);
    }
    sheet.push_row(vec![Cell::text(END_ROW)]);

    if !calculated.additional_self_checks.is_empty() {
        sheet.push_blank();
        sheet.push_row(header(&["Self-check", "Result", "Details"]));
        for check in &calculated.additional_self_checks {
            sheet.push_row(vec![
                Cell::text(check.name.as_str()),
                Cell::text(check.outcome.label()),
                Cell::text(check.message.as_str()),
            ]);
        }
    }
    sheet
}

/// Builds the six-sheet workbook for a calculated report.
pub fn export_workbook(calculated: &CalculatedReport) -> Workbook {
    let mut workbook = Workbook::default();
    workbook.push(installation_sheet(&calculated.report.installation));
    workbook.push(source_stream_sheet(calculated));
    workbook.push(balance_sheet(calculated));
    workbook.push(process_sheet(calculated));
    workbook.push(precursor_sheet(calculated));
    workbook.push(additional_sheet(calculated));

    debug!(
        sheets = workbook.sheets.len(),
        rows = workbook.sheets.iter().map(|s| s.rows.len()).sum::<usize>(),
        "exported workbook"
    );
    workbook
}
