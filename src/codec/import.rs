//! Reads a workbook back into a report.
//!
//! Import never fails. Missing sheets, missing columns and values that do
//! not parse become warnings on the outcome and the affected fields keep
//! their defaults. Only inputs are read; every derived value is recomputed
//! by [`crate::report::recalculate`].

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::cells::{is_not_provided, parse_allocations, parse_flag};
use super::layout::{self, *};
use super::legacy;
use super::workbook::{Cell, HeaderMap, Sheet, Workbook};
use crate::additional::{ActivityData, AdditionalEmission, DeterminationMethod, EmissionFactor};
use crate::balance::{FieldValue, FuelBalance, GhgBalance};
use crate::precursors::{
    PrecursorSummary, ProcessAllocation, PurchasedPrecursor, SupplierIdentity,
};
use crate::processes::{
    matrix::{PrecursorConsumption, PrecursorOrigin, ProcessFlow, ProductFlow},
    DirectEmissions, ElectricityExport, IndirectElectricity, MeasurableHeat, ProductionProcess,
    WasteGases,
};
use crate::report::{Installation, InstallationReport};
use crate::source_streams::{
    measurement::{MeasuredGas, MeasurementSource},
    pfc::{PfcMethod, PfcSource},
    CalculationMethod, SourceStream,
};
use crate::validation::{DataQuality, VerificationStatus};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportOutcome {
    pub report: InstallationReport,
    /// Summary block of the precursor sheet as written, when present.
    pub precursor_summary: Option<PrecursorSummary>,
    pub warnings: Vec<String>,
    pub sheets_found: Vec<String>,
    pub used_legacy_layout: bool,
}

/// Collects warnings while reading cells of one table row.
struct Reader {
    warnings: Vec<String>,
}

impl Reader {
    fn warn(&mut self, message: String) {
        warn!("{message}");
        self.warnings.push(message);
    }

    fn optional(&mut self, header: &HeaderMap, row: &[Cell], column: &str, context: &str) -> Option<f64> {
        let cell = header.cell(row, column);
        let value = cell.as_number();
        if value.is_none() && !cell.is_blank() && !is_not_provided(&cell.as_text()) {
            self.warn(format!("{context}: '{}' in column '{column}' is not a number", cell.as_text()));
        }
        value
    }

    fn number(&mut self, header: &HeaderMap, row: &[Cell], column: &str, context: &str) -> f64 {
        self.optional(header, row, column, context).unwrap_or(0.0)
    }

    fn flag(&mut self, header: &HeaderMap, row: &[Cell], column: &str, context: &str) -> bool {
        let text = header.text(row, column);
        if text.trim().is_empty() {
            return false;
        }
        parse_flag(&text).unwrap_or_else(|| {
            self.warn(format!("{context}: '{text}' in column '{column}' is not yes/no"));
            false
        })
    }

    fn choice<T: Default>(
        &mut self,
        header: &HeaderMap,
        row: &[Cell],
        column: &str,
        context: &str,
        parse: fn(&str) -> Option<T>,
    ) -> T {
        let text = header.text(row, column);
        if text.trim().is_empty() {
            return T::default();
        }
        parse(&text).unwrap_or_else(|| {
            self.warn(format!("{context}: unrecognized {column} '{text}', using the default"));
            T::default()
        })
    }

    fn table(&mut self, sheet: &Sheet, required: &[&str], title: &str) -> Option<HeaderMap> {
        let header = sheet.find_header(required);
        if header.is_none() {
            self.warn(format!("{}: table '{title}' not found", sheet.name));
        }
        header
    }
}

fn row_context(sheet: &Sheet, header: &HeaderMap, row: &[Cell], id_column: &str) -> String {
    let id = header.text(row, id_column);
    if id.is_empty() {
        format!("{}: row without {id_column}", sheet.name)
    } else {
        format!("{}: '{id}'", sheet.name)
    }
}

fn read_installation(sheet: &Sheet) -> Installation {
    use layout::installation::*;

    let text = |label: &str| sheet.lookup_text(label).unwrap_or_default();
    Installation {
        name: text(NAME),
        installation_id: text(ID),
        operator_name: text(OPERATOR),
        street: text(STREET),
        city: text(CITY),
        post_code: text(POST_CODE),
        country_code: text(COUNTRY),
        economic_activity: text(ACTIVITY),
        latitude: sheet.lookup_number(LATITUDE),
        longitude: sheet.lookup_number(LONGITUDE),
        reporting_period_start: text(PERIOD_START),
        reporting_period_end: text(PERIOD_END),
        contact_name: text(CONTACT_NAME),
        contact_email: text(CONTACT_EMAIL),
    }
}

fn read_streams(reader: &mut Reader, sheet: &Sheet) -> Vec<SourceStream> {
    use layout::streams::*;

    let Some(h) = reader.table(sheet, &[ID, METHOD, ACTIVITY], TITLE) else {
        return Vec::new();
    };
    sheet
        .table_rows(&h)
        .map(|row| {
            let cx = row_context(sheet, &h, row, ID);
            SourceStream {
                id: h.text(row, ID),
                name: h.text(row, NAME),
                method: reader.choice(&h, row, METHOD, &cx, CalculationMethod::parse),
                activity_data: reader.number(&h, row, ACTIVITY, &cx),
                activity_data_unit: h.text(row, ACTIVITY_UNIT),
                net_calorific_value: reader.optional(&h, row, NCV, &cx),
                ncv_unit: h.text(row, NCV_UNIT),
                emission_factor: reader.optional(&h, row, EF, &cx),
                emission_factor_unit: h.text(row, EF_UNIT),
                carbon_content: reader.optional(&h, row, CARBON, &cx),
                oxidation_factor: reader.optional(&h, row, OXIDATION, &cx),
                conversion_factor: reader.optional(&h, row, CONVERSION, &cx),
                biomass_content: reader.number(&h, row, BIOMASS, &cx),
                non_sustainable_biomass_content: reader.number(&h, row, NON_SUSTAINABLE, &cx),
                uncertainty: reader.optional(&h, row, UNCERTAINTY, &cx),
                ..SourceStream::default()
            }
        })
        .collect()
}

fn read_pfc(reader: &mut Reader, sheet: &Sheet) -> Vec<PfcSource> {
    use layout::pfc::*;

    let Some(h) = sheet.find_header(&[ID, METHOD]) else {
        return Vec::new();
    };
    sheet
        .table_rows(&h)
        .map(|row| {
            let cx = row_context(sheet, &h, row, ID);
            PfcSource {
                id: h.text(row, ID),
                name: h.text(row, NAME),
                method: reader.choice(&h, row, METHOD, &cx, PfcMethod::parse),
                technology_type: h.text(row, TECHNOLOGY),
                activity_data: reader.number(&h, row, ACTIVITY, &cx),
                anode_effect_frequency: reader.optional(&h, row, FREQUENCY, &cx),
                anode_effect_duration: reader.optional(&h, row, DURATION, &cx),
                slope_coefficient_cf4: reader.optional(&h, row, SLOPE, &cx),
                overvoltage_coefficient: reader.optional(&h, row, OVC, &cx),
                anode_effect_overvoltage: reader.optional(&h, row, OVERVOLTAGE, &cx),
                current_efficiency: reader.optional(&h, row, CURRENT_EFFICIENCY, &cx),
                c2f6_weight_fraction: reader.optional(&h, row, C2F6_FRACTION, &cx),
                reported_cf4: reader.optional(&h, row, REPORTED_CF4, &cx),
                reported_c2f6: reader.optional(&h, row, REPORTED_C2F6, &cx),
                uncertainty: reader.optional(&h, row, UNCERTAINTY, &cx),
                ..PfcSource::default()
            }
        })
        .collect()
}

fn read_measurements(reader: &mut Reader, sheet: &Sheet) -> Vec<MeasurementSource> {
    use layout::measurement::*;

    let Some(h) = sheet.find_header(&[ID, GAS]) else {
        return Vec::new();
    };
    sheet
        .table_rows(&h)
        .map(|row| {
            let cx = row_context(sheet, &h, row, ID);
            MeasurementSource {
                id: h.text(row, ID),
                name: h.text(row, NAME),
                gas: reader.choice(&h, row, GAS, &cx, MeasuredGas::parse),
                average_concentration: reader.number(&h, row, CONCENTRATION, &cx),
                flue_gas_flow: reader.number(&h, row, FLOW, &cx),
                operating_hours: reader.number(&h, row, HOURS, &cx),
                biomass_content: reader.number(&h, row, BIOMASS, &cx),
                uncertainty: reader.optional(&h, row, UNCERTAINTY, &cx),
                ..MeasurementSource::default()
            }
        })
        .collect()
}

fn read_field(reader: &mut Reader, sheet: &Sheet, label: &str) -> FieldValue {
    let Some(cells) = sheet.lookup(label) else {
        reader.warn(format!("{}: row '{label}' not found", sheet.name));
        return FieldValue::default();
    };
    let value = cells.first().and_then(Cell::as_number).unwrap_or(0.0);
    let manual = cells
        .get(1)
        .map(|c| c.as_text().trim().eq_ignore_ascii_case("manual"))
        .unwrap_or(false);
    if manual {
        FieldValue::manual(value)
    } else {
        FieldValue::auto(value)
    }
}

fn read_balance(reader: &mut Reader, sheet: &Sheet) -> (FuelBalance, GhgBalance) {
    use layout::balance::*;

    let fuel = FuelBalance {
        direct_cbam_goods: read_field(reader, sheet, DIRECT_CBAM_GOODS),
        for_electricity: read_field(reader, sheet, FOR_ELECTRICITY),
        direct_non_cbam: read_field(reader, sheet, DIRECT_NON_CBAM),
        total_fuel_input: read_field(reader, sheet, TOTAL_FUEL),
    };
    let ghg = GhgBalance {
        co2: read_field(reader, sheet, CO2),
        biomass_co2: read_field(reader, sheet, BIOMASS_CO2),
        n2o: read_field(reader, sheet, N2O),
        pfc: read_field(reader, sheet, PFC),
        total_direct: read_field(reader, sheet, TOTAL_DIRECT),
        total_indirect: read_field(reader, sheet, TOTAL_INDIRECT),
        total_emissions: read_field(reader, sheet, TOTAL_EMISSIONS),
    };
    (fuel, ghg)
}

fn read_process(reader: &mut Reader, sheet: &Sheet, h: &HeaderMap, row: &[Cell]) -> ProductionProcess {
    use layout::processes::*;

    let cx = row_context(sheet, h, row, ID);
    ProductionProcess {
        id: h.text(row, ID),
        name: h.text(row, NAME),
        production_amount: reader.number(h, row, AMOUNT, &cx),
        production_unit: h.text(row, UNIT),
        produced_for_market: reader.number(h, row, FOR_MARKET, &cx),
        market_share: reader.number(h, row, MARKET_SHARE, &cx),
        direct: DirectEmissions {
            applicable: reader.flag(h, row, DIRECT_APPLICABLE, &cx),
            amount: reader.number(h, row, DIRECT, &cx),
            unit: h.text(row, DIRECT_UNIT),
        },
        measurable_heat: MeasurableHeat {
            applicable: reader.flag(h, row, HEAT_APPLICABLE, &cx),
            net_amount: reader.number(h, row, HEAT_NET, &cx),
            imported: reader.number(h, row, HEAT_IMPORTED, &cx),
            exported: reader.number(h, row, HEAT_EXPORTED, &cx),
            unit: h.text(row, HEAT_UNIT),
            emission_factor: reader.number(h, row, HEAT_EF, &cx),
            emission_factor_unit: h.text(row, HEAT_EF_UNIT),
            share: reader.optional(h, row, HEAT_SHARE, &cx),
        },
        waste_gases: WasteGases {
            applicable: reader.flag(h, row, GAS_APPLICABLE, &cx),
            net_amount: reader.number(h, row, GAS_NET, &cx),
            imported: reader.number(h, row, GAS_IMPORTED, &cx),
            exported: reader.number(h, row, GAS_EXPORTED, &cx),
            unit: h.text(row, GAS_UNIT),
            reused_share: reader.number(h, row, GAS_REUSED, &cx),
            emission_factor: reader.number(h, row, GAS_EF, &cx),
            emission_factor_unit: h.text(row, GAS_EF_UNIT),
        },
        indirect_electricity: IndirectElectricity {
            applicable: reader.flag(h, row, ELECTRICITY_APPLICABLE, &cx),
            consumption: reader.number(h, row, ELECTRICITY, &cx),
            unit: h.text(row, ELECTRICITY_UNIT),
            emission_factor: reader.number(h, row, ELECTRICITY_EF, &cx),
            emission_factor_unit: h.text(row, ELECTRICITY_EF_UNIT),
        },
        electricity_export: ElectricityExport {
            applicable: reader.flag(h, row, EXPORT_APPLICABLE, &cx),
            exported_amount: reader.number(h, row, EXPORT, &cx),
            unit: h.text(row, EXPORT_UNIT),
            emission_factor: reader.number(h, row, EXPORT_EF, &cx),
            emission_factor_unit: h.text(row, EXPORT_EF_UNIT),
        },
        ..ProductionProcess::default()
    }
}

/// Finds the process a matrix row belongs to, warning when there is none.
fn owner<'a>(
    reader: &mut Reader,
    processes: &'a mut [ProductionProcess],
    id: &str,
    what: &str,
) -> Option<&'a mut ProductionProcess> {
    let found = processes.iter_mut().find(|p| p.id == id);
    if found.is_none() {
        reader.warn(format!("{what} row refers to unknown process '{id}', skipped"));
    }
    found
}

fn read_processes(reader: &mut Reader, sheet: &Sheet) -> Vec<ProductionProcess> {
    let Some(h) = reader.table(
        sheet,
        &[layout::processes::ID, layout::processes::AMOUNT],
        layout::processes::TITLE,
    ) else {
        return Vec::new();
    };
    let mut processes: Vec<ProductionProcess> = sheet
        .table_rows(&h)
        .map(|row| read_process(reader, sheet, &h, row))
        .collect();

    if let Some(h) = sheet.find_header(&[flows::FROM, flows::TO]) {
        for row in sheet.table_rows(&h) {
            let cx = row_context(sheet, &h, row, flows::FROM);
            let flow = ProcessFlow {
                to_process_id: h.text(row, flows::TO),
                share: reader.number(&h, row, flows::SHARE, &cx),
                amount: reader.number(&h, row, flows::AMOUNT, &cx),
                unit: h.text(row, flows::UNIT),
                calculation_method: h.text(row, flows::METHOD),
            };
            let from = h.text(row, flows::FROM);
            if let Some(p) = owner(reader, &mut processes, &from, "Process flow") {
                p.matrix.process_to_process.push(flow);
            }
        }
    }

    if let Some(h) = sheet.find_header(&[products::PROCESS, products::NAME]) {
        for row in sheet.table_rows(&h) {
            let cx = row_context(sheet, &h, row, products::PROCESS);
            let flow = ProductFlow {
                product_name: h.text(row, products::NAME),
                cn_code: h.text(row, products::CN_CODE),
                share: reader.number(&h, row, products::SHARE, &cx),
                amount: reader.number(&h, row, products::AMOUNT, &cx),
                unit: h.text(row, products::UNIT),
            };
            let from = h.text(row, products::PROCESS);
            if let Some(p) = owner(reader, &mut processes, &from, "Product flow") {
                p.matrix.process_to_product.push(flow);
            }
        }
    }

    if let Some(h) = sheet.find_header(&[consumption::PROCESS, consumption::AMOUNT]) {
        for row in sheet.table_rows(&h) {
            let cx = row_context(sheet, &h, row, consumption::PROCESS);
            let entry = PrecursorConsumption {
                precursor_id: h.text(row, consumption::PRECURSOR_ID),
                precursor_name: h.text(row, consumption::PRECURSOR_NAME),
                amount: reader.number(&h, row, consumption::AMOUNT, &cx),
                unit: h.text(row, consumption::UNIT),
                origin: reader.choice(&h, row, consumption::ORIGIN, &cx, PrecursorOrigin::parse),
            };
            let from = h.text(row, consumption::PROCESS);
            if let Some(p) = owner(reader, &mut processes, &from, "Precursor consumption") {
                p.matrix.precursor_consumption.push(entry);
            }
        }
    }
    processes
}

fn read_precursor_table(reader: &mut Reader, sheet: &Sheet, h: &HeaderMap) -> Vec<PurchasedPrecursor> {
    use layout::precursors::*;

    sheet
        .table_rows(h)
        .map(|row| {
            let cx = row_context(sheet, h, row, ID);
            let (parsed, rejected) = parse_allocations(&h.text(row, ALLOCATIONS));
            for part in rejected {
                reader.warn(format!("{cx}: allocation '{part}' is not 'process = quantity', skipped"));
            }
            let allocations = parsed
                .into_iter()
                .map(|(process_id, quantity)| ProcessAllocation {
                    process_id,
                    quantity,
                })
                .collect();
            PurchasedPrecursor {
                id: h.text(row, ID),
                name: h.text(row, NAME),
                cn_code: h.text(row, CN_CODE),
                total_quantity: reader.number(h, row, QUANTITY, &cx),
                unit: h.text(row, UNIT),
                non_cbam_quantity: reader.number(h, row, NON_CBAM, &cx),
                supplier: SupplierIdentity {
                    name: h.text(row, SUPPLIER),
                    installation_id: h.text(row, SUPPLIER_INSTALLATION),
                    country_code: h.text(row, SUPPLIER_COUNTRY),
                },
                production_route: h.text(row, ROUTE),
                direct_embedded_emissions: reader.number(h, row, DIRECT, &cx),
                indirect_embedded_emissions: reader.optional(h, row, INDIRECT, &cx),
                electricity_consumption: reader.optional(h, row, ELECTRICITY, &cx),
                electricity_emission_factor: reader.optional(h, row, ELECTRICITY_EF, &cx),
                electricity_factor_source: h.text(row, ELECTRICITY_SOURCE),
                uses_default_values: reader.flag(h, row, USES_DEFAULTS, &cx),
                default_value_justification: h.text(row, JUSTIFICATION),
                allocations,
                data_quality: reader.choice(h, row, QUALITY, &cx, DataQuality::parse),
                verification_status: reader.choice(
                    h,
                    row,
                    VERIFICATION,
                    &cx,
                    VerificationStatus::parse,
                ),
                ..PurchasedPrecursor::default()
            }
        })
        .collect()
}

/// Rows of the allocation table, attached to the precursor they name.
fn read_allocations(reader: &mut Reader, sheet: &Sheet, precursors: &mut [PurchasedPrecursor]) {
    use layout::allocations::*;

    let Some(h) = sheet.find_header(&[PRECURSOR, PROCESS]) else {
        return;
    };
    for row in sheet.table_rows(&h) {
        let cx = row_context(sheet, &h, row, PRECURSOR);
        let allocation = ProcessAllocation {
            process_id: h.text(row, PROCESS),
            quantity: reader.number(&h, row, QUANTITY, &cx),
        };
        let id = h.text(row, PRECURSOR);
        match precursors.iter_mut().find(|p| p.id == id) {
            Some(p) => p.allocations.push(allocation),
            None => reader.warn(format!(
                "Allocation row refers to unknown precursor '{id}', skipped"
            )),
        }
    }
}

fn read_precursor_summary(sheet: &Sheet) -> Option<PrecursorSummary> {
    use layout::precursor_summary::*;

    sheet.lookup(QUANTITY)?;
    let number = |label: &str| sheet.lookup_number(label).unwrap_or(0.0);
    let count = |label: &str| number(label).max(0.0).round() as u32;
    Some(PrecursorSummary {
        total_quantity: number(QUANTITY),
        total_direct_emissions: number(DIRECT),
        total_indirect_emissions: number(INDIRECT),
        total_embedded_emissions: number(EMBEDDED),
        precursor_count: count(COUNT),
        verified_count: count(VERIFIED),
        default_values_count: count(DEFAULTS),
        average_completeness: number(COMPLETENESS),
        overall_quality: sheet
            .lookup_text(QUALITY)
            .and_then(|t| DataQuality::parse(&t))
            .unwrap_or_default(),
    })
}

/// Detail table when it has rows, otherwise the legacy marker blocks.
fn read_precursors(reader: &mut Reader, sheet: &Sheet) -> (Vec<PurchasedPrecursor>, bool) {
    use layout::precursors::{ID, NAME, QUANTITY};

    if let Some(h) = sheet.find_header(&[ID, NAME, QUANTITY]) {
        let mut precursors = read_precursor_table(reader, sheet, &h);
        if !precursors.is_empty() {
            read_allocations(reader, sheet, &mut precursors);
            return (precursors, false);
        }
    }
    let precursors = legacy::scan(sheet);
    let legacy = !precursors.is_empty();
    if legacy {
        debug!(count = precursors.len(), "read precursors from legacy layout");
    }
    (precursors, legacy)
}

fn read_additional(reader: &mut Reader, sheet: &Sheet) -> Vec<AdditionalEmission> {
    use layout::additional::*;

    let Some(h) = reader.table(sheet, &[ID, CO2, N2O], TITLE) else {
        return Vec::new();
    };
    sheet
        .table_rows(&h)
        .map(|row| {
            let cx = row_context(sheet, &h, row, ID);
            AdditionalEmission {
                id: h.text(row, ID),
                name: h.text(row, NAME),
                source_category: h.text(row, CATEGORY),
                co2: reader.number(&h, row, CO2, &cx),
                n2o: reader.number(&h, row, N2O, &cx),
                pfc: reader.number(&h, row, PFC, &cx),
                biomass_co2: reader.number(&h, row, BIOMASS, &cx),
                method: reader.choice(&h, row, METHOD, &cx, DeterminationMethod::parse),
                activity_data: ActivityData {
                    value: reader.number(&h, row, ACTIVITY, &cx),
                    unit: h.text(row, ACTIVITY_UNIT),
                    source: h.text(row, ACTIVITY_SOURCE),
                    uncertainty: reader.optional(&h, row, ACTIVITY_UNCERTAINTY, &cx),
                },
                emission_factor: EmissionFactor {
                    value: reader.number(&h, row, EF, &cx),
                    unit: h.text(row, EF_UNIT),
                    source: h.text(row, EF_SOURCE),
                    uncertainty: reader.optional(&h, row, EF_UNCERTAINTY, &cx),
                },
                biomass_fraction: reader.number(&h, row, BIOMASS_FRACTION, &cx),
                overall_uncertainty: reader.optional(&h, row, UNCERTAINTY, &cx),
                data_quality: reader.choice(&h, row, QUALITY, &cx, DataQuality::parse),
                verification_status: reader.choice(
                    &h,
                    row,
                    VERIFICATION,
                    &cx,
                    VerificationStatus::parse,
                ),
                ..AdditionalEmission::default()
            }
        })
        .collect()
}

/// Reads whatever the workbook holds. Sheets are matched by name ignoring case.
pub fn import_workbook(workbook: &Workbook) -> ImportOutcome {
    let mut reader = Reader {
        warnings: Vec::new(),
    };
    let mut outcome = ImportOutcome::default();

    for name in ALL_SHEETS {
        match workbook.sheet(name) {
            Some(sheet) => outcome.sheets_found.push(sheet.name.clone()),
            None => reader.warn(format!("sheet '{name}' not found")),
        }
    }

    let report = &mut outcome.report;
    if let Some(sheet) = workbook.sheet(SHEET_INSTALLATION) {
        report.installation = read_installation(sheet);
    }
    if let Some(sheet) = workbook.sheet(SHEET_SOURCE_STREAMS) {
        report.source_streams = read_streams(&mut reader, sheet);
        report.pfc_sources = read_pfc(&mut reader, sheet);
        report.measurement_sources = read_measurements(&mut reader, sheet);
    }
    if let Some(sheet) = workbook.sheet(SHEET_BALANCE) {
        let (fuel, ghg) = read_balance(&mut reader, sheet);
        report.fuel_balance = fuel;
        report.ghg_balance = ghg;
    }
    if let Some(sheet) = workbook.sheet(SHEET_PROCESSES) {
        report.processes = read_processes(&mut reader, sheet);
    }
    if let Some(sheet) = workbook.sheet(SHEET_PRECURSORS) {
        let (precursors, legacy) = read_precursors(&mut reader, sheet);
        report.precursors = precursors;
        outcome.used_legacy_layout = legacy;
        outcome.precursor_summary = read_precursor_summary(sheet);
    }
    if let Some(sheet) = workbook.sheet(SHEET_ADDITIONAL) {
        report.additional_emissions = read_additional(&mut reader, sheet);
    }

    outcome.warnings = reader.warnings;
    debug!(
        sheets = outcome.sheets_found.len(),
        warnings = outcome.warnings.len(),
        legacy = outcome.used_legacy_layout,
        "imported workbook"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::export::export_workbook;
    use crate::config::CalculationConfig;
    use crate::report::recalculate;

    fn sample_report() -> InstallationReport {
        InstallationReport {
            installation: Installation {
                name: "Rolling mill".into(),
                installation_id: "DE-0001".into(),
                country_code: "DE".into(),
                latitude: Some(51.2),
                reporting_period_start: "2026-01-01".into(),
                reporting_period_end: "2026-12-31".into(),
                ..Installation::default()
            },
            source_streams: vec![SourceStream {
                id: "s1".into(),
                name: "Natural gas".into(),
                activity_data: 1000.0,
                activity_data_unit: "t".into(),
                net_calorific_value: Some(48.0),
                ncv_unit: "GJ/t".into(),
                emission_factor: Some(56.1),
                emission_factor_unit: "tCO2/TJ".into(),
                ..SourceStream::default()
            }],
            ghg_balance: GhgBalance {
                total_indirect: FieldValue::manual(12.5),
                ..GhgBalance::default()
            },
            processes: vec![ProductionProcess {
                id: "p1".into(),
                name: "Hot rolling".into(),
                production_amount: 500.0,
                production_unit: "t".into(),
                direct: DirectEmissions {
                    applicable: true,
                    amount: 2000.0,
                    unit: "t".into(),
                },
                ..ProductionProcess::default()
            }],
            precursors: vec![PurchasedPrecursor {
                id: "e1".into(),
                name: "Slab".into(),
                total_quantity: 400.0,
                unit: "t".into(),
                direct_embedded_emissions: 800.0,
                electricity_consumption: Some(40.0),
                electricity_emission_factor: Some(0.5),
                allocations: vec![ProcessAllocation {
                    process_id: "p1".into(),
                    quantity: 400.0,
                }],
                data_quality: DataQuality::Fair,
                ..PurchasedPrecursor::default()
            }],
            ..InstallationReport::default()
        }
    }

    #[test]
    fn test_exported_workbook_reads_back() {
        let config = CalculationConfig::default();
        let calculated = recalculate(&sample_report(), &config);
        let outcome = import_workbook(&export_workbook(&calculated));

        assert_eq!(outcome.sheets_found.len(), 6);
        assert!(!outcome.used_legacy_layout);
        assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);

        let again = recalculate(&outcome.report, &config);
        assert_eq!(again.report, calculated.report);
        let summary = outcome.precursor_summary.expect("summary block");
        assert_eq!(summary.total_quantity, 400.0);
        assert_eq!(summary.overall_quality, calculated.precursor_summary.overall_quality);
    }

    #[test]
    fn test_missing_sheets_are_warnings() {
        let outcome = import_workbook(&Workbook::default());
        assert!(outcome.sheets_found.is_empty());
        assert_eq!(outcome.warnings.len(), 6);
        assert_eq!(outcome.report, InstallationReport::default());
    }

    #[test]
    fn test_unparseable_values_fall_back() {
        use layout::streams::*;

        let mut sheet = Sheet::new("b_eminst");
        sheet.push_row(vec![Cell::text(ID), Cell::text(METHOD), Cell::text(ACTIVITY)]);
        sheet.push_row(vec![Cell::text("s1"), Cell::text("Guesswork"), Cell::text("lots")]);
        sheet.push_row(vec![Cell::text("s2"), Cell::text("mass balance"), Cell::text("1.234,5")]);
        let workbook = Workbook {
            sheets: vec![sheet],
        };

        let outcome = import_workbook(&workbook);
        let streams = &outcome.report.source_streams;
        assert_eq!(streams.len(), 2);
        assert_eq!(streams[0].method, CalculationMethod::default());
        assert_eq!(streams[0].activity_data, 0.0);
        assert_eq!(streams[1].method, CalculationMethod::MassBalance);
        assert_eq!(streams[1].activity_data, 1234.5);
        assert!(outcome.warnings.iter().any(|w| w.contains("Guesswork")));
        assert!(outcome.warnings.iter().any(|w| w.contains("lots")));
    }

    #[test]
    fn test_allocation_column_keeps_spaced_process_ids() {
        use layout::precursors::*;

        let mut sheet = Sheet::new(SHEET_PRECURSORS);
        sheet.push_row(vec![
            Cell::text(ID),
            Cell::text(NAME),
            Cell::text(QUANTITY),
            Cell::text(ALLOCATIONS),
        ]);
        sheet.push_row(vec![
            Cell::text("e1"),
            Cell::text("Slab"),
            Cell::number(10.0),
            Cell::text("Process 1 = 4; Line B=6; six"),
        ]);
        let workbook = Workbook {
            sheets: vec![sheet],
        };

        let outcome = import_workbook(&workbook);
        assert_eq!(
            outcome.report.precursors[0].allocations,
            vec![
                ProcessAllocation {
                    process_id: "Process 1".into(),
                    quantity: 4.0,
                },
                ProcessAllocation {
                    process_id: "Line B".into(),
                    quantity: 6.0,
                },
            ]
        );
        assert!(outcome.warnings.iter().any(|w| w.contains("'six'")));
    }

    #[test]
    fn test_allocation_rows_attach_to_their_precursor() {
        let config = CalculationConfig::default();
        let mut report = sample_report();
        report.precursors[0].allocations = vec![ProcessAllocation {
            process_id: "Process 1; hot = end".into(),
            quantity: 250.0,
        }];
        let calculated = recalculate(&report, &config);

        let outcome = import_workbook(&export_workbook(&calculated));
        assert_eq!(outcome.report.precursors[0].allocations, report.precursors[0].allocations);
        assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);
    }

    #[test]
    fn test_legacy_layout_used_without_detail_table() {
        let mut sheet = Sheet::new(SHEET_PRECURSORS);
        sheet.push_row(vec![Cell::text("Purchased precursor 1")]);
        sheet.push_labeled("Name of precursor", Cell::text("Pig iron"));
        sheet.push_labeled("Total quantity", Cell::number(10.0));
        sheet.push_labeled("Specific embedded direct emissions", Cell::number(1.5));
        let workbook = Workbook {
            sheets: vec![sheet],
        };

        let outcome = import_workbook(&workbook);
        assert!(outcome.used_legacy_layout);
        assert_eq!(outcome.report.precursors.len(), 1);
        assert_eq!(outcome.report.precursors[0].direct_embedded_emissions, 15.0);
        assert!(outcome.precursor_summary.is_none());
    }
}
