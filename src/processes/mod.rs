//! Process attribution (section D).
//!
//! Each production process attributes five emission elements to itself:
//! direct emissions, measurable heat, waste gases, indirect emissions from
//! electricity consumed, and a credit for electricity exported. The net
//! attributed emissions divided by the production amount give the specific
//! embedded emissions (SEE) of the process.

pub mod matrix;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ensure_finite, CalculationError};
use crate::units;
use crate::validation::{
    require_non_negative, require_percentage, warn_unsupported, CompletenessTally,
    ValidationStatus,
};

pub use matrix::{
    InputOutputMatrix, PrecursorConsumption, PrecursorOrigin, ProcessFlow, ProductFlow,
};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct DirectEmissions {
    pub applicable: bool,
    /// tCO2e attributed directly to the process.
    pub amount: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct MeasurableHeat {
    pub applicable: bool,
    pub net_amount: f64,
    pub imported: f64,
    pub exported: f64,
    /// Heat unit (TJ when empty).
    pub unit: String,
    pub emission_factor: f64,
    /// tCO2/TJ when empty.
    pub emission_factor_unit: String,
    /// Percent of the heat attributed to this process, 100 when not given.
    pub share: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct WasteGases {
    pub applicable: bool,
    pub net_amount: f64,
    pub imported: f64,
    pub exported: f64,
    /// Energy content unit (TJ when empty).
    pub unit: String,
    /// Percent of the waste gas reused inside the process.
    pub reused_share: f64,
    pub emission_factor: f64,
    pub emission_factor_unit: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct IndirectElectricity {
    pub applicable: bool,
    pub consumption: f64,
    /// MWh when empty.
    pub unit: String,
    pub emission_factor: f64,
    /// tCO2/MWh when empty.
    pub emission_factor_unit: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct ElectricityExport {
    pub applicable: bool,
    pub exported_amount: f64,
    pub unit: String,
    pub emission_factor: f64,
    pub emission_factor_unit: String,
}

/// Contribution of each emission element, tCO2e.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct AttributionBreakdown {
    pub direct: f64,
    pub heat: f64,
    pub waste_gases: f64,
    pub indirect: f64,
    pub export_credit: f64,
}

impl AttributionBreakdown {
    pub fn net(&self) -> f64 {
        self.direct + self.heat + self.waste_gases + self.indirect - self.export_credit
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductionProcess {
    pub id: String,
    pub name: String,
    pub production_amount: f64,
    pub production_unit: String,
    /// Part of the production amount placed on the market.
    pub produced_for_market: f64,
    /// Percent.
    pub market_share: f64,
    pub direct: DirectEmissions,
    pub measurable_heat: MeasurableHeat,
    pub waste_gases: WasteGases,
    pub indirect_electricity: IndirectElectricity,
    pub electricity_export: ElectricityExport,
    pub matrix: InputOutputMatrix,

    pub breakdown: AttributionBreakdown,
    pub net_attributed_emissions: f64,
    pub specific_embedded_emissions: f64,
    pub validation: ValidationStatus,
}

impl ProductionProcess {
    pub fn label(&self) -> String {
        if self.name.trim().is_empty() {
            format!("Process {}", self.id)
        } else {
            format!("Process '{}'", self.name.trim())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessTotals {
    pub net_attributed_emissions: f64,
    pub production_amount: f64,
    pub breakdown: AttributionBreakdown,
    pub process_count: u32,
    pub valid_process_count: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessCalculation {
    pub processes: Vec<ProductionProcess>,
    pub totals: ProcessTotals,
    pub validation: ValidationStatus,
    pub calculated_fields: Vec<String>,
}

/// Net + imported - exported, never below zero.
fn available(net: f64, imported: f64, exported: f64) -> f64 {
    (net + imported - exported).max(0.0)
}

fn heat(block: &MeasurableHeat, status: &mut ValidationStatus) -> f64 {
    if !block.applicable {
        return 0.0;
    }
    let unit = |v: f64| units::heat_to_tj(v, &block.unit);
    let amounts = [unit(block.net_amount), unit(block.imported), unit(block.exported)];
    warn_unsupported(status, amounts[0], "heat", &block.unit, "TJ");
    let ef = units::emission_factor_to_t_per_tj(block.emission_factor, &block.emission_factor_unit);
    warn_unsupported(status, ef, "heat emission factor", &block.emission_factor_unit, "tCO2/TJ");

    let share = block.share.unwrap_or(100.0);
    available(amounts[0].value, amounts[1].value, amounts[2].value) * ef.value * share / 100.0
}

fn waste_gases(block: &WasteGases, status: &mut ValidationStatus) -> f64 {
    if !block.applicable {
        return 0.0;
    }
    let unit = |v: f64| units::heat_to_tj(v, &block.unit);
    let amounts = [unit(block.net_amount), unit(block.imported), unit(block.exported)];
    warn_unsupported(status, amounts[0], "waste gas", &block.unit, "TJ");
    let ef = units::emission_factor_to_t_per_tj(block.emission_factor, &block.emission_factor_unit);
    warn_unsupported(
        status,
        ef,
        "waste gas emission factor",
        &block.emission_factor_unit,
        "tCO2/TJ",
    );

    available(amounts[0].value, amounts[1].value, amounts[2].value)
        * (1.0 - block.reused_share / 100.0)
        * ef.value
}

fn electricity(
    applicable: bool,
    amount: f64,
    unit: &str,
    factor: f64,
    factor_unit: &str,
    status: &mut ValidationStatus,
) -> f64 {
    if !applicable {
        return 0.0;
    }
    let mwh = units::electricity_to_mwh(amount, unit);
    warn_unsupported(status, mwh, "electricity", unit, "MWh");
    let ef = units::electricity_factor_to_t_per_mwh(factor, factor_unit);
    warn_unsupported(status, ef, "electricity emission factor", factor_unit, "tCO2/MWh");
    mwh.value * ef.value
}

fn attribute(
    process: &ProductionProcess,
    status: &mut ValidationStatus,
) -> Result<AttributionBreakdown, CalculationError> {
    let direct = if process.direct.applicable {
        process.direct.amount
    } else {
        0.0
    };
    let indirect = &process.indirect_electricity;
    let export = &process.electricity_export;

    let breakdown = AttributionBreakdown {
        direct: ensure_finite("direct emissions", direct)?,
        heat: ensure_finite("measurable heat emissions", heat(&process.measurable_heat, status))?,
        waste_gases: ensure_finite(
            "waste gas emissions",
            waste_gases(&process.waste_gases, status),
        )?,
        indirect: ensure_finite(
            "indirect emissions",
            electricity(
                indirect.applicable,
                indirect.consumption,
                &indirect.unit,
                indirect.emission_factor,
                &indirect.emission_factor_unit,
                status,
            ),
        )?,
        export_credit: ensure_finite(
            "electricity export credit",
            electricity(
                export.applicable,
                export.exported_amount,
                &export.unit,
                export.emission_factor,
                &export.emission_factor_unit,
                status,
            ),
        )?,
    };
    ensure_finite("net attributed emissions", breakdown.net())?;
    Ok(breakdown)
}

fn validate_process(process: &ProductionProcess, status: &mut ValidationStatus) {
    if process.name.trim().is_empty() {
        status.error("name is required");
    }
    require_non_negative(status, "production amount", process.production_amount);
    require_non_negative(status, "amount produced for market", process.produced_for_market);
    require_percentage(status, "market share", process.market_share);
    if process.produced_for_market > process.production_amount {
        status.warning("amount produced for market exceeds the production amount");
    }

    if process.direct.applicable {
        require_non_negative(status, "direct emissions", process.direct.amount);
    }

    let heat = &process.measurable_heat;
    if heat.applicable {
        require_non_negative(status, "imported heat", heat.imported);
        require_non_negative(status, "exported heat", heat.exported);
        require_non_negative(status, "heat emission factor", heat.emission_factor);
        if let Some(share) = heat.share {
            require_percentage(status, "heat share", share);
        }
        if heat.exported > heat.net_amount + heat.imported {
            status.warning("exported heat exceeds net plus imported heat");
        }
    }

    let gas = &process.waste_gases;
    if gas.applicable {
        require_non_negative(status, "imported waste gas", gas.imported);
        require_non_negative(status, "exported waste gas", gas.exported);
        require_non_negative(status, "waste gas emission factor", gas.emission_factor);
        require_percentage(status, "reused waste gas share", gas.reused_share);
        if gas.exported > gas.net_amount + gas.imported {
            status.warning("exported waste gas exceeds net plus imported waste gas");
        }
    }

    let indirect = &process.indirect_electricity;
    if indirect.applicable {
        require_non_negative(status, "electricity consumption", indirect.consumption);
        require_non_negative(status, "electricity emission factor", indirect.emission_factor);
    }

    let export = &process.electricity_export;
    if export.applicable {
        require_non_negative(status, "exported electricity", export.exported_amount);
        require_non_negative(
            status,
            "exported electricity emission factor",
            export.emission_factor,
        );
    }

    let any_applicable = process.direct.applicable
        || heat.applicable
        || gas.applicable
        || indirect.applicable
        || export.applicable;
    if !any_applicable {
        status.info("no emission element is applicable");
    }
}

fn completeness(process: &ProductionProcess) -> CompletenessTally {
    let mut tally = CompletenessTally::default();
    tally.check(!process.name.trim().is_empty());
    tally.check(process.production_amount > 0.0);
    tally.check(!process.production_unit.trim().is_empty());
    if process.direct.applicable {
        tally.check(process.direct.amount > 0.0);
    }
    if process.measurable_heat.applicable {
        tally.check(process.measurable_heat.emission_factor > 0.0);
    }
    if process.waste_gases.applicable {
        tally.check(process.waste_gases.emission_factor > 0.0);
    }
    if process.indirect_electricity.applicable {
        tally.check(process.indirect_electricity.consumption > 0.0);
        tally.check(process.indirect_electricity.emission_factor > 0.0);
    }
    if process.electricity_export.applicable {
        tally.check(process.electricity_export.emission_factor > 0.0);
    }
    tally
}

/// Specific embedded emissions, 0 when nothing was produced.
pub fn specific_embedded_emissions(net: f64, production_amount: f64) -> f64 {
    if production_amount > 0.0 {
        net / production_amount
    } else {
        0.0
    }
}

/// Recomputes one process. `known_ids` holds every process id in the
/// installation so matrix references can be checked.
pub fn calculate_process(
    process: &ProductionProcess,
    known_ids: &HashSet<&str>,
) -> ProductionProcess {
    let mut out = process.clone();
    let mut status = ValidationStatus::new();
    validate_process(process, &mut status);
    process.matrix.validate(process.id.trim(), known_ids, &mut status);

    match attribute(process, &mut status) {
        Ok(breakdown) => {
            out.breakdown = breakdown;
            out.net_attributed_emissions = breakdown.net();
            out.specific_embedded_emissions =
                specific_embedded_emissions(out.net_attributed_emissions, process.production_amount);
        }
        Err(err) => {
            warn!(process = %process.id, error = %err, "process attribution failed");
            out.breakdown = AttributionBreakdown::default();
            out.net_attributed_emissions = 0.0;
            out.specific_embedded_emissions = 0.0;
            status.error(err.to_string());
        }
    }

    out.validation = status.with_completeness(completeness(process).percent());
    out
}

/// Calculates section D for every process.
pub fn calculate(processes: &[ProductionProcess]) -> ProcessCalculation {
    let known_ids: HashSet<&str> = processes.iter().map(|p| p.id.trim()).collect();
    let mut validation = ValidationStatus::new();
    let mut tally = CompletenessTally::default();
    let mut totals = ProcessTotals::default();
    let mut calculated_fields = Vec::new();

    let mut seen = HashSet::new();
    for process in processes {
        if !process.id.trim().is_empty() && !seen.insert(process.id.trim()) {
            validation.warning(format!("duplicate process id '{}'", process.id.trim()));
        }
    }

    let processes: Vec<ProductionProcess> = processes
        .iter()
        .map(|p| calculate_process(p, &known_ids))
        .collect();

    for process in &processes {
        tally.merge(completeness(process));
        validation.absorb(&process.label(), &process.validation);

        totals.process_count += 1;
        if process.validation.is_valid {
            totals.valid_process_count += 1;
        }
        totals.net_attributed_emissions += process.net_attributed_emissions;
        totals.production_amount += process.production_amount;
        totals.breakdown.direct += process.breakdown.direct;
        totals.breakdown.heat += process.breakdown.heat;
        totals.breakdown.waste_gases += process.breakdown.waste_gases;
        totals.breakdown.indirect += process.breakdown.indirect;
        totals.breakdown.export_credit += process.breakdown.export_credit;

        calculated_fields.extend(
            ["breakdown", "netAttributedEmissions", "specificEmbeddedEmissions"]
                .iter()
                .map(|f| format!("processes.{}.{}", process.id, f)),
        );
    }
    validation.completeness = tally.percent();

    debug!(
        processes = processes.len(),
        net = totals.net_attributed_emissions,
        errors = validation.errors.len(),
        "calculated processes"
    );

    ProcessCalculation {
        processes,
        totals,
        validation,
        calculated_fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steel_process() -> ProductionProcess {
        ProductionProcess {
            id: "p1".to_string(),
            name: "Electric arc furnace".to_string(),
            production_amount: 1000.0,
            production_unit: "t".to_string(),
            direct: DirectEmissions {
                applicable: true,
                amount: 500.0,
                unit: "tCO2e".to_string(),
            },
            measurable_heat: MeasurableHeat {
                applicable: true,
                net_amount: 10.0,
                imported: 5.0,
                exported: 3.0,
                unit: "TJ".to_string(),
                emission_factor: 56.1,
                emission_factor_unit: "tCO2/TJ".to_string(),
                share: None,
            },
            indirect_electricity: IndirectElectricity {
                applicable: true,
                consumption: 400_000.0,
                unit: "kWh".to_string(),
                emission_factor: 0.4,
                emission_factor_unit: "tCO2/MWh".to_string(),
            },
            electricity_export: ElectricityExport {
                applicable: true,
                exported_amount: 100.0,
                unit: "MWh".to_string(),
                emission_factor: 0.4,
                emission_factor_unit: "tCO2/MWh".to_string(),
            },
            ..Default::default()
        }
    }

    fn calc(process: &ProductionProcess) -> ProductionProcess {
        let ids: HashSet<&str> = [process.id.as_str()].into_iter().collect();
        calculate_process(process, &ids)
    }

    #[test]
    fn test_attribution() {
        let out = calc(&steel_process());
        assert!((out.breakdown.heat - 12.0 * 56.1).abs() < 1e-9);
        assert!((out.breakdown.indirect - 160.0).abs() < 1e-9);
        assert!((out.breakdown.export_credit - 40.0).abs() < 1e-9);
        let net = 500.0 + 673.2 + 160.0 - 40.0;
        assert!((out.net_attributed_emissions - net).abs() < 1e-9);
        assert!((out.specific_embedded_emissions - net / 1000.0).abs() < 1e-12);
        assert!(out.validation.is_valid);
    }

    #[test]
    fn test_heat_share_and_clamp() {
        let mut process = steel_process();
        process.measurable_heat.share = Some(50.0);
        let out = calc(&process);
        assert!((out.breakdown.heat - 6.0 * 56.1).abs() < 1e-9);

        process.measurable_heat.exported = 40.0;
        let out = calc(&process);
        assert_eq!(out.breakdown.heat, 0.0);
        assert!(out
            .validation
            .warnings
            .iter()
            .any(|w| w.contains("exported heat")));
    }

    #[test]
    fn test_waste_gas_reuse() {
        let process = ProductionProcess {
            waste_gases: WasteGases {
                applicable: true,
                net_amount: 20.0,
                reused_share: 25.0,
                emission_factor: 100.0,
                ..Default::default()
            },
            ..steel_process()
        };
        let out = calc(&process);
        assert!((out.breakdown.waste_gases - 1500.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_applicable_blocks_contribute_nothing() {
        let mut process = steel_process();
        process.direct.applicable = false;
        process.measurable_heat.applicable = false;
        process.indirect_electricity.applicable = false;
        process.electricity_export.applicable = false;
        let out = calc(&process);
        assert_eq!(out.net_attributed_emissions, 0.0);
        assert_eq!(out.validation.infos.len(), 1);
    }

    #[test]
    fn test_zero_production_gives_zero_see() {
        let process = ProductionProcess {
            production_amount: 0.0,
            ..steel_process()
        };
        let out = calc(&process);
        assert!(out.net_attributed_emissions > 0.0);
        assert_eq!(out.specific_embedded_emissions, 0.0);
    }

    #[test]
    fn test_failing_process_does_not_block_siblings() {
        let broken = ProductionProcess {
            id: "p2".to_string(),
            name: "Broken".to_string(),
            direct: DirectEmissions {
                applicable: true,
                amount: f64::INFINITY,
                unit: String::new(),
            },
            ..Default::default()
        };
        let result = calculate(&[steel_process(), broken]);
        assert!(result.processes[0].validation.is_valid);
        assert!(!result.processes[1].validation.is_valid);
        assert_eq!(result.processes[1].net_attributed_emissions, 0.0);
        assert_eq!(result.totals.valid_process_count, 1);
        assert_eq!(
            result.totals.net_attributed_emissions,
            result.processes[0].net_attributed_emissions
        );
    }

    #[test]
    fn test_negative_production_is_error() {
        let process = ProductionProcess {
            production_amount: -1.0,
            ..steel_process()
        };
        assert!(!calc(&process).validation.is_valid);
    }

    #[test]
    fn test_duplicate_ids_warn() {
        let result = calculate(&[steel_process(), steel_process()]);
        assert!(result
            .validation
            .warnings
            .iter()
            .any(|w| w.contains("duplicate process id")));
    }

    #[test]
    fn test_recalculation_is_fixed_point() {
        let first = calculate(&[steel_process()]);
        let second = calculate(&first.processes);
        assert_eq!(first, second);
    }
}
