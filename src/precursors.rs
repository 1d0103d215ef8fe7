//! Purchased precursors (section E).
//!
//! A purchased precursor carries the embedded emissions its supplier reported.
//! The engine resolves indirect emissions, derives specific values per tonne,
//! scores how completely each entry is filled in, and checks the quantities
//! allocated to each process against the external consumption recorded in the
//! process input/output matrices.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::CalculationConfig;
use crate::error::{ensure_finite, CalculationError};
use crate::processes::ProductionProcess;
use crate::units::{self, UnitFamily};
use crate::validation::{
    cross_check, relative_difference_percent, require_non_negative, CrossCheck, DataQuality,
    ValidationStatus, VerificationStatus,
};

const POINTS_NAME: f64 = 15.0;
const POINTS_QUANTITY: f64 = 20.0;
const POINTS_SUPPLIER_NAME: f64 = 10.0;
const POINTS_SUPPLIER_INSTALLATION: f64 = 10.0;
const POINTS_DIRECT: f64 = 20.0;
const POINTS_INDIRECT: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct SupplierIdentity {
    pub name: String,
    pub installation_id: String,
    pub country_code: String,
}

/// Quantity of a precursor consumed by one process, in the precursor's unit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessAllocation {
    pub process_id: String,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct PurchasedPrecursor {
    pub id: String,
    pub name: String,
    pub cn_code: String,
    pub total_quantity: f64,
    pub unit: String,
    /// Part of the quantity used for goods outside the scheme.
    pub non_cbam_quantity: f64,
    pub supplier: SupplierIdentity,
    pub production_route: String,
    /// tCO2e over the whole quantity.
    pub direct_embedded_emissions: f64,
    /// tCO2e over the whole quantity; derived from electricity when absent.
    pub indirect_embedded_emissions: Option<f64>,
    /// MWh.
    pub electricity_consumption: Option<f64>,
    /// tCO2/MWh.
    pub electricity_emission_factor: Option<f64>,
    pub electricity_factor_source: String,
    pub uses_default_values: bool,
    pub default_value_justification: String,
    pub allocations: Vec<ProcessAllocation>,
    pub data_quality: DataQuality,
    pub verification_status: VerificationStatus,

    pub resolved_indirect_emissions: f64,
    pub total_embedded_emissions: f64,
    pub specific_direct_emissions: f64,
    pub specific_indirect_emissions: f64,
    pub total_specific_embedded_emissions: f64,
    pub completeness_score: f64,
    pub completeness_label: DataQuality,
    pub validation: ValidationStatus,
}

impl PurchasedPrecursor {
    pub fn label(&self) -> String {
        if self.name.trim().is_empty() {
            format!("Precursor {}", self.id)
        } else {
            format!("Precursor '{}'", self.name.trim())
        }
    }

    /// Electricity-derived indirect emissions, when both inputs are present.
    pub fn electricity_indirect(&self) -> Option<f64> {
        Some(self.electricity_consumption? * self.electricity_emission_factor?)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct PrecursorSummary {
    pub total_quantity: f64,
    pub total_direct_emissions: f64,
    pub total_indirect_emissions: f64,
    pub total_embedded_emissions: f64,
    pub precursor_count: u32,
    pub verified_count: u32,
    pub default_values_count: u32,
    pub average_completeness: f64,
    pub overall_quality: DataQuality,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct PrecursorCalculation {
    pub precursors: Vec<PurchasedPrecursor>,
    pub summary: PrecursorSummary,
    pub cross_checks: Vec<CrossCheck>,
    pub validation: ValidationStatus,
    pub calculated_fields: Vec<String>,
}

/// Weighted completeness points; the weights add up to 95.
pub fn completeness_score(precursor: &PurchasedPrecursor) -> f64 {
    let mut score = 0.0;
    if !precursor.name.trim().is_empty() {
        score += POINTS_NAME;
    }
    if precursor.total_quantity > 0.0 {
        score += POINTS_QUANTITY;
    }
    if !precursor.supplier.name.trim().is_empty() {
        score += POINTS_SUPPLIER_NAME;
    }
    if !precursor.supplier.installation_id.trim().is_empty() {
        score += POINTS_SUPPLIER_INSTALLATION;
    }
    if precursor.direct_embedded_emissions > 0.0 {
        score += POINTS_DIRECT;
    }
    if precursor.indirect_embedded_emissions.is_some() || precursor.electricity_indirect().is_some()
    {
        score += POINTS_INDIRECT;
    }
    score
}

fn per_tonne(total: f64, quantity: f64) -> f64 {
    if quantity > 0.0 {
        total / quantity
    } else {
        0.0
    }
}

struct Embedded {
    indirect: f64,
    total: f64,
    specific_direct: f64,
    specific_indirect: f64,
    specific_total: f64,
}

fn embedded(precursor: &PurchasedPrecursor) -> Result<Embedded, CalculationError> {
    let indirect = precursor
        .indirect_embedded_emissions
        .or_else(|| precursor.electricity_indirect())
        .unwrap_or(0.0);
    let indirect = ensure_finite("indirect embedded emissions", indirect)?;
    let direct = precursor.direct_embedded_emissions;
    let total = ensure_finite("total embedded emissions", direct + indirect)?;
    let quantity = precursor.total_quantity;

    Ok(Embedded {
        indirect,
        total,
        specific_direct: ensure_finite("specific direct emissions", per_tonne(direct, quantity))?,
        specific_indirect: ensure_finite(
            "specific indirect emissions",
            per_tonne(indirect, quantity),
        )?,
        specific_total: ensure_finite("specific embedded emissions", per_tonne(total, quantity))?,
    })
}

fn validate_precursor(precursor: &PurchasedPrecursor, status: &mut ValidationStatus) {
    if precursor.name.trim().is_empty() {
        status.error("name is required");
    }
    require_non_negative(status, "total quantity", precursor.total_quantity);
    require_non_negative(status, "non-CBAM quantity", precursor.non_cbam_quantity);
    require_non_negative(status, "direct embedded emissions", precursor.direct_embedded_emissions);
    if let Some(v) = precursor.indirect_embedded_emissions {
        require_non_negative(status, "indirect embedded emissions", v);
    }
    if let Some(v) = precursor.electricity_consumption {
        require_non_negative(status, "electricity consumption", v);
    }
    if let Some(v) = precursor.electricity_emission_factor {
        require_non_negative(status, "electricity emission factor", v);
    }
    if precursor.non_cbam_quantity > precursor.total_quantity {
        status.error(format!(
            "non-CBAM quantity {} exceeds total quantity {}",
            precursor.non_cbam_quantity, precursor.total_quantity
        ));
    }
    if precursor.total_quantity == 0.0 && !precursor.name.trim().is_empty() {
        status.warning("total quantity is zero, specific emissions are reported as 0");
    }
    if precursor.uses_default_values && precursor.default_value_justification.trim().is_empty() {
        status.warning("default values are used without a justification");
    }
    if precursor.data_quality.is_poor() {
        status.info(format!("data quality is {}", precursor.data_quality.label()));
    }
    for (i, allocation) in precursor.allocations.iter().enumerate() {
        require_non_negative(
            status,
            &format!("allocation {} quantity", i + 1),
            allocation.quantity,
        );
    }
}

/// Recomputes one precursor's derived fields.
pub fn calculate_precursor(precursor: &PurchasedPrecursor) -> PurchasedPrecursor {
    let mut out = precursor.clone();
    let mut status = ValidationStatus::new();
    validate_precursor(precursor, &mut status);

    match embedded(precursor) {
        Ok(e) => {
            out.resolved_indirect_emissions = e.indirect;
            out.total_embedded_emissions = e.total;
            out.specific_direct_emissions = e.specific_direct;
            out.specific_indirect_emissions = e.specific_indirect;
            out.total_specific_embedded_emissions = e.specific_total;
        }
        Err(err) => {
            warn!(precursor = %precursor.id, error = %err, "precursor calculation failed");
            out.resolved_indirect_emissions = 0.0;
            out.total_embedded_emissions = 0.0;
            out.specific_direct_emissions = 0.0;
            out.specific_indirect_emissions = 0.0;
            out.total_specific_embedded_emissions = 0.0;
            status.error(err.to_string());
        }
    }

    out.completeness_score = completeness_score(precursor);
    out.completeness_label = DataQuality::from_score(out.completeness_score);
    out.validation = status.with_completeness(out.completeness_score);
    out
}

/// Converts a quantity to tonnes, or records why it cannot be.
fn tonnes(value: f64, unit: &str, what: &str, status: &mut ValidationStatus) -> Option<f64> {
    let converted = units::mass_to_tonnes(value, unit);
    if converted.supported {
        return Some(converted.value);
    }
    match units::unit_family(unit) {
        UnitFamily::Volume => status.warning(format!(
            "{what}: unit '{}' needs a density to compare in tonnes",
            unit.trim()
        )),
        UnitFamily::Count => status.warning(format!(
            "{what}: unit '{}' needs a unit mass to compare in tonnes",
            unit.trim()
        )),
        _ => status.warning(format!("{what}: unrecognized unit '{}'", unit.trim())),
    }
    None
}

/// Compares E allocations with D external consumption, one check per
/// (precursor, process) pair.
fn cross_validate(
    precursor: &PurchasedPrecursor,
    processes: &[ProductionProcess],
    config: &CalculationConfig,
    status: &mut ValidationStatus,
) -> Vec<CrossCheck> {
    let mut checks = Vec::new();
    let label = precursor.label();

    for allocation in &precursor.allocations {
        let process_id = allocation.process_id.trim();
        let pair = format!("{label} in process {process_id}");
        let Some(process) = processes.iter().find(|p| p.id.trim() == process_id) else {
            status.warning(format!("{pair}: process not found in section D"));
            continue;
        };
        let rows: Vec<_> = process
            .matrix
            .external_consumption(&precursor.id, &precursor.name)
            .collect();
        if rows.is_empty() {
            status.warning(format!(
                "{pair}: no external consumption recorded in section D"
            ));
            continue;
        }

        let Some(allocated) = tonnes(allocation.quantity, &precursor.unit, &pair, status) else {
            continue;
        };
        let mut consumed = 0.0;
        let mut comparable = true;
        for row in rows {
            match tonnes(row.amount, &row.unit, &pair, status) {
                Some(t) => consumed += t,
                None => comparable = false,
            }
        }
        if comparable {
            checks.push(cross_check(
                status,
                &pair,
                allocated,
                consumed,
                &config.precursor_band,
            ));
        }
    }

    if !precursor.allocations.is_empty() && precursor.total_quantity > 0.0 {
        let allocated: f64 = precursor.allocations.iter().map(|a| a.quantity).sum();
        if let Some(d) = relative_difference_percent(allocated, precursor.total_quantity) {
            if d > config.allocation_tolerance_percent {
                status.warning(format!(
                    "{label}: allocations add up to {allocated} but the total quantity is {} ({d:.1}% apart)",
                    precursor.total_quantity
                ));
            }
        }
    }

    checks
}

fn summarize(precursors: &[PurchasedPrecursor]) -> PrecursorSummary {
    let mut summary = PrecursorSummary::default();
    let mut completeness = 0.0;
    for p in precursors {
        summary.total_quantity += p.total_quantity;
        summary.total_direct_emissions += p.direct_embedded_emissions;
        summary.total_indirect_emissions += p.resolved_indirect_emissions;
        summary.total_embedded_emissions += p.total_embedded_emissions;
        summary.precursor_count += 1;
        if p.verification_status == VerificationStatus::Verified {
            summary.verified_count += 1;
        }
        if p.uses_default_values {
            summary.default_values_count += 1;
        }
        completeness += p.completeness_score;
    }
    if !precursors.is_empty() {
        summary.average_completeness = completeness / precursors.len() as f64;
    }
    summary.overall_quality = DataQuality::from_score(summary.average_completeness);
    summary
}

/// Calculates section E. Cross-validation runs only when `processes` is
/// given.
pub fn calculate(
    precursors: &[PurchasedPrecursor],
    processes: Option<&[ProductionProcess]>,
    config: &CalculationConfig,
) -> PrecursorCalculation {
    let mut validation = ValidationStatus::new();
    let mut cross_checks = Vec::new();
    let mut calculated_fields = Vec::new();

    let precursors: Vec<PurchasedPrecursor> =
        precursors.iter().map(calculate_precursor).collect();

    for precursor in &precursors {
        validation.absorb(&precursor.label(), &precursor.validation);
        if let Some(processes) = processes {
            cross_checks.extend(cross_validate(precursor, processes, config, &mut validation));
        }
        calculated_fields.extend(
            [
                "resolvedIndirectEmissions",
                "totalEmbeddedEmissions",
                "totalSpecificEmbeddedEmissions",
                "completenessScore",
            ]
            .iter()
            .map(|f| format!("precursors.{}.{}", precursor.id, f)),
        );
    }

    let summary = summarize(&precursors);
    validation.completeness = if precursors.is_empty() {
        100.0
    } else {
        summary.average_completeness
    };

    debug!(
        precursors = precursors.len(),
        checks = cross_checks.len(),
        embedded = summary.total_embedded_emissions,
        errors = validation.errors.len(),
        "calculated purchased precursors"
    );

    PrecursorCalculation {
        precursors,
        summary,
        cross_checks,
        validation,
        calculated_fields,
    }
}
