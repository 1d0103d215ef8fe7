//! Fuel and GHG balance (section C) and its cross-checks against section B.
//!
//! Every balance field carries its own override state. Automatic fields are
//! owned by the engine: totals are re-derived from their components and,
//! when enabled, zero components are seeded from the source-stream totals.
//! Manual fields are never touched.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CalculationConfig;
use crate::source_streams::SourceStreamTotals;
use crate::validation::{
    cross_check, relative_difference_percent, CompletenessTally, CrossCheck, ValidationStatus,
};

/// A balance value together with who owns it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, uniffi::Enum)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum FieldValue {
    Auto { value: f64 },
    Manual { value: f64 },
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Auto { value: 0.0 }
    }
}

impl FieldValue {
    pub fn auto(value: f64) -> Self {
        FieldValue::Auto { value }
    }

    pub fn manual(value: f64) -> Self {
        FieldValue::Manual { value }
    }

    pub fn value(&self) -> f64 {
        match self {
            FieldValue::Auto { value } | FieldValue::Manual { value } => *value,
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, FieldValue::Manual { .. })
    }

    pub fn mode_label(&self) -> &'static str {
        match self {
            FieldValue::Auto { .. } => "Auto",
            FieldValue::Manual { .. } => "Manual",
        }
    }

    /// Replaces the value of an automatic field; manual fields are kept.
    fn derive(&mut self, value: f64) {
        if let FieldValue::Auto { value: v } = self {
            *v = value;
        }
    }
}

/// Fuel input balance in TJ.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct FuelBalance {
    pub direct_cbam_goods: FieldValue,
    pub for_electricity: FieldValue,
    pub direct_non_cbam: FieldValue,
    pub total_fuel_input: FieldValue,
}

/// GHG balance in tCO2e.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct GhgBalance {
    pub co2: FieldValue,
    pub biomass_co2: FieldValue,
    pub n2o: FieldValue,
    pub pfc: FieldValue,
    pub total_direct: FieldValue,
    pub total_indirect: FieldValue,
    pub total_emissions: FieldValue,
}

impl FuelBalance {
    pub fn fields(&self) -> [(&'static str, FieldValue); 4] {
        [
            ("directCbamGoods", self.direct_cbam_goods),
            ("forElectricity", self.for_electricity),
            ("directNonCbam", self.direct_non_cbam),
            ("totalFuelInput", self.total_fuel_input),
        ]
    }
}

impl GhgBalance {
    pub fn fields(&self) -> [(&'static str, FieldValue); 7] {
        [
            ("co2", self.co2),
            ("biomassCo2", self.biomass_co2),
            ("n2o", self.n2o),
            ("pfc", self.pfc),
            ("totalDirect", self.total_direct),
            ("totalIndirect", self.total_indirect),
            ("totalEmissions", self.total_emissions),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct BalanceCalculation {
    pub fuel_balance: FuelBalance,
    pub ghg_balance: GhgBalance,
    pub cross_checks: Vec<CrossCheck>,
    /// tCO2e/TJ, when both direct emissions and fuel input are positive.
    pub implied_emission_factor: Option<f64>,
    pub validation: ValidationStatus,
    pub calculated_fields: Vec<String>,
}

/// Seeds an automatic field that is still zero. Returns whether the engine
/// owns the field.
fn seed(field: &mut FieldValue, value: f64) -> bool {
    match field {
        FieldValue::Auto { value: v } => {
            if *v == 0.0 {
                *v = value;
            }
            true
        }
        FieldValue::Manual { .. } => false,
    }
}

fn check_manual_total(
    status: &mut ValidationStatus,
    name: &str,
    total: FieldValue,
    components: f64,
    tolerance_percent: f64,
) {
    if !total.is_manual() {
        return;
    }
    let differs = match relative_difference_percent(total.value(), components) {
        Some(d) => d > tolerance_percent,
        None => total.value() != 0.0 && components == 0.0,
    };
    if differs {
        status.warning(format!(
            "manual {name} {:.3} differs from the sum of its components {:.3}",
            total.value(),
            components
        ));
    }
}

/// Calculates section C. `streams` is `None` when section B has not been
/// filled, in which case seeding and cross-checks are skipped.
pub fn calculate(
    fuel: &FuelBalance,
    ghg: &GhgBalance,
    streams: Option<&SourceStreamTotals>,
    config: &CalculationConfig,
) -> BalanceCalculation {
    let mut fuel = *fuel;
    let mut ghg = *ghg;
    let mut validation = ValidationStatus::new();
    let mut calculated_fields = Vec::new();

    if let (true, Some(b)) = (config.import_balance_from_streams, streams) {
        let seeded = [
            ("fuelBalance.directCbamGoods", seed(&mut fuel.direct_cbam_goods, b.total_energy_content)),
            ("ghgBalance.co2", seed(&mut ghg.co2, b.fossil_co2())),
            ("ghgBalance.biomassCo2", seed(&mut ghg.biomass_co2, b.total_biomass_co2e())),
            ("ghgBalance.n2o", seed(&mut ghg.n2o, b.measured_n2o_co2e)),
            ("ghgBalance.pfc", seed(&mut ghg.pfc, b.pfc_co2e)),
        ];
        calculated_fields.extend(
            seeded
                .iter()
                .filter(|(_, owned)| *owned)
                .map(|(name, _)| name.to_string()),
        );
    }

    let fuel_components =
        fuel.direct_cbam_goods.value() + fuel.for_electricity.value() + fuel.direct_non_cbam.value();
    fuel.total_fuel_input.derive(fuel_components);
    check_manual_total(
        &mut validation,
        "total fuel input",
        fuel.total_fuel_input,
        fuel_components,
        config.manual_total_tolerance_percent,
    );

    let direct_components = ghg.co2.value() + ghg.n2o.value() + ghg.pfc.value();
    ghg.total_direct.derive(direct_components);
    check_manual_total(
        &mut validation,
        "total direct emissions",
        ghg.total_direct,
        direct_components,
        config.manual_total_tolerance_percent,
    );

    let total_components = ghg.total_direct.value() + ghg.total_indirect.value();
    ghg.total_emissions.derive(total_components);
    check_manual_total(
        &mut validation,
        "total emissions",
        ghg.total_emissions,
        total_components,
        config.manual_total_tolerance_percent,
    );

    for (name, field) in [
        ("fuelBalance.totalFuelInput", fuel.total_fuel_input),
        ("ghgBalance.totalDirect", ghg.total_direct),
        ("ghgBalance.totalEmissions", ghg.total_emissions),
    ] {
        if !field.is_manual() {
            calculated_fields.push(name.to_string());
        }
    }

    for (name, field) in fuel.fields().iter().chain(ghg.fields().iter()) {
        if field.value() < 0.0 {
            validation.error(format!("{name} must not be negative"));
        }
    }
    let mut cross_checks = Vec::new();
    if let Some(b) = streams {
        cross_checks.push(cross_check(
            &mut validation,
            "Direct emissions vs source streams",
            ghg.total_direct.value(),
            b.total_co2e,
            &config.direct_band,
        ));
        cross_checks.push(cross_check(
            &mut validation,
            "Biomass emissions vs source streams",
            ghg.biomass_co2.value(),
            b.total_biomass_co2e(),
            &config.biomass_band,
        ));
        cross_checks.push(cross_check(
            &mut validation,
            "Fuel input vs source stream energy content",
            fuel.total_fuel_input.value(),
            b.total_energy_content,
            &config.fuel_band,
        ));
        cross_checks.push(cross_check(
            &mut validation,
            "Total emissions vs source streams",
            ghg.total_emissions.value(),
            b.total_co2e,
            &config.total_band,
        ));
    }

    let fuel_input = fuel.total_fuel_input.value();
    let direct = ghg.total_direct.value();
    let implied_emission_factor = (fuel_input > 0.0 && direct > 0.0).then(|| direct / fuel_input);
    if let Some(ef) = implied_emission_factor {
        if ef < config.implied_factor_min || ef > config.implied_factor_max {
            validation.warning(format!(
                "implied emission factor {ef:.1} tCO2e/TJ is outside the plausible range {}-{}",
                config.implied_factor_min, config.implied_factor_max
            ));
        }
    }

    let mut tally = CompletenessTally::default();
    tally.check(fuel_input > 0.0);
    tally.check(ghg.co2.value() > 0.0);
    tally.check(direct > 0.0);
    tally.check(ghg.total_emissions.value() > 0.0);
    validation.completeness = tally.percent();

    debug!(
        total_direct = direct,
        total_fuel_input = fuel_input,
        checks = cross_checks.len(),
        errors = validation.errors.len(),
        "calculated balance"
    );

    BalanceCalculation {
        fuel_balance: fuel,
        ghg_balance: ghg,
        cross_checks,
        implied_emission_factor,
        validation,
        calculated_fields,
    }
}
