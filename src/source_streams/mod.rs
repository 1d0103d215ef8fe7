//! Source-stream emissions (section B of the template).
//!
//! Each stream is calculated on its own: a failure is recorded on that
//! stream and the remaining streams, PFC sources and measurement sources
//! still contribute to the totals.

pub mod measurement;
pub mod pfc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::CalculationConfig;
use crate::error::{ensure_finite, require_input, CalculationError};
use crate::units;
use crate::validation::{
    require_non_negative, require_percentage, warn_unsupported, CompletenessTally,
    ValidationStatus,
};

pub use measurement::{calculate_measurement_source, MeasuredGas, MeasurementSource};
pub use pfc::{calculate_pfc_source, PfcMethod, PfcSource};

/// Monitoring methodology of a source stream.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, uniffi::Enum,
)]
#[serde(rename_all = "camelCase")]
pub enum CalculationMethod {
    #[default]
    Combustion,
    Process,
    MassBalance,
    Pfc,
}

impl CalculationMethod {
    pub fn label(&self) -> &'static str {
        match self {
            CalculationMethod::Combustion => "Combustion",
            CalculationMethod::Process => "Process emissions",
            CalculationMethod::MassBalance => "Mass balance",
            CalculationMethod::Pfc => "PFC",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        let key: String = text
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "combustion" => Some(CalculationMethod::Combustion),
            "process" | "processemissions" => Some(CalculationMethod::Process),
            "massbalance" => Some(CalculationMethod::MassBalance),
            "pfc" | "pfcemissions" => Some(CalculationMethod::Pfc),
            _ => None,
        }
    }
}

/// A fuel, material or process flow accounted for with the calculation approach.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceStream {
    pub id: String,
    pub name: String,
    pub method: CalculationMethod,
    pub activity_data: f64,
    pub activity_data_unit: String,
    pub net_calorific_value: Option<f64>,
    pub ncv_unit: String,
    pub emission_factor: Option<f64>,
    pub emission_factor_unit: String,
    /// tC per tonne of material.
    pub carbon_content: Option<f64>,
    /// Percent, defaults to 100.
    pub oxidation_factor: Option<f64>,
    /// Percent, defaults to 100 (3.667 for mass balance).
    pub conversion_factor: Option<f64>,
    /// Percent of the stream's carbon that is biomass.
    pub biomass_content: f64,
    /// Percent of the biomass part that is not sustainable.
    pub non_sustainable_biomass_content: f64,
    /// Fraction, 0–1.
    pub uncertainty: Option<f64>,

    pub co2e_fossil: f64,
    pub co2e_biomass: f64,
    pub co2e_non_sustainable_biomass: f64,
    pub total_emissions: f64,
    /// TJ
    pub energy_content_fossil: f64,
    /// TJ
    pub energy_content_biomass: f64,
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl SourceStream {
    pub fn label(&self) -> String {
        if self.name.trim().is_empty() {
            format!("Source stream {}", self.id)
        } else {
            format!("Source stream '{}'", self.name.trim())
        }
    }

    /// Per-stream messages as a status, for folding into the section result.
    pub fn status(&self) -> ValidationStatus {
        ValidationStatus {
            is_valid: self.is_valid,
            errors: self.errors.clone(),
            warnings: self.warnings.clone(),
            ..ValidationStatus::default()
        }
    }

    fn clear_outputs(&mut self) {
        self.co2e_fossil = 0.0;
        self.co2e_biomass = 0.0;
        self.co2e_non_sustainable_biomass = 0.0;
        self.total_emissions = 0.0;
        self.energy_content_fossil = 0.0;
        self.energy_content_biomass = 0.0;
    }
}

/// Aggregates over all B-section sources.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceStreamTotals {
    pub fossil_co2e: f64,
    pub biomass_co2e: f64,
    pub non_sustainable_biomass_co2e: f64,
    /// Sum of stream totals (all three components).
    pub stream_co2e: f64,
    pub pfc_co2e: f64,
    pub measured_fossil_co2: f64,
    pub measured_biomass_co2: f64,
    pub measured_n2o_co2e: f64,
    /// Streams + PFC + measurement.
    pub total_co2e: f64,
    pub energy_content_fossil: f64,
    pub energy_content_biomass: f64,
    pub total_energy_content: f64,
    pub stream_count: u32,
    pub valid_stream_count: u32,
}

impl SourceStreamTotals {
    /// All biomass CO2 reported in section B.
    pub fn total_biomass_co2e(&self) -> f64 {
        self.biomass_co2e + self.measured_biomass_co2
    }

    /// Fossil CO2 (including non-sustainable biomass) from streams and measurement.
    pub fn fossil_co2(&self) -> f64 {
        self.fossil_co2e + self.non_sustainable_biomass_co2e + self.measured_fossil_co2
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceStreamCalculation {
    pub streams: Vec<SourceStream>,
    pub pfc_sources: Vec<PfcSource>,
    pub measurement_sources: Vec<MeasurementSource>,
    pub totals: SourceStreamTotals,
    pub validation: ValidationStatus,
    pub calculated_fields: Vec<String>,
}

const STREAM_OUTPUT_FIELDS: [&str; 6] = [
    "co2eFossil",
    "co2eBiomass",
    "co2eNonSustainableBiomass",
    "totalEmissions",
    "energyContentFossil",
    "energyContentBiomass",
];

/// Total CO2 and energy content (TJ) of a stream before the biomass split.
struct StreamResult {
    total: f64,
    energy_tj: f64,
}

/// Splits a stream total into (fossil, sustainable biomass, non-sustainable biomass).
pub fn split_by_biomass(
    total: f64,
    biomass_percent: f64,
    non_sustainable_percent: f64,
) -> (f64, f64, f64) {
    let biomass_part = total * biomass_percent / 100.0;
    let non_sustainable = biomass_part * non_sustainable_percent / 100.0;
    (total - biomass_part, biomass_part - non_sustainable, non_sustainable)
}

fn combustion(
    stream: &SourceStream,
    status: &mut ValidationStatus,
) -> Result<StreamResult, CalculationError> {
    let family = units::unit_family(&stream.activity_data_unit);
    let energy_tj = if family.is_compatible_with(units::UnitFamily::Energy) {
        // activity already expressed as energy, the calorific value is not needed
        units::heat_to_tj(stream.activity_data, &stream.activity_data_unit).value
    } else {
        let ad = units::mass_to_tonnes(stream.activity_data, &stream.activity_data_unit);
        warn_unsupported(status, ad, "activity data", &stream.activity_data_unit, "t");
        let ncv = require_input("net calorific value", stream.net_calorific_value)?;
        let ncv = units::calorific_value_to_tj_per_t(ncv, &stream.ncv_unit);
        warn_unsupported(status, ncv, "calorific value", &stream.ncv_unit, "GJ/t");
        ad.value * ncv.value
    };

    let ef = require_input("emission factor", stream.emission_factor)?;
    let ef = units::emission_factor_to_t_per_tj(ef, &stream.emission_factor_unit);
    warn_unsupported(status, ef, "emission factor", &stream.emission_factor_unit, "tCO2/TJ");

    let oxidation = stream.oxidation_factor.unwrap_or(100.0);
    let conversion = stream.conversion_factor.unwrap_or(100.0);
    let total = energy_tj * ef.value * oxidation / 100.0 * conversion / 100.0;

    Ok(StreamResult { total, energy_tj })
}

fn process(
    stream: &SourceStream,
    status: &mut ValidationStatus,
) -> Result<StreamResult, CalculationError> {
    let ef = require_input("emission factor", stream.emission_factor)?;
    let compatibility =
        units::check_compatibility(&stream.activity_data_unit, &stream.emission_factor_unit);
    if let Some(message) = compatibility.message {
        status.warning(message);
    }

    let total = if stream.emission_factor_unit.trim().is_empty() {
        stream.activity_data * ef
    } else {
        let activity = units::activity_in_factor_unit(
            stream.activity_data,
            &stream.activity_data_unit,
            &stream.emission_factor_unit,
        );
        let factor = units::factor_in_tonnes(ef, &stream.emission_factor_unit);
        warn_unsupported(
            status,
            factor,
            "emission factor",
            &stream.emission_factor_unit,
            "tCO2/t",
        );
        activity.value * factor.value
    };

    Ok(StreamResult {
        total,
        energy_tj: 0.0,
    })
}

fn mass_balance(
    stream: &SourceStream,
    config: &CalculationConfig,
    status: &mut ValidationStatus,
) -> Result<StreamResult, CalculationError> {
    let carbon = require_input("carbon content", stream.carbon_content)?;
    let ad = units::mass_to_tonnes(stream.activity_data, &stream.activity_data_unit);
    warn_unsupported(status, ad, "activity data", &stream.activity_data_unit, "t");
    let conversion = stream
        .conversion_factor
        .unwrap_or(config.default_mass_balance_conversion_factor);

    Ok(StreamResult {
        total: ad.value * carbon * conversion / 100.0,
        energy_tj: 0.0,
    })
}

fn validate_stream(stream: &SourceStream, status: &mut ValidationStatus) {
    if stream.name.trim().is_empty() {
        status.error("name is required");
    }
    require_non_negative(status, "activity data", stream.activity_data);
    if let Some(ncv) = stream.net_calorific_value {
        require_non_negative(status, "net calorific value", ncv);
    }
    if let Some(ef) = stream.emission_factor {
        require_non_negative(status, "emission factor", ef);
    }
    if let Some(carbon) = stream.carbon_content {
        require_non_negative(status, "carbon content", carbon);
    }
    if let Some(ox) = stream.oxidation_factor {
        require_percentage(status, "oxidation factor", ox);
    }
    if let Some(conv) = stream.conversion_factor {
        require_percentage(status, "conversion factor", conv);
    }
    require_percentage(status, "biomass content", stream.biomass_content);
    require_percentage(
        status,
        "non-sustainable biomass content",
        stream.non_sustainable_biomass_content,
    );
    if let Some(u) = stream.uncertainty {
        if !(0.0..=1.0).contains(&u) {
            status.error(format!("uncertainty must be between 0 and 1 (got {u})"));
        }
    }
}

/// Required-input tally for the stream's method.
fn stream_completeness(stream: &SourceStream) -> CompletenessTally {
    let mut tally = CompletenessTally::default();
    tally.check(!stream.name.trim().is_empty());
    tally.check(stream.activity_data > 0.0);
    match stream.method {
        CalculationMethod::Combustion => {
            tally.check(stream.net_calorific_value.is_some());
            tally.check(stream.emission_factor.is_some());
        }
        CalculationMethod::Process => tally.check(stream.emission_factor.is_some()),
        CalculationMethod::MassBalance => tally.check(stream.carbon_content.is_some()),
        CalculationMethod::Pfc => {}
    }
    tally
}

/// Recomputes one stream's derived fields from its inputs.
pub fn calculate_stream(stream: &SourceStream, config: &CalculationConfig) -> SourceStream {
    let mut out = stream.clone();
    let mut status = ValidationStatus::new();
    validate_stream(stream, &mut status);

    let result = match stream.method {
        CalculationMethod::Combustion => combustion(stream, &mut status),
        CalculationMethod::Process => process(stream, &mut status),
        CalculationMethod::MassBalance => mass_balance(stream, config, &mut status),
        CalculationMethod::Pfc => Err(CalculationError::DelegatedMethod(
            CalculationMethod::Pfc.label().to_string(),
        )),
    }
    .and_then(|r| {
        ensure_finite("total emissions", r.total)?;
        ensure_finite("energy content", r.energy_tj)?;
        Ok(r)
    });

    match result {
        Ok(r) => {
            let (fossil, biomass, non_sustainable) = split_by_biomass(
                r.total,
                stream.biomass_content,
                stream.non_sustainable_biomass_content,
            );
            out.co2e_fossil = fossil;
            out.co2e_biomass = biomass;
            out.co2e_non_sustainable_biomass = non_sustainable;
            out.total_emissions = r.total;
            out.energy_content_biomass = r.energy_tj * stream.biomass_content / 100.0;
            out.energy_content_fossil = r.energy_tj - out.energy_content_biomass;
        }
        Err(err @ CalculationError::DelegatedMethod(_)) => {
            out.clear_outputs();
            status.warning(err.to_string());
        }
        Err(err) => {
            warn!(stream = %stream.id, error = %err, "source stream calculation failed");
            out.clear_outputs();
            status.error(err.to_string());
        }
    }

    out.is_valid = !status.has_errors();
    out.errors = status.errors;
    out.warnings = status.warnings;
    out
}

/// Calculates section B: every stream, PFC source and measurement source,
/// plus the aggregate totals C and F are checked against.
pub fn calculate(
    streams: &[SourceStream],
    pfc_sources: &[PfcSource],
    measurement_sources: &[MeasurementSource],
    config: &CalculationConfig,
) -> SourceStreamCalculation {
    let mut validation = ValidationStatus::new();
    let mut tally = CompletenessTally::default();
    let mut totals = SourceStreamTotals::default();
    let mut calculated_fields = Vec::new();

    let streams: Vec<SourceStream> = streams
        .iter()
        .map(|s| calculate_stream(s, config))
        .collect();

    for stream in &streams {
        tally.merge(stream_completeness(stream));
        validation.absorb(&stream.label(), &stream.status());

        totals.stream_count += 1;
        if stream.is_valid {
            totals.valid_stream_count += 1;
        }
        totals.fossil_co2e += stream.co2e_fossil;
        totals.biomass_co2e += stream.co2e_biomass;
        totals.non_sustainable_biomass_co2e += stream.co2e_non_sustainable_biomass;
        totals.stream_co2e += stream.total_emissions;
        totals.energy_content_fossil += stream.energy_content_fossil;
        totals.energy_content_biomass += stream.energy_content_biomass;

        calculated_fields.extend(
            STREAM_OUTPUT_FIELDS
                .iter()
                .map(|f| format!("sourceStreams.{}.{}", stream.id, f)),
        );
    }

    let pfc_sources: Vec<PfcSource> = pfc_sources
        .iter()
        .map(|p| calculate_pfc_source(p, config))
        .collect();
    for source in &pfc_sources {
        tally.merge(pfc::completeness(source));
        validation.absorb(&source.label(), &source.status());
        totals.pfc_co2e += source.total_co2e;
        calculated_fields.push(format!("pfcSources.{}.totalCo2e", source.id));
    }

    let measurement_sources: Vec<MeasurementSource> = measurement_sources
        .iter()
        .map(|m| calculate_measurement_source(m, config))
        .collect();
    for source in &measurement_sources {
        tally.merge(measurement::completeness(source));
        validation.absorb(&source.label(), &source.status());
        match source.gas {
            MeasuredGas::Co2 => {
                totals.measured_fossil_co2 += source.co2e_fossil;
                totals.measured_biomass_co2 += source.co2e_biomass;
            }
            MeasuredGas::N2o => totals.measured_n2o_co2e += source.total_co2e,
        }
        calculated_fields.push(format!("measurementSources.{}.totalCo2e", source.id));
    }

    totals.total_energy_content = totals.energy_content_fossil + totals.energy_content_biomass;
    totals.total_co2e = totals.stream_co2e
        + totals.pfc_co2e
        + totals.measured_fossil_co2
        + totals.measured_biomass_co2
        + totals.measured_n2o_co2e;
    calculated_fields.extend(
        ["totalCo2e", "totalEnergyContent", "pfcCo2e"]
            .iter()
            .map(|f| format!("sourceStreamTotals.{f}")),
    );

    validation.completeness = tally.percent();

    debug!(
        streams = streams.len(),
        pfc = pfc_sources.len(),
        measurement = measurement_sources.len(),
        total_co2e = totals.total_co2e,
        errors = validation.errors.len(),
        "calculated source streams"
    );

    SourceStreamCalculation {
        streams,
        pfc_sources,
        measurement_sources,
        totals,
        validation,
        calculated_fields,
    }
}
