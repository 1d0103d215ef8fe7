//! Unit normalization for activity data, calorific values and emission factors.
//!
//! Every conversion is total: an unrecognized unit falls back to the unit the
//! template assumes and reports `supported: false` so the caller can attach a
//! warning. Data entry is never blocked on a unit choice.
//!
//! Units are reduced to a family plus a scale against the family's base unit
//! (tonnes for mass, GJ for energy and electrical energy, m³ for volume,
//! pieces for counts). Compound units such as `kgCO2/GJ` are split at the
//! last `/` and each side scaled independently.

/// Result of a best-effort conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Converted {
    pub value: f64,
    /// `false` when the input unit was not recognized and the default
    /// assumption was applied instead.
    pub supported: bool,
}

impl Converted {
    fn known(value: f64) -> Self {
        Converted {
            value,
            supported: true,
        }
    }

    fn assumed(value: f64) -> Self {
        Converted {
            value,
            supported: false,
        }
    }
}

/// Physical dimension of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitFamily {
    Mass,
    Energy,
    Electricity,
    Volume,
    Count,
    Unknown,
}

impl UnitFamily {
    pub fn label(&self) -> &'static str {
        match self {
            UnitFamily::Mass => "mass",
            UnitFamily::Energy => "energy",
            UnitFamily::Electricity => "electrical energy",
            UnitFamily::Volume => "volume",
            UnitFamily::Count => "count",
            UnitFamily::Unknown => "unknown",
        }
    }

    /// Energy and electrical energy share the GJ base and convert freely.
    pub fn is_compatible_with(&self, other: UnitFamily) -> bool {
        match (self, other) {
            (UnitFamily::Unknown, _) | (_, UnitFamily::Unknown) => false,
            (UnitFamily::Energy, UnitFamily::Electricity)
            | (UnitFamily::Electricity, UnitFamily::Energy) => true,
            (a, b) => *a == b,
        }
    }
}

/// Canonical spelling used for table lookups: lower case, no whitespace,
/// subscripts folded and `CO2e` collapsed to `co2`.
pub fn normalize_unit(unit: &str) -> String {
    let folded: String = unit
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '₂' | '²' => '2',
            '³' => '3',
            '₄' => '4',
            '₆' => '6',
            _ => c,
        })
        .collect::<String>()
        .to_lowercase();

    folded
        .replace("co2eq", "co2")
        .replace("co2e", "co2")
        .replace("tonnes", "t")
        .replace("tonne", "t")
}

/// Family and scale against the family base unit for a simple (non-compound) unit.
fn base_scale(unit: &str) -> Option<(UnitFamily, f64)> {
    let scale = match unit {
        "t" => (UnitFamily::Mass, 1.0),
        "kg" => (UnitFamily::Mass, 1e-3),
        "g" => (UnitFamily::Mass, 1e-6),
        "kt" | "gg" => (UnitFamily::Mass, 1e3),

        "pj" => (UnitFamily::Energy, 1e6),
        "tj" => (UnitFamily::Energy, 1e3),
        "gj" => (UnitFamily::Energy, 1.0),
        "mj" => (UnitFamily::Energy, 1e-3),
        "kj" => (UnitFamily::Energy, 1e-6),

        "wh" => (UnitFamily::Electricity, 3.6e-6),
        "kwh" => (UnitFamily::Electricity, 3.6e-3),
        "mwh" => (UnitFamily::Electricity, 3.6),
        "gwh" => (UnitFamily::Electricity, 3.6e3),

        "m3" | "nm3" | "kl" => (UnitFamily::Volume, 1.0),
        "l" => (UnitFamily::Volume, 1e-3),
        "1000nm3" | "1000m3" => (UnitFamily::Volume, 1e3),

        "pcs" | "pc" | "pieces" | "piece" | "units" | "unit" | "items" => {
            (UnitFamily::Count, 1.0)
        }
        _ => return None,
    };
    Some(scale)
}

/// Family of a simple unit such as an activity-data unit.
pub fn unit_family(unit: &str) -> UnitFamily {
    base_scale(&normalize_unit(unit))
        .map(|(family, _)| family)
        .unwrap_or(UnitFamily::Unknown)
}

/// Splits a compound unit at its last `/`.
fn split_ratio(normalized: &str) -> Option<(&str, &str)> {
    normalized.rsplit_once('/')
}

/// Family of the denominator of a factor unit (`tCO2/TJ` -> energy).
pub fn denominator_family(factor_unit: &str) -> UnitFamily {
    let normalized = normalize_unit(factor_unit);
    split_ratio(&normalized)
        .and_then(|(_, den)| base_scale(den))
        .map(|(family, _)| family)
        .unwrap_or(UnitFamily::Unknown)
}

/// Tonnes per unit of an emission-factor numerator (`kgCO2` -> 0.001).
fn numerator_tonnes(numerator: &str) -> Option<f64> {
    const GASES: [&str; 6] = ["co2", "n2o", "cf4", "c2f6", "ch4", "c"];
    let prefix = GASES
        .iter()
        .find_map(|gas| numerator.strip_suffix(gas))
        .unwrap_or(numerator);
    match base_scale(prefix) {
        Some((UnitFamily::Mass, scale)) => Some(scale),
        _ => None,
    }
}

/// Decomposes a factor unit into (numerator tonnes, denominator family, denominator scale).
fn parse_factor_unit(unit: &str) -> Option<(f64, UnitFamily, f64)> {
    let normalized = normalize_unit(unit);
    let (num, den) = split_ratio(&normalized)?;
    let num_t = numerator_tonnes(num)?;
    let (family, den_scale) = base_scale(den)?;
    Some((num_t, family, den_scale))
}

/// Net calorific value to TJ/t. Unspecified units are GJ/t.
pub fn calorific_value_to_tj_per_t(value: f64, unit: &str) -> Converted {
    let normalized = normalize_unit(unit);
    if normalized.is_empty() {
        return Converted::known(value / 1000.0);
    }
    let parsed = split_ratio(&normalized).and_then(|(num, den)| {
        let (num_family, num_scale) = base_scale(num)?;
        let (den_family, den_scale) = base_scale(den)?;
        (num_family.is_compatible_with(UnitFamily::Energy) && den_family == UnitFamily::Mass)
            .then_some(num_scale / den_scale)
    });
    match parsed {
        // num_scale is in GJ, den_scale in t
        Some(gj_per_t) => Converted::known(value * gj_per_t / 1000.0),
        None => Converted::assumed(value / 1000.0),
    }
}

/// Energy-based emission factor to tCO2/TJ. Unspecified units are tCO2/TJ.
pub fn emission_factor_to_t_per_tj(value: f64, unit: &str) -> Converted {
    if normalize_unit(unit).is_empty() {
        return Converted::known(value);
    }
    match parse_factor_unit(unit) {
        Some((num_t, family, den_gj)) if family.is_compatible_with(UnitFamily::Energy) => {
            Converted::known(value * num_t * 1000.0 / den_gj)
        }
        _ => Converted::assumed(value),
    }
}

/// Mass-based emission factor to tCO2/t. Unspecified units are tCO2/t.
pub fn mass_emission_factor_to_t_per_t(value: f64, unit: &str) -> Converted {
    if normalize_unit(unit).is_empty() {
        return Converted::known(value);
    }
    match parse_factor_unit(unit) {
        Some((num_t, UnitFamily::Mass, den_t)) => Converted::known(value * num_t / den_t),
        _ => Converted::assumed(value),
    }
}

/// Electricity emission factor to tCO2/MWh. Unspecified units are tCO2/MWh.
pub fn electricity_factor_to_t_per_mwh(value: f64, unit: &str) -> Converted {
    if normalize_unit(unit).is_empty() {
        return Converted::known(value);
    }
    match parse_factor_unit(unit) {
        Some((num_t, family, den_gj)) if family.is_compatible_with(UnitFamily::Electricity) => {
            Converted::known(value * num_t * 3.6 / den_gj)
        }
        _ => Converted::assumed(value),
    }
}

fn energy_in_gj(value: f64, unit: &str) -> Option<f64> {
    match base_scale(&normalize_unit(unit)) {
        Some((family, scale)) if family.is_compatible_with(UnitFamily::Energy) => {
            Some(value * scale)
        }
        _ => None,
    }
}

/// Electrical energy to MWh. Unspecified units are MWh.
pub fn electricity_to_mwh(value: f64, unit: &str) -> Converted {
    if normalize_unit(unit).is_empty() {
        return Converted::known(value);
    }
    match energy_in_gj(value, unit) {
        Some(gj) => Converted::known(gj / 3.6),
        None => Converted::assumed(value),
    }
}

/// Heat quantity to TJ. Unspecified units are TJ.
pub fn heat_to_tj(value: f64, unit: &str) -> Converted {
    if normalize_unit(unit).is_empty() {
        return Converted::known(value);
    }
    match energy_in_gj(value, unit) {
        Some(gj) => Converted::known(gj / 1000.0),
        None => Converted::assumed(value),
    }
}

/// Mass to tonnes. Volumes and piece counts need a density or unit mass the
/// template does not carry, so they pass through unconverted and unsupported.
pub fn mass_to_tonnes(value: f64, unit: &str) -> Converted {
    let normalized = normalize_unit(unit);
    if normalized.is_empty() {
        return Converted::known(value);
    }
    match base_scale(&normalized) {
        Some((UnitFamily::Mass, scale)) => Converted::known(value * scale),
        _ => Converted::assumed(value),
    }
}

/// Emission factor expressed as tonnes of gas per denominator unit
/// (`kgCO2/GJ` value 56 -> 0.056 t per GJ).
pub fn factor_in_tonnes(value: f64, factor_unit: &str) -> Converted {
    match parse_factor_unit(factor_unit) {
        Some((num_t, _, _)) => Converted::known(value * num_t),
        None => Converted::assumed(value),
    }
}

/// Converts an activity quantity into the denominator unit of an emission
/// factor so the two can be multiplied (`500 t` against `kgCO2/kg` -> 500000).
pub fn activity_in_factor_unit(value: f64, activity_unit: &str, factor_unit: &str) -> Converted {
    let activity = base_scale(&normalize_unit(activity_unit));
    let normalized_factor = normalize_unit(factor_unit);
    let denominator = split_ratio(&normalized_factor).and_then(|(_, den)| base_scale(den));
    match (activity, denominator) {
        (Some((a_family, a_scale)), Some((d_family, d_scale)))
            if a_family.is_compatible_with(d_family) =>
        {
            Converted::known(value * a_scale / d_scale)
        }
        _ => Converted::assumed(value),
    }
}

/// Outcome of comparing an activity-data unit with an emission-factor unit.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitCompatibility {
    pub compatible: bool,
    pub activity_family: UnitFamily,
    pub factor_family: UnitFamily,
    pub message: Option<String>,
}

/// Checks that the factor's denominator measures the same thing as the
/// activity data. Missing units on either side are not compared.
pub fn check_compatibility(activity_unit: &str, factor_unit: &str) -> UnitCompatibility {
    let activity_family = unit_family(activity_unit);
    let factor_family = denominator_family(factor_unit);

    if normalize_unit(activity_unit).is_empty() || normalize_unit(factor_unit).is_empty() {
        return UnitCompatibility {
            compatible: true,
            activity_family,
            factor_family,
            message: None,
        };
    }

    let compatible = activity_family.is_compatible_with(factor_family);
    let message = (!compatible).then(|| {
        format!(
            "activity unit '{}' ({}) does not match emission factor unit '{}' (per {})",
            activity_unit.trim(),
            activity_family.label(),
            factor_unit.trim(),
            factor_family.label()
        )
    });

    UnitCompatibility {
        compatible,
        activity_family,
        factor_family,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn test_normalize_unit() {
        assert_eq!(normalize_unit(" tCO₂e / TJ "), "tco2/tj");
        assert_eq!(normalize_unit("Nm³"), "nm3");
        assert_eq!(normalize_unit("tonnes"), "t");
    }

    #[test]
    fn test_calorific_value() {
        assert!(close(calorific_value_to_tj_per_t(45.0, "GJ/t").value, 0.045));
        assert!(close(calorific_value_to_tj_per_t(45.0, "MJ/kg").value, 0.045));
        assert!(close(calorific_value_to_tj_per_t(0.045, "TJ/t").value, 0.045));
        assert!(close(calorific_value_to_tj_per_t(45.0, "TJ/Gg").value, 0.045));

        let fallback = calorific_value_to_tj_per_t(45.0, "BTU/lb");
        assert!(!fallback.supported);
        assert!(close(fallback.value, 0.045));

        let unspecified = calorific_value_to_tj_per_t(45.0, "");
        assert!(unspecified.supported);
        assert!(close(unspecified.value, 0.045));
    }

    #[test]
    fn test_emission_factor() {
        assert!(close(emission_factor_to_t_per_tj(56.1, "kgCO2/GJ").value, 56.1));
        assert!(close(emission_factor_to_t_per_tj(0.0561, "tCO2/GJ").value, 56.1));
        assert!(close(emission_factor_to_t_per_tj(56100.0, "kgCO2/TJ").value, 56.1));
        assert!(!emission_factor_to_t_per_tj(1.0, "tCO2/t").supported);
    }

    #[test]
    fn test_electricity() {
        assert!(close(electricity_to_mwh(1500.0, "kWh").value, 1.5));
        assert!(close(electricity_to_mwh(3.6, "GJ").value, 1.0));
        assert!(close(electricity_factor_to_t_per_mwh(0.4, "kgCO2/kWh").value, 0.4));
        assert!(close(electricity_factor_to_t_per_mwh(400.0, "gCO2/kWh").value, 0.4));
        assert!(close(electricity_factor_to_t_per_mwh(0.1, "tCO2/GJ").value, 0.36));
    }

    #[test]
    fn test_heat_and_mass() {
        assert!(close(heat_to_tj(1000.0, "MWh").value, 3.6));
        assert!(close(heat_to_tj(250.0, "GJ").value, 0.25));
        assert!(close(mass_to_tonnes(2500.0, "kg").value, 2.5));
        assert!(close(mass_to_tonnes(3.0, "kt").value, 3000.0));

        let volume = mass_to_tonnes(10.0, "m³");
        assert!(!volume.supported);
        assert_eq!(volume.value, 10.0);
        assert!(!mass_to_tonnes(4.0, "pcs").supported);
    }

    #[test]
    fn test_compatibility() {
        assert!(check_compatibility("t", "tCO2/t").compatible);
        assert!(check_compatibility("TJ", "kgCO2/GJ").compatible);
        assert!(check_compatibility("MWh", "tCO2/TJ").compatible);

        let mismatch = check_compatibility("t", "tCO2/TJ");
        assert!(!mismatch.compatible);
        assert_eq!(mismatch.activity_family, UnitFamily::Mass);
        assert_eq!(mismatch.factor_family, UnitFamily::Energy);
        assert!(mismatch.message.is_some());

        assert!(check_compatibility("", "tCO2/TJ").compatible);
    }

    #[test]
    fn test_activity_in_factor_unit() {
        assert!(close(activity_in_factor_unit(500.0, "t", "kgCO2/kg").value, 500000.0));
        assert!(close(activity_in_factor_unit(2.0, "TJ", "tCO2/GJ").value, 2000.0));
        assert!(!activity_in_factor_unit(2.0, "t", "tCO2/TJ").supported);
        assert!(close(factor_in_tonnes(56.0, "kgCO2/GJ").value, 0.056));
    }
}
