//! Validation primitives shared by every accounting engine.
//!
//! An engine never aborts on bad input. It records messages at one of three
//! severities on a [`ValidationStatus`] and keeps calculating.

use serde::{Deserialize, Serialize};

use crate::units::Converted;

/// Slack applied to band edges so that an exact 30.0% difference is not a
/// breach of a 30% band after floating-point noise.
const BAND_EPSILON: f64 = 1e-9;

/// Message severity. Only errors block export-readiness.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, uniffi::Enum,
)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }
}

/// Validation outcome attached to an engine result or a single entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationStatus {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub infos: Vec<String>,
    /// Share of required inputs filled, 0–100.
    pub completeness: f64,
}

impl Default for ValidationStatus {
    fn default() -> Self {
        ValidationStatus {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            infos: Vec::new(),
            completeness: 100.0,
        }
    }
}

impl ValidationStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.is_valid = false;
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.infos.push(message.into());
    }

    pub fn push(&mut self, severity: Severity, message: impl Into<String>) {
        match severity {
            Severity::Error => self.error(message),
            Severity::Warning => self.warning(message),
            Severity::Info => self.info(message),
        }
    }

    /// Folds an entity's messages into an aggregate status, prefixed with the
    /// entity label so the user can find the offending row.
    pub fn absorb(&mut self, label: &str, other: &ValidationStatus) {
        for e in &other.errors {
            self.error(format!("{label}: {e}"));
        }
        for w in &other.warnings {
            self.warning(format!("{label}: {w}"));
        }
        for i in &other.infos {
            self.info(format!("{label}: {i}"));
        }
    }

    pub fn with_completeness(mut self, completeness: f64) -> Self {
        self.completeness = completeness;
        self
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Running count of required inputs, turned into a 0–100 completeness score.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletenessTally {
    required: u32,
    filled: u32,
}

impl CompletenessTally {
    pub fn check(&mut self, present: bool) {
        self.required += 1;
        if present {
            self.filled += 1;
        }
    }

    pub fn merge(&mut self, other: CompletenessTally) {
        self.required += other.required;
        self.filled += other.filled;
    }

    /// 100 when nothing is required.
    pub fn percent(&self) -> f64 {
        if self.required == 0 {
            100.0
        } else {
            self.filled as f64 * 100.0 / self.required as f64
        }
    }
}

/// Two-stage relative-difference band. Differences above `upper_percent`
/// are reported at `upper_severity`, otherwise above `lower_percent` at
/// `lower_severity`. Both edges are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct ToleranceBand {
    pub lower_percent: f64,
    pub lower_severity: Severity,
    pub upper_percent: f64,
    pub upper_severity: Severity,
}

impl ToleranceBand {
    pub fn warning_error(warning_percent: f64, error_percent: f64) -> Self {
        ToleranceBand {
            lower_percent: warning_percent,
            lower_severity: Severity::Warning,
            upper_percent: error_percent,
            upper_severity: Severity::Error,
        }
    }

    pub fn classify(&self, difference_percent: f64) -> Option<Severity> {
        if difference_percent > self.upper_percent + BAND_EPSILON {
            Some(self.upper_severity)
        } else if difference_percent > self.lower_percent + BAND_EPSILON {
            Some(self.lower_severity)
        } else {
            None
        }
    }
}

/// `|value - reference| / reference` in percent, or `None` when the
/// reference is not positive and there is nothing to compare against.
pub fn relative_difference_percent(value: f64, reference: f64) -> Option<f64> {
    if reference > 0.0 && value.is_finite() {
        Some((value - reference).abs() * 100.0 / reference)
    } else {
        None
    }
}

/// Result of one cross-section comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct CrossCheck {
    pub name: String,
    pub value: f64,
    pub reference: f64,
    pub difference_percent: Option<f64>,
    /// `None` when within tolerance or skipped.
    pub severity: Option<Severity>,
    pub message: String,
}

/// Compares `value` against `reference` with `band` and records any breach
/// on `status`.
pub fn cross_check(
    status: &mut ValidationStatus,
    name: &str,
    value: f64,
    reference: f64,
    band: &ToleranceBand,
) -> CrossCheck {
    let difference_percent = relative_difference_percent(value, reference);
    let severity = difference_percent.and_then(|d| band.classify(d));

    let message = match (difference_percent, severity) {
        (None, _) => format!("{name}: no reference value to compare against"),
        (Some(d), Some(s)) => {
            let msg = format!(
                "{name}: {value:.3} differs from {reference:.3} by {d:.1}% ({} threshold {:.0}%)",
                s.label().to_lowercase(),
                if s == band.upper_severity {
                    band.upper_percent
                } else {
                    band.lower_percent
                }
            );
            status.push(s, msg.clone());
            msg
        }
        (Some(d), None) => format!("{name}: within tolerance ({d:.1}%)"),
    };

    CrossCheck {
        name: name.to_string(),
        value,
        reference,
        difference_percent,
        severity,
        message,
    }
}

/// Records an error when `value` is negative.
pub fn require_non_negative(status: &mut ValidationStatus, field: &str, value: f64) {
    if value < 0.0 {
        status.error(format!("{field} must not be negative"));
    }
}

/// Records an error when a percentage falls outside [0, 100]. Values are
/// reported, never clamped.
pub fn require_percentage(status: &mut ValidationStatus, field: &str, value: f64) {
    if !(0.0..=100.0).contains(&value) {
        status.error(format!("{field} must be between 0 and 100% (got {value})"));
    }
}

/// Records a warning when a unit conversion fell back to its default
/// assumption.
pub fn warn_unsupported(
    status: &mut ValidationStatus,
    converted: Converted,
    what: &str,
    unit: &str,
    assumed: &str,
) {
    if !converted.supported {
        status.warning(format!("unrecognized {what} unit '{unit}', treated as {assumed}"));
    }
}

/// Self-assessed data quality of an entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, uniffi::Enum,
)]
#[serde(rename_all = "camelCase")]
pub enum DataQuality {
    Excellent,
    #[default]
    Good,
    Fair,
    Poor,
    VeryPoor,
}

impl DataQuality {
    pub fn label(&self) -> &'static str {
        match self {
            DataQuality::Excellent => "Excellent",
            DataQuality::Good => "Good",
            DataQuality::Fair => "Fair",
            DataQuality::Poor => "Poor",
            DataQuality::VeryPoor => "Very Poor",
        }
    }

    /// Label for a 0–100 score using the 90/75/60/40 thresholds.
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            DataQuality::Excellent
        } else if score >= 75.0 {
            DataQuality::Good
        } else if score >= 60.0 {
            DataQuality::Fair
        } else if score >= 40.0 {
            DataQuality::Poor
        } else {
            DataQuality::VeryPoor
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        let key: String = text
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "excellent" => Some(DataQuality::Excellent),
            "good" => Some(DataQuality::Good),
            "fair" => Some(DataQuality::Fair),
            "poor" => Some(DataQuality::Poor),
            "verypoor" => Some(DataQuality::VeryPoor),
            _ => None,
        }
    }

    pub fn is_poor(&self) -> bool {
        matches!(self, DataQuality::Poor | DataQuality::VeryPoor)
    }
}

/// Third-party verification state of reported data.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, uniffi::Enum,
)]
#[serde(rename_all = "camelCase")]
pub enum VerificationStatus {
    Verified,
    #[default]
    Unverified,
    Pending,
    NotRequired,
}

impl VerificationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            VerificationStatus::Verified => "Verified",
            VerificationStatus::Unverified => "Unverified",
            VerificationStatus::Pending => "Pending",
            VerificationStatus::NotRequired => "Not required",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        let key: String = text
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "verified" => Some(VerificationStatus::Verified),
            "unverified" | "notverified" => Some(VerificationStatus::Unverified),
            "pending" => Some(VerificationStatus::Pending),
            "notrequired" => Some(VerificationStatus::NotRequired),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_push_and_validity() {
        let mut status = ValidationStatus::new();
        assert!(status.is_valid);

        status.warning("unusual unit");
        status.info("advisory");
        assert!(status.is_valid);

        status.error("missing name");
        assert!(!status.is_valid);
        assert_eq!(status.errors, vec!["missing name".to_string()]);
        assert_eq!(status.warnings.len(), 1);
        assert_eq!(status.infos.len(), 1);
    }

    #[test]
    fn test_absorb_prefixes_messages() {
        let mut child = ValidationStatus::new();
        child.error("bad");
        child.warning("odd");

        let mut parent = ValidationStatus::new();
        parent.absorb("Stream 'Coal'", &child);

        assert!(!parent.is_valid);
        assert_eq!(parent.errors[0], "Stream 'Coal': bad");
        assert_eq!(parent.warnings[0], "Stream 'Coal': odd");
    }

    #[test]
    fn test_completeness_tally() {
        let mut tally = CompletenessTally::default();
        assert_eq!(tally.percent(), 100.0);
        tally.check(true);
        tally.check(false);
        tally.check(true);
        tally.check(true);
        assert_eq!(tally.percent(), 75.0);
    }

    #[test]
    fn test_band_edges() {
        let band = ToleranceBand::warning_error(30.0, 60.0);
        let pct = |c: f64| relative_difference_percent(c, 1000.0).unwrap();

        assert_eq!(band.classify(pct(700.0)), None); // 30.0%
        assert_eq!(band.classify(pct(699.0)), Some(Severity::Warning)); // 30.1%
        assert_eq!(band.classify(pct(400.0)), Some(Severity::Warning)); // 60.0%
        assert_eq!(band.classify(pct(399.0)), Some(Severity::Error)); // 60.1%
        assert_eq!(band.classify(pct(1300.0)), None); // 30.0% above
        assert_eq!(band.classify(pct(1301.0)), Some(Severity::Warning));
    }

    #[test]
    fn test_cross_check_records_breach() {
        let mut status = ValidationStatus::new();
        let band = ToleranceBand::warning_error(30.0, 60.0);

        let check = cross_check(&mut status, "Direct emissions", 1000.0, 1500.0, &band);
        assert_eq!(check.severity, Some(Severity::Warning));
        assert!((check.difference_percent.unwrap() - 33.333).abs() < 0.01);
        assert!(status.is_valid);
        assert_eq!(status.warnings.len(), 1);

        let check = cross_check(&mut status, "Direct emissions", 100.0, 1500.0, &band);
        assert_eq!(check.severity, Some(Severity::Error));
        assert!(!status.is_valid);
    }

    #[test]
    fn test_cross_check_without_reference() {
        let mut status = ValidationStatus::new();
        let band = ToleranceBand::warning_error(30.0, 60.0);
        let check = cross_check(&mut status, "Biomass", 50.0, 0.0, &band);
        assert_eq!(check.difference_percent, None);
        assert_eq!(check.severity, None);
        assert!(status.warnings.is_empty());
    }

    #[test]
    fn test_percentage_checks_do_not_clamp() {
        let mut status = ValidationStatus::new();
        require_percentage(&mut status, "Biomass content", 120.0);
        require_percentage(&mut status, "Oxidation factor", 100.0);
        require_non_negative(&mut status, "Activity data", -1.0);
        assert_eq!(status.errors.len(), 2);
    }

    #[test]
    fn test_quality_labels() {
        assert_eq!(DataQuality::from_score(95.0), DataQuality::Excellent);
        assert_eq!(DataQuality::from_score(90.0), DataQuality::Excellent);
        assert_eq!(DataQuality::from_score(80.0), DataQuality::Good);
        assert_eq!(DataQuality::from_score(60.0), DataQuality::Fair);
        assert_eq!(DataQuality::from_score(45.0), DataQuality::Poor);
        assert_eq!(DataQuality::from_score(10.0), DataQuality::VeryPoor);
        assert_eq!(DataQuality::parse("Very Poor"), Some(DataQuality::VeryPoor));
        assert_eq!(
            VerificationStatus::parse("not required"),
            Some(VerificationStatus::NotRequired)
        );
    }
}
