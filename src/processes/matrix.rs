//! Input/output matrix of a production process.
//!
//! Rows are free-form lists the user extends at will. Each list is validated
//! on its own; nothing here feeds the attribution arithmetic.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::validation::{require_non_negative, require_percentage, ValidationStatus};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, uniffi::Enum,
)]
#[serde(rename_all = "camelCase")]
pub enum PrecursorOrigin {
    Internal,
    #[default]
    External,
}

impl PrecursorOrigin {
    pub fn label(&self) -> &'static str {
        match self {
            PrecursorOrigin::Internal => "Internal",
            PrecursorOrigin::External => "External",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        let key = text.trim().to_lowercase();
        if key.starts_with("int") || key == "own production" {
            Some(PrecursorOrigin::Internal)
        } else if key.starts_with("ext") || key.starts_with("purchased") {
            Some(PrecursorOrigin::External)
        } else {
            None
        }
    }
}

/// Share of this process's output passed on to another process.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessFlow {
    pub to_process_id: String,
    /// Percent of output.
    pub share: f64,
    pub amount: f64,
    pub unit: String,
    pub calculation_method: String,
}

/// Share of this process's output leaving as a product.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductFlow {
    pub product_name: String,
    pub cn_code: String,
    /// Percent of output.
    pub share: f64,
    pub amount: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct PrecursorConsumption {
    pub precursor_id: String,
    pub precursor_name: String,
    pub amount: f64,
    pub unit: String,
    pub origin: PrecursorOrigin,
}

impl PrecursorConsumption {
    /// Matches by id, falling back to a case-insensitive name match when
    /// either side has no id.
    pub fn refers_to(&self, id: &str, name: &str) -> bool {
        let (own_id, id) = (self.precursor_id.trim(), id.trim());
        if !own_id.is_empty() && !id.is_empty() {
            return own_id == id;
        }
        let (own_name, name) = (self.precursor_name.trim(), name.trim());
        !own_name.is_empty() && own_name.eq_ignore_ascii_case(name)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase", default)]
pub struct InputOutputMatrix {
    pub process_to_process: Vec<ProcessFlow>,
    pub process_to_product: Vec<ProductFlow>,
    pub precursor_consumption: Vec<PrecursorConsumption>,
}

impl InputOutputMatrix {
    pub fn is_empty(&self) -> bool {
        self.process_to_process.is_empty()
            && self.process_to_product.is_empty()
            && self.precursor_consumption.is_empty()
    }

    /// External consumption rows recorded for a purchased precursor.
    pub fn external_consumption<'a>(
        &'a self,
        id: &'a str,
        name: &'a str,
    ) -> impl Iterator<Item = &'a PrecursorConsumption> + 'a {
        self.precursor_consumption
            .iter()
            .filter(move |c| c.origin == PrecursorOrigin::External && c.refers_to(id, name))
    }

    pub fn validate(&self, own_id: &str, known_ids: &HashSet<&str>, status: &mut ValidationStatus) {
        for (i, flow) in self.process_to_process.iter().enumerate() {
            let row = format!("process flow {}", i + 1);
            require_percentage(status, &format!("{row} share"), flow.share);
            require_non_negative(status, &format!("{row} amount"), flow.amount);
            if flow.share != 0.0 && flow.calculation_method.trim().is_empty() {
                status.error(format!("{row}: calculation method is required for a non-zero share"));
            }
            let target = flow.to_process_id.trim();
            if target.is_empty() {
                status.warning(format!("{row}: no target process"));
            } else if target == own_id {
                status.warning(format!("{row}: process flows into itself"));
            } else if !known_ids.contains(target) {
                status.warning(format!("{row}: unknown target process '{target}'"));
            }
        }

        for (i, flow) in self.process_to_product.iter().enumerate() {
            let row = format!("product flow {}", i + 1);
            require_percentage(status, &format!("{row} share"), flow.share);
            require_non_negative(status, &format!("{row} amount"), flow.amount);
            if flow.product_name.trim().is_empty() && flow.cn_code.trim().is_empty() {
                status.warning(format!("{row}: product name or CN code expected"));
            }
        }

        let shares: f64 = self
            .process_to_process
            .iter()
            .map(|f| f.share)
            .chain(self.process_to_product.iter().map(|f| f.share))
            .sum();
        if shares > 100.0 + 1e-9 {
            status.warning(format!("output shares add up to {shares:.1}%, more than 100%"));
        }

        for (i, row) in self.precursor_consumption.iter().enumerate() {
            let label = format!("precursor consumption {}", i + 1);
            require_non_negative(status, &format!("{label} amount"), row.amount);
            if row.precursor_id.trim().is_empty() && row.precursor_name.trim().is_empty() {
                status.warning(format!("{label}: precursor id or name expected"));
            }
        }
    }
}
