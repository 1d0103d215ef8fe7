//! Workbook interchange: a six-sheet layout that hosts map to and from their
//! spreadsheet format.

pub mod cells;
pub mod export;
pub mod import;
pub mod layout;
pub mod legacy;
pub mod workbook;

pub use cells::{coerce_number, parse_number};
pub use export::export_workbook;
pub use import::{import_workbook, ImportOutcome};
pub use workbook::{Cell, Sheet, Workbook};

use crate::config::CalculationConfig;
use crate::report::{recalculate, InstallationReport};

/// Recalculates the report and writes it out.
#[uniffi::export]
pub fn export_report_workbook(report: InstallationReport, config: CalculationConfig) -> Workbook {
    export_workbook(&recalculate(&report, &config))
}

#[uniffi::export]
pub fn import_report_workbook(workbook: Workbook) -> ImportOutcome {
    import_workbook(&workbook)
}

/// Number typed into a form field; unparseable text is 0.
#[uniffi::export]
pub fn coerce_input_number(text: String) -> f64 {
    coerce_number(&text)
}
