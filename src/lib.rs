pub mod additional;
pub mod balance;
pub mod codec;
pub mod config;
pub mod error;
pub mod precursors;
pub mod processes;
pub mod report;
pub mod schedule;
pub mod source_streams;
pub mod units;
pub mod validation;

uniffi::setup_scaffolding!();

pub use additional::{AdditionalEmission, AdditionalSummary, CheckOutcome, SelfCheck};
pub use balance::{FieldValue, FuelBalance, GhgBalance};
pub use codec::{export_workbook, import_workbook, Cell, ImportOutcome, Sheet, Workbook};
pub use config::{CalculationConfig, GwpTable};
pub use error::{CalculationError, ConfigError};
pub use precursors::{PrecursorSummary, PurchasedPrecursor};
pub use processes::{ProcessTotals, ProductionProcess};
pub use report::{recalculate, CalculatedReport, Installation, InstallationReport};
pub use schedule::{RecalcConfig, RecalcScheduler};
pub use source_streams::{
    measurement::MeasurementSource, pfc::PfcSource, SourceStream, SourceStreamTotals,
};
pub use validation::{CrossCheck, DataQuality, Severity, ValidationStatus, VerificationStatus};
