pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{CliConfig, Command};

pub use crate::adapters::{CsvFileStore, SheetStore};
pub use crate::config::{toml_config::TomlConfig, LedgerConfig, StoreSettings};
pub use crate::core::{
    ledger::AllocationLedger,
    submission::{SubmissionAttempt, SubmissionState},
};
pub use crate::domain::{
    catalog::{Catalog, ElectiveId},
    model::{Candidate, EnrollmentRecord, Row},
    ports::{ConfigProvider, TabularStore},
    snapshot::{Overbooking, SeatBoard, SeatListing, Snapshot},
};
pub use crate::utils::error::{LedgerError, Rejection, Result};
