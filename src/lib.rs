pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;
pub use config::SplitSettings;

pub use adapters::pdf::PdfSource;
pub use crate::core::context::RunContext;
pub use crate::core::splitter::{run, Progress, SplitEngine, SplitWorker};
pub use domain::model::{GroupStatus, OutcomeRecord, RunReport, RunSummary};
pub use utils::error::{Result, SplitError};
