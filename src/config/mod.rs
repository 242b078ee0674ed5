#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::extractor::{DEFAULT_EMPLOYEE_ID_PATTERN, DEFAULT_PERIOD_PATTERN};
use crate::core::writer::DEFAULT_MONTH_NAMES;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_extension, validate_month_names, validate_path, validate_pattern, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 合併 CLI 與 TOML 後的最終設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitSettings {
    /// Project root holding input/ output/ errors/ logs/
    pub root: PathBuf,
    pub group_multipage: bool,
    pub period_pattern: String,
    pub employee_id_pattern: String,
    pub month_names: Vec<String>,
    pub extension: String,
}

impl Default for SplitSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            group_multipage: true,
            period_pattern: DEFAULT_PERIOD_PATTERN.to_string(),
            employee_id_pattern: DEFAULT_EMPLOYEE_ID_PATTERN.to_string(),
            month_names: DEFAULT_MONTH_NAMES.iter().map(|m| m.to_string()).collect(),
            extension: "pdf".to_string(),
        }
    }
}

impl Validate for SplitSettings {
    fn validate(&self) -> Result<()> {
        validate_path("run.root", &self.root.to_string_lossy())?;
        validate_pattern("markers.period_pattern", &self.period_pattern, 2)?;
        validate_pattern("markers.employee_id_pattern", &self.employee_id_pattern, 0)?;
        validate_month_names("naming.month_names", &self.month_names)?;
        validate_extension("naming.extension", &self.extension)?;
        Ok(())
    }
}
