use crate::config::SplitSettings;
use crate::utils::error::{Result, SplitError};
use crate::utils::validation::Validate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

static ENV_VAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub run: Option<RunConfig>,
    pub markers: Option<MarkersConfig>,
    pub naming: Option<NamingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    pub root: Option<String>,
    pub group_multipage: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarkersConfig {
    pub period_pattern: Option<String>,
    pub employee_id_pattern: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamingConfig {
    pub month_names: Option<Vec<String>>,
    pub extension: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| SplitError::ConfigError {
            message: format!("Cannot read '{}': {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| SplitError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PAYSLIP_ROOT})，未定義者保留原文
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 以檔案內容覆蓋預設值
    pub fn into_settings(self) -> SplitSettings {
        let mut settings = SplitSettings::default();

        if let Some(run) = self.run {
            if let Some(root) = run.root {
                settings.root = PathBuf::from(root);
            }
            if let Some(group) = run.group_multipage {
                settings.group_multipage = group;
            }
        }

        if let Some(markers) = self.markers {
            if let Some(pattern) = markers.period_pattern {
                settings.period_pattern = pattern;
            }
            if let Some(pattern) = markers.employee_id_pattern {
                settings.employee_id_pattern = pattern;
            }
        }

        if let Some(naming) = self.naming {
            if let Some(names) = naming.month_names {
                settings.month_names = names;
            }
            if let Some(extension) = naming.extension {
                settings.extension = extension;
            }
        }

        settings
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.clone().into_settings().validate()
    }
}
