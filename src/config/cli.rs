use crate::config::toml_config::TomlConfig;
use crate::config::SplitSettings;
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, Validate};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "payslip-split")]
#[command(about = "Split a PDF of concatenated pay slips into one PDF per employee and period")]
pub struct CliConfig {
    /// Source PDF containing the concatenated pay slips
    pub source: PathBuf,

    /// Project root for input/ output/ errors/ logs/ (overrides the config file)
    #[arg(long)]
    pub root: Option<PathBuf>,

    #[arg(long, help = "One output file per page instead of grouping multi-page slips")]
    pub no_group: bool,

    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Print the run report as JSON")]
    pub json: bool,
}

impl CliConfig {
    /// 應用命令列覆蓋設定
    pub fn settings(&self) -> Result<SplitSettings> {
        let mut settings = match &self.config {
            Some(path) => TomlConfig::from_file(path)?.into_settings(),
            None => SplitSettings::default(),
        };

        if let Some(root) = &self.root {
            settings.root = root.clone();
        }
        if self.no_group {
            settings.group_multipage = false;
        }

        settings.validate()?;
        Ok(settings)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("source", &self.source.to_string_lossy())?;
        if let Some(root) = &self.root {
            validate_path("root", &root.to_string_lossy())?;
        }
        Ok(())
    }
}
