use crate::domain::model::GroupStatus;
use crate::utils::error::Result;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// 單次執行的時間戳與目錄配置，由 Writer 與 Recorder 共用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub root: PathBuf,
    pub timestamp: String,
}

impl RunContext {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_timestamp(root, Local::now().format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn with_timestamp(root: impl Into<PathBuf>, timestamp: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            timestamp: timestamp.into(),
        }
    }

    fn run_dir_name(&self) -> String {
        format!("split_{}", self.timestamp)
    }

    pub fn input_dir(&self) -> PathBuf {
        self.root.join("input")
    }

    pub fn ok_dir(&self) -> PathBuf {
        self.root.join("output").join(self.run_dir_name())
    }

    pub fn err_dir(&self) -> PathBuf {
        self.root.join("errors").join(self.run_dir_name())
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn csv_path(&self) -> PathBuf {
        self.logs_dir().join(format!("{}.csv", self.run_dir_name()))
    }

    pub fn log_path(&self) -> PathBuf {
        self.logs_dir().join(format!("{}.log", self.run_dir_name()))
    }

    /// OK goes to output/, everything else to errors/
    pub fn dir_for(&self, status: GroupStatus) -> PathBuf {
        match status {
            GroupStatus::Ok => self.ok_dir(),
            GroupStatus::Fallback | GroupStatus::Orphan | GroupStatus::Error => self.err_dir(),
        }
    }

    /// 建立 input/ output/ errors/ logs/ 及本次執行的子目錄
    pub fn prepare(&self) -> Result<()> {
        for dir in [
            self.input_dir(),
            self.ok_dir(),
            self.err_dir(),
            self.logs_dir(),
        ] {
            ensure_dir(&dir)?;
        }
        Ok(())
    }
}

pub(crate) fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout_shares_one_timestamp() {
        let ctx = RunContext::with_timestamp("/work", "20260118_093000");

        assert_eq!(
            ctx.ok_dir(),
            PathBuf::from("/work/output/split_20260118_093000")
        );
        assert_eq!(
            ctx.err_dir(),
            PathBuf::from("/work/errors/split_20260118_093000")
        );
        assert_eq!(
            ctx.csv_path(),
            PathBuf::from("/work/logs/split_20260118_093000.csv")
        );
        assert_eq!(
            ctx.log_path(),
            PathBuf::from("/work/logs/split_20260118_093000.log")
        );
        assert_eq!(ctx.dir_for(GroupStatus::Orphan), ctx.err_dir());
        assert_eq!(ctx.dir_for(GroupStatus::Ok), ctx.ok_dir());
    }

    #[test]
    fn test_prepare_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = RunContext::new(temp_dir.path());

        ctx.prepare().unwrap();
        // idempotent
        ctx.prepare().unwrap();

        assert!(ctx.input_dir().is_dir());
        assert!(ctx.ok_dir().is_dir());
        assert!(ctx.err_dir().is_dir());
        assert!(ctx.logs_dir().is_dir());
        assert_eq!(ctx.timestamp.len(), "20260118_093000".len());
    }
}
