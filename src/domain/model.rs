use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::path::PathBuf;

/// Period and employee identifier found on a slip's first page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Markers {
    pub year: i32,
    /// 1-12
    pub month: u32,
    pub employee_id: String,
}

/// 單頁掃描結果，作為分組 fold 的輸入
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageScan {
    Marked(Markers),
    Unmarked,
    Failed(String),
}

impl PageScan {
    pub fn markers(&self) -> Option<&Markers> {
        match self {
            PageScan::Marked(markers) => Some(markers),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GroupStatus {
    Ok,
    Fallback,
    Orphan,
    Error,
}

impl GroupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupStatus::Ok => "OK",
            GroupStatus::Fallback => "FALLBACK",
            GroupStatus::Orphan => "ORPHAN",
            GroupStatus::Error => "ERROR",
        }
    }
}

impl fmt::Display for GroupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contiguous page range, 0-based and inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpan {
    pub start: usize,
    pub end: usize,
}

impl PageSpan {
    pub fn single(index: usize) -> Self {
        Self {
            start: index,
            end: index,
        }
    }

    pub fn page_count(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn indices(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    /// 1-based page number of the first page
    pub fn first_page_no(&self) -> usize {
        self.start + 1
    }
}

/// 以 1 為起始頁碼顯示："3" 或 "1-2"
impl fmt::Display for PageSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start + 1)
        } else {
            write!(f, "{}-{}", self.start + 1, self.end + 1)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalGroup {
    pub span: PageSpan,
    /// Taken from the first page only
    pub markers: Option<Markers>,
    pub status: GroupStatus,
    pub errors: Vec<String>,
}

impl LogicalGroup {
    pub fn open(index: usize, markers: Option<Markers>, status: GroupStatus) -> Self {
        Self {
            span: PageSpan::single(index),
            markers,
            status,
            errors: Vec::new(),
        }
    }

    pub fn failed(index: usize, message: String) -> Self {
        Self {
            span: PageSpan::single(index),
            markers: None,
            status: GroupStatus::Error,
            errors: vec![message],
        }
    }

    /// ERROR 為單向覆寫，不可回復
    pub fn mark_error(&mut self, message: impl Into<String>) {
        self.status = GroupStatus::Error;
        self.errors.push(message.into());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub status: GroupStatus,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub employee_id: Option<String>,
    pub pages: PageSpan,
    pub output_file: Option<String>,
    pub output_path: Option<PathBuf>,
    pub note: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub pages: usize,
    pub ok_files: usize,
    pub fallback_pages: usize,
    pub orphans: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub timestamp: String,
    pub ok_dir: PathBuf,
    pub err_dir: PathBuf,
    pub csv_path: PathBuf,
    pub log_path: PathBuf,
    pub total_pages: usize,
    pub cancelled: bool,
    pub summary: RunSummary,
    pub records: Vec<OutcomeRecord>,
}
