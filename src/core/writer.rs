use crate::core::context::{ensure_dir, RunContext};
use crate::domain::model::{GroupStatus, LogicalGroup};
use crate::domain::ports::SourceDocument;
use crate::utils::error::{Result, SplitError};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const DEFAULT_MONTH_NAMES: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

pub const NOTE_FALLBACK: &str = "période/AVS non détectés";
pub const NOTE_ORPHAN: &str = "page isolée avant toute fiche";

/// 寫出結果：最終狀態、檔名與路徑（寫入失敗時為 None）以及備註
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub status: GroupStatus,
    pub file_name: Option<String>,
    pub path: Option<PathBuf>,
    pub note: String,
}

pub struct ArtifactWriter<'a> {
    ctx: &'a RunContext,
    month_names: &'a [String],
    extension: &'a str,
    produced: HashSet<PathBuf>,
}

impl<'a> ArtifactWriter<'a> {
    pub fn new(ctx: &'a RunContext, month_names: &'a [String], extension: &'a str) -> Self {
        Self {
            ctx,
            month_names,
            extension,
            produced: HashSet::new(),
        }
    }

    /// Base file name for the group's current status, before collision handling.
    pub fn file_name(&self, group: &LogicalGroup) -> String {
        let page_no = group.span.first_page_no();
        match (group.status, group.markers.as_ref()) {
            (GroupStatus::Ok, Some(markers)) => {
                let month = (markers.month as usize)
                    .checked_sub(1)
                    .and_then(|i| self.month_names.get(i))
                    .cloned()
                    .unwrap_or_else(|| format!("{:02}", markers.month));
                format!(
                    "{}-{}-{}.{}",
                    markers.year,
                    clean_filename(&month),
                    clean_filename(&markers.employee_id),
                    self.extension
                )
            }
            (GroupStatus::Fallback, _) | (GroupStatus::Ok, None) => {
                format!("fiche_page_{:03}.{}", page_no, self.extension)
            }
            (GroupStatus::Orphan, _) => format!("orphan_page_{:03}.{}", page_no, self.extension),
            (GroupStatus::Error, _) => self.error_file_name(group),
        }
    }

    fn error_file_name(&self, group: &LogicalGroup) -> String {
        let page_no = group.span.first_page_no();
        if group.span.page_count() == 1 {
            format!("error_page_{:03}.{}", page_no, self.extension)
        } else {
            format!("error_slip_p{:03}.{}", page_no, self.extension)
        }
    }

    /// 檔名已存在（本次已產生或磁碟上已有）時附加 `_p{NNN}`
    fn unique_destination(&self, dir: &Path, file_name: &str, page_no: usize) -> PathBuf {
        let candidate = dir.join(file_name);
        if !self.is_taken(&candidate) {
            return candidate;
        }

        let (stem, ext) = split_extension(file_name);
        let mut suffixed = dir.join(format!("{}_p{:03}{}", stem, page_no, ext));
        let mut counter = 2;
        while self.is_taken(&suffixed) {
            suffixed = dir.join(format!("{}_p{:03}_{}{}", stem, page_no, counter, ext));
            counter += 1;
        }
        suffixed
    }

    fn is_taken(&self, path: &Path) -> bool {
        self.produced.contains(path) || path.exists()
    }

    fn save<D: SourceDocument + ?Sized>(
        &mut self,
        group: &LogicalGroup,
        status: GroupStatus,
        file_name: &str,
        doc: &D,
    ) -> Result<PathBuf> {
        let dir = self.ctx.dir_for(status);
        ensure_dir(&dir).map_err(|e| SplitError::write(dir.display().to_string(), e))?;

        let dest = self.unique_destination(&dir, file_name, group.span.first_page_no());
        let indices: Vec<usize> = group.span.indices().collect();
        doc.write_pages(&indices, &dest)?;

        self.produced.insert(dest.clone());
        Ok(dest.canonicalize().unwrap_or(dest))
    }

    /// Write the group's pages; failures degrade the artifact to ERROR instead of bubbling up.
    pub fn write<D: SourceDocument + ?Sized>(&mut self, group: &LogicalGroup, doc: &D) -> Artifact {
        let file_name = self.file_name(group);
        let mut notes: Vec<String> = group.errors.clone();

        match self.save(group, group.status, &file_name, doc) {
            Ok(path) => {
                match group.status {
                    GroupStatus::Fallback => notes.push(NOTE_FALLBACK.to_string()),
                    GroupStatus::Orphan => notes.push(NOTE_ORPHAN.to_string()),
                    GroupStatus::Ok | GroupStatus::Error => {}
                }
                Artifact {
                    status: group.status,
                    file_name: file_name_of(&path),
                    path: Some(path),
                    note: notes.join("; "),
                }
            }
            Err(e) => {
                tracing::error!("❌ Pages {}: {}", group.span, e);
                notes.push(e.to_string());

                // 已經在 errors/ 的組不再重試
                if group.status == GroupStatus::Ok {
                    let error_name = self.error_file_name(group);
                    match self.save(group, GroupStatus::Error, &error_name, doc) {
                        Ok(path) => {
                            return Artifact {
                                status: GroupStatus::Error,
                                file_name: file_name_of(&path),
                                path: Some(path),
                                note: notes.join("; "),
                            }
                        }
                        Err(retry) => {
                            tracing::error!("❌ Pages {}: fallback copy failed: {}", group.span, retry);
                            notes.push(retry.to_string());
                        }
                    }
                }

                Artifact {
                    status: GroupStatus::Error,
                    file_name: None,
                    path: None,
                    note: notes.join("; "),
                }
            }
        }
    }
}

fn file_name_of(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(pos) if pos > 0 => file_name.split_at(pos),
        _ => (file_name, ""),
    }
}

/// 只保留字母、數字與 `.-_`，空白轉為底線
pub fn clean_filename(text: &str) -> String {
    let cleaned: String = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    cleaned.chars().take(120).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Markers, PageSpan};
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// 以純文字檔模擬 PDF 寫出，可指定失敗的目錄
    struct FakeDocument {
        pages: usize,
        fail_under: Option<PathBuf>,
        writes: RefCell<Vec<(Vec<usize>, PathBuf)>>,
    }

    impl FakeDocument {
        fn new(pages: usize) -> Self {
            Self {
                pages,
                fail_under: None,
                writes: RefCell::new(Vec::new()),
            }
        }
    }

    impl SourceDocument for FakeDocument {
        fn page_count(&self) -> usize {
            self.pages
        }

        fn page_text(&self, _index: usize) -> Result<String> {
            Ok(String::new())
        }

        fn write_pages(&self, indices: &[usize], dest: &Path) -> Result<()> {
            if let Some(dir) = &self.fail_under {
                if dest.starts_with(dir) {
                    return Err(SplitError::write(dest.display().to_string(), "disk full"));
                }
            }
            std::fs::write(dest, format!("{:?}", indices))?;
            self.writes
                .borrow_mut()
                .push((indices.to_vec(), dest.to_path_buf()));
            Ok(())
        }
    }

    fn month_names() -> Vec<String> {
        DEFAULT_MONTH_NAMES.iter().map(|m| m.to_string()).collect()
    }

    fn ok_group(start: usize, end: usize, month: u32, id: &str) -> LogicalGroup {
        LogicalGroup {
            span: PageSpan { start, end },
            markers: Some(Markers {
                year: 2026,
                month,
                employee_id: id.to_string(),
            }),
            status: GroupStatus::Ok,
            errors: Vec::new(),
        }
    }

    #[test]
    fn test_file_names_by_status() {
        let ctx = RunContext::with_timestamp("/tmp/unused", "20260101_000000");
        let names = month_names();
        let writer = ArtifactWriter::new(&ctx, &names, "pdf");

        assert_eq!(
            writer.file_name(&ok_group(0, 1, 2, "756.9999.9999.00")),
            "2026-février-756.9999.9999.00.pdf"
        );
        assert_eq!(
            writer.file_name(&LogicalGroup::open(4, None, GroupStatus::Fallback)),
            "fiche_page_005.pdf"
        );
        assert_eq!(
            writer.file_name(&LogicalGroup::open(0, None, GroupStatus::Orphan)),
            "orphan_page_001.pdf"
        );
        assert_eq!(
            writer.file_name(&LogicalGroup::failed(9, "x".to_string())),
            "error_page_010.pdf"
        );

        let mut degraded = ok_group(2, 4, 1, "756.1234.5678.97");
        degraded.mark_error("bad stream");
        assert_eq!(writer.file_name(&degraded), "error_slip_p003.pdf");
    }

    #[test]
    fn test_duplicate_ok_name_gets_page_suffix() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = RunContext::new(temp_dir.path());
        let names = month_names();
        let doc = FakeDocument::new(4);
        let mut writer = ArtifactWriter::new(&ctx, &names, "pdf");

        let first = writer.write(&ok_group(0, 1, 1, "756.1234.5678.97"), &doc);
        let second = writer.write(&ok_group(2, 3, 1, "756.1234.5678.97"), &doc);

        assert_eq!(
            first.file_name.as_deref(),
            Some("2026-janvier-756.1234.5678.97.pdf")
        );
        assert_eq!(
            second.file_name.as_deref(),
            Some("2026-janvier-756.1234.5678.97_p003.pdf")
        );
        assert_ne!(first.path, second.path);
        assert!(first.path.unwrap().exists());
        assert!(second.path.unwrap().exists());

        let writes = doc.writes.borrow();
        assert_eq!(writes[0].0, vec![0, 1]);
        assert_eq!(writes[1].0, vec![2, 3]);
    }

    #[test]
    fn test_non_ok_groups_go_to_errors_tree() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = RunContext::new(temp_dir.path());
        let names = month_names();
        let doc = FakeDocument::new(1);
        let mut writer = ArtifactWriter::new(&ctx, &names, "pdf");

        let artifact = writer.write(&LogicalGroup::open(0, None, GroupStatus::Orphan), &doc);

        assert_eq!(artifact.status, GroupStatus::Orphan);
        assert_eq!(artifact.note, NOTE_ORPHAN);
        let path = artifact.path.unwrap();
        assert!(path.starts_with(ctx.err_dir().canonicalize().unwrap()));
    }

    #[test]
    fn test_write_failure_forces_error_and_copies_to_errors() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = RunContext::new(temp_dir.path());
        let names = month_names();
        let mut doc = FakeDocument::new(2);
        doc.fail_under = Some(ctx.ok_dir());
        let mut writer = ArtifactWriter::new(&ctx, &names, "pdf");

        let artifact = writer.write(&ok_group(0, 1, 3, "756.1234.5678.97"), &doc);

        assert_eq!(artifact.status, GroupStatus::Error);
        assert_eq!(artifact.file_name.as_deref(), Some("error_slip_p001.pdf"));
        assert!(artifact.note.contains("disk full"));
    }

    #[test]
    fn test_write_failure_everywhere_leaves_no_path() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = RunContext::new(temp_dir.path());
        let names = month_names();
        let mut doc = FakeDocument::new(1);
        doc.fail_under = Some(temp_dir.path().to_path_buf());
        let mut writer = ArtifactWriter::new(&ctx, &names, "pdf");

        let artifact = writer.write(&LogicalGroup::open(0, None, GroupStatus::Fallback), &doc);

        assert_eq!(artifact.status, GroupStatus::Error);
        assert!(artifact.file_name.is_none());
        assert!(artifact.path.is_none());
        assert!(artifact.note.contains("disk full"));
    }

    #[test]
    fn test_clean_filename() {
        assert_eq!(clean_filename(" Jean  Dupont "), "Jean_Dupont");
        assert_eq!(clean_filename("756.1234.5678.97"), "756.1234.5678.97");
        assert_eq!(clean_filename("a/b\\c"), "abc");
        assert_eq!(clean_filename("août"), "août");
    }
}
