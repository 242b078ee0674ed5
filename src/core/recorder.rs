use crate::core::context::ensure_dir;
use crate::core::writer::Artifact;
use crate::domain::model::{GroupStatus, LogicalGroup, OutcomeRecord, RunSummary};
use crate::utils::error::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub const CSV_HEADER: [&str; 8] = [
    "status",
    "year",
    "month",
    "avs",
    "pages",
    "output_file",
    "output_path",
    "note",
];

/// Placeholder for unknown scalar fields, keeps the column count constant.
pub const UNKNOWN: &str = "-";

#[derive(Debug, Default)]
pub struct RunRecorder {
    records: Vec<OutcomeRecord>,
}

impl RunRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 每個邏輯組一筆，依頁序加入
    pub fn record(&mut self, group: &LogicalGroup, artifact: Artifact) -> &OutcomeRecord {
        let markers = group.markers.as_ref();
        self.records.push(OutcomeRecord {
            status: artifact.status,
            year: markers.map(|m| m.year),
            month: markers.map(|m| m.month),
            employee_id: markers.map(|m| m.employee_id.clone()),
            pages: group.span,
            output_file: artifact.file_name,
            output_path: artifact.path,
            note: artifact.note,
        });
        &self.records[self.records.len() - 1]
    }

    pub fn records(&self) -> &[OutcomeRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<OutcomeRecord> {
        self.records
    }

    pub fn summary(&self) -> RunSummary {
        self.records
            .iter()
            .fold(RunSummary::default(), |mut summary, record| {
                let pages = record.pages.page_count();
                summary.pages += pages;
                match record.status {
                    GroupStatus::Ok => summary.ok_files += 1,
                    GroupStatus::Fallback => summary.fallback_pages += pages,
                    GroupStatus::Orphan => {
                        summary.fallback_pages += pages;
                        summary.orphans += pages;
                    }
                    GroupStatus::Error => summary.errors += 1,
                }
                summary
            })
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        write_csv(&self.records, writer)
    }

    pub fn export_csv(&self, path: &Path) -> Result<()> {
        export_csv(&self.records, path)
    }
}

pub fn write_csv<W: Write>(records: &[OutcomeRecord], writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(writer);

    csv_writer.write_record(CSV_HEADER)?;
    for record in records {
        csv_writer.write_record(csv_row(record))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// `;`-delimited UTF-8 export, parent directory created as needed
pub fn export_csv(records: &[OutcomeRecord], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let file = File::create(path)?;
    write_csv(records, file)?;
    tracing::debug!("CSV export written to {}", path.display());
    Ok(())
}

fn or_unknown<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn csv_row(record: &OutcomeRecord) -> [String; 8] {
    [
        record.status.to_string(),
        or_unknown(record.year),
        or_unknown(record.month.map(|m| format!("{:02}", m))),
        or_unknown(record.employee_id.as_deref()),
        record.pages.to_string(),
        or_unknown(record.output_file.as_deref()),
        or_unknown(record.output_path.as_ref().map(|p| p.display())),
        record.note.clone(),
    ]
}
