use crate::adapters::pdf::PdfSource;
use crate::config::SplitSettings;
use crate::core::context::RunContext;
use crate::core::extractor::MarkerExtractor;
use crate::core::grouping::Grouper;
use crate::core::recorder::{export_csv, RunRecorder};
use crate::core::writer::ArtifactWriter;
use crate::domain::model::{GroupStatus, LogicalGroup, OutcomeRecord, PageScan, RunReport};
use crate::domain::ports::SourceDocument;
use crate::utils::error::{Result, SplitError};
use crate::utils::logger;
use crate::utils::validation::Validate;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

pub struct SplitEngine {
    settings: SplitSettings,
    extractor: MarkerExtractor,
    /// 執行日誌是否同時輸出到主控台 (`Some(verbose)`)
    console: Option<bool>,
}

impl SplitEngine {
    pub fn new(settings: SplitSettings) -> Result<Self> {
        settings.validate()?;
        let extractor =
            MarkerExtractor::new(&settings.period_pattern, &settings.employee_id_pattern)?;
        Ok(Self {
            settings,
            extractor,
            console: None,
        })
    }

    /// Echo the run log to the console as well as `logs/split_<ts>.log`.
    pub fn with_console(mut self, verbose: bool) -> Self {
        self.console = Some(verbose);
        self
    }

    pub fn settings(&self) -> &SplitSettings {
        &self.settings
    }

    fn scan_page<D: SourceDocument + ?Sized>(&self, doc: &D, index: usize) -> PageScan {
        match doc.page_text(index) {
            Ok(text) => match self.extractor.extract(&text) {
                Some(markers) => PageScan::Marked(markers),
                None => PageScan::Unmarked,
            },
            Err(e) => {
                tracing::error!("❌ Page {}: {}", index + 1, e);
                PageScan::Failed(e.to_string())
            }
        }
    }

    /// 單次循序掃描：逐頁分類、組關閉即寫出並記錄
    ///
    /// Cancellation is checked between pages; the group still open at that
    /// point is closed and written so every processed page keeps its record.
    pub fn run<D, F>(
        &self,
        doc: &D,
        ctx: &RunContext,
        mut progress: F,
        cancel: &CancellationToken,
    ) -> RunReport
    where
        D: SourceDocument + ?Sized,
        F: FnMut(usize, usize),
    {
        let total = doc.page_count();

        tracing::info!("📌 Pages: {}", total);
        tracing::info!("📁 OK: {}", ctx.ok_dir().display());
        tracing::info!("🧨 ERRORS: {}", ctx.err_dir().display());
        tracing::info!(
            "🧩 Multi-pages: {}",
            if self.settings.group_multipage { "ON" } else { "OFF" }
        );

        let mut grouper = Grouper::new(self.settings.group_multipage);
        let mut writer = ArtifactWriter::new(ctx, &self.settings.month_names, &self.settings.extension);
        let mut recorder = RunRecorder::new();
        let mut cancelled = false;

        for index in 0..total {
            if cancel.is_cancelled() {
                tracing::warn!("⏹️ Cancelled before page {}/{}", index + 1, total);
                cancelled = true;
                break;
            }

            let scan = self.scan_page(doc, index);
            if let Some(group) = grouper.push(scan) {
                Self::emit(group, doc, &mut writer, &mut recorder);
            }
            progress(index + 1, total);
        }

        if let Some(group) = grouper.finish() {
            Self::emit(group, doc, &mut writer, &mut recorder);
        }

        let summary = recorder.summary();
        tracing::info!("📦 Fichiers OK: {}", summary.ok_files);
        tracing::info!("⚠️ Pages fallback (errors/orphans): {}", summary.fallback_pages);
        tracing::info!("🧩 Orphans: {}", summary.orphans);
        tracing::info!("❌ Erreurs techniques: {}", summary.errors);

        RunReport {
            timestamp: ctx.timestamp.clone(),
            ok_dir: ctx.ok_dir(),
            err_dir: ctx.err_dir(),
            csv_path: ctx.csv_path(),
            log_path: ctx.log_path(),
            total_pages: total,
            cancelled,
            summary,
            records: recorder.into_records(),
        }
    }

    fn emit<D: SourceDocument + ?Sized>(
        group: LogicalGroup,
        doc: &D,
        writer: &mut ArtifactWriter<'_>,
        recorder: &mut RunRecorder,
    ) {
        let artifact = writer.write(&group, doc);
        let record = recorder.record(&group, artifact);
        let file = record.output_file.as_deref().unwrap_or("-");

        match record.status {
            GroupStatus::Ok => tracing::info!("✅ Fiche pages {} -> OK -> {}", record.pages, file),
            GroupStatus::Fallback | GroupStatus::Orphan => tracing::warn!(
                "⚠️ Pages {} -> {} -> errors -> {}",
                record.pages,
                record.status,
                file
            ),
            GroupStatus::Error => tracing::error!(
                "❌ Pages {} -> ERROR -> {} ({})",
                record.pages,
                file,
                record.note
            ),
        }
    }

    /// 開啟來源 PDF、建立目錄、執行並匯出 CSV
    ///
    /// Only a source that cannot be opened (or an unwritable root) fails the run.
    /// Events emitted during the run go to `ctx.log_path()`.
    pub fn split_file<F>(
        &self,
        ctx: &RunContext,
        source: &Path,
        progress: F,
        cancel: &CancellationToken,
    ) -> Result<RunReport>
    where
        F: FnMut(usize, usize),
    {
        let doc = PdfSource::open(source)?;
        ctx.prepare()?;
        let subscriber = logger::run_subscriber(&ctx.log_path(), self.console)?;

        tracing::subscriber::with_default(subscriber, || -> Result<RunReport> {
            tracing::info!("📄 Fichier: {}", source.display());
            let report = self.run(&doc, ctx, progress, cancel);
            export_csv(&report.records, &report.csv_path)?;
            tracing::info!("🧾 CSV: {}", report.csv_path.display());
            tracing::info!("📝 Log: {}", report.log_path.display());
            Ok(report)
        })
    }

    /// Run on a blocking worker thread, publishing progress on a watch channel.
    pub fn spawn(
        self: Arc<Self>,
        ctx: RunContext,
        source: PathBuf,
        cancel: CancellationToken,
    ) -> SplitWorker {
        let (tx, rx) = watch::channel(Progress::default());
        let handle = tokio::task::spawn_blocking(move || {
            self.split_file(
                &ctx,
                &source,
                |current, total| {
                    // receiver gone only means nobody is watching
                    let _ = tx.send(Progress { current, total });
                },
                &cancel,
            )
        });

        SplitWorker {
            handle,
            progress: rx,
        }
    }
}

pub struct SplitWorker {
    handle: JoinHandle<Result<RunReport>>,
    progress: watch::Receiver<Progress>,
}

impl SplitWorker {
    pub fn progress(&self) -> watch::Receiver<Progress> {
        self.progress.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn wait(self) -> Result<RunReport> {
        self.handle.await.map_err(|e| SplitError::WorkerError {
            message: e.to_string(),
        })?
    }
}

/// Split `source_path` under the current working directory with default settings.
pub fn run<F>(source_path: &Path, group_multipage: bool, progress_cb: F) -> Result<Vec<OutcomeRecord>>
where
    F: FnMut(usize, usize),
{
    let settings = SplitSettings {
        group_multipage,
        ..SplitSettings::default()
    };
    let engine = SplitEngine::new(settings)?;
    let ctx = RunContext::new(engine.settings().root.clone());
    let report = engine.split_file(&ctx, source_path, progress_cb, &CancellationToken::new())?;
    Ok(report.records)
}
