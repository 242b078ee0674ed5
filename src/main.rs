use clap::Parser;
use payslip_split::utils::error::ErrorSeverity;
use payslip_split::utils::{logger, validation::Validate};
use payslip_split::{CliConfig, RunContext, SplitEngine};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();
    logger::init_cli_logger(config.verbose);

    // 驗證配置
    let settings = match config.validate().and_then(|_| config.settings()) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    // 本次執行的時間戳在此建立一次，日誌與輸出共用
    let ctx = RunContext::new(settings.root.clone());

    tracing::info!("Starting payslip-split");
    tracing::debug!("Settings: {:?}", settings);

    let engine = Arc::new(SplitEngine::new(settings)?.with_console(config.verbose));
    let cancel = CancellationToken::new();
    let worker = engine.spawn(ctx, config.source.clone(), cancel.clone());

    let mut progress = worker.progress();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("received SIGINT, stopping after the current page");
                cancel.cancel();
            }
        }
    });
    tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let p = *progress.borrow_and_update();
            tracing::debug!("Traitement… {}/{}", p.current, p.total);
        }
    });

    match worker.wait().await {
        Ok(report) => {
            let summary = &report.summary;
            if config.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "{} : Fichiers OK: {} | Fallback pages: {} | Orphans: {} | Erreurs: {}",
                    if report.cancelled { "Interrompu" } else { "Terminé" },
                    summary.ok_files,
                    summary.fallback_pages,
                    summary.orphans,
                    summary.errors
                );
                println!("📁 Output: {}", report.ok_dir.display());
                println!("🧨 Errors: {}", report.err_dir.display());
                println!("🧾 CSV: {}", report.csv_path.display());
                println!("📝 Log: {}", report.log_path.display());
            }
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Split failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
