use std::path::Path;
use tracing::Subscriber;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

fn default_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("payslip_split=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("payslip_split=info"))
    }
}

pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// 單次執行的純文字日誌 (logs/split_<ts>.log)，可選擇同時輸出到主控台
///
/// `console` is `None` for file-only logging, `Some(verbose)` to echo to the
/// console as well. The file is written synchronously, so it is complete as
/// soon as the run returns.
pub fn run_subscriber(
    log_path: &Path,
    console: Option<bool>,
) -> std::io::Result<impl Subscriber + Send + Sync + 'static> {
    let log_dir = log_path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = log_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "split.log".to_string());

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(log_dir)
        .map_err(std::io::Error::other)?;

    let verbose = console.unwrap_or(false);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(false)
        .with_filter(default_filter(verbose));

    let console_layer = console.map(|verbose| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .with_filter(default_filter(verbose))
    });

    Ok(tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer))
}
