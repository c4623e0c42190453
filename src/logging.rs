use eyre::{
    Context as _,
    Result,
};
use speedlog_config::get_data_dir;
use std::{
    fs::OpenOptions,
    path::PathBuf,
    sync::Mutex,
};
use tracing_subscriber::{
    fmt,
    prelude::*,
    EnvFilter,
};

const LOG_FILE: &str = concat!(env!("CARGO_PKG_NAME"), ".log");

/// Sends tracing output to `<data dir>/speedlog.log`; stdout belongs to the progress line.
///
/// `RUST_LOG` overrides the level chosen by `verbose`. Returns the path of the log file.
pub fn init_logging(verbose: bool) -> Result<PathBuf> {
    let directory = get_data_dir();
    std::fs::create_dir_all(&directory).context("Failed to create data directory")?;
    let log_path = directory.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .wrap_err_with(|| format!("Failed to open log file {:?}", log_path))?;

    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "speedlog={level},speedlog_config={level},speedlog_provider={level}"
        ))
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_filter(filter),
        )
        .with(tracing_error::ErrorLayer::default())
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    Ok(log_path)
}
