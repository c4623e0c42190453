use crate::{
    deadline,
    format,
    progress::{
        Banner,
        Progress,
    },
    row::Row,
    store::LogStore,
};
use chrono::Local;
use color_eyre::Result;
use speedlog_config::Settings;
use speedlog_provider::{
    MeasureConstraints,
    MeasurementProvider,
    ProviderError,
};
use tokio::time::sleep;

/// What a single measurement cycle wrote to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Measured(Row),
    /// The measurement timed out or the provider could not measure. The row carries the note.
    Failed { row: Row, note: String },
}

/// Measures, records and sleeps, forever.
///
/// Timeouts and [`ProviderError`]s are recorded as failure rows and the loop goes on. Any other
/// error (an unwritable log, fields that do not match the provider's results, a missing speed test
/// executable) ends the loop.
pub struct MeasurementLoop<P> {
    settings: Settings,
    provider: P,
    store: LogStore,
    progress: Progress,
}

impl<P: MeasurementProvider> MeasurementLoop<P> {
    pub fn new(settings: Settings, provider: P) -> Self {
        let store = LogStore::new(settings.output.clone());
        Self {
            settings,
            provider,
            store,
            progress: Progress::new(),
        }
    }

    /// Number of measurements attempted so far.
    pub fn measurements(&self) -> u64 {
        self.progress.measurements()
    }

    pub fn print_banner(&mut self) {
        println!(
            "{}",
            Banner {
                provider: self.provider.name(),
                settings: &self.settings,
            }
        );
        self.print_progress();
    }

    /// Runs cycles separated by the configured interval until an unrecoverable error occurs.
    pub async fn run(&mut self) -> Result<()> {
        info!(
            provider = self.provider.name(),
            interval = ?self.settings.interval,
            timeout = ?self.settings.timeout,
            output = %self.store.path().display(),
            "Starting measurements"
        );
        loop {
            self.run_cycle().await?;
            sleep(self.settings.interval).await;
        }
    }

    /// One measurement under the configured timeout, recorded as exactly one row.
    #[instrument(level = "debug", skip(self))]
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome> {
        self.store.ensure_header(&self.settings.fields)?;
        self.progress.begin_measurement();

        let attempt = deadline::within(
            self.settings.timeout,
            self.provider.measure(MeasureConstraints::default()),
        )
        .await;

        // The provider call is finished or cancelled here; nothing below can be interrupted by
        // the deadline.
        let note = match attempt {
            Ok(Ok(result)) => {
                let row = format::success_row(&result, &self.settings.fields)?;
                self.store.append_row(&row)?;
                debug!(
                    download = ?result.download(),
                    upload = ?result.upload(),
                    ping = ?result.ping(),
                    "Measurement recorded"
                );
                self.progress.measured(&result);
                self.print_progress();
                return Ok(CycleOutcome::Measured(row));
            }
            Ok(Err(err)) => match err.downcast::<ProviderError>() {
                Ok(provider_error) => provider_error.to_string(),
                Err(err) => return Err(err),
            },
            Err(elapsed) => elapsed.to_string(),
        };

        warn!(%note, "Measurement failed");
        let row = format::failure_row(&self.settings.fields, &note, Local::now());
        self.store.append_row(&row)?;
        self.progress.failed(&note);
        self.print_progress();
        Ok(CycleOutcome::Failed { row, note })
    }

    fn print_progress(&mut self) {
        if let Err(e) = self.progress.print() {
            debug!("Failed to print progress: {e}");
        }
    }
}
