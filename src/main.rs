use clap::Parser;
use color_eyre::Result;
use speedlog::{
    init_errors,
    init_logging,
    MeasurementLoop,
};
use speedlog_config::{
    Args,
    Settings,
};
use speedlog_provider::SpeedtestCli;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_errors()?;
    let args = Args::parse();
    let log_path = init_logging(args.verbose)?;
    info!(log = %log_path.display(), "Starting speedlog");

    let settings = Settings::new(&args)?;
    let provider = SpeedtestCli::new(settings.provider.command.clone())
        .with_share(settings.provider.share)
        .with_secure(settings.provider.secure);

    let mut measurements = MeasurementLoop::new(settings, provider);
    measurements.print_banner();

    // Rows are written synchronously between await points, so stopping here never leaves a
    // partial row behind.
    tokio::select! {
        result = measurements.run() => result,
        signal = tokio::signal::ctrl_c() => {
            println!();
            signal?;
            info!("Interrupted, exiting");
            Ok(())
        }
    }
}
