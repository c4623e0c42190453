//! # Speed measurement providers
//!
//! A provider performs one complete measurement cycle (server discovery, latency, download and
//! upload) and hands back the raw result record. Providers do not format, store or retry anything.
//!
//! Failures come back as [`eyre::Report`]s. Reports that wrap a [`ProviderError`] describe a
//! measurement that could not be taken right now; every other error is a setup problem.

#[macro_use]
extern crate tracing;

mod error;
mod result;
mod speedtest_cli;

pub use error::ProviderError;
use eyre::Result;
use futures::future::BoxFuture;
pub use result::MeasurementResult;
pub use speedtest_cli::SpeedtestCli;

/// Optional restrictions for a single measurement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeasureConstraints {
    /// Number of parallel connections, `None` for the provider's default.
    pub threads: Option<usize>,
    /// Candidate server ids, empty for full server discovery.
    pub servers: Vec<u64>,
}

/// Something that can measure the speed of the internet connection.
pub trait MeasurementProvider {
    /// Run one measurement. Dropping the returned future cancels it.
    fn measure(&self, constraints: MeasureConstraints) -> BoxFuture<'_, Result<MeasurementResult>>;

    /// Name of the benchmarking service, used in the startup banner.
    fn name(&self) -> &'static str;
}
