use std::process::ExitStatus;

/// A measurement that could not be taken for reasons outside of this process, e.g. an unreachable
/// network or a benchmark server answering garbage. Callers treat these as transient.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("Cannot retrieve speedtest configuration: {0}")]
    ConfigRetrieval(String),
    #[error("No matched servers: {0}")]
    NoServers(String),
    #[error("Unable to connect to servers to test latency: {0}")]
    Unreachable(String),
    #[error("Malformed speed test response: {0}")]
    MalformedResponse(String),
    #[error("Speed test exited with {status}: {message}")]
    Failed { status: String, message: String },
}

impl ProviderError {
    /// Maps the diagnostics of a failed `speedtest-cli` run to an error kind.
    pub(crate) fn from_failed_run(status: ExitStatus, stderr: &str) -> Self {
        let message = stderr
            .lines()
            .map(str::trim)
            .rfind(|line| !line.is_empty())
            .map(|line| line.trim_start_matches("ERROR:").trim().to_string())
            .unwrap_or_else(|| "no diagnostics".to_string());

        if stderr.contains("No matched servers") {
            Self::NoServers(message.trim_start_matches("No matched servers:").trim().to_string())
        } else if stderr.contains("Cannot retrieve speedtest") {
            Self::ConfigRetrieval(message)
        } else if stderr.contains("Unable to connect to servers") {
            Self::Unreachable(message)
        } else {
            Self::Failed {
                status: status.to_string(),
                message,
            }
        }
    }
}
