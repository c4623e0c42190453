use crate::{
    MeasureConstraints,
    MeasurementProvider,
    MeasurementResult,
    ProviderError,
};
use eyre::{
    Context as _,
    Result,
};
use futures::{
    future::BoxFuture,
    FutureExt as _,
};
use std::process::Stdio;
use tokio::process::Command;

/// Runs the `speedtest-cli` executable (speedtest.net) and reads its `--json` report.
///
/// The child process is killed when the measurement future is dropped, so racing it against a
/// timer does not leave stray speed tests behind.
#[derive(Debug, Clone)]
pub struct SpeedtestCli {
    command: String,
    share: bool,
    secure: bool,
}

impl SpeedtestCli {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            share: false,
            secure: false,
        }
    }

    /// Ask speedtest.net for a shareable result image. Its URL ends up in the `share` key.
    pub fn with_share(mut self, share: bool) -> Self {
        self.share = share;
        self
    }

    /// Talk to speedtest.net over HTTPS.
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    fn arguments(&self, constraints: &MeasureConstraints) -> Vec<String> {
        let mut args = vec!["--json".to_string()];
        if self.share {
            args.push("--share".to_string());
        }
        if self.secure {
            args.push("--secure".to_string());
        }
        match constraints.threads {
            None => {}
            Some(1) => args.push("--single".to_string()),
            Some(threads) => {
                warn!(threads, "speedtest-cli only supports a single connection or its default; using the default")
            }
        }
        for server in &constraints.servers {
            args.push("--server".to_string());
            args.push(server.to_string());
        }
        args
    }

    async fn run(&self, constraints: MeasureConstraints) -> Result<MeasurementResult> {
        // A missing executable is a setup problem, not a transient measurement failure.
        let program = which::which(&self.command)
            .wrap_err_with(|| format!("Speed test executable {:?} not found", self.command))?;
        let args = self.arguments(&constraints);
        debug!(program = %program.display(), ?args, "Starting speed test");

        let output = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .wrap_err_with(|| format!("Failed to run {:?}", program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProviderError::from_failed_run(output.status, &stderr).into());
        }

        Ok(MeasurementResult::parse(&output.stdout)?)
    }
}

impl Default for SpeedtestCli {
    fn default() -> Self {
        Self::new("speedtest-cli")
    }
}

impl MeasurementProvider for SpeedtestCli {
    fn measure(&self, constraints: MeasureConstraints) -> BoxFuture<'_, Result<MeasurementResult>> {
        self.run(constraints).boxed()
    }

    fn name(&self) -> &'static str {
        "speedtest.net"
    }
}
