//! Console output: the startup banner and the single, continuously overwritten status line.

use crate::format::{
    megabits,
    render,
};
use speedlog_config::Settings;
use speedlog_provider::MeasurementResult;
use std::{
    fmt,
    io::{
        self,
        Write as _,
    },
    time::Duration,
};
use tokio::time::Instant;

pub struct Banner<'a> {
    pub provider: &'a str,
    pub settings: &'a Settings,
}

impl fmt::Display for Banner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "### Running automatic Internet Speedtest Measurements.")?;
        writeln!(f, "### Using {} as provider", self.provider)?;
        writeln!(
            f,
            "##    Interval: {}",
            humantime::format_duration(self.settings.interval)
        )?;
        writeln!(f, "##    Timeout: {}", humantime::format_duration(self.settings.timeout))?;
        writeln!(f, "##    Output: {}", self.settings.output.display())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Latest {
    Nothing,
    Measured { down: String, up: String, ping: String },
    Failed(String),
}

/// Running totals shown on the status line.
#[derive(Debug)]
pub struct Progress {
    started: Instant,
    measurements: u64,
    latest: Latest,
    printed_width: usize,
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            measurements: 0,
            latest: Latest::Nothing,
            printed_width: 0,
        }
    }

    /// Number of measurements started so far, including failed ones.
    pub fn measurements(&self) -> u64 {
        self.measurements
    }

    pub fn begin_measurement(&mut self) {
        self.measurements += 1;
    }

    pub fn measured(&mut self, result: &MeasurementResult) {
        let speed = |value: Option<f64>| value.map(megabits).unwrap_or_else(|| "?".to_string());
        self.latest = Latest::Measured {
            down: speed(result.download()),
            up: speed(result.upload()),
            ping: result.get("ping").map(render).unwrap_or_else(|| "?".to_string()),
        };
    }

    pub fn failed(&mut self, note: &str) {
        self.latest = Latest::Failed(note.to_string());
    }

    pub fn line(&self) -> String {
        let current = match &self.latest {
            Latest::Nothing => "Current: down=0 up=0 ping=-1".to_string(),
            Latest::Measured { down, up, ping } => {
                format!("Current: down={down}Mbit/s up={up}Mbit/s ping={ping}s")
            }
            Latest::Failed(note) => format!("Failed: {note}"),
        };
        format!(
            "{current} ## Runtime={} Measurements={}",
            format_runtime(self.started.elapsed()),
            self.measurements
        )
    }

    /// Overwrites the previous status line in place.
    pub fn print(&mut self) -> io::Result<()> {
        let line = self.line();
        let width = line.chars().count();
        let padding = self.printed_width.saturating_sub(width);
        self.printed_width = width;

        let mut stdout = io::stdout().lock();
        write!(stdout, "\r{line}{:padding$}", "")?;
        stdout.flush()
    }
}

/// `H:MM:SS`, hours are not wrapped into days.
pub fn format_runtime(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use speedlog_config::FieldSelector;

    #[test]
    fn runtime_format() {
        assert_eq!(format_runtime(Duration::ZERO), "0:00:00");
        assert_eq!(format_runtime(Duration::from_secs(3 * 60 + 7)), "0:03:07");
        assert_eq!(format_runtime(Duration::from_secs(26 * 3600 + 61)), "26:01:01");
    }

    #[test]
    fn banner_lists_settings() {
        let settings = Settings {
            interval: Duration::from_secs(300),
            timeout: Duration::from_secs(90),
            output: "speedtest.csv".into(),
            fields: vec![FieldSelector::notes()],
            provider: Default::default(),
        };
        let banner = Banner {
            provider: "speedtest.net",
            settings: &settings,
        }
        .to_string();
        assert_eq!(
            banner,
            "### Running automatic Internet Speedtest Measurements.\n\
             ### Using speedtest.net as provider\n\
             ##    Interval: 5m\n\
             ##    Timeout: 1m 30s\n\
             ##    Output: speedtest.csv\n"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn line_tracks_latest_outcome() {
        let mut progress = Progress::new();
        assert_eq!(progress.line(), "Current: down=0 up=0 ping=-1 ## Runtime=0:00:00 Measurements=0");

        progress.begin_measurement();
        let result = MeasurementResult::try_from(json!({
            "timestamp": "2023-01-01T12:00:00.000001Z",
            "download": 93_847_562.3,
            "upload": 38_271_612.0,
            "ping": 14.372,
        }))
        .unwrap();
        progress.measured(&result);
        tokio::time::advance(Duration::from_secs(65)).await;
        assert_eq!(
            progress.line(),
            "Current: down=93.85Mbit/s up=38.27Mbit/s ping=14.372s ## Runtime=0:01:05 Measurements=1"
        );

        progress.begin_measurement();
        progress.failed("Speed test timed out after 10s");
        assert_eq!(
            progress.line(),
            "Failed: Speed test timed out after 10s ## Runtime=0:01:05 Measurements=2"
        );
    }

    #[test]
    fn ping_matches_the_logged_value() {
        let result = MeasurementResult::try_from(json!({
            "timestamp": "2023-01-01T12:00:00Z",
            "download": 1_000_000.0,
            "upload": 1_000_000.0,
            "ping": 14.0,
        }))
        .unwrap();
        let logged = crate::format::success_row(&result, &[FieldSelector::key("ping")]).unwrap();
        assert_eq!(logged[0].as_str(), "14.0");

        let mut progress = Progress::new();
        progress.measured(&result);
        assert!(
            progress.line().starts_with("Current: down=1.00Mbit/s up=1.00Mbit/s ping=14.0s ##"),
            "{}",
            progress.line()
        );
    }
}
