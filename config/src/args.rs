use clap::Parser;
use std::path::PathBuf;

/// Periodic internet speed measurements, appended to a CSV log.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version = version(), about, long_about = None)]
pub struct Args {
    /// YAML configuration file. Defaults to `config.yaml` in the config directory.
    #[clap(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Seconds to wait after one measurement finished before starting the next.
    #[clap(long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Seconds a single measurement may take before it is recorded as failed.
    #[clap(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// CSV file the measurements are appended to.
    #[clap(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Log at debug level.
    #[clap(long, short, action)]
    pub verbose: bool,
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            if let Some(interval) = self.interval {
                cache.insert("interval".to_string(), interval.into());
            }
            if let Some(timeout) = self.timeout {
                cache.insert("timeout".to_string(), timeout.into());
            }
            if let Some(output) = &self.output {
                cache.insert("output".to_string(), output.display().to_string().into());
            }
            Ok(cache)
        }
    }
}

pub fn version() -> String {
    let author = clap::crate_authors!();
    let config_dir_path = crate::get_config_dir().display().to_string();
    let data_dir_path = crate::get_data_dir().display().to_string();

    format!(
        "{}

Authors: {author}

Config directory: {config_dir_path}
Data directory: {data_dir_path}",
        clap::crate_version!()
    )
}
