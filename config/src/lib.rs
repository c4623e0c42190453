#[macro_use]
extern crate tracing;

mod app_config;
mod args;
mod field;

pub use app_config::{
    get_config_dir,
    get_data_dir,
    PROJECT_NAME,
};
pub use args::Args;
use color_eyre::Result;
use eyre::{
    bail,
    Context as _,
};
pub use field::{
    FieldSelector,
    KnownField,
    NOTES_FIELD,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    path::PathBuf,
    time::Duration,
};

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");

/// How the speed test executable is invoked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_command")]
    pub command: String,
    #[serde(default = "default_share")]
    pub share: bool,
    #[serde(default)]
    pub secure: bool,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            command: default_command(),
            share: default_share(),
            secure: false,
        }
    }
}

fn default_command() -> String {
    "speedtest-cli".to_string()
}

fn default_share() -> bool {
    true
}

/// The configuration document as written by the user.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawSettings {
    pub interval: u64,
    pub timeout: u64,
    pub output: PathBuf,
    pub output_keys: Vec<FieldSelector>,
    #[serde(default)]
    pub provider: ProviderSettings,
}

/// Validated, immutable settings for one process lifetime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub interval: Duration,
    pub timeout: Duration,
    pub output: PathBuf,
    /// The configured output keys followed by exactly one `notes` field.
    pub fields: Vec<FieldSelector>,
    pub provider: ProviderSettings,
}

impl Settings {
    /// Layers the built-in defaults, the config file, `SPEEDLOG_*` environment variables and the
    /// command line, in that order. `interval`, `timeout`, `output` and `output-keys` have no
    /// built-in default and must come from one of the other layers.
    pub fn new(args: &Args) -> Result<Self> {
        Self::load(args, None)
    }

    /// Like [`Settings::new`], reading environment variables from `env` instead of the process
    /// environment when given.
    #[instrument(level = "debug", skip(args, env))]
    fn load(args: &Args, env: Option<config::Map<String, String>>) -> Result<Self> {
        let path = args
            .config
            .clone()
            .unwrap_or_else(|| get_config_dir().join("config.yaml"));
        debug!(path = %path.display(), required = args.config.is_some(), "Loading configuration");

        let raw: RawSettings = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Yaml))
            .add_source(
                config::File::from(path.clone())
                    .format(config::FileFormat::Yaml)
                    .required(args.config.is_some()),
            )
            .add_source(
                config::Environment::with_prefix(&PROJECT_NAME)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .add_source(args.clone())
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .wrap_err_with(|| format!("Failed to load configuration from {:?}", path))?;

        Self::from_raw(raw)
    }

    /// Parses a YAML document on its own, without any other configuration layer.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let raw = serde_yml::from_str::<RawSettings>(content).context("Failed to parse configuration")?;
        Self::from_raw(raw)
    }

    /// Validates the raw document and derives the field list. Any `notes` entry the user listed is
    /// dropped so that the list always ends with exactly one.
    pub fn from_raw(raw: RawSettings) -> Result<Self> {
        if raw.interval == 0 {
            bail!("interval must be a positive number of seconds");
        }
        if raw.timeout == 0 {
            bail!("timeout must be a positive number of seconds");
        }
        if raw.output.as_os_str().is_empty() {
            bail!("output must name a file");
        }

        let mut fields: Vec<FieldSelector> = raw.output_keys.into_iter().filter(|f| !f.is_notes()).collect();
        if fields.is_empty() {
            bail!("output-keys must list at least one field");
        }
        fields.push(FieldSelector::notes());

        Ok(Self {
            interval: Duration::from_secs(raw.interval),
            timeout: Duration::from_secs(raw.timeout),
            output: raw.output,
            fields,
            provider: raw.provider,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EXAMPLE: &str = "\
interval: 5
timeout: 10
output: log.csv
output-keys:
  - timestamp
  - download
  - upload
  - ping
  - [server, name]
";

    #[test]
    fn notes_is_appended_once() {
        let settings = Settings::from_yaml(EXAMPLE).unwrap();
        assert_eq!(settings.interval, Duration::from_secs(5));
        assert_eq!(settings.timeout, Duration::from_secs(10));
        assert_eq!(settings.output, PathBuf::from("log.csv"));
        assert_eq!(
            settings.fields,
            vec![
                FieldSelector::key("timestamp"),
                FieldSelector::key("download"),
                FieldSelector::key("upload"),
                FieldSelector::key("ping"),
                FieldSelector::nested("server", "name"),
                FieldSelector::notes(),
            ]
        );
    }

    #[test]
    fn reloading_does_not_duplicate_notes() {
        let first = Settings::from_yaml(EXAMPLE).unwrap();
        let again = Settings::from_raw(RawSettings {
            interval: 5,
            timeout: 10,
            output: first.output.clone(),
            output_keys: first.fields.clone(),
            provider: first.provider.clone(),
        })
        .unwrap();
        assert_eq!(first, again);
        assert_eq!(again.fields.iter().filter(|f| f.is_notes()).count(), 1);
    }

    #[test]
    fn user_listed_notes_moves_to_the_end() {
        let settings = Settings::from_yaml(
            "interval: 1\ntimeout: 1\noutput: x.csv\noutput-keys: [notes, timestamp, notes, ping]\n",
        )
        .unwrap();
        assert_eq!(
            settings.fields,
            vec![
                FieldSelector::key("timestamp"),
                FieldSelector::key("ping"),
                FieldSelector::notes(),
            ]
        );
    }

    #[test]
    fn rejects_zero_durations() {
        let err = Settings::from_yaml("interval: 0\ntimeout: 10\noutput: x.csv\noutput-keys: [ping]\n").unwrap_err();
        assert!(err.to_string().contains("interval"));
        let err = Settings::from_yaml("interval: 10\ntimeout: 0\noutput: x.csv\noutput-keys: [ping]\n").unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }

    /// `EXAMPLE` without the line that sets `key`.
    fn example_without(key: &str) -> String {
        let mut lines = EXAMPLE.lines().peekable();
        let mut out = String::new();
        while let Some(line) = lines.next() {
            if line.starts_with(&format!("{key}:")) {
                // Skip the list items that belong to the removed key.
                while lines.peek().is_some_and(|next| next.starts_with("  ")) {
                    lines.next();
                }
                continue;
            }
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    const REQUIRED_KEYS: [&str; 4] = ["interval", "timeout", "output", "output-keys"];

    #[test]
    fn required_keys_must_be_present() {
        for key in REQUIRED_KEYS {
            let content = example_without(key);
            assert!(!content.contains(&format!("{key}:")), "{content}");
            assert!(Settings::from_yaml(&content).is_err(), "accepted a document without {key}");
        }
    }

    #[test]
    fn layered_loading_requires_keys_without_built_in_defaults() {
        let dir = temp_dir::TempDir::new().unwrap();
        for key in REQUIRED_KEYS {
            let path = dir.child(format!("without-{key}.yaml"));
            std::fs::write(&path, example_without(key)).unwrap();
            let args = Args {
                config: Some(path),
                ..Args::default()
            };
            assert!(
                Settings::load(&args, Some(config::Map::new())).is_err(),
                "accepted a config file without {key}"
            );
        }
    }

    #[test]
    fn provider_settings_fall_back_to_defaults() {
        let settings = Settings::from_yaml(EXAMPLE).unwrap();
        assert_eq!(settings.provider, ProviderSettings::default());
    }

    #[test]
    fn environment_overrides_config_file() {
        let dir = temp_dir::TempDir::new().unwrap();
        let path = dir.child("config.yaml");
        std::fs::write(&path, EXAMPLE).unwrap();
        let args = Args {
            config: Some(path),
            ..Args::default()
        };
        let env = config::Map::from([
            ("SPEEDLOG_INTERVAL".to_string(), "7".to_string()),
            ("SPEEDLOG_PROVIDER__SHARE".to_string(), "false".to_string()),
        ]);

        let settings = Settings::load(&args, Some(env)).unwrap();
        assert_eq!(settings.interval, Duration::from_secs(7));
        assert_eq!(settings.timeout, Duration::from_secs(10));
        assert!(!settings.provider.share);

        // The command line still wins over the environment.
        let args = Args {
            interval: Some(3),
            ..args
        };
        let env = config::Map::from([("SPEEDLOG_INTERVAL".to_string(), "7".to_string())]);
        assert_eq!(
            Settings::load(&args, Some(env)).unwrap().interval,
            Duration::from_secs(3)
        );
    }

    #[test]
    fn layered_loading_prefers_command_line() {
        let dir = temp_dir::TempDir::new().unwrap();
        let path = dir.child("config.yaml");
        std::fs::write(&path, EXAMPLE).unwrap();

        let args = Args {
            config: Some(path),
            timeout: Some(42),
            ..Args::default()
        };
        let settings = Settings::load(&args, Some(config::Map::new())).unwrap();
        assert_eq!(settings.interval, Duration::from_secs(5));
        assert_eq!(settings.timeout, Duration::from_secs(42));
        assert_eq!(settings.fields.len(), 6);
        assert_eq!(settings.fields[4], FieldSelector::nested("server", "name"));
        // The embedded defaults still fill in what the file leaves out.
        assert_eq!(settings.provider.command, "speedtest-cli");
        assert!(settings.provider.share);
    }

    #[test]
    fn explicit_config_file_must_exist() {
        let args = Args {
            config: Some(PathBuf::from("/nonexistent/speedlog/config.yaml")),
            ..Args::default()
        };
        assert!(Settings::new(&args).is_err());
    }
}
