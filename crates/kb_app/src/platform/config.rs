//! `kb.ron` configuration and command-line overrides.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use kb_bridge::BridgeSettings;
use kb_core::DEFAULT_PAGE_SIZE;
use kb_logging::LogDestination;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::GlobalArgs;

pub const CONFIG_FILENAME: &str = "kb.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("invalid {field}: {value:?}")]
    Invalid { field: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub page_size: usize,
    /// `terminal`, `file`, `both` or `off`.
    pub log: String,
    pub log_level: String,
    /// Where client preferences are kept.
    pub state_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        let bridge = BridgeSettings::default();
        Self {
            backend_url: bridge.base_url,
            connect_timeout_secs: bridge.connect_timeout.as_secs(),
            request_timeout_secs: bridge.request_timeout.as_secs(),
            page_size: DEFAULT_PAGE_SIZE,
            log: "terminal".to_string(),
            log_level: "warn".to_string(),
            state_file: PathBuf::from(".kb_state.ron"),
        }
    }
}

impl AppConfig {
    /// Reads `explicit`, or `./kb.ron` when it exists, or falls back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(CONFIG_FILENAME);
                if path.is_file() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_overrides(&mut self, args: &GlobalArgs) {
        if let Some(backend) = &args.backend {
            self.backend_url = backend.clone();
        }
        if let Some(log) = &args.log {
            self.log = log.clone();
        }
        if let Some(page_size) = args.page_size {
            self.page_size = page_size;
        }
        if args.verbose {
            self.log_level = "debug".to_string();
        }
    }

    pub fn bridge_settings(&self) -> BridgeSettings {
        BridgeSettings {
            base_url: self.backend_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs.max(1)),
            request_timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
        }
    }

    pub fn log_destination(&self) -> Result<LogDestination, ConfigError> {
        LogDestination::from_name(&self.log).ok_or_else(|| ConfigError::Invalid {
            field: "log",
            value: self.log.clone(),
        })
    }

    pub fn log_level(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(self.log_level.trim()).map_err(|_| ConfigError::Invalid {
            field: "log_level",
            value: self.log_level.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(&path, r#"(backend_url: "http://kb.local:9000", page_size: 50)"#).unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(
            config,
            AppConfig {
                backend_url: "http://kb.local:9000".to_string(),
                page_size: 50,
                ..AppConfig::default()
            }
        );
    }

    #[test]
    fn explicit_config_must_exist() {
        let temp = TempDir::new().unwrap();
        let err = AppConfig::load(Some(&temp.path().join("absent.ron"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }), "{err:?}");
    }

    #[test]
    fn malformed_config_reports_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(&path, "(page_size: \"many\")").unwrap();
        let err = AppConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "{err:?}");
    }

    #[test]
    fn command_line_overrides_file_values() {
        let mut config = AppConfig::default();
        config.apply_overrides(&GlobalArgs {
            backend: Some("http://other:1234".to_string()),
            log: Some("off".to_string()),
            page_size: Some(5),
            verbose: true,
            ..GlobalArgs::default()
        });

        assert_eq!(config.bridge_settings().base_url, "http://other:1234");
        assert_eq!(config.page_size, 5);
        assert_eq!(config.log_destination().unwrap(), LogDestination::Off);
        assert_eq!(config.log_level().unwrap(), LevelFilter::Debug);
    }

    #[test]
    fn unknown_log_settings_are_invalid() {
        let config = AppConfig {
            log: "syslog".to_string(),
            log_level: "loud".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(
            config.log_destination(),
            Err(ConfigError::Invalid { field: "log", .. })
        ));
        assert!(matches!(
            config.log_level(),
            Err(ConfigError::Invalid { field: "log_level", .. })
        ));
    }

    #[test]
    fn zero_timeouts_are_raised_to_one_second() {
        let config = AppConfig {
            connect_timeout_secs: 0,
            request_timeout_secs: 0,
            ..AppConfig::default()
        };
        let settings = config.bridge_settings();
        assert_eq!(settings.connect_timeout, Duration::from_secs(1));
        assert_eq!(settings.request_timeout, Duration::from_secs(1));
    }
}
