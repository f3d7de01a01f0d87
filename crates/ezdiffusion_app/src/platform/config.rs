use std::path::PathBuf;
use std::time::Duration;

use ezd_logging::parse_level;
use ezdiffusion_client::ApiSettings;
use log::LevelFilter;

use super::logging::LogDestination;

/// Start-up configuration read from the environment.
///
/// | Env Var                    | Default                          |
/// |----------------------------|----------------------------------|
/// | `EZD_API_URL`              | dev or prod url by build profile |
/// | `EZD_STATE_DIR`            | current directory                |
/// | `EZD_LOG`                  | `terminal`                       |
/// | `EZD_LOG_LEVEL`            | `info`                           |
/// | `EZD_REQUEST_TIMEOUT_SECS` | `120`                            |
/// | `EZD_CONNECT_TIMEOUT_SECS` | `10`                             |
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiSettings,
    pub state_dir: PathBuf,
    pub log_destination: LogDestination,
    pub log_level: LevelFilter,
    /// Values that were set but could not be used. Logged once logging is up.
    pub warnings: Vec<String>,
}

impl AppConfig {
    /// Loads `.env` when present, then reads the process environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut warnings = Vec::new();
        let mut api = ApiSettings::default();

        if let Some(url) = lookup("EZD_API_URL").filter(|url| !url.trim().is_empty()) {
            api.base_url = url.trim().to_string();
        }
        if let Some(secs) = parse_secs(&lookup, "EZD_REQUEST_TIMEOUT_SECS", &mut warnings) {
            api.request_timeout = secs;
        }
        if let Some(secs) = parse_secs(&lookup, "EZD_CONNECT_TIMEOUT_SECS", &mut warnings) {
            api.connect_timeout = secs;
        }

        let state_dir = lookup("EZD_STATE_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let log_destination = match lookup("EZD_LOG") {
            None => LogDestination::Terminal,
            Some(raw) => LogDestination::parse(&raw).unwrap_or_else(|| {
                warnings.push(format!("EZD_LOG={raw:?} is not terminal|file|both; using terminal"));
                LogDestination::Terminal
            }),
        };

        let log_level = match lookup("EZD_LOG_LEVEL") {
            None => LevelFilter::Info,
            Some(raw) => parse_level(&raw).unwrap_or_else(|| {
                warnings.push(format!("EZD_LOG_LEVEL={raw:?} is not a log level; using info"));
                LevelFilter::Info
            }),
        };

        Self {
            api,
            state_dir,
            log_destination,
            log_level,
            warnings,
        }
    }
}

fn parse_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    warnings: &mut Vec<String>,
) -> Option<Duration> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
        _ => {
            warnings.push(format!("{key}={raw:?} is not a positive number of seconds; using default"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = config_from(&[]);
        let defaults = ApiSettings::default();
        assert_eq!(config.api.base_url, defaults.base_url);
        assert_eq!(config.api.request_timeout, Duration::from_secs(120));
        assert_eq!(config.api.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.state_dir, PathBuf::from("."));
        assert_eq!(config.log_destination, LogDestination::Terminal);
        assert_eq!(config.log_level, LevelFilter::Info);
        assert!(config.warnings.is_empty());
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_from(&[
            ("EZD_API_URL", "https://gpu.example.com/"),
            ("EZD_STATE_DIR", "/tmp/ezd"),
            ("EZD_LOG", "both"),
            ("EZD_LOG_LEVEL", "debug"),
            ("EZD_REQUEST_TIMEOUT_SECS", "300"),
            ("EZD_CONNECT_TIMEOUT_SECS", "3"),
        ]);
        assert_eq!(config.api.base_url, "https://gpu.example.com/");
        assert_eq!(config.state_dir, PathBuf::from("/tmp/ezd"));
        assert_eq!(config.log_destination, LogDestination::Both);
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.api.request_timeout, Duration::from_secs(300));
        assert_eq!(config.api.connect_timeout, Duration::from_secs(3));
    }

    #[test]
    fn bad_values_fall_back_with_warnings() {
        let config = config_from(&[
            ("EZD_LOG", "syslog"),
            ("EZD_LOG_LEVEL", "loud"),
            ("EZD_REQUEST_TIMEOUT_SECS", "soon"),
            ("EZD_CONNECT_TIMEOUT_SECS", "0"),
        ]);
        assert_eq!(config.log_destination, LogDestination::Terminal);
        assert_eq!(config.log_level, LevelFilter::Info);
        assert_eq!(config.api.request_timeout, Duration::from_secs(120));
        assert_eq!(config.api.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.warnings.len(), 4);
    }
}
