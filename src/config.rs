use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::Level;

pub const DEFAULT_API_BASE: &str = "https://fantasy.premierleague.com/api";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SNAPSHOT_PATH: &str = "data/bootstrap_static.json";
const DEFAULT_EXPORT_PATH: &str = "fpl_dashboard.xlsx";
const DEFAULT_LOG_FILE: &str = "fpl_stats.log";

/// Runtime settings, read once at startup and handed to whoever needs them.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base: String,
    pub timeout: Duration,
    pub snapshot_path: PathBuf,
    pub export_path: PathBuf,
    pub log_file: PathBuf,
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            log_level: Level::INFO,
        }
    }
}

impl Config {
    /// Load `.env.local`/`.env` (if present) and read `FPL_*` variables.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| {
            lookup(key)
                .map(|val| val.trim().to_string())
                .filter(|val| !val.is_empty())
        };

        let api_base = non_empty("FPL_API_BASE")
            .map(|val| val.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base);
        let timeout = non_empty("FPL_TIMEOUT_SECS")
            .and_then(|val| val.parse::<u64>().ok())
            .map(|secs| Duration::from_secs(secs.max(1)))
            .unwrap_or(defaults.timeout);
        let log_level = non_empty("FPL_LOG_LEVEL")
            .and_then(|val| val.parse::<Level>().ok())
            .unwrap_or(defaults.log_level);

        Self {
            api_base,
            timeout,
            snapshot_path: non_empty("FPL_SNAPSHOT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.snapshot_path),
            export_path: non_empty("FPL_EXPORT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.export_path),
            log_file: non_empty("FPL_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file),
            log_level,
        }
    }

    pub fn bootstrap_url(&self) -> String {
        format!("{}/bootstrap-static/", self.api_base)
    }

    pub fn fixtures_url(&self) -> String {
        format!("{}/fixtures/", self.api_base)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use super::Config;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_public_api() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(
            config.bootstrap_url(),
            "https://fantasy.premierleague.com/api/bootstrap-static/"
        );
        assert_eq!(
            config.fixtures_url(),
            "https://fantasy.premierleague.com/api/fixtures/"
        );
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn overrides_are_trimmed_and_clamped() {
        let config = Config::from_lookup(lookup(&[
            ("FPL_API_BASE", " http://localhost:8000/api/ "),
            ("FPL_TIMEOUT_SECS", "0"),
            ("FPL_LOG_LEVEL", "debug"),
        ]));
        assert_eq!(config.bootstrap_url(), "http://localhost:8000/api/bootstrap-static/");
        assert_eq!(config.timeout, Duration::from_secs(1));
        assert_eq!(config.log_level, tracing::Level::DEBUG);
    }

    #[test]
    fn garbage_numbers_fall_back() {
        let config = Config::from_lookup(lookup(&[("FPL_TIMEOUT_SECS", "soon")]));
        assert_eq!(config.timeout, Duration::from_secs(10));
    }
}
