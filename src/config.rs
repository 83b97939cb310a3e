//! Application configuration
//!
//! `AppConfig` comes from the environment (optionally seeded from a `.env` file) and
//! `ScrapeSettings` from the command line. Both are built once and passed down.

use crate::error::ConfigError;
use crate::scraper::{RetryPolicy, DEFAULT_BASE_URL};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const MAX_WORKERS_KEY: &str = "MAX_WORKERS";
pub const MAX_GENERATIONS_KEY: &str = "MAX_GENERATIONS";
pub const DATABASE_URL_KEY: &str = "DATABASE_URL";

/// Default proxy list location
pub const DEFAULT_PROXIES_FILE: &str = "files/proxies.txt";

/// Startup configuration from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Concurrent fetch workers
    pub max_workers: usize,
    /// Identifiers scanned per run
    pub max_generations: usize,
    /// sqlx SQLite connection string
    pub database_url: String,
}

impl AppConfig {
    /// Read the keys from the process environment, falling back to `env_file`.
    /// Variables already set in the environment take precedence over the file.
    pub fn load(env_file: &Path) -> Result<Self, ConfigError> {
        Self::load_with(env_file, |key| std::env::var(key).ok())
    }

    /// Like [`AppConfig::load`], with `env` standing in for the process environment
    pub fn load_with<F>(env_file: &Path, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file_vars = read_env_file(env_file)?;
        Self::from_lookup(|key| env(key).or_else(|| file_vars.get(key).cloned()))
    }

    /// Build from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key).ok_or_else(|| ConfigError::MissingKey {
                key: key.to_string(),
            })
        };

        Ok(Self {
            max_workers: parse_positive(MAX_WORKERS_KEY, &require(MAX_WORKERS_KEY)?)?,
            max_generations: parse_positive(MAX_GENERATIONS_KEY, &require(MAX_GENERATIONS_KEY)?)?,
            database_url: require(DATABASE_URL_KEY)?,
        })
    }
}

/// Parse a `.env` file without touching the process environment; a missing file is empty
fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    if !path.exists() {
        return Ok(HashMap::new());
    }

    let env_file_error = |e: dotenvy::Error| ConfigError::EnvFile {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    dotenvy::from_path_iter(path)
        .map_err(&env_file_error)?
        .map(|item| item.map_err(&env_file_error))
        .collect()
}

fn parse_positive(key: &str, value: &str) -> Result<usize, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };

    match value.trim().parse::<usize>() {
        Ok(0) => Err(invalid("must be greater than zero")),
        Ok(n) => Ok(n),
        Err(_) => Err(invalid("must be a positive integer")),
    }
}

/// Per-run scrape settings
#[derive(Debug, Clone)]
pub struct ScrapeSettings {
    pub proxies_file: PathBuf,
    /// Upstream users API, without the `/v1/users/{id}` path
    pub base_url: String,
    /// Per-request timeout, `None` for the transport default
    pub request_timeout: Option<Duration>,
    pub retry: RetryPolicy,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            proxies_file: PathBuf::from(DEFAULT_PROXIES_FILE),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Some(Duration::from_secs(30)),
            retry: RetryPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("MAX_WORKERS", "8"),
            ("MAX_GENERATIONS", "1000"),
            ("DATABASE_URL", "sqlite://users.db"),
        ]))
        .unwrap();

        assert_eq!(
            config,
            AppConfig {
                max_workers: 8,
                max_generations: 1000,
                database_url: "sqlite://users.db".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_key_is_named() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("MAX_WORKERS", "8"),
            ("DATABASE_URL", "sqlite://users.db"),
        ]))
        .unwrap_err();

        match err {
            ConfigError::MissingKey { key } => assert_eq!(key, "MAX_GENERATIONS"),
            other => panic!("expected MissingKey, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_numbers() {
        for bad in ["0", "-3", "many"] {
            let err = AppConfig::from_lookup(lookup_from(&[
                ("MAX_WORKERS", bad),
                ("MAX_GENERATIONS", "10"),
                ("DATABASE_URL", "sqlite://users.db"),
            ]))
            .unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "MAX_WORKERS"),
                "{} should be rejected",
                bad
            );
        }
    }

    fn write_env_file(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let env_file = dir.path().join(".env");
        std::fs::write(&env_file, content).unwrap();
        env_file
    }

    #[test]
    fn test_load_reads_env_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let env_file = write_env_file(
            &dir,
            "MAX_WORKERS=3\nMAX_GENERATIONS=7\nDATABASE_URL=sqlite::memory:\n",
        );

        let config = AppConfig::load_with(&env_file, |_| None).unwrap();
        assert_eq!(config.max_workers, 3);
        assert_eq!(config.max_generations, 7);
        assert_eq!(config.database_url, "sqlite::memory:");
    }

    #[test]
    fn test_environment_wins_over_env_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let env_file = write_env_file(
            &dir,
            "MAX_WORKERS=3\nMAX_GENERATIONS=7\nDATABASE_URL=sqlite::memory:\n",
        );

        let config = AppConfig::load_with(&env_file, lookup_from(&[("MAX_WORKERS", "9")])).unwrap();
        assert_eq!(config.max_workers, 9);
        assert_eq!(config.max_generations, 7);
    }

    #[test]
    fn test_missing_env_file_uses_environment_only() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = AppConfig::load_with(&dir.path().join("absent.env"), |_| None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey { ref key } if key == "MAX_WORKERS"));
    }

    #[test]
    fn test_unparseable_env_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let env_file = write_env_file(&dir, "MAX_WORKERS='3\n");

        let err = AppConfig::load_with(&env_file, |_| None).unwrap_err();
        assert!(matches!(err, ConfigError::EnvFile { .. }));
    }

    #[test]
    fn test_scrape_settings_default() {
        let settings = ScrapeSettings::default();
        assert_eq!(settings.proxies_file, PathBuf::from("files/proxies.txt"));
        assert_eq!(settings.base_url, "https://users.roblox.com");
        assert_eq!(settings.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(settings.retry.max_attempts, None);
    }
}
