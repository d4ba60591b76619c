//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::store::keys::DEFAULT_PROFILE;

/// Database path that selects the in-memory store.
pub const MEMORY_DB_PATH: &str = ":memory:";

/// Where flow records are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// Lost on restart.
    Memory,
    /// libSQL file at this path.
    File(PathBuf),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Database file, or `:memory:`.
    pub db_path: String,
    /// Scopes the libSQL records, so one file can hold several profiles.
    pub profile_id: String,
    /// Port the REST server listens on.
    pub http_port: u16,
    /// Simulated latency of credential login and sign-up.
    pub auth_latency: Duration,
    /// Simulated latency of the OAuth round trip.
    pub oauth_latency: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: "./data/heyprodata.db".to_string(),
            profile_id: DEFAULT_PROFILE.to_string(),
            http_port: 8080,
            auth_latency: Duration::from_millis(800),
            oauth_latency: Duration::from_millis(1000),
        }
    }
}

impl AppConfig {
    /// Read `HEYPRO_*` variables. Unparseable numbers fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let db_path = lookup("HEYPRO_DB_PATH").unwrap_or(defaults.db_path);

        let profile_id = lookup("HEYPRO_PROFILE")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.profile_id);

        let http_port: u16 = lookup("HEYPRO_HTTP_PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.http_port);

        let auth_latency = lookup("HEYPRO_AUTH_LATENCY_MS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.auth_latency);

        let oauth_latency = lookup("HEYPRO_OAUTH_LATENCY_MS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.oauth_latency);

        Self {
            db_path,
            profile_id,
            http_port,
            auth_latency,
            oauth_latency,
        }
    }

    /// Resolve the storage backend from `db_path`.
    pub fn storage(&self) -> Result<StorageConfig, ConfigError> {
        match self.db_path.trim() {
            "" => Err(ConfigError::InvalidValue {
                key: "HEYPRO_DB_PATH".to_string(),
                message: "path is empty".to_string(),
            }),
            MEMORY_DB_PATH => Ok(StorageConfig::Memory),
            path => Ok(StorageConfig::File(PathBuf::from(path))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config.db_path, "./data/heyprodata.db");
        assert_eq!(config.profile_id, "default");
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.auth_latency, Duration::from_millis(800));
        assert_eq!(config.oauth_latency, Duration::from_millis(1000));
    }

    #[test]
    fn reads_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("HEYPRO_DB_PATH", "/tmp/flow.db"),
            ("HEYPRO_PROFILE", " work "),
            ("HEYPRO_HTTP_PORT", "9090"),
            ("HEYPRO_AUTH_LATENCY_MS", "0"),
            ("HEYPRO_OAUTH_LATENCY_MS", "25"),
        ]));
        assert_eq!(config.http_port, 9090);
        assert_eq!(config.profile_id, "work");
        assert_eq!(config.auth_latency, Duration::ZERO);
        assert_eq!(config.oauth_latency, Duration::from_millis(25));
        assert_eq!(
            config.storage().unwrap(),
            StorageConfig::File(PathBuf::from("/tmp/flow.db"))
        );
    }

    #[test]
    fn bad_numbers_fall_back() {
        let config = AppConfig::from_lookup(lookup(&[
            ("HEYPRO_HTTP_PORT", "not-a-port"),
            ("HEYPRO_AUTH_LATENCY_MS", "-5"),
        ]));
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.auth_latency, Duration::from_millis(800));
    }

    #[test]
    fn blank_profile_uses_default() {
        let config = AppConfig::from_lookup(lookup(&[("HEYPRO_PROFILE", "  ")]));
        assert_eq!(config.profile_id, "default");
    }

    #[test]
    fn memory_path_selects_memory_store() {
        let config = AppConfig::from_lookup(lookup(&[("HEYPRO_DB_PATH", ":memory:")]));
        assert_eq!(config.storage().unwrap(), StorageConfig::Memory);
    }

    #[test]
    fn empty_path_is_rejected() {
        let config = AppConfig::from_lookup(lookup(&[("HEYPRO_DB_PATH", "  ")]));
        assert!(matches!(
            config.storage(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
