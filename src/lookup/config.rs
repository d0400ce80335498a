//! Engine configuration
//!
//! Loaded from a JSON file or built in code. Every tuning knob is
//! optional except the two file paths and the prefix length.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::observability::{log_event_with_fields, Event, Severity};

use super::errors::{LookupError, LookupResult};

/// Lookup engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Data CSV; first column is the lookup key
    pub data_csv_path: PathBuf,

    /// Index CSV; `prefix,offset` rows
    pub index_csv_path: PathBuf,

    /// Characters in every indexed prefix
    pub index_key_length: usize,

    /// Most handles checked out at once (default 64)
    #[serde(default = "default_handle_limit")]
    pub concurrent_handle_limit: usize,

    /// Handles pre-opened by warm-up (default 0)
    #[serde(default)]
    pub warm_up_count: usize,

    /// Pause between warm-up acquisitions in milliseconds (default 0)
    #[serde(default)]
    pub warm_up_delay_ms: u64,

    /// Warm the pool as part of construction (default false)
    #[serde(default)]
    pub warm_up_on_open: bool,

    /// Minimum log severity (default "INFO")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_handle_limit() -> usize {
    64
}

fn default_log_level() -> String {
    "INFO".to_string()
}

impl EngineConfig {
    /// Configuration with defaults for every optional setting.
    pub fn new(
        data_csv_path: impl Into<PathBuf>,
        index_csv_path: impl Into<PathBuf>,
        index_key_length: usize,
    ) -> Self {
        Self {
            data_csv_path: data_csv_path.into(),
            index_csv_path: index_csv_path.into(),
            index_key_length,
            concurrent_handle_limit: default_handle_limit(),
            warm_up_count: 0,
            warm_up_delay_ms: 0,
            warm_up_on_open: false,
            log_level: default_log_level(),
        }
    }

    pub fn with_handle_limit(mut self, limit: usize) -> Self {
        self.concurrent_handle_limit = limit;
        self
    }

    pub fn with_warm_up(mut self, count: usize, delay: Duration) -> Self {
        self.warm_up_count = count;
        self.warm_up_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_warm_up_on_open(mut self, enabled: bool) -> Self {
        self.warm_up_on_open = enabled;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Load and validate configuration from a JSON file
    pub fn load(path: &Path) -> LookupResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            LookupError::InvalidConfig(format!("failed to read {}: {}", path.display(), e))
        })?;

        let config: EngineConfig = serde_json::from_str(&content)
            .map_err(|e| LookupError::InvalidConfig(format!("invalid config JSON: {}", e)))?;

        config.validate()?;

        let path_str = path.display().to_string();
        log_event_with_fields(Event::ConfigLoaded, &[("path", path_str.as_str())]);

        Ok(config)
    }

    /// Validate settings. File existence is checked at engine open.
    pub fn validate(&self) -> LookupResult<()> {
        if self.index_key_length == 0 {
            return Err(LookupError::InvalidConfig(
                "index_key_length must be >= 1".to_string(),
            ));
        }

        if self.concurrent_handle_limit == 0 {
            return Err(LookupError::InvalidConfig(
                "concurrent_handle_limit must be >= 1".to_string(),
            ));
        }

        if self.warm_up_count > self.concurrent_handle_limit {
            return Err(LookupError::InvalidConfig(format!(
                "warm_up_count {} exceeds concurrent_handle_limit {}",
                self.warm_up_count, self.concurrent_handle_limit
            )));
        }

        if Severity::parse(&self.log_level).is_none() {
            return Err(LookupError::InvalidConfig(format!(
                "unknown log_level: '{}'",
                self.log_level
            )));
        }

        Ok(())
    }

    /// Pause between warm-up acquisitions
    pub fn warm_up_delay(&self) -> Duration {
        Duration::from_millis(self.warm_up_delay_ms)
    }

    /// Parsed minimum log severity, INFO if unparseable
    pub fn log_severity(&self) -> Severity {
        Severity::parse(&self.log_level).unwrap_or(Severity::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_minimal_json() {
        let config: EngineConfig = serde_json::from_str(
            r#"{"data_csv_path":"rows.csv","index_csv_path":"index.csv","index_key_length":3}"#,
        )
        .unwrap();

        assert_eq!(config.concurrent_handle_limit, 64);
        assert_eq!(config.warm_up_count, 0);
        assert_eq!(config.warm_up_delay(), Duration::ZERO);
        assert!(!config.warm_up_on_open);
        assert_eq!(config.log_severity(), Severity::Info);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_key_length_rejected() {
        let result: Result<EngineConfig, _> =
            serde_json::from_str(r#"{"data_csv_path":"rows.csv","index_csv_path":"index.csv"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_zero_key_length() {
        let config = EngineConfig::new("rows.csv", "index.csv", 0);
        assert!(matches!(config.validate(), Err(LookupError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_zero_handle_limit() {
        let config = EngineConfig::new("rows.csv", "index.csv", 2).with_handle_limit(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_warm_up_beyond_limit() {
        let config = EngineConfig::new("rows.csv", "index.csv", 2)
            .with_handle_limit(2)
            .with_warm_up(3, Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_log_level() {
        let config = EngineConfig::new("rows.csv", "index.csv", 2).with_log_level("chatty");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builder_settings() {
        let config = EngineConfig::new("rows.csv", "index.csv", 2)
            .with_handle_limit(8)
            .with_warm_up(4, Duration::from_millis(25))
            .with_warm_up_on_open(true)
            .with_log_level("trace");

        assert_eq!(config.concurrent_handle_limit, 8);
        assert_eq!(config.warm_up_count, 4);
        assert_eq!(config.warm_up_delay(), Duration::from_millis(25));
        assert!(config.warm_up_on_open);
        assert_eq!(config.log_severity(), Severity::Trace);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_warm_up_delay_saturates() {
        let config = EngineConfig::new("rows.csv", "index.csv", 2).with_warm_up(1, Duration::MAX);
        assert_eq!(config.warm_up_delay_ms, u64::MAX);
    }
}
