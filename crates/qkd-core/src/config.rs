//! Configuration management.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML)
//! 2. Environment variables (with `QKD_` prefix)
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables
//! 2. Configuration file
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use qkd_hal::{BackendConfig, WaitPolicy};

use crate::orchestrator::SessionConfig;
use crate::qber::DEFAULT_QBER_THRESHOLD;

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Session parameters
    #[serde(default)]
    pub session: SessionSection,

    /// Backend selection and simulator settings
    #[serde(default)]
    pub backend: BackendSection,
}

/// Session parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSection {
    /// Qubits generated per session
    #[serde(default = "default_n_bits")]
    pub n_bits: usize,

    /// Deadline for the random draws, in milliseconds
    #[serde(default)]
    pub draw_timeout_ms: Option<u64>,

    /// Deadline for transmission, in milliseconds
    #[serde(default)]
    pub transmit_timeout_ms: Option<u64>,

    /// QBER above which a session is reported as compromised
    #[serde(default = "default_qber_threshold")]
    pub qber_threshold: f64,
}

/// Backend selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendSection {
    /// Registered backend name
    #[serde(default = "default_backend_name")]
    pub name: String,

    /// Seed for simulated randomness; unseeded runs use system entropy
    #[serde(default)]
    pub seed: Option<u64>,

    /// Simulated readout bit-flip probability
    #[serde(default)]
    pub readout_error: f64,

    /// Fraction of qubits a simulated eavesdropper intercepts
    #[serde(default)]
    pub intercept_rate: f64,

    /// Job status poll interval, in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Maximum time to wait for a job, in milliseconds
    #[serde(default = "default_max_wait")]
    pub max_wait_ms: u64,
}

// Default value functions
fn default_n_bits() -> usize {
    5
}

fn default_qber_threshold() -> f64 {
    DEFAULT_QBER_THRESHOLD
}

fn default_backend_name() -> String {
    "simulator".to_string()
}

fn default_poll_interval() -> u64 {
    500
}

fn default_max_wait() -> u64 {
    300_000 // 5 minutes
}

impl Default for SessionSection {
    fn default() -> Self {
        SessionSection {
            n_bits: default_n_bits(),
            draw_timeout_ms: None,
            transmit_timeout_ms: None,
            qber_threshold: default_qber_threshold(),
        }
    }
}

impl Default for BackendSection {
    fn default() -> Self {
        BackendSection {
            name: default_backend_name(),
            seed: None,
            readout_error: 0.0,
            intercept_rate: 0.0,
            poll_interval_ms: default_poll_interval(),
            max_wait_ms: default_max_wait(),
        }
    }
}

impl Config {
    /// Default configuration file location, `~/.qkd/config.yaml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".qkd").join("config.yaml"))
    }

    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(format!("{}: {e}", path.as_ref().display())))?;

        Self::from_yaml(&contents)
    }

    /// Parse and validate configuration from YAML text.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml_ng::from_str(contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with the following precedence:
    /// 1. Load from file if provided, else from the default path if it exists
    /// 2. Apply environment variable overrides
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(path)?,
                None => Config::default(),
            },
        };

        let config = config.merge_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Merge environment variables into this configuration.
    ///
    /// Only variables present in `lookup` override values; a variable that
    /// is set but unparsable is an error rather than silently ignored.
    pub fn merge_env(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        // Session
        if let Some(v) = lookup("QKD_N_BITS") {
            self.session.n_bits = parse_env("QKD_N_BITS", &v)?;
        }
        if let Some(v) = lookup("QKD_DRAW_TIMEOUT_MS") {
            self.session.draw_timeout_ms = Some(parse_env("QKD_DRAW_TIMEOUT_MS", &v)?);
        }
        if let Some(v) = lookup("QKD_TRANSMIT_TIMEOUT_MS") {
            self.session.transmit_timeout_ms = Some(parse_env("QKD_TRANSMIT_TIMEOUT_MS", &v)?);
        }
        if let Some(v) = lookup("QKD_QBER_THRESHOLD") {
            self.session.qber_threshold = parse_env("QKD_QBER_THRESHOLD", &v)?;
        }

        // Backend
        if let Some(v) = lookup("QKD_BACKEND") {
            self.backend.name = v;
        }
        if let Some(v) = lookup("QKD_SEED") {
            self.backend.seed = Some(parse_env("QKD_SEED", &v)?);
        }
        if let Some(v) = lookup("QKD_READOUT_ERROR") {
            self.backend.readout_error = parse_env("QKD_READOUT_ERROR", &v)?;
        }
        if let Some(v) = lookup("QKD_INTERCEPT_RATE") {
            self.backend.intercept_rate = parse_env("QKD_INTERCEPT_RATE", &v)?;
        }
        if let Some(v) = lookup("QKD_POLL_INTERVAL_MS") {
            self.backend.poll_interval_ms = parse_env("QKD_POLL_INTERVAL_MS", &v)?;
        }
        if let Some(v) = lookup("QKD_MAX_WAIT_MS") {
            self.backend.max_wait_ms = parse_env("QKD_MAX_WAIT_MS", &v)?;
        }

        Ok(self)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.n_bits == 0 {
            return Err(ConfigError::ValidationError(
                "n_bits must be greater than 0".to_string(),
            ));
        }

        check_probability("qber_threshold", self.session.qber_threshold)?;
        check_probability("readout_error", self.backend.readout_error)?;
        check_probability("intercept_rate", self.backend.intercept_rate)?;

        if self.backend.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "backend name must not be empty".to_string(),
            ));
        }

        if self.backend.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "poll_interval_ms must be greater than 0".to_string(),
            ));
        }

        if self.backend.max_wait_ms < self.backend.poll_interval_ms {
            return Err(ConfigError::ValidationError(format!(
                "max_wait_ms ({}) must be at least poll_interval_ms ({})",
                self.backend.max_wait_ms, self.backend.poll_interval_ms
            )));
        }

        Ok(())
    }

    /// Session parameters for the orchestrator.
    pub fn session_config(&self) -> SessionConfig {
        let mut config = SessionConfig::new(self.session.n_bits);
        if let Some(ms) = self.session.draw_timeout_ms {
            config = config.with_draw_timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = self.session.transmit_timeout_ms {
            config = config.with_transmit_timeout(Duration::from_millis(ms));
        }
        config
    }

    /// How long sources and channels wait for backend jobs.
    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy::new(
            Duration::from_millis(self.backend.poll_interval_ms),
            Duration::from_millis(self.backend.max_wait_ms),
        )
    }

    /// Registry configuration for the selected backend.
    pub fn backend_config(&self) -> BackendConfig {
        let mut config = BackendConfig::new(self.backend.name.clone())
            .with_extra("readout_error", serde_json::json!(self.backend.readout_error))
            .with_extra("intercept_rate", serde_json::json!(self.backend.intercept_rate));
        if let Some(seed) = self.backend.seed {
            config = config.with_extra("seed", serde_json::json!(seed));
        }
        config
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::ParseError(format!("{key}: cannot parse '{value}'")))
}

fn check_probability(name: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{name} must be within [0, 1], got {value}"
        )))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.session.n_bits, 5);
        assert_eq!(config.session.qber_threshold, 0.11);
        assert_eq!(config.backend.name, "simulator");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = Config::from_yaml("session:\n  n_bits: 128\n").unwrap();
        assert_eq!(config.session.n_bits, 128);
        assert_eq!(config.backend, BackendSection::default());
    }

    #[test]
    fn test_yaml_sections() {
        let yaml = r"
session:
  n_bits: 64
  transmit_timeout_ms: 2000
  qber_threshold: 0.05
backend:
  name: sim
  seed: 42
  intercept_rate: 1.0
";
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.session.transmit_timeout_ms, Some(2000));
        assert_eq!(config.backend.seed, Some(42));

        let session = config.session_config();
        assert_eq!(session.n_bits, 64);
        assert_eq!(session.transmit_timeout, Some(Duration::from_secs(2)));
        assert_eq!(session.draw_timeout, None);

        let backend = config.backend_config();
        assert_eq!(backend.name, "sim");
        assert_eq!(backend.extra_u64("seed"), Some(42));
        assert_eq!(backend.extra_f64("intercept_rate"), Some(1.0));
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            Config::from_yaml("session: [1, 2"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_bits() {
        let mut config = Config::default();
        config.session.n_bits = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_rates() {
        let mut config = Config::default();
        config.backend.readout_error = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.session.qber_threshold = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_wait_bounds() {
        let mut config = Config::default();
        config.backend.max_wait_ms = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let config = Config::from_yaml("session:\n  n_bits: 128\n")
            .unwrap()
            .merge_env(env(&[("QKD_N_BITS", "32"), ("QKD_SEED", "7")]))
            .unwrap();
        assert_eq!(config.session.n_bits, 32);
        assert_eq!(config.backend.seed, Some(7));
    }

    #[test]
    fn test_env_unparsable_value() {
        let result = Config::default().merge_env(env(&[("QKD_N_BITS", "many")]));
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "backend:\n  readout_error: 0.02\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.backend.readout_error, 0.02);

        assert!(matches!(
            Config::from_file(dir.path().join("missing.yaml")),
            Err(ConfigError::IoError(_))
        ));
    }

    #[test]
    fn test_wait_policy() {
        let policy = Config::default().wait_policy();
        assert_eq!(policy.poll_interval, Duration::from_millis(500));
        assert_eq!(policy.max_wait, Duration::from_secs(300));
    }
}
