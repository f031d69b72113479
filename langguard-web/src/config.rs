//! Configuration for langguard-web
//!
//! Every option resolves through the same tiers, highest priority first:
//! command line → environment (`LANGGUARD_*`) → TOML file → compiled default.

use langguard_common::config::{default_config_path, load_toml_config, LoggingConfig};
use langguard_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Module name used for the default TOML path
pub const MODULE_NAME: &str = "langguard";

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5750";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;
pub const DEFAULT_BUCKET: &str = "langguard-media";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Object-store bucket for recognition hand-off
    pub bucket: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    /// Named profile; default provider chain when unset
    pub profile: Option<String>,
    /// Region; provider chain when unset
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    pub poll_interval_secs: u64,
    pub poll_timeout_secs: u64,
    /// Locale used when a source code has no recognition locale
    pub default_locale: String,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            poll_timeout_secs: 600,
            default_locale: "en-US".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Characters per premium synthesis request
    pub chunk_budget: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self { chunk_budget: 2500 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Age after which artifacts and uploads are evicted; 0 keeps everything
    pub artifact_ttl_secs: u64,
    pub sweep_interval_secs: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            artifact_ttl_secs: 86_400,
            sweep_interval_secs: 600,
        }
    }
}

impl RetentionConfig {
    pub fn ttl(&self) -> Option<Duration> {
        (self.artifact_ttl_secs > 0).then(|| Duration::from_secs(self.artifact_ttl_secs))
    }
}

/// Full service configuration (`langguard.toml`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub root_folder: Option<PathBuf>,
    pub bind_address: String,
    pub max_upload_bytes: usize,
    pub ffmpeg_path: PathBuf,
    pub storage: StorageConfig,
    pub aws: AwsConfig,
    pub transcription: TranscriptionConfig,
    pub synthesis: SynthesisConfig,
    pub retention: RetentionConfig,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            ffmpeg_path: PathBuf::from("ffmpeg"),
            storage: StorageConfig::default(),
            aws: AwsConfig::default(),
            transcription: TranscriptionConfig::default(),
            synthesis: SynthesisConfig::default(),
            retention: RetentionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub root_folder: Option<PathBuf>,
    pub bind_address: Option<String>,
}

impl AppConfig {
    /// Resolve the configuration through every tier
    ///
    /// Also returns the environment variables that were applied, so they can
    /// be logged once tracing is up.
    pub fn resolve(cli: &CliOverrides) -> Result<(Self, Vec<&'static str>)> {
        let path = cli
            .config_path
            .clone()
            .or_else(|| default_config_path(MODULE_NAME));

        let mut config = match path {
            Some(path) => Self::load(&path)?,
            None => Self::default(),
        };
        let env_overrides = config.apply_env(|key| std::env::var(key).ok())?;
        config.apply_cli(cli);
        config.validate()?;
        Ok((config, env_overrides))
    }

    /// TOML file or defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        Ok(load_toml_config::<AppConfig>(path)?.unwrap_or_default())
    }

    /// Apply `LANGGUARD_*` variables read through `lookup`, returning the
    /// names of the variables that took effect
    ///
    /// Blank values are ignored. Numeric variables that fail to parse are a
    /// `Config` error.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<Vec<&'static str>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = Vec::new();
        let mut get = |key: &'static str| {
            let value = lookup(key).filter(|v| !v.trim().is_empty());
            if value.is_some() {
                applied.push(key);
            }
            value
        };

        if let Some(v) = get("LANGGUARD_BIND_ADDRESS") {
            self.bind_address = v;
        }
        if let Some(v) = get("LANGGUARD_MAX_UPLOAD_BYTES") {
            self.max_upload_bytes = parse_env("LANGGUARD_MAX_UPLOAD_BYTES", &v)?;
        }
        if let Some(v) = get("LANGGUARD_FFMPEG_PATH") {
            self.ffmpeg_path = PathBuf::from(v);
        }
        if let Some(v) = get("LANGGUARD_BUCKET") {
            self.storage.bucket = v;
        }
        if let Some(v) = get("LANGGUARD_AWS_PROFILE") {
            self.aws.profile = Some(v);
        }
        if let Some(v) = get("LANGGUARD_AWS_REGION") {
            self.aws.region = Some(v);
        }
        if let Some(v) = get("LANGGUARD_POLL_INTERVAL_SECS") {
            self.transcription.poll_interval_secs = parse_env("LANGGUARD_POLL_INTERVAL_SECS", &v)?;
        }
        if let Some(v) = get("LANGGUARD_POLL_TIMEOUT_SECS") {
            self.transcription.poll_timeout_secs = parse_env("LANGGUARD_POLL_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("LANGGUARD_DEFAULT_LOCALE") {
            self.transcription.default_locale = v;
        }
        if let Some(v) = get("LANGGUARD_ARTIFACT_TTL_SECS") {
            self.retention.artifact_ttl_secs = parse_env("LANGGUARD_ARTIFACT_TTL_SECS", &v)?;
        }
        if let Some(v) = get("LANGGUARD_SWEEP_INTERVAL_SECS") {
            self.retention.sweep_interval_secs = parse_env("LANGGUARD_SWEEP_INTERVAL_SECS", &v)?;
        }
        if let Some(v) = get("LANGGUARD_LOG_LEVEL") {
            self.logging.level = v;
        }
        Ok(applied)
    }

    pub fn apply_cli(&mut self, cli: &CliOverrides) {
        if let Some(root) = &cli.root_folder {
            self.root_folder = Some(root.clone());
        }
        if let Some(bind) = &cli.bind_address {
            self.bind_address = bind.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage.bucket.trim().is_empty() {
            return Err(Error::Config("storage.bucket must not be empty".into()));
        }
        if self.transcription.poll_interval_secs == 0 {
            return Err(Error::Config(
                "transcription.poll_interval_secs must be at least 1".into(),
            ));
        }
        if self.transcription.poll_timeout_secs < self.transcription.poll_interval_secs {
            return Err(Error::Config(
                "transcription.poll_timeout_secs must not be shorter than the poll interval".into(),
            ));
        }
        if self.synthesis.chunk_budget == 0 {
            return Err(Error::Config("synthesis.chunk_budget must be positive".into()));
        }
        if self.retention.sweep_interval_secs == 0 {
            return Err(Error::Config(
                "retention.sweep_interval_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.transcription.poll_interval_secs)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.transcription.poll_timeout_secs)
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("{} has invalid value '{}': {}", key, value, e)))
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
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.bind_address, "127.0.0.1:5750");
        assert_eq!(config.storage.bucket, "langguard-media");
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.poll_timeout(), Duration::from_secs(600));
        assert_eq!(config.transcription.default_locale, "en-US");
        assert_eq!(config.synthesis.chunk_budget, 2500);
        assert_eq!(config.retention.ttl(), Some(Duration::from_secs(86_400)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults_for_missing_keys() {
        let config: AppConfig = toml::from_str(
            r#"
            bind_address = "0.0.0.0:8080"

            [transcription]
            poll_interval_secs = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.transcription.poll_interval_secs, 2);
        assert_eq!(config.transcription.poll_timeout_secs, 600);
        assert_eq!(config.storage.bucket, DEFAULT_BUCKET);
    }

    #[test]
    fn env_overrides_toml_and_cli_overrides_env() {
        let mut config = AppConfig {
            bind_address: "10.0.0.1:1".into(),
            ..AppConfig::default()
        };
        let applied = config
            .apply_env(env(&[
                ("LANGGUARD_BIND_ADDRESS", "10.0.0.2:2"),
                ("LANGGUARD_BUCKET", "my-bucket"),
                ("LANGGUARD_AWS_REGION", "ap-southeast-1"),
                ("LANGGUARD_POLL_TIMEOUT_SECS", "30"),
                ("LANGGUARD_SWEEP_INTERVAL_SECS", "60"),
            ]))
            .unwrap();
        assert_eq!(
            applied,
            vec![
                "LANGGUARD_BIND_ADDRESS",
                "LANGGUARD_BUCKET",
                "LANGGUARD_AWS_REGION",
                "LANGGUARD_POLL_TIMEOUT_SECS",
                "LANGGUARD_SWEEP_INTERVAL_SECS",
            ]
        );
        assert_eq!(config.bind_address, "10.0.0.2:2");
        assert_eq!(config.storage.bucket, "my-bucket");
        assert_eq!(config.aws.region.as_deref(), Some("ap-southeast-1"));
        assert_eq!(config.transcription.poll_timeout_secs, 30);
        assert_eq!(config.retention.sweep_interval_secs, 60);

        config.apply_cli(&CliOverrides {
            bind_address: Some("10.0.0.3:3".into()),
            ..CliOverrides::default()
        });
        assert_eq!(config.bind_address, "10.0.0.3:3");
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut config = AppConfig::default();
        let applied = config
            .apply_env(env(&[("LANGGUARD_BUCKET", "  ")]))
            .unwrap();
        assert!(applied.is_empty());
        assert_eq!(config.storage.bucket, DEFAULT_BUCKET);
    }

    #[test]
    fn bad_numeric_env_is_a_config_error() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env(env(&[("LANGGUARD_POLL_INTERVAL_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn validation_rejects_inconsistent_polling() {
        let mut config = AppConfig::default();
        config.transcription.poll_interval_secs = 10;
        config.transcription.poll_timeout_secs = 5;
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.synthesis.chunk_budget = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_ttl_disables_eviction() {
        let retention = RetentionConfig {
            artifact_ttl_secs: 0,
            sweep_interval_secs: 60,
        };
        assert_eq!(retention.ttl(), None);
    }
}
