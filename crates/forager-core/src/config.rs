//! Configuration loading and typed config structures for Forager.
//!
//! The configuration lives in `forager-config.yaml` next to the binary.
//! This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads the file. Every field has
//! a default, so an empty file (or no file at all) yields a working
//! configuration.

use std::path::{Path, PathBuf};

use forager_types::{ClientLanguage, Job, NodeId};
use serde::Deserialize;

/// Environment variable that overrides `session.world_data`.
pub const WORLD_DATA_ENV: &str = "FORAGER_WORLD_DATA";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level Forager configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GatherConfig {
    /// Feature toggles and gear-set names.
    #[serde(default)]
    pub features: FeatureConfig,

    /// Session settings (language, data paths, polling).
    #[serde(default)]
    pub session: SessionConfig,

    /// Alarms registered at startup.
    #[serde(default)]
    pub alarms: Vec<AlarmConfig>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GatherConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `FORAGER_WORLD_DATA` overrides `session.world_data` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to a mapping.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.session.apply_env_overrides();
        Ok(config)
    }
}

/// Feature toggles for the action pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeatureConfig {
    /// Issue a teleport command to the node's aetheryte.
    #[serde(default = "default_true")]
    pub use_teleport: bool,

    /// Switch to the matching job's gear set before travelling.
    #[serde(default = "default_true")]
    pub use_gear_change: bool,

    /// Place a map flag on the node's coordinates.
    #[serde(default = "default_true")]
    pub use_coordinates: bool,

    /// Gear set used for mining and quarrying nodes.
    #[serde(default)]
    pub miner_set_name: Option<String>,

    /// Gear set used for logging and harvesting nodes.
    #[serde(default)]
    pub botanist_set_name: Option<String>,

    /// Real milliseconds to wait after each dispatched command.
    #[serde(default = "default_command_settle_ms")]
    pub command_settle_ms: u64,
}

impl FeatureConfig {
    /// Configuration key holding the set-name override for `job`.
    pub const fn set_name_key(job: Job) -> &'static str {
        match job {
            Job::Miner => "miner_set_name",
            Job::Botanist => "botanist_set_name",
        }
    }

    /// Gear set name for `job`: the configured override if non-empty,
    /// otherwise the job's own name.
    pub fn set_name(&self, job: Job) -> &str {
        let configured = match job {
            Job::Miner => self.miner_set_name.as_deref(),
            Job::Botanist => self.botanist_set_name.as_deref(),
        };
        configured
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| job.default_set_name())
    }

    /// Feature set with every toggle off.
    pub fn all_disabled() -> Self {
        Self {
            use_teleport: false,
            use_gear_change: false,
            use_coordinates: false,
            ..Self::default()
        }
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            use_teleport: default_true(),
            use_gear_change: default_true(),
            use_coordinates: default_true(),
            miner_set_name: None,
            botanist_set_name: None,
            command_settle_ms: default_command_settle_ms(),
        }
    }
}

/// Session settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// Client language used for territory names in coordinate commands.
    #[serde(default)]
    pub language: ClientLanguage,

    /// Path to a JSON world-data export. The bundled sample world is used
    /// when unset.
    #[serde(default)]
    pub world_data: Option<PathBuf>,

    /// Real milliseconds between alarm polls.
    #[serde(default = "default_alarm_poll_interval_ms")]
    pub alarm_poll_interval_ms: u64,

    /// Path to the teleport collaborator's JSON configuration, watched for
    /// its language setting.
    #[serde(default)]
    pub teleporter_config: Option<PathBuf>,
}

impl SessionConfig {
    /// Override session paths with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup(WORLD_DATA_ENV).filter(|v| !v.trim().is_empty()) {
            self.world_data = Some(PathBuf::from(val));
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            language: ClientLanguage::default(),
            world_data: None,
            alarm_poll_interval_ms: default_alarm_poll_interval_ms(),
            teleporter_config: None,
        }
    }
}

/// One alarm registered at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AlarmConfig {
    /// Display name announced when the alarm fires.
    pub name: String,

    /// Node whose uptime window drives the alarm.
    pub node: NodeId,

    /// Real minutes of lead time before the window opens.
    #[serde(default)]
    pub offset_minutes: i64,

    /// Disabled alarms are skipped at registration.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

const fn default_true() -> bool {
    true
}

const fn default_command_settle_ms() -> u64 {
    250
}

const fn default_alarm_poll_interval_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_enables_everything() {
        let config = GatherConfig::default();
        assert!(config.features.use_teleport);
        assert!(config.features.use_gear_change);
        assert!(config.features.use_coordinates);
        assert_eq!(config.features.command_settle_ms, 250);
        assert_eq!(config.session.alarm_poll_interval_ms, 2000);
        assert_eq!(config.session.language, ClientLanguage::English);
        assert!(config.alarms.is_empty());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn empty_yaml_gives_defaults() {
        let config = GatherConfig::parse("").unwrap();
        assert_eq!(config.features, FeatureConfig::default());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
features:
  use_teleport: false
  use_gear_change: true
  use_coordinates: false
  miner_set_name: "MIN Endgame"
  command_settle_ms: 0

session:
  language: german
  world_data: "data/world.json"
  alarm_poll_interval_ms: 500
  teleporter_config: "plugins/Teleporter.json"

alarms:
  - name: "Cobalt"
    node: 101
    offset_minutes: 2
  - name: "Sap"
    node: 202
    enabled: false

logging:
  level: debug
"#;
        let config = GatherConfig::parse(yaml).unwrap();
        assert!(!config.features.use_teleport);
        assert!(!config.features.use_coordinates);
        assert_eq!(config.features.set_name(Job::Miner), "MIN Endgame");
        assert_eq!(config.features.set_name(Job::Botanist), "Botanist");
        assert_eq!(config.features.command_settle_ms, 0);
        assert_eq!(config.session.language, ClientLanguage::German);
        assert_eq!(config.session.alarm_poll_interval_ms, 500);
        assert_eq!(
            config.session.teleporter_config,
            Some(PathBuf::from("plugins/Teleporter.json"))
        );
        assert_eq!(config.alarms.len(), 2);
        assert_eq!(config.alarms[0].node, NodeId(101));
        assert_eq!(config.alarms[0].offset_minutes, 2);
        assert!(config.alarms[0].enabled);
        assert!(!config.alarms[1].enabled);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn blank_set_name_falls_back_to_job_name() {
        let features = FeatureConfig {
            miner_set_name: Some("   ".to_owned()),
            ..FeatureConfig::default()
        };
        assert_eq!(features.set_name(Job::Miner), "Miner");
    }

    #[test]
    fn env_override_replaces_world_data() {
        let mut session = SessionConfig::default();
        session.apply_overrides_from(|key| {
            (key == WORLD_DATA_ENV).then(|| "/srv/world.json".to_owned())
        });
        assert_eq!(session.world_data, Some(PathBuf::from("/srv/world.json")));
    }

    #[test]
    fn blank_env_override_is_ignored() {
        let mut session = SessionConfig {
            world_data: Some(PathBuf::from("local.json")),
            ..SessionConfig::default()
        };
        session.apply_overrides_from(|_| Some(String::new()));
        assert_eq!(session.world_data, Some(PathBuf::from("local.json")));
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result = GatherConfig::parse("features: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = GatherConfig::from_file(Path::new("/nonexistent/forager-config.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn from_file_reads_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forager-config.yaml");
        std::fs::write(&path, "session:\n  language: french\n").unwrap();
        let config = GatherConfig::from_file(&path).unwrap();
        assert_eq!(config.session.language, ClientLanguage::French);
    }
}
