use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::Platform;
use crate::logging::LogLevel;
use crate::request_policy::PatternTables;

pub const HOME_ENV: &str = "IDENTITY_SHIELD_HOME";
pub const LOG_ENV: &str = "IDENTITY_SHIELD_LOG";
pub const STATE_DIR_NAME: &str = ".identity-shield";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const PROFILE_FILE_NAME: &str = "identity-profile.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no home directory available and IDENTITY_SHIELD_HOME is not set")]
    NoHomeDirectory,

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IDENTITY_SHIELD_LOG: {0}")]
    InvalidLogLevel(String),

    #[error("unknown platform '{0}'")]
    UnknownPlatform(String),
}

/// Top-level shield configuration. Every field has a default so a partial
/// `config.json` is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShieldConfig {
    /// Always the directory the config was resolved from; a value in the file
    /// is ignored.
    #[serde(skip)]
    pub state_dir: PathBuf,
    pub log_level: LogLevel,
    pub product_domains: Vec<String>,
    pub extra_essential: Vec<String>,
    pub extra_telemetry: Vec<String>,
    /// `win32` / `darwin` / `linux`; the build target when unset.
    pub platform: Option<String>,
}

impl Default for ShieldConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from(STATE_DIR_NAME),
            log_level: LogLevel::default(),
            product_domains: crate::request_policy::rules::DEFAULT_PRODUCT_DOMAINS
                .iter()
                .map(|d| d.to_string())
                .collect(),
            extra_essential: Vec::new(),
            extra_telemetry: Vec::new(),
            platform: None,
        }
    }
}

impl ShieldConfig {
    /// `$IDENTITY_SHIELD_HOME`, else `~/.identity-shield`.
    pub fn default_state_dir() -> Result<PathBuf, ConfigError> {
        if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(STATE_DIR_NAME))
            .ok_or(ConfigError::NoHomeDirectory)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let state_dir = Self::default_state_dir()?;
        let log_override = std::env::var(LOG_ENV).ok().filter(|v| !v.is_empty());
        Self::load_from(state_dir, log_override.as_deref())
    }

    /// Reads `config.json` in `state_dir` when present and applies the log
    /// level override.
    pub fn load_from(state_dir: PathBuf, log_override: Option<&str>) -> Result<Self, ConfigError> {
        let file = state_dir.join(CONFIG_FILE_NAME);
        let mut config = if file.exists() {
            Self::from_file(&file)?
        } else {
            Self::default()
        };
        config.state_dir = state_dir;
        if let Some(level) = log_override {
            config.log_level = level.parse().map_err(ConfigError::InvalidLogLevel)?;
        }
        config.platform()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = dir.into();
        self
    }

    pub fn profile_path(&self) -> PathBuf {
        self.state_dir.join(PROFILE_FILE_NAME)
    }

    pub fn platform(&self) -> Result<Platform, ConfigError> {
        match &self.platform {
            None => Ok(Platform::current()),
            Some(name) => Platform::parse(name).ok_or_else(|| ConfigError::UnknownPlatform(name.clone())),
        }
    }

    pub fn pattern_tables(&self) -> PatternTables {
        PatternTables::default()
            .with_product_domains(&self.product_domains)
            .with_extra_essential(&self.extra_essential)
            .with_extra_telemetry(&self.extra_telemetry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults_in_state_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = ShieldConfig::load_from(dir.path().to_path_buf(), None).unwrap();
        assert_eq!(config.state_dir, dir.path());
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.product_domains, vec!["augmentcode.com".to_string()]);
        assert_eq!(config.profile_path(), dir.path().join(PROFILE_FILE_NAME));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{"logLevel":"debug","extraTelemetry":["metrics.corp"],"platform":"linux"}"#,
        )
        .unwrap();
        let config = ShieldConfig::load_from(dir.path().to_path_buf(), None).unwrap();
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.extra_telemetry, vec!["metrics.corp".to_string()]);
        assert_eq!(config.platform().unwrap(), Platform::Linux);
        assert_eq!(config.product_domains, vec!["augmentcode.com".to_string()]);
    }

    #[test]
    fn log_override_beats_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), r#"{"logLevel":"debug"}"#).unwrap();
        let config = ShieldConfig::load_from(dir.path().to_path_buf(), Some("error")).unwrap();
        assert_eq!(config.log_level, LogLevel::Error);
    }

    #[test]
    fn bad_inputs_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ShieldConfig::load_from(dir.path().to_path_buf(), Some("loud")),
            Err(ConfigError::InvalidLogLevel(_))
        ));
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "{not json").unwrap();
        assert!(matches!(
            ShieldConfig::load_from(dir.path().to_path_buf(), None),
            Err(ConfigError::Parse { .. })
        ));
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), r#"{"platform":"beos"}"#).unwrap();
        assert!(matches!(
            ShieldConfig::load_from(dir.path().to_path_buf(), None),
            Err(ConfigError::UnknownPlatform(_))
        ));
    }

    #[test]
    fn pattern_tables_carry_config() {
        let config = ShieldConfig {
            extra_essential: vec!["intranet.local".to_string()],
            ..ShieldConfig::default()
        };
        let tables = config.pattern_tables();
        assert!(tables.essential.contains(&"intranet.local".to_string()));
        assert!(tables.essential.contains(&"localhost".to_string()));
    }
}
