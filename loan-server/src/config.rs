//! Server configuration, read from an optional TOML file.
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1"
//! port = 8080
//!
//! [database]
//! backend = "sqlite"
//! connection_string = "reports.db"
//!
//! [logging]
//! level = "info"
//! file = "loan-server.log"
//! stdout = true
//!
//! [wizard]
//! validate_jumps = false
//! idle_minutes = 60
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use loan_core::db::DbConfig;
use loan_core::wizard::JumpPolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ListenConfig,
    pub database: DbConfig,
    pub logging: LoggingConfig,
    pub wizard: WizardConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Bare level or full `EnvFilter` directive. `RUST_LOG` wins when set.
    pub level: String,
    /// Appended to when set.
    pub file: Option<PathBuf>,
    pub stdout: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            stdout: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    /// Re-validate skipped steps on forward jumps.
    pub validate_jumps: bool,
    /// Sessions untouched for this long are dropped.
    pub idle_minutes: u64,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            validate_jumps: false,
            idle_minutes: 60,
        }
    }
}

impl WizardConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_minutes.saturating_mul(60))
    }

    pub fn jump_policy(&self) -> JumpPolicy {
        if self.validate_jumps {
            JumpPolicy::ValidateIntervening
        } else {
            JumpPolicy::Free
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind.trim().is_empty() {
            return Err(ConfigError::Invalid("server.bind must not be empty".to_string()));
        }
        if self.database.backend.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "database.backend must not be empty".to_string(),
            ));
        }
        if self.database.connection_string.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "database.connection_string must not be empty".to_string(),
            ));
        }
        if self.wizard.idle_minutes == 0 {
            return Err(ConfigError::Invalid(
                "wizard.idle_minutes must be at least 1".to_string(),
            ));
        }
        if let Err(e) = EnvFilter::try_new(&self.logging.level) {
            return Err(ConfigError::Invalid(format!(
                "logging.level '{}' is not a valid filter: {e}",
                self.logging.level
            )));
        }
        Ok(())
    }

    /// `host:port` for the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }
}

/// Loads the configuration at `path`.
///
/// A missing file yields the defaults. The result is validated either way.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    if !path.exists() {
        let cfg = ServerConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg: ServerConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn write(
        dir: &tempfile::TempDir,
        contents: &str,
    ) -> PathBuf {
        let path = dir.path().join("loan-server.toml");
        fs::write(&path, contents).expect("write config");
        path
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");

        let cfg = load_config(&dir.path().join("missing.toml")).expect("load");

        assert_eq!(cfg, ServerConfig::default());
        assert_eq!(cfg.listen_addr(), "127.0.0.1:8080");
        assert_eq!(cfg.database.connection_string, ":memory:");
        assert_eq!(cfg.wizard.jump_policy(), JumpPolicy::Free);
        assert_eq!(cfg.wizard.idle_timeout(), Duration::from_secs(3600));
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(
            &dir,
            r#"
[database]
connection_string = "reports.db"

[wizard]
validate_jumps = true
"#,
        );

        let cfg = load_config(&path).expect("load");

        assert_eq!(cfg.database.backend, "sqlite");
        assert_eq!(cfg.database.connection_string, "reports.db");
        assert_eq!(cfg.server.port, 8080);
        assert!(cfg.logging.stdout);
        assert_eq!(cfg.wizard.jump_policy(), JumpPolicy::ValidateIntervening);
    }

    #[test]
    fn zero_idle_timeout_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(&dir, "[wizard]\nidle_minutes = 0\n");

        match load_config(&path) {
            Err(ConfigError::Invalid(msg)) => assert!(msg.contains("wizard.idle_minutes")),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(&dir, "[server\nport = 1");

        let err = load_config(&path).unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn wrong_type_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(&dir, "[server]\nport = \"eighty\"\n");

        assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn empty_backend_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(&dir, "[database]\nbackend = \"\"\n");

        match load_config(&path) {
            Err(ConfigError::Invalid(msg)) => assert!(msg.contains("database.backend")),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let mut cfg = ServerConfig::default();
        cfg.logging.level = "loan_server=loud".to_string();

        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }
}
