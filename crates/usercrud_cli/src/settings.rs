//! Application settings.
//!
//! Sources, lowest priority first: built-in defaults, the TOML file
//! (`usercrud.toml` in the working directory unless `--config` names one),
//! then `USERCRUD_*` environment variables such as `USERCRUD_STORE__PATH`.
//! Command-line flags are applied on top by `main`.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;
use usercrud_core::{default_log_level, StoreSettings};

pub const DEFAULT_CONFIG_FILE: &str = "usercrud.toml";
const ENV_PREFIX: &str = "USERCRUD";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub in_memory: bool,
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("usercrud.sqlite3"),
            in_memory: false,
            busy_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Relative paths resolve against the working directory.
    pub dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: PathBuf::from("logs"),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Load(config::ConfigError),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load(err) => write!(f, "failed to load configuration: {err}"),
            Self::Invalid(message) => write!(f, "invalid configuration: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Load(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(value: config::ConfigError) -> Self {
        Self::Load(value)
    }
}

impl AppConfig {
    /// Loads defaults, the config file and the environment.
    ///
    /// An explicitly named file must exist; the default file is optional.
    pub fn load(explicit_file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(explicit_file, None)
    }

    /// Same as [`AppConfig::load`], reading variables from `env` instead of
    /// the process environment when it is given.
    fn load_with_env(
        explicit_file: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let file = match explicit_file {
            Some(path) => config::File::from(path).required(true),
            None => config::File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
        };

        let settings = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.store.in_memory && self.store.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "store.path cannot be empty".to_string(),
            ));
        }
        if self.store.busy_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "store.busy_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn store_settings(&self, base_dir: &Path) -> StoreSettings {
        let mut settings = if self.store.in_memory {
            StoreSettings::in_memory()
        } else {
            StoreSettings::file(resolve(base_dir, &self.store.path))
        };
        settings.busy_timeout = Duration::from_millis(self.store.busy_timeout_ms);
        settings
    }

    pub fn log_dir(&self, base_dir: &Path) -> PathBuf {
        resolve(base_dir, &self.logging.dir)
    }
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError};
    use std::path::Path;
    use std::time::Duration;
    use usercrud_core::StoreLocation;

    #[test]
    fn explicit_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("custom.toml");
        std::fs::write(
            &file,
            "[store]\npath = \"people.sqlite3\"\nbusy_timeout_ms = 250\n\n[logging]\nlevel = \"warn\"\n",
        )
        .unwrap();

        let config = AppConfig::load_with_env(Some(file.as_path()), env(&[])).unwrap();
        assert_eq!(config.store.path, Path::new("people.sqlite3"));
        assert_eq!(config.store.busy_timeout_ms, 250);
        assert!(!config.store.in_memory);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.dir, Path::new("logs"));
    }

    fn env(pairs: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        )
    }

    #[test]
    fn environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("usercrud.toml");
        std::fs::write(
            &file,
            "[store]\npath = \"file.sqlite3\"\nbusy_timeout_ms = 250\n\n[logging]\nlevel = \"debug\"\ndir = \"file-logs\"\n",
        )
        .unwrap();

        let config = AppConfig::load_with_env(
            Some(file.as_path()),
            env(&[
                ("USERCRUD_STORE__PATH", "env.sqlite3"),
                ("USERCRUD_LOGGING__LEVEL", "warn"),
                ("USERCRUD_LOGGING__DIR", "/var/log/usercrud"),
                ("OTHER_STORE__PATH", "ignored.sqlite3"),
            ]),
        )
        .unwrap();

        assert_eq!(config.store.path, Path::new("env.sqlite3"));
        assert_eq!(config.store.busy_timeout_ms, 250);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.dir, Path::new("/var/log/usercrud"));
    }

    #[test]
    fn environment_values_are_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_with_env(
            Some(write_empty(dir.path()).as_path()),
            env(&[
                ("USERCRUD_STORE__IN_MEMORY", "true"),
                ("USERCRUD_STORE__BUSY_TIMEOUT_MS", "750"),
            ]),
        )
        .unwrap();

        assert!(config.store.in_memory);
        assert_eq!(config.store.busy_timeout_ms, 750);
        assert_eq!(config.store.path, Path::new("usercrud.sqlite3"));
    }

    fn write_empty(dir: &Path) -> std::path::PathBuf {
        let file = dir.join("empty.toml");
        std::fs::write(&file, "").unwrap();
        file
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::load(Some(dir.path().join("absent.toml").as_path()));
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn relative_paths_resolve_against_base_dir() {
        let config = AppConfig::default();
        let base = Path::new("/srv/usercrud");

        let settings = config.store_settings(base);
        assert_eq!(
            settings.location,
            StoreLocation::File(base.join("usercrud.sqlite3"))
        );
        assert_eq!(settings.busy_timeout, Duration::from_secs(5));
        assert_eq!(config.log_dir(base), base.join("logs"));
    }

    #[test]
    fn in_memory_store_ignores_path() {
        let mut config = AppConfig::default();
        config.store.in_memory = true;
        config.store.path = "".into();

        assert!(config.validate().is_ok());
        assert_eq!(
            config.store_settings(Path::new("/tmp")).location,
            StoreLocation::InMemory
        );
    }

    #[test]
    fn validate_rejects_empty_path_and_zero_timeout() {
        let mut config = AppConfig::default();
        config.store.path = "".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = AppConfig::default();
        config.store.busy_timeout_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
