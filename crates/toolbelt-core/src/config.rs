use serde::Deserialize;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::credentials::{GenerationLimits, DEFAULT_MAX_LENGTH, MIN_PASSWORD_LENGTH};
use crate::logging::LogFormat;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid {name} override {value:?}: {reason}")]
    Env {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Invalid(String),
}

/// On-disk configuration. Every field is optional; unset fields fall back
/// to the defaults in [`Settings`].
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub workers: Option<usize>,
    pub max_body_bytes: Option<usize>,
    pub max_generated_length: Option<usize>,
    pub log_format: Option<LogFormat>,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(host) = &self.host {
            if host.trim().is_empty() {
                return Err(ConfigError::Invalid("host must not be empty".to_string()));
            }
        }
        if self.port == Some(0) {
            return Err(ConfigError::Invalid("port must be non-zero".to_string()));
        }
        if self.workers == Some(0) {
            return Err(ConfigError::Invalid("workers must be at least 1".to_string()));
        }
        if self.max_body_bytes == Some(0) {
            return Err(ConfigError::Invalid(
                "max_body_bytes must be non-zero".to_string(),
            ));
        }
        if let Some(max) = self.max_generated_length {
            if max < MIN_PASSWORD_LENGTH {
                return Err(ConfigError::Invalid(format!(
                    "max_generated_length must be at least {}",
                    MIN_PASSWORD_LENGTH
                )));
            }
        }
        Ok(())
    }
}

pub fn default_config_path() -> PathBuf {
    // ~/.config/toolbelt/config.toml
    if let Some(home) = env::var_os("HOME") {
        PathBuf::from(home)
            .join(".config")
            .join("toolbelt")
            .join("config.toml")
    } else {
        PathBuf::from(".config/toolbelt/config.toml")
    }
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&data)?)
}

/// Loads the file named by `TOOLBELT_CONFIG`, or the default path.
///
/// An absent default file yields an empty config. A file explicitly named
/// by `TOOLBELT_CONFIG` must exist.
pub fn load_config_or_default() -> Result<(Config, Option<PathBuf>), ConfigError> {
    match env::var_os("TOOLBELT_CONFIG") {
        Some(path) => {
            let path = PathBuf::from(path);
            Ok((read_config(&path)?, Some(path)))
        }
        None => {
            let path = default_config_path();
            if path.exists() {
                Ok((read_config(&path)?, Some(path)))
            } else {
                Ok((Config::default(), None))
            }
        }
    }
}

/// Fully resolved server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub max_body_bytes: usize,
    pub limits: GenerationLimits,
    pub log_format: LogFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            workers: DEFAULT_WORKERS,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            limits: GenerationLimits {
                max_length: DEFAULT_MAX_LENGTH,
            },
            log_format: LogFormat::default(),
        }
    }
}

impl Settings {
    pub fn from_config(cfg: &Config) -> Self {
        let defaults = Settings::default();
        Self {
            host: cfg.host.clone().unwrap_or(defaults.host),
            port: cfg.port.unwrap_or(defaults.port),
            workers: cfg.workers.unwrap_or(defaults.workers),
            max_body_bytes: cfg.max_body_bytes.unwrap_or(defaults.max_body_bytes),
            limits: GenerationLimits {
                max_length: cfg
                    .max_generated_length
                    .unwrap_or(defaults.limits.max_length),
            },
            log_format: cfg.log_format.unwrap_or(defaults.log_format),
        }
    }

    /// Applies the `HOST` and `PORT` environment overrides.
    pub fn apply_env(mut self) -> Result<Self, ConfigError> {
        if let Ok(host) = env::var("HOST") {
            if host.trim().is_empty() {
                return Err(ConfigError::Env {
                    name: "HOST",
                    value: host,
                    reason: "must not be empty".to_string(),
                });
            }
            self.host = host;
        }
        if let Ok(port) = env::var("PORT") {
            self.port = match port.trim().parse::<u16>() {
                Ok(0) => {
                    return Err(ConfigError::Env {
                        name: "PORT",
                        value: port,
                        reason: "must be non-zero".to_string(),
                    })
                }
                Ok(value) => value,
                Err(e) => {
                    return Err(ConfigError::Env {
                        name: "PORT",
                        value: port,
                        reason: e.to_string(),
                    })
                }
            };
        }
        Ok(self)
    }

    /// Config file (if any), then environment overrides.
    pub fn resolve() -> Result<(Self, Option<PathBuf>), ConfigError> {
        let (cfg, path) = load_config_or_default()?;
        cfg.validate()?;
        let settings = Settings::from_config(&cfg).apply_env()?;
        Ok((settings, path))
    }

    pub fn listen_addr(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_path(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        env::temp_dir().join(format!("toolbelt-{prefix}-{nanos}.toml"))
    }

    fn restore(name: &str, prev: Option<String>) {
        if let Some(value) = prev {
            env::set_var(name, value);
        } else {
            env::remove_var(name);
        }
    }

    #[test]
    fn validate_rejects_empty_host() {
        let cfg = Config {
            host: Some(" ".to_string()),
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_port_and_workers() {
        let cfg = Config {
            port: Some(0),
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
        let cfg = Config {
            workers: Some(0),
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_tiny_generation_limit() {
        let cfg = Config {
            max_generated_length: Some(3),
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn settings_default_to_port_5000() {
        let settings = Settings::from_config(&Config::default());
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.listen_addr(), "0.0.0.0:5000");
    }

    #[test]
    fn listen_addr_brackets_ipv6() {
        let settings = Settings {
            host: "::1".to_string(),
            port: 8080,
            ..Settings::default()
        };
        assert_eq!(settings.listen_addr(), "[::1]:8080");
    }

    #[test]
    fn load_config_reads_toml() {
        let _guard = crate::test_support::ENV_LOCK
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let path = unique_temp_path("config-load");
        let data = "host = \"127.0.0.1\"\nport = 8081\nworkers = 2\nlog_format = \"json\"\n";
        fs::write(&path, data).expect("write config");

        let prev = env::var("TOOLBELT_CONFIG").ok();
        env::set_var("TOOLBELT_CONFIG", &path);

        let (cfg, loaded_path) = load_config_or_default().expect("load config");
        assert_eq!(loaded_path, Some(path.clone()));
        assert_eq!(cfg.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(cfg.port, Some(8081));
        assert_eq!(cfg.workers, Some(2));
        assert_eq!(cfg.log_format, Some(LogFormat::Json));

        restore("TOOLBELT_CONFIG", prev);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let _guard = crate::test_support::ENV_LOCK
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let path = unique_temp_path("config-missing");
        let prev = env::var("TOOLBELT_CONFIG").ok();
        env::set_var("TOOLBELT_CONFIG", &path);

        let err = load_config_or_default().unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));

        restore("TOOLBELT_CONFIG", prev);
    }

    #[test]
    fn port_env_overrides_config() {
        let _guard = crate::test_support::ENV_LOCK
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let prev_port = env::var("PORT").ok();
        let prev_host = env::var("HOST").ok();
        env::set_var("PORT", "7070");
        env::remove_var("HOST");

        let cfg = Config {
            port: Some(9000),
            ..Config::default()
        };
        let settings = Settings::from_config(&cfg).apply_env().expect("apply env");
        assert_eq!(settings.port, 7070);
        assert_eq!(settings.host, DEFAULT_HOST);

        env::set_var("PORT", "not-a-port");
        let err = Settings::default().apply_env().unwrap_err();
        assert!(err.to_string().contains("PORT"));

        restore("PORT", prev_port);
        restore("HOST", prev_host);
    }
}
