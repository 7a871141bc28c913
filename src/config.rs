use serde::Deserialize;
use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(deserialize_with = "deserialize_log_level")]
    pub log_level: LogLevel,
    pub storage: StorageConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

fn deserialize_log_level<'de, D>(deserializer: D) -> Result<LogLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

impl ServerConfig {
    pub fn get_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_frame_path")]
    pub frame_path: PathBuf,
}

fn default_frame_path() -> PathBuf {
    PathBuf::from("./latest_frame.jpg")
}

/// Limits applied to the multipart endpoints.
#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Reject `image` parts that declare a non-JPEG content type.
    #[serde(default)]
    pub require_jpeg: bool,
}

fn default_max_body_bytes() -> usize {
    32 << 20
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: default_max_body_bytes(),
            require_jpeg: false,
        }
    }
}

/// Selects the `{environment}.yaml` overlay through `APP_ENVIRONMENT`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("local") {
            Ok(Self::Local)
        } else if s.eq_ignore_ascii_case("production") {
            Ok(Self::Production)
        } else {
            Err(format!(
                "unknown environment `{}`, expected `local` or `production`",
                s
            ))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogLevel {
    Debug,
    Info,
}

impl LogLevel {
    /// Directive used as the default `EnvFilter` level.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [LogLevel::Debug, LogLevel::Info]
            .into_iter()
            .find(|level| s.eq_ignore_ascii_case(level.as_str()))
            .ok_or_else(|| format!("unsupported log level `{}`, expected `debug` or `info`", s))
    }
}

pub fn get_configuration() -> Result<Config, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("no current directory: {}", e)))?;

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .parse()
        .map_err(config::ConfigError::Message)?;

    load_configuration(&base_path.join("configuration"), &environment)
}

/// Layers `base.yaml`, the environment file and `RELAY_*` variables.
pub fn load_configuration(
    configuration_directory: &Path,
    environment: &Environment,
) -> Result<Config, config::ConfigError> {
    let config = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("base.yaml"),
        ))
        .add_source(
            config::File::from(
                configuration_directory.join(format!("{}.yaml", environment.as_str())),
            )
            .required(false),
        )
        .add_source(
            config::Environment::with_prefix("RELAY")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    config.try_deserialize::<Config>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_log_level_is_case_insensitive() {
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("Info".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert!("trace".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_unknown_environment_is_rejected() {
        let err = "staging".parse::<Environment>().unwrap_err();
        assert!(err.contains("staging"));
        assert_eq!(
            "Production".parse::<Environment>().unwrap(),
            Environment::Production
        );
    }

    #[test]
    fn test_environment_file_overrides_base() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("base.yaml"),
            "server:\n  host: \"0.0.0.0\"\nlog_level: \"info\"\nstorage:\n  frame_path: \"/var/lib/relay/frame.jpg\"\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("production.yaml"),
            "server:\n  host: \"10.0.0.1\"\n  port: 9000\n",
        )
        .unwrap();

        let config = load_configuration(dir.path(), &Environment::Production).unwrap();

        assert_eq!(config.server.get_address(), "10.0.0.1:9000");
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(
            config.storage.frame_path,
            PathBuf::from("/var/lib/relay/frame.jpg")
        );
        assert_eq!(config.upload.max_body_bytes, 32 * 1024 * 1024);
        assert!(!config.upload.require_jpeg);
    }

    #[test]
    fn test_missing_base_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_configuration(dir.path(), &Environment::Local).is_err());
    }
}
