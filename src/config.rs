//! Configuration file handling for stockcheck.
//!
//! Loads configuration from `~/.config/stockcheck/config.toml` or a custom path.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The environment variable holding the persistence API base URL.
/// Takes precedence over the config file.
pub const API_URL_ENV: &str = "STOCKCHECK_API_URL";

/// Configuration file structure for stockcheck.
/// Loaded from ~/.config/stockcheck/config.toml (or custom path via --config).
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub camera: CameraConfig,
}

#[derive(Debug, Deserialize, Default)]
pub struct ApiConfig {
    /// Base URL of the persistence API, e.g. `https://stock.example.org`.
    pub base_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CameraConfig {
    /// Device index used for the rear ("environment") facing preference.
    #[serde(default)]
    pub environment_device: u32,
    /// Device index used for the front ("user") facing preference.
    #[serde(default = "default_user_device")]
    pub user_device: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            environment_device: 0,
            user_device: default_user_device(),
        }
    }
}

fn default_user_device() -> u32 {
    1
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                source: e,
            })?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Resolve the API base URL: environment variable first, then config file.
    ///
    /// Returns `None` when neither is set; callers must treat that as a
    /// configuration error rather than falling back to a hardcoded host.
    pub fn api_base_url(&self) -> Option<String> {
        std::env::var(API_URL_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.api.base_url.clone())
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("stockcheck").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/stockcheck/config.toml")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = Config::load(Some(Path::new("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config.camera.environment_device, 0);
        assert_eq!(config.camera.user_device, 1);
        assert!(config.api.base_url.is_none());
    }

    #[test]
    fn test_parses_full_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[api]\nbase_url = \"https://stock.example.org\"\n\n[camera]\nenvironment_device = 2\nuser_device = 0"
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(
            config.api.base_url.as_deref(),
            Some("https://stock.example.org")
        );
        assert_eq!(config.camera.environment_device, 2);
        assert_eq!(config.camera.user_device, 0);
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api\nbase_url = oops").unwrap();

        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
