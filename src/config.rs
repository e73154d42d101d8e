/// Report configuration.
///
/// The report runs without any configuration: every field defaults to the
/// fixed paths the report was built around. A TOML file can override them:
///
/// ```toml
/// input_path = "data/extract.csv"
/// images_dir = "images"
///
/// [logging]
/// level = "debug"
/// file = "lag_report.log"
/// timestamps = true
/// ```
///
/// The file is `./lag_report.toml` (optional), or the path named by the
/// `LAG_REPORT_CONFIG` environment variable (required to exist). `.env` is
/// read first, so the variable may live there.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::logging::LogLevel;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Location of the reconciliation extract.
pub const DEFAULT_INPUT_PATH: &str =
    "../../../Downloads/SkyLedgerReconciliationExtract_FrontierAirlines_URExtract.csv";

/// Directory the chart PNGs are written to.
pub const DEFAULT_IMAGES_DIR: &str = "../images";

pub const DEFAULT_CONFIG_PATH: &str = "./lag_report.toml";

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "LAG_REPORT_CONFIG";

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub input_path: PathBuf,
    pub images_dir: PathBuf,
    pub logging: LoggingConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            images_dir: PathBuf::from(DEFAULT_IMAGES_DIR),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: LogLevel,
    /// Append log entries to this file as well as the console.
    pub file: Option<String>,
    /// Timestamped console output.
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: LogLevel::Info,
            file: None,
            timestamps: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// The config file could not be read.
    Read { path: String, message: String },
    /// The config file is not valid TOML for `ReportConfig`.
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read { path, message } => {
                write!(f, "Cannot read config {}: {}", path, message)
            }
            ConfigError::Parse(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

pub fn parse_config(text: &str) -> Result<ReportConfig, ConfigError> {
    toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
}

pub fn load_config_from(path: &Path) -> Result<ReportConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    parse_config(&text)
}

/// Resolves the configuration for a run.
///
/// An explicit `LAG_REPORT_CONFIG` file must exist; the default file may be
/// absent, in which case the built-in defaults apply.
pub fn load_config() -> Result<ReportConfig, ConfigError> {
    dotenv::dotenv().ok();

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return load_config_from(Path::new(&path));
    }

    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        load_config_from(default_path)
    } else {
        Ok(ReportConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, ReportConfig::default());
        assert_eq!(config.images_dir, PathBuf::from("../images"));
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_partial_override() {
        let config = parse_config(
            r#"
            input_path = "data/extract.csv"

            [logging]
            level = "warn"
            timestamps = true
            "#,
        )
        .unwrap();

        assert_eq!(config.input_path, PathBuf::from("data/extract.csv"));
        assert_eq!(config.images_dir, PathBuf::from(DEFAULT_IMAGES_DIR));
        assert_eq!(config.logging.level, LogLevel::Warning);
        assert!(config.logging.timestamps);
        assert_eq!(config.logging.file, None);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = parse_config("output = \"x\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = load_config_from(Path::new("/nonexistent/lag_report.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lag_report.toml");
        std::fs::write(&path, "images_dir = \"out\"\n").unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.images_dir, PathBuf::from("out"));
    }
}
