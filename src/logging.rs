/// Structured logging for the revenue lag report
///
/// Provides context-rich logging tagged with the pipeline stage and an
/// optional subject (file, grouping or chart name), with severity levels.
/// Supports both console output and appending to a log file.

use chrono::Utc;
use serde::Deserialize;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline Stages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extract,
    Clean,
    Analysis,
    Chart,
    System,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Extract => write!(f, "EXTRACT"),
            Stage::Clean => write!(f, "CLEAN"),
            Stage::Analysis => write!(f, "ANALYSIS"),
            Stage::Chart => write!(f, "CHART"),
            Stage::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        if let Ok(mut slot) = LOGGER.lock() {
            *slot = Some(logger);
        }
    }

    /// Formats the file/timestamped form of an entry.
    fn format_entry(level: LogLevel, stage: Stage, subject: Option<&str>, message: &str) -> String {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let subject_part = subject.map(|s| format!(" [{}]", s)).unwrap_or_default();
        format!("{} {} {}{}: {}", timestamp, level, stage, subject_part, message)
    }

    fn log(&self, level: LogLevel, stage: Stage, subject: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let log_entry = Self::format_entry(level, stage, subject, message);
        let subject_part = subject.map(|s| format!(" [{}]", s)).unwrap_or_default();

        // Console output
        if self.console_timestamps {
            match level {
                LogLevel::Error => eprintln!("{}", log_entry),
                LogLevel::Warning => eprintln!("   {}", log_entry),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => println!("   [DEBUG] {}", message),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", stage, subject_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", stage, subject_part, message),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => {} // Skip debug in non-timestamp mode
            }
        }

        // File output
        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

fn dispatch(level: LogLevel, stage: Stage, subject: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, stage, subject, message);
        }
    }
}

/// Log a general informational message
pub fn info(stage: Stage, subject: Option<&str>, message: &str) {
    dispatch(LogLevel::Info, stage, subject, message);
}

/// Log a warning message
pub fn warn(stage: Stage, subject: Option<&str>, message: &str) {
    dispatch(LogLevel::Warning, stage, subject, message);
}

/// Log an error message
pub fn error(stage: Stage, subject: Option<&str>, message: &str) {
    dispatch(LogLevel::Error, stage, subject, message);
}

/// Log a debug message
pub fn debug(stage: Stage, subject: Option<&str>, message: &str) {
    dispatch(LogLevel::Debug, stage, subject, message);
}

// ---------------------------------------------------------------------------
// Summary Logging
// ---------------------------------------------------------------------------

/// Log how many extract rows survived cleaning.
///
/// An empty result is a warning: every grouping downstream will be empty.
pub fn log_clean_summary(rows_read: usize, rows_kept: usize) {
    let message = format!(
        "Cleaning complete: {}/{} rows kept, {} dropped",
        rows_kept,
        rows_read,
        rows_read.saturating_sub(rows_kept)
    );

    if rows_kept == 0 {
        warn(Stage::Clean, None, &message);
    } else {
        info(Stage::Clean, None, &message);
    }
}

/// Log a fatal failure of one pipeline stage.
pub fn log_stage_failure(stage: Stage, operation: &str, err: &dyn std::error::Error) {
    let message = format!("{} failed: {}", operation, err);
    error(stage, None, &message);
}
