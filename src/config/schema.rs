//! TOML configuration schema.
//!
//! Every section is `#[serde(default)]`, so a partial or empty file yields
//! the built-in defaults for whatever it leaves out. Durations are
//! human-readable strings (`"60s"`, `"2m"`) parsed with `humantime` by
//! [`Config::validate`] and the typed accessors.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::xdg;
use crate::export::{ExportOptions, DEFAULT_FALLBACK_DENSITY, DEFAULT_FILE_PREFIX};
use crate::feedback::DEFAULT_RATE_LIMIT_MAX;
use crate::ingest::DEFAULT_MAX_FILE_SIZE;
use crate::preview::Theme;
use crate::state::{Properties, DEFAULT_HISTORY_LIMIT, MAX_PADDING};

/// Root of the config file:
/// ```toml
/// [canvas]
/// [export]
/// [ingest]
/// [history]
/// [feedback]
/// [logging]
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Initial visual properties of a new session.
    pub canvas: Properties,
    pub export: ExportConfig,
    pub ingest: IngestConfig,
    pub history: HistoryConfig,
    pub feedback: FeedbackConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Checks values serde cannot: ranges and duration strings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let density = self.export.fallback_density;
        if !(density.is_finite() && density > 0.0 && density <= 8.0) {
            return Err(ConfigError::InvalidValue {
                key: "export.fallback_density".to_string(),
                message: format!("{} is not in (0, 8]", density),
            });
        }
        if self.canvas.padding > MAX_PADDING {
            return Err(ConfigError::InvalidValue {
                key: "canvas.padding".to_string(),
                message: format!("{} is above the maximum of {}", self.canvas.padding, MAX_PADDING),
            });
        }
        if self.export.file_prefix.is_empty() || self.export.file_prefix.contains(['/', '\\']) {
            return Err(ConfigError::InvalidValue {
                key: "export.file_prefix".to_string(),
                message: format!("{:?} is not a valid file name prefix", self.export.file_prefix),
            });
        }
        if self.ingest.max_file_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "ingest.max_file_size".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if self.history.limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "history.limit".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        self.feedback.rate_window()?;
        Ok(())
    }
}

/// Color scheme used to resolve themed colors at export time.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeChoice {
    #[default]
    Light,
    Dark,
}

impl ThemeChoice {
    pub fn theme(self) -> Theme {
        match self {
            ThemeChoice::Light => Theme::light(),
            ThemeChoice::Dark => Theme::dark(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory downloads are saved into. `~` is expanded.
    pub output_dir: String,
    /// Default file names are `<file_prefix>-<unix millis>.png`.
    pub file_prefix: String,
    /// Pixel density of structural exports.
    pub fallback_density: f32,
    pub theme: ThemeChoice,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: ".".to_string(),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            fallback_density: DEFAULT_FALLBACK_DENSITY,
            theme: ThemeChoice::Light,
        }
    }
}

impl ExportConfig {
    pub fn output_dir(&self) -> PathBuf {
        xdg::expand_tilde(&self.output_dir)
    }

    pub fn options(&self) -> ExportOptions {
        ExportOptions {
            fallback_density: self.fallback_density,
            theme: self.theme.theme(),
            file_prefix: self.file_prefix.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct IngestConfig {
    /// Largest accepted image file, in bytes.
    pub max_file_size: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HistoryConfig {
    /// Undo snapshots kept; the oldest is dropped past this.
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Token granting admin actions. Empty disables admin access.
    pub admin_token: String,
    /// Submissions allowed per client per window.
    pub rate_limit: u32,
    /// Window length, e.g. `"60s"`.
    pub rate_window: String,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            admin_token: String::new(),
            rate_limit: DEFAULT_RATE_LIMIT_MAX,
            rate_window: "60s".to_string(),
        }
    }
}

impl FeedbackConfig {
    pub fn rate_window(&self) -> Result<Duration, ConfigError> {
        humantime::parse_duration(&self.rate_window).map_err(|e| ConfigError::InvalidValue {
            key: "feedback.rate_window".to_string(),
            message: e.to_string(),
        })
    }

    pub fn admin_token(&self) -> Option<String> {
        (!self.admin_token.is_empty()).then(|| self.admin_token.clone())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Used when `PICTRIKIT_LOG` is unset.
    pub level: LogLevel,
}

/// Log verbosity levels (kebab-case in TOML).
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}
