//! Configuration file loader with position-aware error reporting.
//!
//! With no explicit path, the default location is used, and a missing file
//! there means `Config::default()`.

use std::fs;
use std::path::Path;

use crate::config::error::ConfigError;
use crate::config::schema::Config;
use crate::config::xdg;

/// Stateless configuration loader.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads and validates `path`, which must exist.
    pub fn load_from_path(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::ReadError {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        let config = Self::parse_toml(&content, path)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file at the default location, or the defaults if absent.
    pub fn load_default() -> Result<Config, ConfigError> {
        let path = xdg::config_path();
        if path.exists() {
            Self::load_from_path(&path)
        } else {
            tracing::debug!("No config file at {:?}, using defaults", path);
            Ok(Config::default())
        }
    }

    /// `load_from_path` when `path` is given, `load_default` otherwise.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => Self::load_default(),
        }
    }

    fn parse_toml(content: &str, path: &Path) -> Result<Config, ConfigError> {
        toml::from_str(content).map_err(|e| {
            let (line, column) = e
                .span()
                .map(|span| line_column(content, span.start))
                .unwrap_or((0, 0));
            ConfigError::ParseError {
                path: path.to_path_buf(),
                line,
                column,
                message: e.message().to_string(),
            }
        })
    }
}

/// One-based line and column of byte `offset` in `content`.
fn line_column(content: &str, offset: usize) -> (usize, usize) {
    let before = &content[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|p| p + 1).unwrap_or(0);
    (line, offset - line_start + 1)
}
