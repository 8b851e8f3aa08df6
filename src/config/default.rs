//! Commented default config file and the `config init` writer.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::error::ConfigError;
use crate::config::xdg;

// ---------------------------------------------------------------------------
// Default TOML template
// ---------------------------------------------------------------------------

/// Every value here must match `Config::default()`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r##"# PictriKit configuration
#
# All values below are the built-in defaults.
# Location: $XDG_CONFIG_HOME/pictrikit/config.toml

# ==============================================================================
# Canvas: initial properties of every new session
# ==============================================================================

[canvas]

# Space between the canvas edge and the content, in preview pixels.
padding = 24

# Space between adjacent slots, in preview pixels.
gap = 12

# Corner radius of the canvas and slots.
roundness = 12

# Linear export sizing.
#   uniform  - scale every image to the tallest (row) or widest (column) one
#   original - keep each image's native size
scale_mode = "uniform"

# Cross-axis alignment for original-scale exports: "start", "center", "end"
linear_align = "center"

# "transparent" or a hex color (#rgb, #rrggbb, #rrggbbaa)
background = "#ffffff"

# ==============================================================================
# Export
# ==============================================================================

[export]

# Directory PNG downloads are written to. Tilde (~) is expanded.
output_dir = "."

# Default file names are <file_prefix>-<unix millis>.png
file_prefix = "pictrikit"

# Pixel density for grid, focus and comparison exports.
fallback_density = 2.0

# Colors for slot surfaces and borders: "light" or "dark"
theme = "light"

# ==============================================================================
# Ingest
# ==============================================================================

[ingest]

# Largest accepted image file, in bytes (10 MiB).
max_file_size = 10485760

# ==============================================================================
# History
# ==============================================================================

[history]

# Undo snapshots kept. The oldest is dropped past this limit.
limit = 50

# ==============================================================================
# Feedback
# ==============================================================================

[feedback]

# Token for replying to and deleting feedback. Empty disables admin actions.
admin_token = ""

# Submissions allowed per client within rate_window.
rate_limit = 5
rate_window = "60s"

# ==============================================================================
# Logging
# ==============================================================================

[logging]

# Used when PICTRIKIT_LOG is unset.
# Options: "error", "warn", "info", "debug", "trace"
level = "info"
"##;

// ---------------------------------------------------------------------------
// File creation
// ---------------------------------------------------------------------------

/// Writes the default template to the default location.
///
/// An existing file is an error unless `force`, in which case it is first
/// moved to `config.toml.backup`.
pub fn create_default_config(force: bool) -> Result<PathBuf, ConfigError> {
    let path = xdg::config_path();
    create_default_config_at(&path, force)?;
    Ok(path)
}

pub fn create_default_config_at(path: &Path, force: bool) -> Result<(), ConfigError> {
    if path.exists() {
        if !force {
            return Err(ConfigError::AlreadyExists {
                path: path.to_path_buf(),
            });
        }
        let backup_path = path.with_extension("toml.backup");
        fs::rename(path, &backup_path).map_err(|e| ConfigError::WriteError {
            path: backup_path.clone(),
            source: e,
        })?;
        tracing::info!("Backed up existing config to {}", backup_path.display());
    }

    let write_err = |e| ConfigError::WriteError {
        path: path.to_path_buf(),
        source: e,
    };
    if let Some(parent) = path.parent() {
        xdg::ensure_dir(parent).map_err(write_err)?;
    }
    fs::write(path, DEFAULT_CONFIG_TEMPLATE).map_err(write_err)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(write_err)?;
    }
    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
