//! Platform-aware config path resolution.
//!
//! - `$XDG_CONFIG_HOME/pictrikit` when the variable is set, on any platform
//! - Linux: `~/.config/pictrikit`
//! - macOS: `~/Library/Application Support/pictrikit`

use std::fs;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "pictrikit";

pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.is_empty() {
            return PathBuf::from(xdg).join(APP_NAME);
        }
    }
    platform_config_dir().join(APP_NAME)
}

fn platform_config_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        dirs::config_dir().expect("could not determine config directory")
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::home_dir()
            .expect("could not determine home directory")
            .join(".config")
    }
}

/// `config_dir()/config.toml`.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Expands a leading `~` to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("could not determine home directory")
            .join(rest)
    } else if path == "~" {
        dirs::home_dir().expect("could not determine home directory")
    } else {
        PathBuf::from(path)
    }
}

/// `mkdir -p` with mode 0700 on Unix.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o700))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn with_env<F: FnOnce()>(key: &str, value: Option<&str>, f: F) {
        let original = std::env::var(key).ok();
        match value {
            Some(v) => std::env::set_var(key, v),
            None => std::env::remove_var(key),
        }
        f();
        match original {
            Some(v) => std::env::set_var(key, v),
            None => std::env::remove_var(key),
        }
    }

    #[test]
    #[serial]
    fn test_config_path_with_xdg_override() {
        with_env("XDG_CONFIG_HOME", Some("/custom/config"), || {
            assert_eq!(
                config_path(),
                PathBuf::from("/custom/config/pictrikit/config.toml")
            );
        });
    }

    #[test]
    #[serial]
    fn test_empty_xdg_is_ignored() {
        with_env("XDG_CONFIG_HOME", Some(""), || {
            assert_eq!(config_dir(), platform_config_dir().join(APP_NAME));
        });
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    #[serial]
    fn test_linux_default_is_dot_config() {
        with_env("XDG_CONFIG_HOME", None, || {
            let home = dirs::home_dir().expect("home");
            assert_eq!(config_dir(), home.join(".config/pictrikit"));
        });
    }

    #[test]
    fn test_expand_tilde() {
        let home = dirs::home_dir().expect("home");
        assert_eq!(expand_tilde("~/Pictures"), home.join("Pictures"));
        assert_eq!(expand_tilde("~"), home);
        assert_eq!(expand_tilde("/abs/out"), PathBuf::from("/abs/out"));
        assert_eq!(expand_tilde("rel/out"), PathBuf::from("rel/out"));
    }

    #[test]
    fn test_ensure_dir_creates_with_private_mode() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let nested = tmp.path().join("a/b");
        ensure_dir(&nested).expect("ensure_dir");
        assert!(nested.is_dir());
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&nested).expect("meta").permissions().mode();
            assert_eq!(mode & 0o777, 0o700);
        }
    }
}
