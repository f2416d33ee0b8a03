//! Default paths for halbridge components
//!
//! Paths are user-writable by default (no root required):
//! - Config: `$XDG_CONFIG_HOME/halbridge/config.toml` or `~/.config/halbridge/config.toml`

use std::path::PathBuf;

/// Environment variable for overriding the config path
pub const HALBRIDGE_CONFIG_ENV: &str = "HALBRIDGE_CONFIG";

/// Config filename within the config directory
const CONFIG_FILENAME: &str = "config.toml";

/// Application subdirectory name
const APP_DIR: &str = "halbridge";

/// Get the default config file path.
///
/// Order of precedence:
/// 1. `$HALBRIDGE_CONFIG` environment variable (if set)
/// 2. `$XDG_CONFIG_HOME/halbridge/config.toml` (if XDG_CONFIG_HOME is set)
/// 3. `~/.config/halbridge/config.toml`
/// 4. `/etc/halbridge/config.toml` (last resort)
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(HALBRIDGE_CONFIG_ENV) {
        return PathBuf::from(path);
    }

    config_path_without_env()
}

/// Get the config path without checking the HALBRIDGE_CONFIG env var.
pub fn config_path_without_env() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join(CONFIG_FILENAME);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILENAME);
    }

    PathBuf::from("/etc").join(APP_DIR).join(CONFIG_FILENAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_contains_halbridge() {
        let path = config_path_without_env();
        assert!(path.to_string_lossy().contains("halbridge"));
        assert!(path.ends_with(CONFIG_FILENAME));
    }
}
