use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// File looked up in the project base directory when `project.settings` is unset
pub const PROJECT_SETTINGS_FILE: &str = "sonar-project.properties";

/// Expand tilde (~) in paths to the user's home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

/// Resolve a configured path: absolute paths are kept, relative ones are joined to `base`.
pub fn resolve_against(base: &Path, configured: &str) -> PathBuf {
    let expanded = expand_tilde(configured.trim());
    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}

/// Resolve the runner configuration file based on priority:
/// 1. Explicit path (`runner.settings` property)
/// 2. `<config dir>/sonar-runner/config.toml`
/// 3. `$HOME/.sonar-runner/config.toml`
///
/// Returns the path and whether it was explicitly requested.
pub fn resolve_runner_settings(explicit: Option<&str>, cwd: &Path) -> Result<(PathBuf, bool)> {
    // Priority 1: Explicit path
    if let Some(path) = explicit {
        return Ok((resolve_against(cwd, path), true));
    }

    // Priority 2: platform configuration directory
    if let Some(config_dir) = dirs::config_dir() {
        return Ok((config_dir.join("sonar-runner").join("config.toml"), false));
    }

    if let Some(home) = std::env::var_os("HOME") {
        return Ok((PathBuf::from(home).join(".sonar-runner").join("config.toml"), false));
    }

    Err(Error::Configuration(
        "Could not locate the runner configuration: no HOME directory or configuration directory found"
            .to_string(),
    ))
}
