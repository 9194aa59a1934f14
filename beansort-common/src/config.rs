//! Parameter file resolution
//!
//! Follows a fixed priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Platform config directory (`<config_dir>/beansort/config.toml`)
//! 4. Compiled defaults (no file)

use crate::params::MachineParams;
use crate::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming a parameter file
pub const CONFIG_ENV_VAR: &str = "BEANSORT_CONFIG";

/// Resolve the parameter file to use, if any
pub fn resolve_config_file(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }

    // Priority 3: Platform config directory
    if let Some(path) = dirs::config_dir().map(|d| d.join("beansort").join("config.toml")) {
        if path.exists() {
            return Some(path);
        }
    }

    None
}

/// Default directory for preview derivatives
///
/// `<data_local_dir>/beansort/previews`, falling back to the system temp
/// directory when the platform has no local data directory.
pub fn default_preview_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("beansort").join("previews"))
        .unwrap_or_else(|| std::env::temp_dir().join("beansort-previews"))
}

/// Load machine parameters, falling back to compiled defaults when no
/// parameter file resolves
pub fn load_params(cli_arg: Option<&Path>) -> Result<MachineParams> {
    match resolve_config_file(cli_arg) {
        Some(path) => {
            debug!("loading parameters from {}", path.display());
            MachineParams::load(&path)
        }
        None => {
            debug!("no parameter file found, using compiled defaults");
            Ok(MachineParams::default())
        }
    }
}
