//! Configuration helpers shared by the transfer binaries
//!
//! Settings resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Arguments and environment are handled by clap in each binary; this module
//! covers the file tier and the merge rule.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{info, warn};

/// Read and parse a TOML config file
pub fn read_toml_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let parsed = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
    info!("Loaded config file {}", path.display());
    Ok(parsed)
}

/// Read a TOML config file if a path was given, else use the type's default
///
/// A missing or unreadable file is an error only when the path was given
/// explicitly; without a path the defaults apply silently.
pub fn load_optional<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T> {
    match path {
        Some(path) => read_toml_file(path),
        None => Ok(T::default()),
    }
}

/// Pick the higher-priority value, ignoring blank strings
///
/// `primary` is the CLI/environment value, `fallback` the file value.
pub fn resolve_setting(name: &str, primary: Option<String>, fallback: Option<String>) -> Option<String> {
    let primary = non_blank(primary);
    let fallback = non_blank(fallback);

    if primary.is_some() && fallback.is_some() {
        warn!("{} set in both environment/arguments and config file; using environment/arguments", name);
    }
    primary.or(fallback)
}

/// `None` for missing or whitespace-only values
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
