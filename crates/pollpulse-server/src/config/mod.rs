//! Server config loader (strict parsing).

pub mod schema;

use std::fs;
use std::path::Path;

use pollpulse_core::{PollError, Result};

pub use schema::{PollSection, ServerConfig, ServerSection};

pub fn load_from_file(path: &str) -> Result<ServerConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| PollError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ServerConfig> {
    let cfg: ServerConfig = serde_yaml::from_str(s)
        .map_err(|e| PollError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load from `path` when it exists, otherwise fall back to built-in
/// defaults. The demo server must come up with no config file on disk.
pub fn load_or_default(path: &str) -> Result<ServerConfig> {
    if Path::new(path).exists() {
        load_from_file(path)
    } else {
        Ok(ServerConfig::default())
    }
}
