pub mod state;
pub mod status;
pub mod sync;

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Resolve the state file path: `--state`, then `$GUIDECAST_STATE`, then
/// `~/.guidecast/state.json`.
pub(crate) fn resolve_state_path(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path);
    }
    if let Ok(env_path) = std::env::var("GUIDECAST_STATE") {
        if !env_path.is_empty() {
            return Ok(PathBuf::from(env_path));
        }
    }
    let home = dirs::home_dir().context("could not determine home directory")?;
    Ok(home.join(".guidecast").join("state.json"))
}
