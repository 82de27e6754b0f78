//! Configuration types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Gate runtime settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GateConfig {
    /// Where to persist gate state (trusted root + claim set).
    /// `None` keeps everything in memory.
    #[serde(default)]
    pub state_path: Option<PathBuf>,

    /// Write the state file after every successful claim and root update
    #[serde(default)]
    pub autosave: bool,
}

impl GateConfig {
    /// Config that persists to `path` and saves after every state change.
    pub fn persistent(path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: Some(path.into()),
            autosave: true,
        }
    }
}
