use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Storage
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding `catalog.json` and `conversations.json`.
    /// When `None`, all state lives in memory and is lost on exit.
    #[serde(default)]
    pub state_path: Option<PathBuf>,
    /// How often dirty stores are written back to disk.
    #[serde(default = "d_30")]
    pub flush_interval_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_path: None,
            flush_interval_secs: 30,
        }
    }
}

fn d_30() -> u64 {
    30
}
