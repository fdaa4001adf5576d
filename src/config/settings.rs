//! Engine settings types

use serde::{Deserialize, Serialize};

/// General engine settings, stored as `config.toml` in the data directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Directory (relative to the data dir) holding one YAML unit per tree
    #[serde(default = "default_trees_dir")]
    pub trees_dir: String,

    /// SQLite file (relative to the data dir) holding player progress
    #[serde(default = "default_database")]
    pub database: String,

    /// Seconds between write-behind flushes of dirty player progress.
    /// Zero disables the periodic flush; progress is then only saved on
    /// player quit and shutdown.
    #[serde(default = "default_autosave_interval_secs")]
    pub autosave_interval_secs: u64,

    /// Write the bundled example tree when the trees directory is first created
    #[serde(default = "default_seed_example")]
    pub seed_example: bool,
}

fn default_trees_dir() -> String {
    "advancement-trees".to_string()
}

fn default_database() -> String {
    "progress.db".to_string()
}

fn default_autosave_interval_secs() -> u64 {
    300
}

fn default_seed_example() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            trees_dir: default_trees_dir(),
            database: default_database(),
            autosave_interval_secs: default_autosave_interval_secs(),
            seed_example: default_seed_example(),
        }
    }
}
