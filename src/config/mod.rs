//! Configuration loading and management
//!
//! Two kinds of configuration live in the data directory:
//!
//! - `config.toml`: engine [`Settings`] (layout, autosave interval)
//! - `advancement-trees/*.yml`: one [`ConfigUnit`] per advancement tree,
//!   read through [`ConfigSection`] views

mod io;
mod section;
mod settings;
mod unit;

pub use io::write_atomic;
pub use section::ConfigSection;
pub use settings::Settings;
pub use unit::{unit_id, ConfigUnit, UNIT_EXTENSIONS};

use std::path::{Path, PathBuf};

/// Resolved filesystem layout of a data directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub data_dir: PathBuf,
    pub trees_dir: PathBuf,
    pub database: PathBuf,
}

impl DataPaths {
    /// Default data directory (~/.advancements/)
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".advancements")
    }

    /// Settings file inside a data directory
    pub fn settings_path(data_dir: &Path) -> PathBuf {
        data_dir.join("config.toml")
    }

    pub fn resolve(data_dir: &Path, settings: &Settings) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            trees_dir: data_dir.join(&settings.trees_dir),
            database: data_dir.join(&settings.database),
        }
    }
}
