//! Display metadata handed to the presentation layer
//!
//! The core never renders anything; it only materializes these values from
//! configuration so a GUI, chat or toast renderer can consume them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Icon used for advancements without one
pub const DEFAULT_ADVANCEMENT_ICON: &str = "CHEST";
/// Icon used for trees without one
pub const DEFAULT_TREE_ICON: &str = "OAK_SAPLING";
/// Icon substituted for identifiers that are not well formed
pub const FALLBACK_ICON: &str = "BARRIER";
/// GUI placement that lets the renderer decide
pub const AUTO_GUI_LOCATION: &str = "auto";
/// Background texture of a tree's native achievement view
pub const DEFAULT_NATIVE_GUI_BACKGROUND: &str = "block/dirt";

/// Icon identifiers are upper-case material-style names, e.g. `DIAMOND_PICKAXE`.
/// Whether such an icon exists is for the renderer to decide.
pub fn is_valid_icon(icon: &str) -> bool {
    !icon.is_empty()
        && icon
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// Icon identifier, or [`FALLBACK_ICON`] when it is not well formed
pub fn resolve_icon(icon: &str) -> String {
    if is_valid_icon(icon) {
        icon.to_string()
    } else {
        FALLBACK_ICON.to_string()
    }
}

/// Frame style of an advancement in a native achievement view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvancementFrame {
    #[default]
    Task,
    Goal,
    Challenge,
}

impl AdvancementFrame {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Goal => "goal",
            Self::Challenge => "challenge",
        }
    }
}

impl FromStr for AdvancementFrame {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "task" => Ok(Self::Task),
            "goal" => Ok(Self::Goal),
            "challenge" => Ok(Self::Challenge),
            other => Err(format!("unknown frame '{}'", other)),
        }
    }
}

impl fmt::Display for AdvancementFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How progress is shown in a native achievement view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProgressDisplay {
    /// Renderer decides based on the amount
    #[default]
    Auto,
    Always,
    Never,
    Percentage,
}

impl ProgressDisplay {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "AUTO",
            Self::Always => "ALWAYS",
            Self::Never => "NEVER",
            Self::Percentage => "PERCENTAGE",
        }
    }
}

impl FromStr for ProgressDisplay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AUTO" => Ok(Self::Auto),
            "ALWAYS" => Ok(Self::Always),
            "NEVER" => Ok(Self::Never),
            "PERCENTAGE" => Ok(Self::Percentage),
            other => Err(format!("unknown progress display '{}'", other)),
        }
    }
}

impl fmt::Display for ProgressDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation metadata of a single advancement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvancementDisplay {
    pub name: String,
    pub description: Option<String>,
    pub icon: String,
    pub gui_location: String,
    /// Progress unit label, e.g. "blocks"
    pub unit: Option<String>,
    pub frame: AdvancementFrame,
    pub announce: bool,
    pub toast: bool,
    pub progress_display: ProgressDisplay,
}

/// Presentation metadata of a tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeDisplay {
    pub name: String,
    pub description: Option<String>,
    pub icon: String,
    pub gui_location: String,
    /// Whether the tree shows up in the native achievement view
    pub native_gui: bool,
    pub native_gui_background: String,
}
