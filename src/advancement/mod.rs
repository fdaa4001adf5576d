//! Advancement data model and completion engine
//!
//! Trees are loaded from configuration units by the [`loader`] and published
//! by the [`AdvancementManager`] as an immutable [`TreeSnapshot`]. Strategies
//! for advancement, reward and requirement types are looked up in
//! [`TypeRegistries`].

#[allow(clippy::module_inception)]
mod advancement;
mod display;
mod error;
mod events;
pub mod loader;
mod manager;
mod path;
mod registry;
mod tree;
mod types;

pub use advancement::{Advancement, DEFAULT_AMOUNT, Requirement, Reward, RewardQueue};
pub use display::{
    AUTO_GUI_LOCATION, AdvancementDisplay, AdvancementFrame, DEFAULT_ADVANCEMENT_ICON,
    DEFAULT_NATIVE_GUI_BACKGROUND, DEFAULT_TREE_ICON, FALLBACK_ICON, ProgressDisplay,
    TreeDisplay,
};
pub use error::{AdvancementError, ConfigWarning, WarningKind};
pub use events::{GameEvent, Subscriptions};
pub use loader::{LoadedTree, load_tree};
pub use manager::{
    AdvancementManager, EXAMPLE_TREE, EXAMPLE_TREE_FILE, LoadReport, SkippedUnit, TreeSnapshot,
};
pub use path::{AdvancementPath, is_namespaced_key, validate_label};
pub use registry::{StrategyRegistry, TypeRegistries};
pub use tree::{AdvancementTree, AdvancementTreeOptions, Completion};
pub use types::{
    AdvancementType, CompletedAdvancement, EMPTY_TYPE, Empty, EventCounter, NONE_TYPE,
    NoRequirement, NoReward, RequirementType, RewardType, Strategy,
};
