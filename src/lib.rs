//! Advancements - configuration-defined achievement trees
//!
//! Advancements are goals grouped into named trees. Each tree is one YAML
//! file; every advancement in it has a type (what counts as progress), a
//! target amount, requirements that gate completion and rewards that run
//! once on completion. Completing every advancement of a tree runs the
//! tree's own rewards.
//!
//! ## Runtime
//!
//! An [`AdvancementContext`] owns the [`AdvancementManager`] (trees and
//! strategy registries) and the [`ProgressStore`] (per-player progress,
//! persisted write-behind to SQLite). Hosts feed it [`GameEvent`]s and
//! player join/quit calls.

pub mod advancement;
pub mod config;
pub mod context;
pub mod player;

mod sync;

pub use advancement::{
    AdvancementError, AdvancementManager, AdvancementPath, Completion, GameEvent, LoadReport,
};
pub use context::{AdvancementContext, ProgressReport};
pub use player::{NotLoaded, PlayerId, PlayerProgress, ProgressStore};
