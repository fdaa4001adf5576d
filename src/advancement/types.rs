//! Pluggable strategies: advancement types, reward types, requirement types
//!
//! Each strategy is keyed by a lowercase namespaced label. Every registry has
//! a designated no-op strategy ([`Empty`], [`NoReward`], [`NoRequirement`])
//! that unknown labels resolve to, so a typo in configuration degrades to
//! "does nothing" instead of failing the load.

use anyhow::Result;

use super::advancement::Advancement;
use super::events::GameEvent;
use super::path::AdvancementPath;
use crate::player::{PlayerId, PlayerProgress};

/// Label of the no-op advancement type
pub const EMPTY_TYPE: &str = "empty";
/// Label of the no-op reward and requirement types
pub const NONE_TYPE: &str = "none";

/// Anything stored in a strategy registry
pub trait Strategy: Send + Sync {
    /// Unique lowercase label this strategy is registered under
    fn label(&self) -> &str;
}

/// The meaning of an advancement's progress unit, e.g. "blocks broken".
///
/// An advancement type subscribes to external event kinds and translates
/// matching events into progress for the advancements that use it.
pub trait AdvancementType: Strategy {
    /// Unit label shown when an advancement does not configure one
    fn default_unit(&self) -> &str;

    /// Event kinds this type wants to receive
    fn event_kinds(&self) -> Vec<String>;

    /// Progress delta `event` contributes to `advancement`, if any
    fn progress(&self, event: &GameEvent, advancement: &Advancement) -> Option<u64>;
}

/// A side effect executed once when an advancement or tree completes.
///
/// Runs after the player's progress record is released, so an execution may
/// call back into the engine for the same player.
pub trait RewardType: Strategy {
    fn execute(&self, player: PlayerId, value: Option<&str>) -> Result<()>;
}

/// A per-player gate that must hold for an advancement to complete
pub trait RequirementType: Strategy {
    fn check(&self, player: &PlayerProgress, value: &str) -> bool;
}

/// No-op advancement type. Never receives events.
#[derive(Debug, Default)]
pub struct Empty;

impl Strategy for Empty {
    fn label(&self) -> &str {
        EMPTY_TYPE
    }
}

impl AdvancementType for Empty {
    fn default_unit(&self) -> &str {
        "none"
    }

    fn event_kinds(&self) -> Vec<String> {
        Vec::new()
    }

    fn progress(&self, _event: &GameEvent, _advancement: &Advancement) -> Option<u64> {
        None
    }
}

/// No-op reward
#[derive(Debug, Default)]
pub struct NoReward;

impl Strategy for NoReward {
    fn label(&self) -> &str {
        NONE_TYPE
    }
}

impl RewardType for NoReward {
    fn execute(&self, _player: PlayerId, _value: Option<&str>) -> Result<()> {
        Ok(())
    }
}

/// Requirement that always passes
#[derive(Debug, Default)]
pub struct NoRequirement;

impl Strategy for NoRequirement {
    fn label(&self) -> &str {
        NONE_TYPE
    }
}

impl RequirementType for NoRequirement {
    fn check(&self, _player: &PlayerProgress, _value: &str) -> bool {
        true
    }
}

/// Requirement on another advancement: passes once the path in `value`
/// (`tree.advancement`) is completed for the player.
#[derive(Debug, Default)]
pub struct CompletedAdvancement;

impl Strategy for CompletedAdvancement {
    fn label(&self) -> &str {
        "advancement"
    }
}

impl RequirementType for CompletedAdvancement {
    fn check(&self, player: &PlayerProgress, value: &str) -> bool {
        match AdvancementPath::parse(value.trim()) {
            Ok(path) => player.is_completed(&path),
            Err(_) => false,
        }
    }
}

/// Generic counter: one event kind, one unit.
///
/// An advancement of this type counts events whose value equals the
/// advancement's value (case-insensitive). An advancement without a value,
/// or with the value `any`, counts every event of the kind.
#[derive(Debug, Clone)]
pub struct EventCounter {
    label: String,
    event_kind: String,
    unit: String,
}

impl EventCounter {
    pub fn new(label: &str, event_kind: &str, unit: &str) -> Self {
        Self {
            label: label.to_string(),
            event_kind: event_kind.to_string(),
            unit: unit.to_string(),
        }
    }

    /// Counters registered by default
    pub fn builtin() -> Vec<Self> {
        vec![
            Self::new("block_break", "block_break", "blocks"),
            Self::new("block_place", "block_place", "blocks"),
            Self::new("entity_kill", "entity_kill", "kills"),
            Self::new("item_craft", "item_craft", "items"),
            Self::new("item_consume", "item_consume", "items"),
            Self::new("player_join", "player_join", "joins"),
        ]
    }

    fn matches(&self, event_value: Option<&str>, wanted: Option<&str>) -> bool {
        match wanted.map(str::trim) {
            None => true,
            Some(w) if w.eq_ignore_ascii_case("any") => true,
            Some(w) => event_value.is_some_and(|v| v.trim().eq_ignore_ascii_case(w)),
        }
    }
}

impl Strategy for EventCounter {
    fn label(&self) -> &str {
        &self.label
    }
}

impl AdvancementType for EventCounter {
    fn default_unit(&self) -> &str {
        &self.unit
    }

    fn event_kinds(&self) -> Vec<String> {
        vec![self.event_kind.clone()]
    }

    fn progress(&self, event: &GameEvent, advancement: &Advancement) -> Option<u64> {
        if event.kind != self.event_kind || event.amount == 0 {
            return None;
        }
        self.matches(event.value.as_deref(), advancement.value.as_deref())
            .then_some(event.amount)
    }
}
