//! Advancement trees and the per-player completion state machine

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use super::advancement::{Advancement, Reward, RewardQueue};
use super::display::TreeDisplay;
use super::error::AdvancementError;
use super::path::AdvancementPath;
use super::registry::TypeRegistries;
use crate::player::PlayerProgress;

/// Tree-wide options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvancementTreeOptions {
    /// Every advancement counts as active without explicit activation
    pub auto_active: bool,
    /// Run once when a player completes every advancement of the tree
    pub rewards: Vec<Reward>,
    pub display: TreeDisplay,
}

/// Result of evaluating one advancement for one player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Not activated and the tree is not auto-active; progress was ignored
    Inactive,
    AlreadyCompleted,
    /// Below the target amount
    Pending { progress: u64, amount: u64 },
    /// Target reached but a requirement does not pass yet
    Blocked { progress: u64, amount: u64 },
    /// Transitioned to completed just now
    Completed { tree_completed: bool },
}

impl Completion {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Ordered collection of advancements loaded from one configuration unit
#[derive(Debug)]
pub struct AdvancementTree {
    label: String,
    advancements: Vec<Arc<Advancement>>,
    index: HashMap<String, usize>,
    pub options: AdvancementTreeOptions,
}

impl AdvancementTree {
    /// Build a tree. A repeated advancement label replaces the earlier entry in place.
    pub fn new(
        label: impl Into<String>,
        advancements: Vec<Advancement>,
        options: AdvancementTreeOptions,
    ) -> Self {
        let mut tree = Self {
            label: label.into(),
            advancements: Vec::with_capacity(advancements.len()),
            index: HashMap::new(),
            options,
        };
        for advancement in advancements {
            let advancement = Arc::new(advancement);
            match tree.index.get(advancement.label()) {
                Some(&i) => tree.advancements[i] = advancement,
                None => {
                    tree.index
                        .insert(advancement.label().to_string(), tree.advancements.len());
                    tree.advancements.push(advancement);
                }
            }
        }
        tree
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Advancements in configuration order
    pub fn advancements(&self) -> &[Arc<Advancement>] {
        &self.advancements
    }

    pub fn advancement(&self, label: &str) -> Result<Arc<Advancement>, AdvancementError> {
        self.index
            .get(label)
            .map(|&i| self.advancements[i].clone())
            .ok_or_else(|| {
                AdvancementError::invalid_reference(format!("{}.{}", self.label, label))
            })
    }

    pub fn len(&self) -> usize {
        self.advancements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.advancements.is_empty()
    }

    pub fn completed_count(&self, player: &PlayerProgress) -> usize {
        self.advancements
            .iter()
            .filter(|a| player.is_completed(&a.path))
            .count()
    }

    pub fn is_completed(&self, player: &PlayerProgress) -> bool {
        !self.is_empty() && self.completed_count(player) == self.len()
    }

    pub fn is_active(&self, path: &AdvancementPath, player: &PlayerProgress) -> bool {
        self.options.auto_active || player.is_activated(path)
    }

    /// Add `delta` progress to `label` and complete it when it qualifies.
    /// Rewards earned by the transition are pushed onto `rewards`.
    pub fn advance(
        &self,
        label: &str,
        delta: u64,
        player: &mut PlayerProgress,
        registries: &TypeRegistries,
        rewards: &mut RewardQueue,
    ) -> Result<Completion, AdvancementError> {
        let advancement = self.advancement(label)?;
        if player.is_completed(&advancement.path) {
            return Ok(Completion::AlreadyCompleted);
        }
        if !self.is_active(&advancement.path, player) {
            return Ok(Completion::Inactive);
        }
        player.increment(&advancement.path, delta);
        Ok(self.evaluate(&advancement, player, registries, rewards))
    }

    /// Re-evaluate `label` without adding progress
    pub fn check(
        &self,
        label: &str,
        player: &mut PlayerProgress,
        registries: &TypeRegistries,
        rewards: &mut RewardQueue,
    ) -> Result<Completion, AdvancementError> {
        self.advance(label, 0, player, registries, rewards)
    }

    /// Complete `label` regardless of progress, activation and requirements
    pub fn complete(
        &self,
        label: &str,
        player: &mut PlayerProgress,
        rewards: &mut RewardQueue,
    ) -> Result<Completion, AdvancementError> {
        let advancement = self.advancement(label)?;
        if player.is_completed(&advancement.path) {
            return Ok(Completion::AlreadyCompleted);
        }
        Ok(self.finish(&advancement, player, rewards))
    }

    fn evaluate(
        &self,
        advancement: &Advancement,
        player: &mut PlayerProgress,
        registries: &TypeRegistries,
        rewards: &mut RewardQueue,
    ) -> Completion {
        let progress = player.progress(&advancement.path);
        let amount = advancement.amount;
        if progress < amount {
            return Completion::Pending { progress, amount };
        }
        if !advancement.requirements_met(player, registries) {
            return Completion::Blocked { progress, amount };
        }
        self.finish(advancement, player, rewards)
    }

    /// Completion transition: queue rewards, mark, then tree aggregation
    fn finish(
        &self,
        advancement: &Advancement,
        player: &mut PlayerProgress,
        rewards: &mut RewardQueue,
    ) -> Completion {
        let id = player.player();
        rewards.push(id, &advancement.path.to_string(), &advancement.rewards);
        player.mark_completed(&advancement.path, advancement.amount);
        info!("Player {} completed advancement {}", id, advancement.path);

        let completed = self.completed_count(player);
        debug!(
            "Player {} has {}/{} advancements of tree '{}'",
            id,
            completed,
            self.len(),
            self.label
        );
        let tree_completed = completed == self.len();
        if tree_completed {
            info!("Player {} completed advancement tree '{}'", id, self.label);
            rewards.push(id, &self.label, &self.options.rewards);
        }
        Completion::Completed { tree_completed }
    }
}
