//! Advancements, their rewards and their requirements

use tracing::{debug, warn};

use super::display::AdvancementDisplay;
use super::path::AdvancementPath;
use super::registry::TypeRegistries;
use crate::player::{PlayerId, PlayerProgress};

/// Target amount used when configuration has none (or a non-positive one)
pub const DEFAULT_AMOUNT: u64 = 10;

/// A side effect to run on completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reward {
    pub kind: String,
    pub value: Option<String>,
}

impl Reward {
    pub fn new(kind: &str, value: Option<&str>) -> Self {
        Self {
            kind: kind.to_string(),
            value: value.map(|v| v.to_string()),
        }
    }
}

/// Runs rewards in order. Failures are logged and never stop the rest.
/// Returns how many rewards succeeded.
pub fn run_rewards(
    rewards: &[Reward],
    player: PlayerId,
    owner: &str,
    registries: &TypeRegistries,
) -> usize {
    let mut succeeded = 0;
    for reward in rewards {
        if !registries.reward_types.contains(&reward.kind) {
            warn!(
                "Reward type '{}' of '{}' is not registered, skipping it",
                reward.kind, owner
            );
            continue;
        }
        let strategy = registries.reward_types.resolve(Some(reward.kind.as_str()));
        match strategy.execute(player, reward.value.as_deref()) {
            Ok(()) => succeeded += 1,
            Err(e) => warn!(
                "Reward '{}' of '{}' failed for player {}: {:#}",
                reward.kind, owner, player, e
            ),
        }
    }
    succeeded
}

/// Rewards earned by completion transitions, waiting to be executed.
///
/// Transitions happen under the player's record lock. Executing the queue
/// after that lock is released lets a reward call back into the engine for
/// the same player.
#[derive(Debug, Default)]
pub struct RewardQueue {
    batches: Vec<RewardBatch>,
}

#[derive(Debug)]
struct RewardBatch {
    player: PlayerId,
    owner: String,
    rewards: Vec<Reward>,
}

impl RewardQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, player: PlayerId, owner: &str, rewards: &[Reward]) {
        if rewards.is_empty() {
            return;
        }
        self.batches.push(RewardBatch {
            player,
            owner: owner.to_string(),
            rewards: rewards.to_vec(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Run every batch in the order it was queued. Returns how many rewards succeeded.
    pub fn run(self, registries: &TypeRegistries) -> usize {
        self.batches
            .iter()
            .map(|batch| run_rewards(&batch.rewards, batch.player, &batch.owner, registries))
            .sum()
    }
}

/// A per-player gate, with optional presentation overrides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub kind: String,
    pub value: String,
    pub display_name: Option<String>,
    pub message: Option<String>,
    pub icon: Option<String>,
}

impl Requirement {
    pub fn new(kind: &str, value: &str) -> Self {
        Self {
            kind: kind.to_string(),
            value: value.to_string(),
            display_name: None,
            message: None,
            icon: None,
        }
    }
}

/// One goal inside a tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advancement {
    pub path: AdvancementPath,
    /// Advancement type label
    pub kind: String,
    /// Type-specific value, e.g. the block to break
    pub value: Option<String>,
    /// Progress needed to complete, always at least 1
    pub amount: u64,
    pub rewards: Vec<Reward>,
    pub requirements: Vec<Requirement>,
    pub display: AdvancementDisplay,
}

impl Advancement {
    pub fn label(&self) -> &str {
        self.path.advancement()
    }

    pub fn tree_label(&self) -> &str {
        self.path.tree()
    }

    /// True when every requirement passes for `player` (true when there are none)
    pub fn requirements_met(&self, player: &PlayerProgress, registries: &TypeRegistries) -> bool {
        self.requirements.iter().all(|requirement| {
            let strategy = registries
                .requirement_types
                .resolve(Some(requirement.kind.as_str()));
            let passed = strategy.check(player, &requirement.value);
            if !passed {
                debug!(
                    "Requirement '{}' of {} not met for player {}",
                    requirement.kind,
                    self.path,
                    player.player()
                );
            }
            passed
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::advancement::display::{AdvancementFrame, ProgressDisplay};
    use crate::advancement::types::{RequirementType, RewardType, Strategy};
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    /// Minimal advancement for tests
    pub(crate) fn advancement_with(
        tree: &str,
        label: &str,
        kind: &str,
        value: Option<&str>,
        amount: u64,
    ) -> Advancement {
        Advancement {
            path: AdvancementPath::new(tree, label),
            kind: kind.to_string(),
            value: value.map(|v| v.to_string()),
            amount,
            rewards: Vec::new(),
            requirements: Vec::new(),
            display: AdvancementDisplay {
                name: label.to_string(),
                description: None,
                icon: "CHEST".to_string(),
                gui_location: "auto".to_string(),
                unit: None,
                frame: AdvancementFrame::Task,
                announce: true,
                toast: true,
                progress_display: ProgressDisplay::Auto,
            },
        }
    }

    struct Recording {
        log: Arc<Mutex<Vec<String>>>,
        fail_on: Option<&'static str>,
    }

    impl Strategy for Recording {
        fn label(&self) -> &str {
            "record"
        }
    }

    impl RewardType for Recording {
        fn execute(&self, _player: PlayerId, value: Option<&str>) -> anyhow::Result<()> {
            let value = value.unwrap_or_default();
            if Some(value) == self.fail_on {
                anyhow::bail!("boom");
            }
            self.log.lock().unwrap().push(value.to_string());
            Ok(())
        }
    }

    struct Never;

    impl Strategy for Never {
        fn label(&self) -> &str {
            "never"
        }
    }

    impl RequirementType for Never {
        fn check(&self, _player: &PlayerProgress, _value: &str) -> bool {
            false
        }
    }

    #[test]
    fn test_rewards_run_in_order_and_survive_failures() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registries = TypeRegistries::with_defaults();
        registries.register_reward_type(Arc::new(Recording {
            log: log.clone(),
            fail_on: Some("second"),
        }));

        let rewards = vec![
            Reward::new("record", Some("first")),
            Reward::new("record", Some("second")),
            Reward::new("unknown_type", Some("ignored")),
            Reward::new("record", Some("third")),
        ];
        let succeeded = run_rewards(&rewards, Uuid::new_v4(), "mining.stone", &registries);

        assert_eq!(succeeded, 2);
        assert_eq!(*log.lock().unwrap(), vec!["first", "third"]);
    }

    #[test]
    fn test_requirements_are_anded() {
        let registries = TypeRegistries::with_defaults();
        registries.register_requirement_type(Arc::new(Never));
        let player = PlayerProgress::new(Uuid::new_v4());

        let mut advancement = advancement_with("mining", "stone", "block_break", None, 10);
        assert!(advancement.requirements_met(&player, &registries));

        advancement.requirements.push(Requirement::new("none", "none"));
        assert!(advancement.requirements_met(&player, &registries));

        advancement.requirements.push(Requirement::new("never", "x"));
        assert!(!advancement.requirements_met(&player, &registries));
    }

    #[test]
    fn test_reward_queue_runs_in_queue_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registries = TypeRegistries::with_defaults();
        registries.register_reward_type(Arc::new(Recording {
            log: log.clone(),
            fail_on: None,
        }));
        let player = Uuid::new_v4();

        let mut queue = RewardQueue::new();
        queue.push(player, "mining.stone", &[Reward::new("record", Some("stone"))]);
        queue.push(player, "mining.wood", &[]);
        queue.push(
            player,
            "mining",
            &[Reward::new("record", Some("tree")), Reward::new("record", Some("bonus"))],
        );
        assert!(log.lock().unwrap().is_empty());

        assert_eq!(queue.run(&registries), 3);
        assert_eq!(*log.lock().unwrap(), vec!["stone", "tree", "bonus"]);
    }
}
