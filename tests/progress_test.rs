//! Integration tests for progress accumulation and completion

mod common;

use std::sync::Arc;
use std::thread;

use advancements::advancement::{AdvancementManager, RequirementType, Strategy};
use advancements::config::ConfigUnit;
use advancements::{
    AdvancementContext, AdvancementPath, Completion, GameEvent, PlayerProgress, ProgressStore,
};
use uuid::Uuid;

use common::{rewards_for, RecordingReward, MINING_TREE};

fn mining_context() -> (AdvancementContext, Arc<std::sync::Mutex<Vec<(Uuid, String)>>>) {
    let manager = AdvancementManager::new("unused");
    let (reward, log) = RecordingReward::new();
    manager.register_reward_type(reward);
    manager.load_units(vec![ConfigUnit::from_yaml("mining", MINING_TREE).unwrap()]);
    let ctx = AdvancementContext::new(Arc::new(manager), Arc::new(ProgressStore::in_memory()));
    (ctx, log)
}

fn stone() -> AdvancementPath {
    AdvancementPath::new("mining", "stone")
}

fn wood() -> AdvancementPath {
    AdvancementPath::new("mining", "wood")
}

#[test]
fn test_tree_rewards_fire_exactly_once() {
    let (ctx, log) = mining_context();
    let player = Uuid::new_v4();
    ctx.player_join(player).unwrap();

    for _ in 0..10 {
        ctx.handle_event(&GameEvent::new(player, "block_break", Some("STONE"), 1))
            .unwrap();
    }
    assert_eq!(rewards_for(&log, player), vec!["stone"]);
    assert_eq!(ctx.completed_in_tree(player, "mining").unwrap(), 1);

    let outcomes = ctx
        .handle_event(&GameEvent::new(player, "block_break", Some("OAK_LOG"), 5))
        .unwrap();
    assert_eq!(outcomes, vec![(wood(), Completion::Completed { tree_completed: true })]);
    assert_eq!(rewards_for(&log, player), vec!["stone", "wood", "tree"]);

    // Further events, checks and forced completions change nothing
    ctx.handle_event(&GameEvent::new(player, "block_break", Some("OAK_LOG"), 5))
        .unwrap();
    assert_eq!(ctx.check(player, &wood()).unwrap(), Completion::AlreadyCompleted);
    assert_eq!(ctx.complete(player, &stone()).unwrap(), Completion::AlreadyCompleted);
    assert_eq!(rewards_for(&log, player), vec!["stone", "wood", "tree"]);
}

#[test]
fn test_progress_is_frozen_after_completion() {
    let (ctx, _log) = mining_context();
    let player = Uuid::new_v4();
    ctx.player_join(player).unwrap();

    ctx.add_progress(player, &wood(), 7).unwrap();
    ctx.add_progress(player, &wood(), 3).unwrap();
    let report = ctx.report(player, &wood()).unwrap();
    assert!(report.completed);
    assert_eq!(report.progress, 7);
}

#[test]
fn test_players_progress_independently_across_threads() {
    let (ctx, log) = mining_context();
    let ctx = Arc::new(ctx);
    let players: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
    for player in &players {
        ctx.player_join(*player).unwrap();
    }

    let handles: Vec<_> = players
        .iter()
        .map(|&player| {
            let ctx = ctx.clone();
            thread::spawn(move || {
                for _ in 0..3 {
                    ctx.add_progress(player, &AdvancementPath::new("mining", "stone"), 1)
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for player in &players {
        assert_eq!(ctx.report(*player, &stone()).unwrap().progress, 3);
        assert!(rewards_for(&log, *player).is_empty());
    }
}

#[test]
fn test_concurrent_increments_on_one_player_complete_once() {
    let (ctx, log) = mining_context();
    let ctx = Arc::new(ctx);
    let player = Uuid::new_v4();
    ctx.player_join(player).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ctx = ctx.clone();
            thread::spawn(move || {
                for _ in 0..5 {
                    ctx.add_progress(player, &AdvancementPath::new("mining", "stone"), 1)
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let report = ctx.report(player, &stone()).unwrap();
    assert!(report.completed);
    assert_eq!(report.progress, 10);
    assert_eq!(rewards_for(&log, player), vec!["stone"]);
}

#[test]
fn test_increments_commute() {
    let (first, _) = mining_context();
    let (second, _) = mining_context();
    let player = Uuid::new_v4();
    first.player_join(player).unwrap();
    second.player_join(player).unwrap();
    let deltas = [1, 4, 2];

    for delta in deltas {
        first.add_progress(player, &stone(), delta).unwrap();
    }
    for delta in deltas.iter().rev() {
        second.add_progress(player, &stone(), *delta).unwrap();
    }

    assert_eq!(
        first.report(player, &stone()).unwrap().progress,
        second.report(player, &stone()).unwrap().progress
    );
}

struct Denied;

impl Strategy for Denied {
    fn label(&self) -> &str {
        "denied"
    }
}

impl RequirementType for Denied {
    fn check(&self, _player: &PlayerProgress, _value: &str) -> bool {
        false
    }
}

#[test]
fn test_failing_requirement_blocks_completion() {
    let manager = AdvancementManager::new("unused");
    manager.register_requirement_type(Arc::new(Denied));
    manager.load_units(vec![ConfigUnit::from_yaml(
        "mining",
        r#"
advancements:
  stone:
    type: block_break
    value: STONE
    amount: 2
    requirements:
      gate:
        type: denied
        value: anything
options:
  auto_active: true
"#,
    )
    .unwrap()]);
    let ctx = AdvancementContext::new(Arc::new(manager), Arc::new(ProgressStore::in_memory()));
    let player = Uuid::new_v4();
    ctx.player_join(player).unwrap();

    assert_eq!(
        ctx.add_progress(player, &stone(), 5).unwrap(),
        Completion::Blocked { progress: 5, amount: 2 }
    );
    assert!(!ctx.report(player, &stone()).unwrap().completed);

    // The admin path completes regardless
    assert!(ctx.complete(player, &stone()).unwrap().is_completed());
}

#[test]
fn test_inactive_advancements_ignore_progress() {
    let manager = AdvancementManager::new("unused");
    manager.load_units(vec![ConfigUnit::from_yaml(
        "mining",
        "advancements:\n  stone:\n    type: block_break\n    value: STONE\n    amount: 1\n",
    )
    .unwrap()]);
    let ctx = AdvancementContext::new(Arc::new(manager), Arc::new(ProgressStore::in_memory()));
    let player = Uuid::new_v4();
    ctx.player_join(player).unwrap();

    let outcomes = ctx
        .handle_event(&GameEvent::new(player, "block_break", Some("STONE"), 3))
        .unwrap();
    assert_eq!(outcomes, vec![(stone(), Completion::Inactive)]);
    assert_eq!(ctx.report(player, &stone()).unwrap().progress, 0);

    ctx.activate(player, &stone()).unwrap();
    let outcomes = ctx
        .handle_event(&GameEvent::new(player, "block_break", Some("STONE"), 1))
        .unwrap();
    assert!(outcomes[0].1.is_completed());
}

#[test]
fn test_unregister_all_resolves_to_noops() {
    let (ctx, log) = mining_context();
    let player = Uuid::new_v4();
    ctx.player_join(player).unwrap();
    ctx.shutdown().unwrap();

    let manager = ctx.manager();
    assert!(manager.trees().is_empty());
    assert_eq!(
        manager.registries().reward_types.resolve(Some("record")).label(),
        "none"
    );
    assert_eq!(
        manager.registries().advancement_types.resolve(Some("block_break")).label(),
        "empty"
    );
    let outcomes = ctx
        .handle_event(&GameEvent::new(player, "block_break", Some("STONE"), 10))
        .unwrap();
    assert!(outcomes.is_empty());
    assert!(rewards_for(&log, player).is_empty());
}
