//! Advancement context: the explicit owner of the engine's runtime state
//!
//! Hosts construct one [`AdvancementContext`], feed it events and player
//! lifecycle calls, and shut it down explicitly. Nothing in the crate is a
//! global.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::advancement::{
    AdvancementError, AdvancementManager, AdvancementPath, Completion, GameEvent, LoadReport,
    RewardQueue,
};
use crate::config::{DataPaths, Settings};
use crate::player::{NotLoaded, PlayerId, ProgressDb, ProgressStore};

/// Progress of one player on one advancement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressReport {
    pub path: String,
    pub name: String,
    pub progress: u64,
    pub amount: u64,
    pub unit: Option<String>,
    pub active: bool,
    pub completed: bool,
    pub completed_at: Option<i64>,
}

pub struct AdvancementContext {
    manager: Arc<AdvancementManager>,
    store: Arc<ProgressStore>,
    settings: Settings,
}

impl AdvancementContext {
    pub fn new(manager: Arc<AdvancementManager>, store: Arc<ProgressStore>) -> Self {
        Self {
            manager,
            store,
            settings: Settings::default(),
        }
    }

    /// Context over a data directory: settings, trees dir and progress database.
    /// Trees are not loaded until [`reload`](Self::reload).
    pub fn open(data_dir: &Path) -> Result<Self> {
        let settings = Settings::load_or_init(data_dir)?;
        let paths = DataPaths::resolve(data_dir, &settings);
        let db = ProgressDb::open(&paths.database)
            .with_context(|| format!("Failed to open {}", paths.database.display()))?;
        let manager =
            AdvancementManager::new(&paths.trees_dir).seed_example(settings.seed_example);

        Ok(Self {
            manager: Arc::new(manager),
            store: Arc::new(ProgressStore::new(db)),
            settings,
        })
    }

    pub fn manager(&self) -> &Arc<AdvancementManager> {
        &self.manager
    }

    pub fn store(&self) -> &Arc<ProgressStore> {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// (Re)load every tree. Player progress is kept.
    pub fn reload(&self) -> Result<LoadReport> {
        let report = self.manager.load_all()?;
        info!(
            "Loaded {} advancement trees ({} skipped, {} warnings)",
            report.loaded.len(),
            report.skipped.len(),
            report.warnings.len()
        );
        Ok(report)
    }

    /// Add progress to one advancement and complete it when it qualifies.
    /// Fails with [`NotLoaded`] unless the player has joined.
    pub fn add_progress(
        &self,
        player: PlayerId,
        path: &AdvancementPath,
        delta: u64,
    ) -> Result<Completion> {
        let snapshot = self.manager.snapshot();
        let (tree, advancement) = snapshot.lookup(path)?;
        let registries = self.manager.registries();
        let mut rewards = RewardQueue::new();
        let completion = self.store.update(player, |progress| {
            tree.advance(advancement.label(), delta, progress, registries, &mut rewards)
        })??;
        rewards.run(registries);
        Ok(completion)
    }

    /// Dispatch an event to every advancement whose type subscribed to its kind.
    /// Returns the advancements that reacted, with their outcome. Events of
    /// players that are not loaded are dropped.
    pub fn handle_event(&self, event: &GameEvent) -> Result<Vec<(AdvancementPath, Completion)>> {
        let registries = self.manager.registries();
        let type_labels = registries.subscriptions.interested(&event.kind);
        if type_labels.is_empty() {
            debug!("No advancement type listens to '{}' events", event.kind);
            return Ok(Vec::new());
        }
        if !self.store.is_loaded(event.player) {
            debug!(
                "Dropping '{}' event of player {}, who is not loaded",
                event.kind, event.player
            );
            return Ok(Vec::new());
        }

        let mut rewards = RewardQueue::new();
        let outcomes = self.dispatch(event, &type_labels, &mut rewards);
        rewards.run(registries);
        outcomes
    }

    fn dispatch(
        &self,
        event: &GameEvent,
        type_labels: &[String],
        rewards: &mut RewardQueue,
    ) -> Result<Vec<(AdvancementPath, Completion)>> {
        let registries = self.manager.registries();
        let snapshot = self.manager.snapshot();
        let mut outcomes = Vec::new();
        for type_label in type_labels {
            let Some(strategy) = registries.advancement_types.lookup(type_label) else {
                continue;
            };
            for path in snapshot.paths_for_type(type_label) {
                let (tree, advancement) = snapshot.lookup(path)?;
                let Some(delta) = strategy.progress(event, &advancement) else {
                    continue;
                };
                let updated = self.store.update(event.player, |progress| {
                    tree.advance(advancement.label(), delta, progress, registries, rewards)
                });
                match updated {
                    Ok(completion) => outcomes.push((path.clone(), completion?)),
                    Err(NotLoaded(player)) => {
                        debug!("Player {} left while '{}' was dispatched", player, event.kind);
                        return Ok(outcomes);
                    }
                }
            }
        }
        Ok(outcomes)
    }

    /// Explicitly activate an advancement. Returns false if it already was.
    pub fn activate(&self, player: PlayerId, path: &AdvancementPath) -> Result<bool> {
        self.manager.snapshot().lookup(path)?;
        Ok(self.store.update(player, |progress| progress.activate(path))?)
    }

    /// Re-evaluate completion without adding progress
    pub fn check(&self, player: PlayerId, path: &AdvancementPath) -> Result<Completion> {
        self.add_progress(player, path, 0)
    }

    /// Complete regardless of progress and requirements
    pub fn complete(&self, player: PlayerId, path: &AdvancementPath) -> Result<Completion> {
        let mut rewards = RewardQueue::new();
        let completion = self.store.update(player, |progress| {
            self.manager.complete(path, progress, &mut rewards)
        })??;
        rewards.run(self.manager.registries());
        Ok(completion)
    }

    pub fn report(&self, player: PlayerId, path: &AdvancementPath) -> Result<ProgressReport> {
        let (tree, advancement) = self.manager.snapshot().lookup(path)?;
        let progress = self.store.snapshot(player)?;
        let entry = progress.entry(path).cloned().unwrap_or_default();

        Ok(ProgressReport {
            path: path.to_string(),
            name: advancement.display.name.clone(),
            progress: entry.progress,
            amount: advancement.amount,
            unit: advancement.display.unit.clone(),
            active: entry.active || tree.options.auto_active,
            completed: entry.completed,
            completed_at: entry.completed_at,
        })
    }

    /// Reports for every advancement of a tree, in configuration order
    pub fn tree_report(&self, player: PlayerId, tree: &str) -> Result<Vec<ProgressReport>> {
        let tree = self
            .manager
            .tree(tree)
            .ok_or_else(|| AdvancementError::invalid_reference(tree))?;
        tree.advancements()
            .iter()
            .map(|advancement| self.report(player, &advancement.path))
            .collect()
    }

    /// How many advancements of `tree` the player has completed
    pub fn completed_in_tree(&self, player: PlayerId, tree: &str) -> Result<usize> {
        let tree = self
            .manager
            .tree(tree)
            .ok_or_else(|| AdvancementError::invalid_reference(tree))?;
        let progress = self.store.snapshot(player)?;
        Ok(tree.completed_count(&progress))
    }

    /// Load the player's progress and report the join as a `player_join` event
    pub fn player_join(&self, player: PlayerId) -> Result<()> {
        self.store.load(player)?;
        self.handle_event(&GameEvent::new(player, "player_join", None, 1))?;
        Ok(())
    }

    /// Persist and drop the player's progress
    pub fn player_quit(&self, player: PlayerId) -> Result<()> {
        self.store.unload(player)
    }

    pub fn flush(&self) -> Result<usize> {
        self.store.flush()
    }

    /// Periodically flush dirty progress until the task is aborted.
    /// Must be called inside a tokio runtime.
    pub fn spawn_autosave(&self, interval: Duration) -> JoinHandle<()> {
        let store = self.store.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let store = store.clone();
                match tokio::task::spawn_blocking(move || store.flush()).await {
                    Ok(Ok(0)) => {}
                    Ok(Ok(saved)) => debug!("Autosave wrote {} players", saved),
                    Ok(Err(e)) => warn!("Autosave failed: {:#}", e),
                    Err(e) => warn!("Autosave task panicked: {}", e),
                }
            }
        })
    }

    /// Autosave at the configured interval, unless it is zero
    pub fn start_autosave(&self) -> Option<JoinHandle<()>> {
        match self.settings.autosave_interval_secs {
            0 => None,
            secs => Some(self.spawn_autosave(Duration::from_secs(secs))),
        }
    }

    /// Flush everything, then drop trees and strategies
    pub fn shutdown(&self) -> Result<()> {
        let saved = self.store.flush()?;
        self.manager.unregister_all();
        info!("Advancement context shut down, saved {} players", saved);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advancement::{RewardType, Strategy};
    use crate::config::ConfigUnit;
    use uuid::Uuid;

    const MINING: &str = r#"
advancements:
  stone:
    type: block_break
    value: STONE
    amount: 10
  wood:
    type: block_break
    value: OAK_LOG
    amount: 5
options:
  auto_active: true
"#;

    fn context(yaml: &str) -> AdvancementContext {
        let manager = AdvancementManager::new("unused");
        manager.load_units(vec![ConfigUnit::from_yaml("mining", yaml).unwrap()]);
        AdvancementContext::new(Arc::new(manager), Arc::new(ProgressStore::in_memory()))
    }

    fn joined(ctx: &AdvancementContext) -> PlayerId {
        let player = Uuid::new_v4();
        ctx.player_join(player).unwrap();
        player
    }

    #[test]
    fn test_event_dispatch() {
        let ctx = context(MINING);
        let player = joined(&ctx);

        let outcomes = ctx
            .handle_event(&GameEvent::new(player, "block_break", Some("stone"), 4))
            .unwrap();
        assert_eq!(
            outcomes,
            vec![(
                AdvancementPath::new("mining", "stone"),
                Completion::Pending { progress: 4, amount: 10 }
            )]
        );

        let outcomes = ctx
            .handle_event(&GameEvent::new(player, "entity_kill", Some("ZOMBIE"), 1))
            .unwrap();
        assert!(outcomes.is_empty());
    }

    #[test]
    fn test_report() {
        let ctx = context(MINING);
        let player = joined(&ctx);
        let wood = AdvancementPath::new("mining", "wood");

        ctx.add_progress(player, &wood, 5).unwrap();
        let report = ctx.report(player, &wood).unwrap();
        assert_eq!(report.progress, 5);
        assert!(report.completed);
        assert!(report.active);
        assert_eq!(report.unit.as_deref(), Some("blocks"));
        assert_eq!(ctx.completed_in_tree(player, "mining").unwrap(), 1);
        assert_eq!(ctx.tree_report(player, "mining").unwrap().len(), 2);
    }

    #[test]
    fn test_unknown_path_is_invalid_reference() {
        let ctx = context(MINING);
        let err = ctx
            .add_progress(joined(&ctx), &AdvancementPath::new("mining", "gold"), 1)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AdvancementError>(),
            Some(AdvancementError::InvalidReference(_))
        ));
    }

    #[test]
    fn test_activate_unlocks_progress() {
        let ctx = context(
            "advancements:\n  stone:\n    type: block_break\n    value: STONE\n    amount: 2\n",
        );
        let player = joined(&ctx);
        let stone = AdvancementPath::new("mining", "stone");

        assert_eq!(ctx.add_progress(player, &stone, 2).unwrap(), Completion::Inactive);
        assert!(ctx.activate(player, &stone).unwrap());
        assert!(!ctx.activate(player, &stone).unwrap());
        assert_eq!(
            ctx.add_progress(player, &stone, 2).unwrap(),
            Completion::Completed { tree_completed: true }
        );
    }

    #[test]
    fn test_events_of_players_that_left_are_dropped() {
        let ctx = context(MINING);
        let player = joined(&ctx);
        let stone = AdvancementPath::new("mining", "stone");

        ctx.add_progress(player, &stone, 3).unwrap();
        ctx.player_quit(player).unwrap();

        let outcomes = ctx
            .handle_event(&GameEvent::new(player, "block_break", Some("STONE"), 4))
            .unwrap();
        assert!(outcomes.is_empty());
        let err = ctx.add_progress(player, &stone, 1).unwrap_err();
        assert_eq!(err.downcast_ref::<NotLoaded>(), Some(&NotLoaded(player)));
        assert!(!ctx.store().is_loaded(player));
        assert_eq!(ctx.store().loaded_count(), 0);
    }

    /// Activates the advancement named by its value
    struct Unlock {
        store: Arc<ProgressStore>,
    }

    impl Strategy for Unlock {
        fn label(&self) -> &str {
            "unlock"
        }
    }

    impl RewardType for Unlock {
        fn execute(&self, player: PlayerId, value: Option<&str>) -> anyhow::Result<()> {
            let path = AdvancementPath::parse(value.unwrap_or_default())?;
            self.store.update(player, |progress| progress.activate(&path))?;
            Ok(())
        }
    }

    #[test]
    fn test_reward_can_update_the_same_player() {
        let store = Arc::new(ProgressStore::in_memory());
        let manager = AdvancementManager::new("unused");
        manager.register_reward_type(Arc::new(Unlock {
            store: store.clone(),
        }));
        manager.load_units(vec![ConfigUnit::from_yaml(
            "mining",
            r#"
advancements:
  stone:
    type: block_break
    value: STONE
    amount: 2
    rewards:
      next:
        type: unlock
        value: mining.wood
  wood:
    type: block_break
    value: OAK_LOG
    amount: 1
"#,
        )
        .unwrap()]);
        let ctx = AdvancementContext::new(Arc::new(manager), store);
        let player = joined(&ctx);
        let stone = AdvancementPath::new("mining", "stone");
        let wood = AdvancementPath::new("mining", "wood");

        ctx.activate(player, &stone).unwrap();
        assert!(ctx.add_progress(player, &stone, 2).unwrap().is_completed());
        assert!(ctx.report(player, &wood).unwrap().active);
        assert_eq!(
            ctx.add_progress(player, &wood, 1).unwrap(),
            Completion::Completed { tree_completed: true }
        );
    }
}
