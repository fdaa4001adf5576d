//! Advancement manager: owns the registries and the published tree snapshot

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::advancement::{Advancement, RewardQueue};
use super::error::{AdvancementError, ConfigWarning, WarningKind};
use super::loader::load_tree;
use super::path::AdvancementPath;
use super::registry::TypeRegistries;
use super::tree::{AdvancementTree, Completion};
use super::types::{AdvancementType, RequirementType, RewardType};
use crate::config::{write_atomic, ConfigUnit};
use crate::player::PlayerProgress;
use crate::sync::{read, write};

/// Tree unit written into an empty trees directory
pub const EXAMPLE_TREE: &str = include_str!("../../assets/trees/example.yml");
pub const EXAMPLE_TREE_FILE: &str = "example.yml";

/// Immutable view of every loaded tree. Replaced as a whole on reload.
#[derive(Debug, Default)]
pub struct TreeSnapshot {
    trees: HashMap<String, Arc<AdvancementTree>>,
    /// Advancement type label → advancements of that type
    by_type: HashMap<String, Vec<AdvancementPath>>,
}

impl TreeSnapshot {
    pub fn new(trees: HashMap<String, Arc<AdvancementTree>>) -> Self {
        let mut by_type: HashMap<String, Vec<AdvancementPath>> = HashMap::new();
        for tree in trees.values() {
            for advancement in tree.advancements() {
                by_type
                    .entry(advancement.kind.clone())
                    .or_default()
                    .push(advancement.path.clone());
            }
        }
        for paths in by_type.values_mut() {
            paths.sort();
        }
        Self { trees, by_type }
    }

    pub fn tree(&self, label: &str) -> Option<Arc<AdvancementTree>> {
        self.trees.get(label).cloned()
    }

    /// Trees sorted by label
    pub fn trees(&self) -> Vec<Arc<AdvancementTree>> {
        let mut trees: Vec<_> = self.trees.values().cloned().collect();
        trees.sort_by(|a, b| a.label().cmp(b.label()));
        trees
    }

    /// Tree and advancement behind `path`
    pub fn lookup(
        &self,
        path: &AdvancementPath,
    ) -> Result<(Arc<AdvancementTree>, Arc<Advancement>), AdvancementError> {
        let tree = self
            .tree(path.tree())
            .ok_or_else(|| AdvancementError::invalid_reference(path.to_string()))?;
        let advancement = tree.advancement(path.advancement())?;
        Ok((tree, advancement))
    }

    pub fn paths_for_type(&self, type_label: &str) -> &[AdvancementPath] {
        self.by_type
            .get(type_label)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}

/// A unit that was not loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedUnit {
    pub unit: String,
    pub reason: String,
}

/// Outcome of one load pass
#[derive(Debug, Default, Serialize)]
pub struct LoadReport {
    /// Loaded tree labels, sorted
    pub loaded: Vec<String>,
    pub skipped: Vec<SkippedUnit>,
    pub warnings: Vec<ConfigWarning>,
}

pub struct AdvancementManager {
    registries: TypeRegistries,
    snapshot: RwLock<Arc<TreeSnapshot>>,
    trees_dir: PathBuf,
    seed_example: bool,
}

impl AdvancementManager {
    /// Manager with the built-in strategies registered and no trees loaded
    pub fn new(trees_dir: impl Into<PathBuf>) -> Self {
        Self::with_registries(trees_dir, TypeRegistries::with_defaults())
    }

    pub fn with_registries(trees_dir: impl Into<PathBuf>, registries: TypeRegistries) -> Self {
        Self {
            registries,
            snapshot: RwLock::new(Arc::new(TreeSnapshot::default())),
            trees_dir: trees_dir.into(),
            seed_example: true,
        }
    }

    /// Whether a missing trees directory gets the example tree
    pub fn seed_example(mut self, seed: bool) -> Self {
        self.seed_example = seed;
        self
    }

    pub fn trees_dir(&self) -> &Path {
        &self.trees_dir
    }

    pub fn registries(&self) -> &TypeRegistries {
        &self.registries
    }

    /// Current snapshot. Stays valid even if a reload publishes a new one.
    pub fn snapshot(&self) -> Arc<TreeSnapshot> {
        read(&self.snapshot).clone()
    }

    /// Load every unit in the trees directory and publish the result
    pub fn load_all(&self) -> Result<LoadReport> {
        self.ensure_trees_dir()?;

        let mut paths: Vec<PathBuf> = std::fs::read_dir(&self.trees_dir)
            .with_context(|| format!("Failed to read trees dir: {}", self.trees_dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        let mut units = Vec::new();
        let mut skipped = Vec::new();
        for path in paths {
            let Some(id) = crate::config::unit_id(&path) else {
                debug!("Ignoring non-tree file {}", path.display());
                continue;
            };
            if id.chars().any(char::is_whitespace) {
                error!(
                    "Advancement tree file '{}' contains spaces, skipping it",
                    path.display()
                );
                skipped.push(SkippedUnit {
                    unit: id,
                    reason: "file name contains spaces".to_string(),
                });
                continue;
            }
            match ConfigUnit::read(&path) {
                Ok(unit) => units.push(unit),
                Err(e) => {
                    let err = AdvancementError::LoadFailure {
                        unit: id.clone(),
                        reason: format!("{:#}", e),
                    };
                    error!("{}", err);
                    skipped.push(SkippedUnit {
                        unit: id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        let mut report = self.load_units(units);
        skipped.append(&mut report.skipped);
        report.skipped = skipped;
        Ok(report)
    }

    /// Materialize `units`, persist normalized documents and publish.
    /// Whatever was loaded before is replaced entirely.
    pub fn load_units(&self, units: Vec<ConfigUnit>) -> LoadReport {
        let mut report = LoadReport::default();
        let mut trees = HashMap::new();

        for unit in units {
            info!("Attempting to load advancement tree '{}'", unit.id);
            if trees.contains_key(&unit.id) {
                warn!("Advancement tree '{}' is defined twice, skipping the second", unit.id);
                report.skipped.push(SkippedUnit {
                    unit: unit.id,
                    reason: "duplicate tree label".to_string(),
                });
                continue;
            }

            let loaded = match load_tree(&unit, &self.registries) {
                Ok(loaded) => loaded,
                Err(e) => {
                    error!("Failed to load advancement tree '{}': {}", unit.id, e);
                    report.skipped.push(SkippedUnit {
                        unit: unit.id,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            for warning in &loaded.warnings {
                match warning.kind {
                    WarningKind::Skipped { .. } => error!("{}", warning),
                    _ => warn!("{}", warning),
                }
            }
            if let Some(document) = &loaded.normalized {
                if let Err(e) = unit.save(document) {
                    warn!("Failed to write defaults back to '{}': {:#}", unit.id, e);
                }
            }

            info!(
                "Loaded advancement tree '{}' with {} advancements",
                unit.id,
                loaded.tree.len()
            );
            report.loaded.push(unit.id.clone());
            report.warnings.extend(loaded.warnings);
            trees.insert(unit.id, Arc::new(loaded.tree));
        }

        report.loaded.sort();
        *write(&self.snapshot) = Arc::new(TreeSnapshot::new(trees));
        report
    }

    fn ensure_trees_dir(&self) -> Result<()> {
        if self.trees_dir.exists() {
            return Ok(());
        }
        std::fs::create_dir_all(&self.trees_dir).with_context(|| {
            format!("Failed to create trees dir: {}", self.trees_dir.display())
        })?;
        if self.seed_example {
            write_atomic(&self.trees_dir.join(EXAMPLE_TREE_FILE), EXAMPLE_TREE)?;
            info!("Created example advancement tree in {}", self.trees_dir.display());
        }
        Ok(())
    }

    /// Resolve a dotted `tree.advancement` reference
    pub fn resolve(&self, path: &str) -> Result<Arc<Advancement>, AdvancementError> {
        let path = AdvancementPath::parse(path)?;
        self.snapshot().lookup(&path).map(|(_, advancement)| advancement)
    }

    pub fn tree(&self, label: &str) -> Option<Arc<AdvancementTree>> {
        self.snapshot().tree(label)
    }

    /// Loaded trees, sorted by label
    pub fn trees(&self) -> Vec<Arc<AdvancementTree>> {
        self.snapshot().trees()
    }

    pub fn advancement_type_labels(&self) -> Vec<String> {
        self.registries.advancement_types.labels()
    }

    pub fn paths_for_type(&self, type_label: &str) -> Vec<AdvancementPath> {
        self.snapshot().paths_for_type(type_label).to_vec()
    }

    /// Force completion of `path` for the player owning `player`.
    /// Earned rewards are queued on `rewards`.
    pub fn complete(
        &self,
        path: &AdvancementPath,
        player: &mut PlayerProgress,
        rewards: &mut RewardQueue,
    ) -> Result<Completion, AdvancementError> {
        let tree = self
            .tree(path.tree())
            .ok_or_else(|| AdvancementError::invalid_reference(path.to_string()))?;
        tree.complete(path.advancement(), player, rewards)
    }

    pub fn register_advancement_type(&self, advancement_type: Arc<dyn AdvancementType>) {
        self.registries.register_advancement_type(advancement_type);
    }

    pub fn register_reward_type(&self, reward_type: Arc<dyn RewardType>) {
        self.registries.register_reward_type(reward_type);
    }

    pub fn register_requirement_type(&self, requirement_type: Arc<dyn RequirementType>) {
        self.registries.register_requirement_type(requirement_type);
    }

    /// Detach subscriptions, clear the registries and drop every tree
    pub fn unregister_all(&self) {
        self.registries.unregister_all();
        *write(&self.snapshot) = Arc::new(TreeSnapshot::default());
        info!("Unregistered all advancement types and trees");
    }
}
