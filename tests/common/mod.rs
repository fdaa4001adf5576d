//! Shared test utilities for advancement integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use advancements::advancement::{RewardType, Strategy};
use advancements::PlayerId;
use tempfile::TempDir;

/// Two block-breaking advancements: stone (10) and wood (5), tree reward "tree"
pub const MINING_TREE: &str = r#"
advancements:
  stone:
    type: block_break
    value: STONE
    amount: 10
    rewards:
      first:
        type: record
        value: stone
  wood:
    type: block_break
    value: OAK_LOG
    amount: 5
    rewards:
      first:
        type: record
        value: wood
options:
  auto_active: true
  rewards:
    done:
      type: record
      value: tree
"#;

/// Creates a data directory with a `trees` subdirectory
pub fn create_data_dir() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    fs::create_dir_all(trees_dir(temp_dir.path())).expect("Failed to create trees dir");
    temp_dir
}

pub fn trees_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("advancement-trees")
}

/// Writes `<label>.yml` into the trees directory
pub fn write_tree(data_dir: &Path, label: &str, yaml: &str) -> PathBuf {
    let path = trees_dir(data_dir).join(format!("{}.yml", label));
    fs::write(&path, yaml).expect("Failed to write tree file");
    path
}

/// Reward type that records `(player, value)` for every execution
pub struct RecordingReward {
    pub log: Arc<Mutex<Vec<(PlayerId, String)>>>,
}

impl RecordingReward {
    pub fn new() -> (Arc<Self>, Arc<Mutex<Vec<(PlayerId, String)>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        (Arc::new(Self { log: log.clone() }), log)
    }
}

impl Strategy for RecordingReward {
    fn label(&self) -> &str {
        "record"
    }
}

impl RewardType for RecordingReward {
    fn execute(&self, player: PlayerId, value: Option<&str>) -> anyhow::Result<()> {
        self.log
            .lock()
            .unwrap()
            .push((player, value.unwrap_or_default().to_string()));
        Ok(())
    }
}

/// Values recorded for one player, in order
pub fn rewards_for(log: &Mutex<Vec<(PlayerId, String)>>, player: PlayerId) -> Vec<String> {
    log.lock()
        .unwrap()
        .iter()
        .filter(|(p, _)| *p == player)
        .map(|(_, v)| v.clone())
        .collect()
}
