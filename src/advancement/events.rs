//! External events and the subscription table
//!
//! Instead of hooking into a host event bus, each advancement type declares
//! the event kinds it cares about. The table maps event kind → interested
//! type labels and is consulted synchronously on dispatch.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::player::PlayerId;
use crate::sync::{read, write};

/// One raw event reported by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEvent {
    pub player: PlayerId,
    /// Event kind, e.g. `block_break`
    pub kind: String,
    /// Raw value, e.g. the block that was broken
    pub value: Option<String>,
    /// How many times it happened
    pub amount: u64,
}

impl GameEvent {
    pub fn new(player: PlayerId, kind: &str, value: Option<&str>, amount: u64) -> Self {
        Self {
            player,
            kind: kind.to_string(),
            value: value.map(|v| v.to_string()),
            amount,
        }
    }
}

/// Event kind → advancement type labels subscribed to it
#[derive(Debug, Default)]
pub struct Subscriptions {
    by_kind: RwLock<HashMap<String, Vec<String>>>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a type label to the given kinds. Re-subscribing is a no-op.
    pub fn subscribe(&self, type_label: &str, kinds: &[String]) {
        let mut by_kind = write(&self.by_kind);
        for kind in kinds {
            let labels = by_kind.entry(kind.clone()).or_default();
            if !labels.iter().any(|l| l == type_label) {
                labels.push(type_label.to_string());
            }
        }
    }

    /// Remove a type label from every kind
    pub fn unsubscribe(&self, type_label: &str) {
        let mut by_kind = write(&self.by_kind);
        for labels in by_kind.values_mut() {
            labels.retain(|l| l != type_label);
        }
        by_kind.retain(|_, labels| !labels.is_empty());
    }

    /// Type labels interested in `kind`, in subscription order
    pub fn interested(&self, kind: &str) -> Vec<String> {
        read(&self.by_kind).get(kind).cloned().unwrap_or_default()
    }

    pub fn clear(&self) {
        write(&self.by_kind).clear();
    }

    pub fn is_empty(&self) -> bool {
        read(&self.by_kind).is_empty()
    }
}
