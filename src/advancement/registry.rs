//! Strategy registries
//!
//! A registry maps a label to a shared strategy. Registration is
//! last-wins so extensions can override built-ins, and resolution never
//! fails: unknown labels resolve to the registry's no-op fallback.
//! Warnings about unknown labels belong to the caller (see
//! [`StrategyRegistry::lookup`]).

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::events::Subscriptions;
use super::types::{
    AdvancementType, CompletedAdvancement, Empty, EventCounter, NoRequirement, NoReward,
    RequirementType, RewardType, Strategy,
};
use crate::sync::{read, write};

/// Label → strategy, with an always-present fallback
pub struct StrategyRegistry<T: ?Sized + Strategy> {
    /// Human-readable registry name used in warnings, e.g. "reward type"
    kind: &'static str,
    entries: RwLock<HashMap<String, Arc<T>>>,
    fallback: Arc<T>,
}

impl<T: ?Sized + Strategy> StrategyRegistry<T> {
    /// Create an empty registry. `fallback` is also registered under its own label.
    pub fn new(kind: &'static str, fallback: Arc<T>) -> Self {
        let registry = Self {
            kind,
            entries: RwLock::new(HashMap::new()),
            fallback,
        };
        registry.register(registry.fallback.clone());
        registry
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Insert or replace. Returns the strategy that was replaced, if any.
    pub fn register(&self, strategy: Arc<T>) -> Option<Arc<T>> {
        let label = normalize(strategy.label());
        write(&self.entries).insert(label, strategy)
    }

    /// Registered strategy for `label`, without falling back
    pub fn lookup(&self, label: &str) -> Option<Arc<T>> {
        read(&self.entries).get(&normalize(label)).cloned()
    }

    /// Registered strategy for `label`, or the no-op fallback
    pub fn resolve(&self, label: Option<&str>) -> Arc<T> {
        label
            .and_then(|l| self.lookup(l))
            .unwrap_or_else(|| self.fallback.clone())
    }

    pub fn contains(&self, label: &str) -> bool {
        read(&self.entries).contains_key(&normalize(label))
    }

    /// Registered labels, sorted
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = read(&self.entries).keys().cloned().collect();
        labels.sort();
        labels
    }

    /// Remove every registration. The fallback keeps resolving.
    pub fn clear(&self) {
        write(&self.entries).clear();
    }

    pub fn len(&self) -> usize {
        read(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn normalize(label: &str) -> String {
    label.trim().to_ascii_lowercase()
}

/// The three strategy registries plus the event subscription table
pub struct TypeRegistries {
    pub advancement_types: StrategyRegistry<dyn AdvancementType>,
    pub reward_types: StrategyRegistry<dyn RewardType>,
    pub requirement_types: StrategyRegistry<dyn RequirementType>,
    pub subscriptions: Subscriptions,
}

impl Default for TypeRegistries {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistries {
    /// Registries holding only the no-op strategies
    pub fn new() -> Self {
        Self {
            advancement_types: StrategyRegistry::new("advancement type", Arc::new(Empty)),
            reward_types: StrategyRegistry::new("reward type", Arc::new(NoReward)),
            requirement_types: StrategyRegistry::new("requirement type", Arc::new(NoRequirement)),
            subscriptions: Subscriptions::new(),
        }
    }

    /// Registries pre-populated with the built-in strategies
    ///
    /// **Advancement types:** `empty` plus the [`EventCounter::builtin`] counters
    /// **Reward types:** `none`
    /// **Requirement types:** `none`, `advancement`
    pub fn with_defaults() -> Self {
        let registries = Self::new();
        for counter in EventCounter::builtin() {
            registries.register_advancement_type(Arc::new(counter));
        }
        registries.register_requirement_type(Arc::new(CompletedAdvancement));
        registries
    }

    /// Register an advancement type and subscribe it to its event kinds.
    /// A replaced type loses its subscriptions first.
    pub fn register_advancement_type(&self, advancement_type: Arc<dyn AdvancementType>) {
        let label = normalize(advancement_type.label());
        let kinds = advancement_type.event_kinds();
        if self.advancement_types.register(advancement_type).is_some() {
            self.subscriptions.unsubscribe(&label);
        }
        self.subscriptions.subscribe(&label, &kinds);
    }

    pub fn register_reward_type(&self, reward_type: Arc<dyn RewardType>) {
        self.reward_types.register(reward_type);
    }

    pub fn register_requirement_type(&self, requirement_type: Arc<dyn RequirementType>) {
        self.requirement_types.register(requirement_type);
    }

    /// Detach every event subscription, then clear all registries
    pub fn unregister_all(&self) {
        self.subscriptions.clear();
        self.advancement_types.clear();
        self.reward_types.clear();
        self.requirement_types.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advancement::types::{EMPTY_TYPE, NONE_TYPE};

    struct Named(&'static str, &'static str);

    impl Strategy for Named {
        fn label(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_resolve_falls_back() {
        let registry: StrategyRegistry<Named> =
            StrategyRegistry::new("test", Arc::new(Named("none", "fallback")));
        registry.register(Arc::new(Named("money", "builtin")));

        assert_eq!(registry.resolve(Some("money")).1, "builtin");
        assert_eq!(registry.resolve(Some("MONEY")).1, "builtin");
        assert_eq!(registry.resolve(Some("unknown")).1, "fallback");
        assert_eq!(registry.resolve(None).1, "fallback");
        assert!(registry.lookup("unknown").is_none());
    }

    #[test]
    fn test_register_last_wins() {
        let registry: StrategyRegistry<Named> =
            StrategyRegistry::new("test", Arc::new(Named("none", "fallback")));
        assert!(registry.register(Arc::new(Named("money", "first"))).is_none());
        let replaced = registry.register(Arc::new(Named("money", "second")));

        assert_eq!(replaced.map(|r| r.1), Some("first"));
        assert_eq!(registry.resolve(Some("money")).1, "second");
        assert_eq!(registry.labels(), vec!["money", "none"]);
    }

    #[test]
    fn test_clear_keeps_fallback() {
        let registry: StrategyRegistry<Named> =
            StrategyRegistry::new("test", Arc::new(Named("none", "fallback")));
        registry.register(Arc::new(Named("money", "builtin")));
        registry.clear();

        assert!(registry.is_empty());
        assert_eq!(registry.resolve(Some("money")).1, "fallback");
    }

    #[test]
    fn test_defaults_and_subscriptions() {
        let registries = TypeRegistries::with_defaults();

        assert!(registries.advancement_types.contains(EMPTY_TYPE));
        assert!(registries.advancement_types.contains("block_break"));
        assert!(registries.reward_types.contains(NONE_TYPE));
        assert!(registries.requirement_types.contains("advancement"));
        assert_eq!(
            registries.subscriptions.interested("block_break"),
            vec!["block_break"]
        );
    }

    #[test]
    fn test_unregister_all() {
        let registries = TypeRegistries::with_defaults();
        registries.unregister_all();

        assert!(registries.subscriptions.interested("block_break").is_empty());
        assert!(registries.advancement_types.is_empty());
        assert_eq!(registries.advancement_types.resolve(Some("block_break")).label(), EMPTY_TYPE);
        assert_eq!(registries.reward_types.resolve(Some("none")).label(), NONE_TYPE);
    }
}
