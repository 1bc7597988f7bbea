use crate::configuration::Configuration;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// A configuration shared between the registry and in-flight requests.
///
/// The mutex serializes mutations per configuration; distinct configurations never
/// contend with each other.
pub type SharedConfiguration = Arc<Mutex<Box<dyn Configuration>>>;

/// Index row: identifier and display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryEntry {
    pub id: String,
    pub display_name: String,
}

/// Identifier → configuration map, iterated in identifier order.
///
/// Cloning is cheap; clones share the same map, so the registry can be extended or
/// replaced while the container serves requests.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Arc<RwLock<BTreeMap<String, SharedConfiguration>>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `config` under its own identifier, returning the one it replaced.
    pub fn insert(&self, config: impl Configuration + 'static) -> Option<SharedConfiguration> {
        self.insert_boxed(Box::new(config))
    }

    pub fn insert_boxed(&self, config: Box<dyn Configuration>) -> Option<SharedConfiguration> {
        let id = config.id().to_owned();
        debug!(config = %id, "Registering configuration");
        self.entries.write().insert(id, Arc::new(Mutex::new(config)))
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<SharedConfiguration> {
        self.entries.read().get(id).cloned()
    }

    pub fn remove(&self, id: &str) -> Option<SharedConfiguration> {
        self.entries.write().remove(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.read().contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    /// `(id, display name)` of every configuration, in identifier order.
    ///
    /// Briefly locks each configuration; do not call it while holding one of them.
    #[must_use]
    pub fn entries(&self) -> Vec<RegistryEntry> {
        let handles: Vec<_> =
            self.entries.read().iter().map(|(id, config)| (id.clone(), config.clone())).collect();

        handles
            .into_iter()
            .map(|(id, config)| {
                let display_name = config.lock().display_name().to_owned();
                RegistryEntry { id, display_name }
            })
            .collect()
    }

    /// Swaps the whole content in one step; readers see either the old or the new set.
    pub fn replace_all<I>(&self, configs: I)
    where
        I: IntoIterator<Item = Box<dyn Configuration>>,
    {
        let fresh: BTreeMap<_, _> = configs
            .into_iter()
            .map(|config| (config.id().to_owned(), Arc::new(Mutex::new(config))))
            .collect();
        debug!(count = fresh.len(), "Replacing registry content");
        *self.entries.write() = fresh;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::MemoryConfiguration;

    #[test]
    fn entries_are_sorted_by_id() {
        let registry = Registry::new();
        registry.insert(MemoryConfiguration::new("zeta", "Zeta"));
        registry.insert(MemoryConfiguration::new("alpha", "Alpha"));

        let ids: Vec<_> = registry.entries().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["alpha", "zeta"]);
    }

    #[test]
    fn insert_replaces_same_id() {
        let registry = Registry::new();
        assert!(registry.insert(MemoryConfiguration::new("db", "Old")).is_none());
        let previous = registry.insert(MemoryConfiguration::new("db", "New"));

        assert_eq!(previous.unwrap().lock().display_name(), "Old");
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.entries()[0].display_name, "New");
    }

    #[test]
    fn clones_share_content() {
        let registry = Registry::new();
        let clone = registry.clone();
        clone.insert(MemoryConfiguration::new("db", "Database"));

        assert!(registry.contains("db"));
        assert!(registry.remove("db").is_some());
        assert!(clone.is_empty());
    }

    #[test]
    fn replace_all_swaps_everything() {
        let registry = Registry::new();
        registry.insert(MemoryConfiguration::new("old", "Old"));

        registry.replace_all([
            Box::new(MemoryConfiguration::new("b", "B")) as Box<dyn Configuration>,
            Box::new(MemoryConfiguration::new("a", "A")),
        ]);

        assert_eq!(registry.ids(), vec!["a", "b"]);
        assert!(registry.get("old").is_none());
    }
}
