use cfgd_domain::config::ConfigurationSeed;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;

/// A named string-to-string property store the container browses and mutates.
///
/// Keys are reported in a stable order; absence is `None`, never an empty string.
pub trait Configuration: Send + Sync + Debug {
    /// Unique identifier; also the registry key.
    fn id(&self) -> &str;

    /// Human-readable name shown on the index page.
    fn display_name(&self) -> &str;

    /// Property keys, in iteration order.
    fn keys(&self) -> Vec<String>;

    fn get_property(&self, key: &str) -> Option<&str>;

    /// Inserts or overwrites `key`.
    fn set_property(&mut self, key: &str, value: &str);

    /// Removes `key`, returning whether anything was removed.
    fn remove_property(&mut self, key: &str) -> bool;

    fn has_property(&self, key: &str) -> bool {
        self.get_property(key).is_some()
    }

    /// `(key, value)` pairs in key order.
    fn properties(&self) -> Vec<(String, String)> {
        self.keys()
            .into_iter()
            .filter_map(|key| {
                let value = self.get_property(&key)?.to_owned();
                Some((key, value))
            })
            .collect()
    }

    /// Serializable copy of the current state.
    fn snapshot(&self) -> ConfigurationSnapshot {
        ConfigurationSnapshot {
            id: self.id().to_owned(),
            display_name: self.display_name().to_owned(),
            properties: self.properties().into_iter().collect(),
        }
    }
}

/// Point-in-time copy of a configuration, as persisted by the snapshot listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationSnapshot {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

/// In-memory [`Configuration`] with keys kept in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryConfiguration {
    id: String,
    display_name: String,
    properties: BTreeMap<String, String>,
}

impl MemoryConfiguration {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self { id: id.into(), display_name: display_name.into(), properties: BTreeMap::new() }
    }

    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }
}

impl Configuration for MemoryConfiguration {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn keys(&self) -> Vec<String> {
        self.properties.keys().cloned().collect()
    }

    fn get_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    fn set_property(&mut self, key: &str, value: &str) {
        self.properties.insert(key.to_owned(), value.to_owned());
    }

    fn remove_property(&mut self, key: &str) -> bool {
        self.properties.remove(key).is_some()
    }

    fn properties(&self) -> Vec<(String, String)> {
        self.properties.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    fn snapshot(&self) -> ConfigurationSnapshot {
        ConfigurationSnapshot {
            id: self.id.clone(),
            display_name: self.display_name.clone(),
            properties: self.properties.clone(),
        }
    }
}

impl From<ConfigurationSnapshot> for MemoryConfiguration {
    fn from(snapshot: ConfigurationSnapshot) -> Self {
        Self { id: snapshot.id, display_name: snapshot.display_name, properties: snapshot.properties }
    }
}

impl From<&ConfigurationSeed> for MemoryConfiguration {
    fn from(seed: &ConfigurationSeed) -> Self {
        Self {
            id: seed.id.clone(),
            display_name: seed.display_name().to_owned(),
            properties: seed.properties.clone(),
        }
    }
}
