//! State Map
//!
//! Ordered mapping from state key to diagram source.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Key rendered on page-ready when present
pub const INITIAL_STATE: &str = "initial";

/// Mapping from state key to diagram source text, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateMap {
    states: IndexMap<String, String>,
}

impl StateMap {
    /// An empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the source for a key
    pub fn insert(&mut self, key: impl Into<String>, source: impl Into<String>) {
        self.states.insert(key.into(), source.into());
    }

    /// Diagram source for `key`, treating an empty source as missing
    pub fn source(&self, key: &str) -> Option<&str> {
        self.states
            .get(key)
            .map(String::as_str)
            .filter(|source| !source.is_empty())
    }

    /// Whether `key` is present, even with an empty source
    pub fn contains(&self, key: &str) -> bool {
        self.states.contains_key(key)
    }

    /// Key to render on page-ready: `"initial"` if it has a source, else the
    /// first key inserted, else nothing.
    pub fn initial_key(&self) -> Option<&str> {
        if self.source(INITIAL_STATE).is_some() {
            return Some(INITIAL_STATE);
        }
        self.states.keys().next().map(String::as_str)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }

    /// Number of states, including ones with an empty source
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for StateMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            states: iter
                .into_iter()
                .map(|(key, source)| (key.into(), source.into()))
                .collect(),
        }
    }
}
