//! Persistent string flags shared by every scene and overlay.
//!
//! Flags are the only durable game state. Booleans are stored as the strings
//! `"true"` and `"false"`, matching what the browser store holds.

use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised by a flag backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlagError {
    #[error("flag storage unavailable: {0}")]
    Unavailable(String),
    #[error("failed to write flag `{key}`: {reason}")]
    Write { key: String, reason: String },
}

/// Handle returned by [`FlagStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchId(u64);

/// Callback invoked with the key and the new value (`None` when removed).
pub type FlagCallback = Box<dyn FnMut(&str, Option<&str>)>;

/// Key/value store backing game progress.
pub trait FlagStore {
    fn get(&self, key: &str) -> Option<String>;

    /// Store a raw value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn set(&mut self, key: &str, value: &str) -> Result<(), FlagError>;

    /// # Errors
    ///
    /// Returns an error if the backend rejects the removal.
    fn remove(&mut self, key: &str) -> Result<(), FlagError>;

    /// Register a callback fired after `key` changes through this store.
    fn subscribe(&mut self, key: &str, callback: FlagCallback) -> WatchId;

    fn unsubscribe(&mut self, id: WatchId) -> bool;

    /// `true` only when the stored value is exactly `"true"`.
    fn get_bool(&self, key: &str) -> bool {
        self.get(key).as_deref() == Some("true")
    }

    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn set_bool(&mut self, key: &str, value: bool) -> Result<(), FlagError> {
        self.set(key, if value { "true" } else { "false" })
    }
}

/// Subscriber bookkeeping shared by store implementations.
#[derive(Default)]
pub struct FlagWatchers {
    next_id: u64,
    entries: Vec<(WatchId, String, FlagCallback)>,
}

impl FlagWatchers {
    pub fn subscribe(&mut self, key: &str, callback: FlagCallback) -> WatchId {
        self.next_id += 1;
        let id = WatchId(self.next_id);
        self.entries.push((id, key.to_string(), callback));
        id
    }

    pub fn unsubscribe(&mut self, id: WatchId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _, _)| *entry != id);
        self.entries.len() != before
    }

    pub fn notify(&mut self, key: &str, value: Option<&str>) {
        for (_, watched, callback) in &mut self.entries {
            if watched == key {
                callback(key, value);
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for FlagWatchers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlagWatchers")
            .field("subscriptions", &self.entries.len())
            .finish()
    }
}

/// In-memory store used by native builds, the tester and unit tests.
#[derive(Debug, Default)]
pub struct MemoryFlagStore {
    values: BTreeMap<String, String>,
    watchers: FlagWatchers,
}

impl MemoryFlagStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with raw key/value pairs.
    #[must_use]
    pub fn with_flags<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
            watchers: FlagWatchers::default(),
        }
    }

    /// Copy of every stored value, sorted by key.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.values.clone()
    }
}

impl FlagStore for MemoryFlagStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), FlagError> {
        self.values.insert(key.to_string(), value.to_string());
        self.watchers.notify(key, Some(value));
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), FlagError> {
        if self.values.remove(key).is_some() {
            self.watchers.notify(key, None);
        }
        Ok(())
    }

    fn subscribe(&mut self, key: &str, callback: FlagCallback) -> WatchId {
        self.watchers.subscribe(key, callback)
    }

    fn unsubscribe(&mut self, id: WatchId) -> bool {
        self.watchers.unsubscribe(id)
    }
}

/// Flag key recording that `item` is held, e.g. `inventory_rustykey`.
///
/// Only ASCII letters, digits and underscores survive, lowercased.
#[must_use]
pub fn inventory_key(item: &str) -> String {
    let cleaned: String = item
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect::<String>()
        .to_ascii_lowercase();
    format!("inventory_{cleaned}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn bools_are_string_encoded() {
        let mut store = MemoryFlagStore::new();
        assert!(!store.get_bool("door_open"));
        store.set_bool("door_open", true).unwrap();
        assert_eq!(store.get("door_open").as_deref(), Some("true"));
        assert!(store.get_bool("door_open"));
        store.set("door_open", "yes").unwrap();
        assert!(!store.get_bool("door_open"));
    }

    #[test]
    fn watchers_fire_for_their_key_only() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = MemoryFlagStore::new();
        let sink = Rc::clone(&seen);
        let id = store.subscribe(
            "phone_ringing",
            Box::new(move |key, value| {
                sink.borrow_mut()
                    .push(format!("{key}={}", value.unwrap_or("<removed>")));
            }),
        );
        store.set_bool("phone_ringing", true).unwrap();
        store.set_bool("other", true).unwrap();
        store.remove("phone_ringing").unwrap();
        assert!(store.unsubscribe(id));
        store.set_bool("phone_ringing", true).unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![
                "phone_ringing=true".to_string(),
                "phone_ringing=<removed>".to_string()
            ]
        );
    }

    #[test]
    fn inventory_keys_strip_punctuation() {
        assert_eq!(inventory_key("Rusty Key"), "inventory_rustykey");
        assert_eq!(inventory_key("Sophie's Napkin"), "inventory_sophiesnapkin");
        assert_eq!(inventory_key("ID_badge"), "inventory_id_badge");
    }
}
