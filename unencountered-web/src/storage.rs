//! Flag persistence in `window.localStorage`.
//!
//! Every flag lives under [`KEY_PREFIX`] so the game never touches, or clears,
//! storage owned by anything else on the page.

use thiserror::Error;
use unencountered_engine::FlagError;

pub const KEY_PREFIX: &str = "unencountered.flags.";

#[must_use]
pub fn storage_key(flag: &str) -> String {
    format!("{KEY_PREFIX}{flag}")
}

/// Flag name for a namespaced storage key, or `None` for foreign keys.
#[must_use]
pub fn flag_name(storage_key: &str) -> Option<&str> {
    storage_key.strip_prefix(KEY_PREFIX)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WebStorageError {
    #[error("localStorage is unavailable")]
    Unavailable,
    #[error("Storage error: {0}")]
    Storage(String),
}

impl WebStorageError {
    #[must_use]
    pub fn for_key(self, key: &str) -> FlagError {
        match self {
            Self::Unavailable => FlagError::Unavailable(key.to_string()),
            Self::Storage(reason) => FlagError::Write {
                key: key.to_string(),
                reason,
            },
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::LocalStorageFlags;

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::{WebStorageError, flag_name, storage_key};
    use crate::dom;
    use unencountered_engine::flags::{FlagCallback, FlagWatchers};
    use unencountered_engine::{FlagError, FlagStore, WatchId};
    use web_sys::Storage;

    /// [`FlagStore`] backed by `window.localStorage`.
    pub struct LocalStorageFlags {
        storage: Storage,
        watchers: FlagWatchers,
    }

    impl LocalStorageFlags {
        /// # Errors
        ///
        /// Returns an error if the page has no usable `localStorage` (private mode,
        /// sandboxed iframes).
        pub fn open() -> Result<Self, WebStorageError> {
            let storage = dom::local_storage().ok_or(WebStorageError::Unavailable)?;
            Ok(Self {
                storage,
                watchers: FlagWatchers::default(),
            })
        }

        /// Every stored flag name.
        ///
        /// # Errors
        ///
        /// Returns an error if storage cannot be enumerated.
        pub fn keys(&self) -> Result<Vec<String>, WebStorageError> {
            let len = self.storage.length().map_err(storage_error)?;
            let mut keys = Vec::new();
            for index in 0..len {
                if let Some(key) = self.storage.key(index).map_err(storage_error)?
                    && let Some(name) = flag_name(&key)
                {
                    keys.push(name.to_string());
                }
            }
            Ok(keys)
        }

        /// Remove every flag, leaving other storage untouched.
        ///
        /// # Errors
        ///
        /// Returns an error if a key cannot be enumerated or removed.
        pub fn clear(&mut self) -> Result<(), WebStorageError> {
            for name in self.keys()? {
                self.storage
                    .remove_item(&storage_key(&name))
                    .map_err(storage_error)?;
                self.watchers.notify(&name, None);
            }
            Ok(())
        }
    }

    fn storage_error(err: wasm_bindgen::JsValue) -> WebStorageError {
        WebStorageError::Storage(dom::js_error_message(&err))
    }

    impl FlagStore for LocalStorageFlags {
        fn get(&self, key: &str) -> Option<String> {
            self.storage.get_item(&storage_key(key)).ok().flatten()
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), FlagError> {
            self.storage
                .set_item(&storage_key(key), value)
                .map_err(|err| storage_error(err).for_key(key))?;
            self.watchers.notify(key, Some(value));
            Ok(())
        }

        fn remove(&mut self, key: &str) -> Result<(), FlagError> {
            self.storage
                .remove_item(&storage_key(key))
                .map_err(|err| storage_error(err).for_key(key))?;
            self.watchers.notify(key, None);
            Ok(())
        }

        fn subscribe(&mut self, key: &str, callback: FlagCallback) -> WatchId {
            self.watchers.subscribe(key, callback)
        }

        fn unsubscribe(&mut self, id: WatchId) -> bool {
            self.watchers.unsubscribe(id)
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced() {
        assert_eq!(storage_key("inventory_key"), "unencountered.flags.inventory_key");
        assert_eq!(flag_name("unencountered.flags.phase1_ready"), Some("phase1_ready"));
        assert_eq!(flag_name("other.app.setting"), None);
    }

    #[test]
    fn storage_errors_map_to_flag_errors() {
        assert_eq!(
            WebStorageError::Storage("QuotaExceededError".to_string()).for_key("notes"),
            FlagError::Write {
                key: "notes".to_string(),
                reason: "QuotaExceededError".to_string(),
            }
        );
        assert_eq!(
            WebStorageError::Unavailable.for_key("notes"),
            FlagError::Unavailable("notes".to_string())
        );
    }
}
