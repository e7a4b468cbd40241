// In-memory value mirrored into a key-value slot

use eyre::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::kv::KvStore;

/// Holds a value of type `T` and writes it back to `key` on every change
///
/// The in-memory value is the source of truth for the running process. A failed
/// write is returned to the caller but the new value is kept; the slot simply
/// lags behind until the next successful write.
#[derive(Debug)]
pub struct PersistedStore<T, S> {
    backend: S,
    key: String,
    value: T,
}

impl<T, S> PersistedStore<T, S>
where
    T: Serialize + DeserializeOwned,
    S: KvStore,
{
    /// Load the value stored under `key`, or fall back to `default`
    ///
    /// Missing, unreadable and undecodable slots all yield `default`.
    pub fn new(backend: S, key: impl Into<String>, default: T) -> Self {
        let key = key.into();

        let value = match backend.read(&key) {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(value) => {
                    debug!(key = %key, bytes = bytes.len(), "Loaded persisted value");
                    value
                }
                Err(e) => {
                    warn!(key = %key, error = ?e, "Failed to parse stored value, using default");
                    default
                }
            },
            Ok(None) => {
                debug!(key = %key, "No stored value, using default");
                default
            }
            Err(e) => {
                warn!(key = %key, error = ?e, "Failed to read stored value, using default");
                default
            }
        };

        Self { backend, key, value }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Replace the value and write it through
    pub fn set(&mut self, value: T) -> Result<()> {
        self.value = value;
        self.persist()
    }

    /// Mutate the value in place and write it through
    pub fn update<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        let out = f(&mut self.value);
        self.persist()?;
        Ok(out)
    }

    /// Write the current value to the slot
    pub fn persist(&mut self) -> Result<()> {
        let bytes = serde_json::to_vec(&self.value).context("Failed to serialize value")?;
        self.backend
            .write(&self.key, &bytes)
            .wrap_err_with(|| format!("Failed to persist {}", self.key))
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}
