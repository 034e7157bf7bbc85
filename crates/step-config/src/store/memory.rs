//! In-memory stores

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{Lookup, SecretStore, SharedEnvironment};
use crate::{Error, Result};

/// Secret store backed by a map.
///
/// Can be switched to unreachable to model a store that is down.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    entries: RwLock<BTreeMap<String, String>>,
    unreachable: AtomicBool,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&self, name: impl Into<String>, value: impl Into<String>) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(name.into(), value.into());
        }
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }
}

impl SecretStore for MemorySecretStore {
    fn lookup(&self, name: &str) -> Lookup<String> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Lookup::Unavailable("secret store is unreachable".to_string());
        }
        match self.entries.read() {
            Ok(entries) => entries
                .get(name)
                .cloned()
                .map_or(Lookup::NotFound, Lookup::Found),
            Err(_) => Lookup::Unavailable("secret store lock poisoned".to_string()),
        }
    }
}

/// Shared environment backed by a map.
#[derive(Debug, Default)]
pub struct MemoryEnvironment {
    fields: RwLock<BTreeMap<String, Value>>,
}

impl MemoryEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(self, path: impl Into<String>, value: Value) -> Self {
        if let Ok(mut fields) = self.fields.write() {
            fields.insert(path.into(), value);
        }
        self
    }

    /// Snapshot of every field.
    pub fn fields(&self) -> BTreeMap<String, Value> {
        self.fields.read().map(|f| f.clone()).unwrap_or_default()
    }
}

impl SharedEnvironment for MemoryEnvironment {
    fn lookup(&self, path: &str) -> Lookup<Value> {
        match self.fields.read() {
            Ok(fields) => fields
                .get(path)
                .cloned()
                .map_or(Lookup::NotFound, Lookup::Found),
            Err(_) => Lookup::Unavailable("environment lock poisoned".to_string()),
        }
    }

    fn write(&self, path: &str, value: &Value) -> Result<()> {
        if super::path_segments(path).is_none() {
            return Err(Error::SharedEnvironmentWrite {
                path: path.to_string(),
                message: "invalid field path".to_string(),
            });
        }
        let mut fields = self.fields.write().map_err(|_| Error::SharedEnvironmentWrite {
            path: path.to_string(),
            message: "environment lock poisoned".to_string(),
        })?;
        fields.insert(path.to_string(), value.clone());
        Ok(())
    }
}
