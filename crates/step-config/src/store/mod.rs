//! External stores consulted by resource references
//!
//! Two collaborators sit behind traits so the engine never touches a
//! concrete backend: a [`SecretStore`] holding named secrets and a
//! [`SharedEnvironment`] holding values earlier steps published. Both come
//! in an in-memory flavour and a directory-backed flavour.

mod directory;
mod memory;

pub use directory::{DirectoryEnvironment, DirectorySecretStore};
pub use memory::{MemoryEnvironment, MemorySecretStore};

use serde_json::Value;

use crate::Result;

/// Outcome of one store lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// The entry exists. An empty value is still a hit.
    Found(T),
    /// The store answered and has no such entry
    NotFound,
    /// The store could not be asked
    Unavailable(String),
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    /// The found value, discarding the reason for a miss.
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound | Lookup::Unavailable(_) => None,
        }
    }
}

/// Named secrets, e.g. a vault or a credentials directory.
pub trait SecretStore: Send + Sync {
    fn lookup(&self, name: &str) -> Lookup<String>;
}

/// Values shared between the steps of one pipeline run, addressed by
/// slash-separated paths such as `github/owner`.
pub trait SharedEnvironment: Send + Sync {
    fn lookup(&self, path: &str) -> Lookup<Value>;

    /// Publish a value for later steps, replacing any previous value.
    fn write(&self, path: &str, value: &Value) -> Result<()>;
}

/// Split a store path into its segments, rejecting anything that could
/// escape the store root.
pub(crate) fn path_segments(path: &str) -> Option<Vec<&str>> {
    let segments: Vec<&str> = path.split('/').collect();
    let valid = segments.iter().all(|s| {
        !s.is_empty() && *s != "." && *s != ".." && !s.contains('\\') && !s.contains(':')
    });
    valid.then_some(segments)
}
