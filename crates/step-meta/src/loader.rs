//! Loader for step metadata files
//!
//! Metadata documents live in a directory, one YAML file per step:
//!
//! ```text
//! resources/metadata/
//!   githubCreateIssue.yaml
//!   helmExecute.yaml
//! ```

use std::fs;
use std::path::Path;

use crate::schema::StepMetadata;
use crate::{Error, Result};

/// Loads step metadata documents from disk
#[derive(Debug, Default, Clone, Copy)]
pub struct MetadataLoader;

impl MetadataLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load and validate a single metadata file.
    pub fn load_file(&self, path: &Path) -> Result<StepMetadata> {
        let content = step_fs::io::read_text(path)?;
        StepMetadata::from_yaml(&content, &path.display().to_string())
    }

    /// Load every `*.yaml` / `*.yml` metadata file in `dir`.
    ///
    /// A missing directory yields an empty list. Files that fail to parse or
    /// validate are logged and skipped so one broken step does not hide the
    /// others.
    pub fn load_dir(&self, dir: &Path) -> Result<Vec<StepMetadata>> {
        let mut steps = Vec::new();

        if !dir.is_dir() {
            return Ok(steps);
        }

        let entries = fs::read_dir(dir).map_err(|e| Error::Fs(step_fs::Error::io(dir, e)))?;

        let mut paths: Vec<_> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .is_some_and(|ext| ext == "yaml" || ext == "yml")
            })
            .collect();
        paths.sort();

        for path in paths {
            match self.load_file(&path) {
                Ok(metadata) => steps.push(metadata),
                Err(e) => {
                    tracing::warn!("Failed to load step metadata {:?}: {}", path, e);
                }
            }
        }

        Ok(steps)
    }
}
