//! Durable storage for the genre mapping.

use super::mapping::GenreMapping;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Key-value store holding the whole [`GenreMapping`] document.
///
/// The mapping is read at the start of a resolution batch and overwritten in
/// full at the end. Callers must not run overlapping batches against the same
/// store.
pub trait GenreStore: Send + Sync {
    fn load(&self) -> Result<GenreMapping>;
    fn save(&self, mapping: &GenreMapping) -> Result<()>;
}

/// Stores the mapping as a pretty-printed JSON object on disk.
pub struct JsonFileGenreStore {
    path: PathBuf,
}

impl JsonFileGenreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl GenreStore for JsonFileGenreStore {
    /// A missing or unreadable cache file yields an empty mapping; it is
    /// replaced on the next save.
    fn load(&self) -> Result<GenreMapping> {
        if !self.path.exists() {
            debug!("No genre cache at {}, starting empty", self.path.display());
            return Ok(GenreMapping::new());
        }

        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read genre cache {}", self.path.display()))?;

        match serde_json::from_str(&contents) {
            Ok(mapping) => Ok(mapping),
            Err(e) => {
                warn!(
                    "Ignoring corrupt genre cache {}: {}",
                    self.path.display(),
                    e
                );
                Ok(GenreMapping::new())
            }
        }
    }

    fn save(&self, mapping: &GenreMapping) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;

        let json = serde_json::to_string_pretty(mapping)?;

        // Write next to the target and rename over it, so readers never see a
        // half-written file.
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)
            .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
        tmp.write_all(json.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to write genre cache {}", self.path.display()))?;

        debug!(
            "Saved {} genre entries to {}",
            mapping.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// In-memory store, mostly for tests and one-off runs.
#[derive(Default)]
pub struct MemoryGenreStore {
    mapping: Mutex<GenreMapping>,
    saves: Mutex<usize>,
}

impl MemoryGenreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mapping(mapping: GenreMapping) -> Self {
        Self {
            mapping: Mutex::new(mapping),
            saves: Mutex::new(0),
        }
    }

    /// Number of times `save` has been called.
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> GenreMapping {
        self.mapping
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl GenreStore for MemoryGenreStore {
    fn load(&self) -> Result<GenreMapping> {
        Ok(self.snapshot())
    }

    fn save(&self, mapping: &GenreMapping) -> Result<()> {
        *self.mapping.lock().unwrap_or_else(|e| e.into_inner()) = mapping.clone();
        *self.saves.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        Ok(())
    }
}
