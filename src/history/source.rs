//! Discovery and loading of exported history files.

use super::models::SourceDocument;
use super::normalizer::{normalize_documents, NormalizedHistory};
use rayon::prelude::*;
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// File names produced by the music streaming-history export.
pub const HISTORY_FILE_PATTERN: &str = r"^StreamingHistory_music.*\.json$";

/// Trailing part number of an export file, e.g. `10` in `..._music_10.json`.
const FILE_INDEX_PATTERN: &str = r"(\d+)\.json$";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Invalid history file pattern: {0}")]
    Pattern(#[from] regex::Error),
}

fn file_index(path: &Path, index_pattern: &Regex) -> Option<u64> {
    let name = path.file_name()?.to_str()?;
    index_pattern.captures(name)?.get(1)?.as_str().parse().ok()
}

/// Recursively find history files under `dir`.
///
/// Files are ordered by directory, then by their numeric part, so `_2.json`
/// comes before `_10.json`.
pub fn find_history_files(dir: &Path) -> Result<Vec<PathBuf>, SourceError> {
    if !dir.exists() {
        return Err(SourceError::PathNotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(SourceError::NotADirectory(dir.to_path_buf()));
    }

    let pattern = Regex::new(HISTORY_FILE_PATTERN)?;
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Error accessing entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| pattern.is_match(name));
        if matches {
            files.push(entry.into_path());
        }
    }

    let index_pattern = Regex::new(FILE_INDEX_PATTERN)?;
    files.sort_by_cached_key(|path| {
        (
            path.parent().map(Path::to_path_buf),
            file_index(path, &index_pattern),
            path.clone(),
        )
    });
    debug!("Found {} history files under {}", files.len(), dir.display());
    Ok(files)
}

/// Read files in parallel. Unreadable files are logged and left out; the
/// remaining documents keep the order of `paths`.
pub fn read_documents(paths: &[PathBuf]) -> Vec<SourceDocument> {
    paths
        .par_iter()
        .filter_map(|path| match std::fs::read_to_string(path) {
            Ok(contents) => Some(SourceDocument::new(path.display().to_string(), contents)),
            Err(e) => {
                warn!("Could not read {}: {}", path.display(), e);
                None
            }
        })
        .collect()
}

/// Discover, read and normalize every history file under `dir`.
pub fn load_history_dir(dir: &Path) -> Result<NormalizedHistory, SourceError> {
    let paths = find_history_files(dir)?;
    let documents = read_documents(&paths);
    let history = normalize_documents(&documents);

    info!(
        "Loaded {} play events from {} files ({} documents skipped, {} records skipped)",
        history.events.len(),
        documents.len(),
        history.documents_skipped,
        history.records_skipped
    );
    Ok(history)
}
