//! Fallback filesystem scan.
//!
//! When the index store yields nothing, the engine walks a fixed set of
//! well-known roots directly. The walk produces no store ordering, so the
//! results are sorted descending by modification time before they are
//! returned.

use std::cmp::Reverse;
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::models::{QueryFilter, SearchResult};

/// Recursive scanner over a fixed set of storage roots.
pub struct FallbackScanner {
    roots: Vec<PathBuf>,
}

impl FallbackScanner {
    pub fn new(roots: Vec<PathBuf>) -> FallbackScanner {
        FallbackScanner { roots }
    }

    /// The common user media and download directories plus removable-media
    /// mount points, when the platform exposes them.
    pub fn with_default_roots() -> FallbackScanner {
        let mut roots = Vec::new();
        for dir in [
            dirs::download_dir(),
            dirs::picture_dir(),
            dirs::video_dir(),
            dirs::audio_dir(),
            dirs::document_dir(),
        ]
        .into_iter()
        .flatten()
        {
            roots.push(dir);
        }

        #[cfg(unix)]
        for mount in ["/media", "/run/media", "/mnt"] {
            roots.push(PathBuf::from(mount));
        }

        FallbackScanner::new(roots)
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Walk every root and apply the folder, date, and type filters.
    pub fn scan(&self, filter: &QueryFilter) -> Vec<SearchResult> {
        let folder_lower = filter.folder.as_ref().map(|f| f.to_lowercase());

        let mut candidates: Vec<(PathBuf, String, i64)> = Vec::new();
        for root in &self.roots {
            if !root.is_dir() {
                // Missing roots are expected (unmounted cards, absent app
                // folders); skip quietly.
                log::debug!("skipping absent scan root {}", root.display());
                continue;
            }
            for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
                if !entry.file_type().is_file() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy().to_string();
                let Some(modified_ms) = entry
                    .metadata()
                    .ok()
                    .and_then(|m| m.modified().ok())
                    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                    .map(|d| d.as_millis() as i64)
                else {
                    continue;
                };
                candidates.push((entry.into_path(), name, modified_ms));
            }
        }

        let mut results: Vec<SearchResult> = candidates
            .into_par_iter()
            .filter_map(|(path, name, modified_ms)| {
                if let Some(folder) = &folder_lower {
                    if !path.to_string_lossy().to_lowercase().contains(folder) {
                        return None;
                    }
                }
                if let Some((start, end)) = filter.date_range {
                    if modified_ms < start * 1000 || modified_ms > (end + 1) * 1000 - 1 {
                        return None;
                    }
                }
                if !filter.type_filter.matches_name(&name) {
                    return None;
                }
                Some(SearchResult::direct(path, name, modified_ms))
            })
            .collect();

        results.sort_by_key(|r| Reverse(r.last_modified_ms));
        results
    }
}
