//! Two-phase search execution.
//!
//! The primary phase pages through the index store; the fallback phase walks
//! the filesystem directly, but only when the store returned nothing at all.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::EngineError;
use crate::models::SearchResult;
use crate::models::{Locator, QueryFilter};
use crate::search::fallback::FallbackScanner;
use crate::search::store::{IndexRow, IndexStore};

/// Rows fetched per index store page. Bounds peak cursor memory while the
/// concatenated pages still form one complete descending list.
pub const PAGE_SIZE: usize = 2000;

pub struct SearchCoordinator {
    store: Arc<dyn IndexStore>,
    scanner: FallbackScanner,
}

impl SearchCoordinator {
    pub fn new(store: Arc<dyn IndexStore>, scanner: FallbackScanner) -> SearchCoordinator {
        SearchCoordinator { store, scanner }
    }

    /// Run a query to completion: paged index lookup first, filesystem scan
    /// only if the index produced zero rows.
    pub fn execute(&self, filter: &QueryFilter) -> Result<Vec<SearchResult>, EngineError> {
        let primary = self.query_index(filter)?;
        if !primary.is_empty() {
            return Ok(primary);
        }
        log::info!("index store found nothing, starting deep filesystem scan");
        Ok(self.scanner.scan(filter))
    }

    /// Sequential pagination: request fixed-size pages until one comes back
    /// short or empty. Pages arrive already sorted descending, so the
    /// concatenation is the complete result list.
    fn query_index(&self, filter: &QueryFilter) -> Result<Vec<SearchResult>, EngineError> {
        let mut results = Vec::new();
        let mut offset = 0;
        loop {
            let page = self.store.query_page(filter, offset, PAGE_SIZE)?;
            let fetched = page.len();
            results.extend(page.into_iter().map(result_from_row));
            if fetched < PAGE_SIZE {
                break;
            }
            offset += PAGE_SIZE;
        }
        Ok(results)
    }
}

fn result_from_row(row: IndexRow) -> SearchResult {
    SearchResult {
        locator: Locator::Indexed {
            id: row.id,
            category: row.category,
        },
        path: row.path.map(PathBuf::from),
        display_name: row.display_name,
        last_modified_ms: row.modified_secs * 1000,
        included: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaCategory;
    use crate::search::store::SqliteIndexStore;
    use std::fs;

    fn coordinator_with_rows(row_count: usize) -> (SearchCoordinator, tempfile::TempDir) {
        let store = SqliteIndexStore::open_in_memory().unwrap();
        for i in 0..row_count {
            store
                .insert(
                    MediaCategory::Image,
                    (row_count - i) as i64,
                    &format!("IMG_{i:05}.jpg"),
                    Some(&format!("/dcim/IMG_{i:05}.jpg")),
                )
                .unwrap();
        }
        let tmp = tempfile::tempdir().unwrap();
        let coordinator = SearchCoordinator::new(
            Arc::new(store),
            FallbackScanner::new(vec![tmp.path().to_path_buf()]),
        );
        (coordinator, tmp)
    }

    #[test]
    fn test_multiple_pages_concatenate_without_gaps() {
        let (coordinator, _tmp) = coordinator_with_rows(4500);
        let results = coordinator.execute(&QueryFilter::default()).unwrap();
        assert_eq!(results.len(), 4500);

        // Descending and gap-free: the seeded timestamps are 4500..=1.
        assert!(results
            .windows(2)
            .all(|w| w[0].last_modified_ms >= w[1].last_modified_ms));
        let mut ids: Vec<i64> = results
            .iter()
            .map(|r| match r.locator {
                Locator::Indexed { id, .. } => id,
                Locator::Direct(_) => panic!("expected indexed results"),
            })
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4500);
    }

    #[test]
    fn test_exact_page_boundary_terminates() {
        let (coordinator, _tmp) = coordinator_with_rows(PAGE_SIZE);
        let results = coordinator.execute(&QueryFilter::default()).unwrap();
        assert_eq!(results.len(), PAGE_SIZE);
    }

    #[test]
    fn test_fallback_runs_only_when_index_is_empty() {
        let store = SqliteIndexStore::open_in_memory().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("found.txt"), b"x").unwrap();
        let coordinator = SearchCoordinator::new(
            Arc::new(store),
            FallbackScanner::new(vec![tmp.path().to_path_buf()]),
        );

        let results = coordinator.execute(&QueryFilter::default()).unwrap();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0].locator, Locator::Direct(_)));
    }
}
