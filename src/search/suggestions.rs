//! Folder-name autocompletion.
//!
//! Suggestion lookups run on independent per-keystroke threads, so several
//! can be in flight at once. Each lookup is stamped with a monotonically
//! increasing sequence number and delivered through [`LatestSuggestions`],
//! which only accepts fresher stamps. A slow, stale lookup can therefore
//! never overwrite a newer suggestion list.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::search::store::IndexStore;

/// Last-writer-wins holder for the current suggestion list.
pub struct LatestSuggestions {
    inner: Mutex<(u64, Vec<String>)>,
}

impl LatestSuggestions {
    pub fn new() -> LatestSuggestions {
        LatestSuggestions {
            inner: Mutex::new((0, Vec::new())),
        }
    }

    /// Install `list` if `seq` is fresher than what is already held.
    /// Returns false when the publication was stale and dropped.
    pub fn publish(&self, seq: u64, list: Vec<String>) -> bool {
        let Ok(mut inner) = self.inner.lock() else {
            return false;
        };
        if seq <= inner.0 {
            return false;
        }
        *inner = (seq, list);
        true
    }

    pub fn current(&self) -> Vec<String> {
        self.inner
            .lock()
            .map(|inner| inner.1.clone())
            .unwrap_or_default()
    }
}

impl Default for LatestSuggestions {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns background folder-name lookups against the index store.
pub struct FolderSuggester {
    store: Arc<dyn IndexStore>,
    seq: AtomicU64,
}

impl FolderSuggester {
    pub fn new(store: Arc<dyn IndexStore>) -> FolderSuggester {
        FolderSuggester {
            store,
            seq: AtomicU64::new(0),
        }
    }

    /// The word being completed is everything after the last space.
    fn completion_prefix(input: &str) -> &str {
        match input.rfind(' ') {
            Some(idx) => &input[idx + 1..],
            None => input,
        }
    }

    /// Launch one lookup for the current input. The result lands in `sink`
    /// unless a fresher lookup got there first. Returns the sequence number
    /// assigned to this lookup.
    pub fn request(&self, input: &str, sink: Arc<LatestSuggestions>) -> u64 {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let prefix = Self::completion_prefix(input).to_string();
        let store = Arc::clone(&self.store);
        thread::spawn(move || {
            let names = match store.folder_names(&prefix) {
                Ok(names) => names,
                Err(e) => {
                    log::warn!("folder suggestion lookup failed: {e}");
                    Vec::new()
                }
            };
            sink.publish(seq, names);
        });
        seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::models::QueryFilter;
    use crate::search::store::IndexRow;

    struct FixedStore(Vec<String>);

    impl IndexStore for FixedStore {
        fn query_page(
            &self,
            _filter: &QueryFilter,
            _offset: usize,
            _limit: usize,
        ) -> Result<Vec<IndexRow>, EngineError> {
            Ok(Vec::new())
        }

        fn folder_names(&self, prefix: &str) -> Result<Vec<String>, EngineError> {
            Ok(self
                .0
                .iter()
                .filter(|n| n.to_lowercase().starts_with(&prefix.to_lowercase()))
                .cloned()
                .collect())
        }
    }

    #[test]
    fn test_stale_publication_is_dropped() {
        let sink = LatestSuggestions::new();
        assert!(sink.publish(2, vec!["fresh".into()]));
        assert!(!sink.publish(1, vec!["stale".into()]));
        assert_eq!(sink.current(), vec!["fresh".to_string()]);
    }

    #[test]
    fn test_fresher_publication_replaces() {
        let sink = LatestSuggestions::new();
        assert!(sink.publish(1, vec!["old".into()]));
        assert!(sink.publish(2, vec!["new".into()]));
        assert_eq!(sink.current(), vec!["new".to_string()]);
    }

    #[test]
    fn test_completion_prefix_is_last_word() {
        assert_eq!(FolderSuggester::completion_prefix("today cam"), "cam");
        assert_eq!(FolderSuggester::completion_prefix("cam"), "cam");
        assert_eq!(FolderSuggester::completion_prefix("today "), "");
    }

    #[test]
    fn test_request_delivers_matching_names() {
        let store = Arc::new(FixedStore(vec!["Camera".into(), "Download".into()]));
        let suggester = FolderSuggester::new(store);
        let sink = Arc::new(LatestSuggestions::new());

        suggester.request("today cam", Arc::clone(&sink));

        // The lookup runs on its own thread; poll briefly.
        for _ in 0..50 {
            if !sink.current().is_empty() {
                break;
            }
            thread::sleep(std::time::Duration::from_millis(10));
        }
        assert_eq!(sink.current(), vec!["Camera".to_string()]);
    }
}
