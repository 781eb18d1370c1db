//! Per-query session state.
//!
//! One `SearchSession` owns the display list and all selection state for
//! one query execution; running a new query replaces its contents wholesale.
//! All mutation happens through the session on the coordinating thread;
//! background workers hand results over instead of touching it directly.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use crate::error::EngineError;
use crate::models::{DisplayEntry, SearchResult, SelectionSummary};
use crate::search::grouper::group_results;

#[derive(Default)]
pub struct SearchSession {
    entries: Vec<DisplayEntry>,
    /// Set while a destructive batch runs; selection mutation is refused
    /// until it clears.
    busy: bool,
}

impl SearchSession {
    pub fn new() -> SearchSession {
        SearchSession::default()
    }

    /// Replace the display list with freshly grouped results. The previous
    /// list and all its selection state are discarded.
    pub fn replace_results(&mut self, flat: Vec<SearchResult>) {
        self.entries = group_results(flat);
    }

    pub fn entries(&self) -> &[DisplayEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Currently included results, in display order.
    pub fn selected(&self) -> Vec<SearchResult> {
        self.entries
            .iter()
            .filter_map(DisplayEntry::as_item)
            .filter(|item| item.included)
            .cloned()
            .collect()
    }

    pub fn selection_summary(&self) -> SelectionSummary {
        SelectionSummary::for_results(&self.selected())
    }

    /// Flip one item's inclusion flag and rederive the owning header.
    ///
    /// Identity is display-list position, not structural equality: items
    /// mutate in place, so two entries may compare equal while being
    /// distinct rows. Indices pointing at a header or past the end are
    /// ignored.
    pub fn toggle_item(&mut self, index: usize) -> Result<(), EngineError> {
        self.check_not_busy()?;
        match self.entries.get_mut(index) {
            Some(DisplayEntry::Item(item)) => item.included = !item.included,
            _ => return Ok(()),
        }
        if let Some(header_index) = self.owning_header(index) {
            self.recompute_header(header_index);
        }
        Ok(())
    }

    /// Check or uncheck a whole header run. Header state written here is
    /// still only derived: any later item toggle recomputes it from the
    /// items, which always win.
    pub fn set_header(&mut self, index: usize, checked: bool) -> Result<(), EngineError> {
        self.check_not_busy()?;
        if !matches!(self.entries.get(index), Some(DisplayEntry::Header(_))) {
            return Ok(());
        }
        let (start, end) = self.run_bounds(index);
        for entry in &mut self.entries[start..end] {
            if let DisplayEntry::Item(item) = entry {
                item.included = checked;
            }
        }
        if let Some(DisplayEntry::Header(header)) = self.entries.get_mut(index) {
            header.checked = checked;
        }
        Ok(())
    }

    /// Remove every item whose path is in `paths`, then prune headers left
    /// without a following item.
    pub fn remove_by_paths(&mut self, paths: &[PathBuf]) {
        let removed: FxHashSet<&Path> = paths.iter().map(PathBuf::as_path).collect();
        self.entries.retain(|entry| match entry {
            DisplayEntry::Item(item) => item
                .path
                .as_deref()
                .map_or(true, |p| !removed.contains(p)),
            DisplayEntry::Header(_) => true,
        });
        self.prune_headers();
    }

    /// Mark the session busy for the duration of a destructive batch.
    pub fn begin_operation(&mut self) -> Result<(), EngineError> {
        if self.busy {
            return Err(EngineError::OperationInProgress);
        }
        self.busy = true;
        Ok(())
    }

    pub fn finish_operation(&mut self) {
        self.busy = false;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    fn check_not_busy(&self) -> Result<(), EngineError> {
        if self.busy {
            Err(EngineError::OperationInProgress)
        } else {
            Ok(())
        }
    }

    /// Index of the header owning the item at `item_index`.
    fn owning_header(&self, item_index: usize) -> Option<usize> {
        self.entries[..item_index]
            .iter()
            .rposition(DisplayEntry::is_header)
    }

    /// Item range of a header's run: `(header_index + 1, first index past
    /// the run)`.
    fn run_bounds(&self, header_index: usize) -> (usize, usize) {
        let start = header_index + 1;
        let end = self.entries[start..]
            .iter()
            .position(DisplayEntry::is_header)
            .map(|offset| start + offset)
            .unwrap_or(self.entries.len());
        (start, end)
    }

    /// Rederive `checked` as AND over the run. An empty run is vacuously
    /// checked.
    fn recompute_header(&mut self, header_index: usize) {
        let (start, end) = self.run_bounds(header_index);
        let all_included = self.entries[start..end]
            .iter()
            .filter_map(DisplayEntry::as_item)
            .all(|item| item.included);
        if let Some(DisplayEntry::Header(header)) = self.entries.get_mut(header_index) {
            header.checked = all_included;
        }
    }

    /// Drop headers not immediately followed by an item (emptied runs and
    /// header-adjacent-to-header states after removals).
    fn prune_headers(&mut self) {
        let entries = std::mem::take(&mut self.entries);
        let mut pruned = Vec::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if entry.is_header()
                && !matches!(entries.get(i + 1), Some(DisplayEntry::Item(_)))
            {
                continue;
            }
            pruned.push(entry.clone());
        }
        self.entries = pruned;
    }
}
