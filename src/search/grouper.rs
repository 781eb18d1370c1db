//! Grouping of flat, time-ordered results under calendar-day headers.

use crate::models::{DateHeader, DisplayEntry, SearchResult};

/// Single forward pass: emit a header whenever the day label changes, then
/// the item itself. Input ordering is preserved exactly; empty input yields
/// an empty list.
pub fn group_results(flat: Vec<SearchResult>) -> Vec<DisplayEntry> {
    let mut grouped = Vec::with_capacity(flat.len());
    let mut current_label = String::new();
    for result in flat {
        let label = result.day_label();
        if label != current_label {
            current_label.clone_from(&label);
            grouped.push(DisplayEntry::Header(DateHeader::new(label)));
        }
        grouped.push(DisplayEntry::Item(result));
    }
    grouped
}

/// Drop the headers, keeping items in display order.
pub fn flatten(entries: &[DisplayEntry]) -> Vec<SearchResult> {
    entries
        .iter()
        .filter_map(|entry| entry.as_item().cloned())
        .collect()
}
