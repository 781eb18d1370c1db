//! Capture-burst sibling detection.
//!
//! Cameras write several files per capture event under one timestamped base
//! name, e.g. `IMG_20230115_143022.jpg` plus `IMG_20230115_143022.mp4` for a
//! paired motion clip. Destructive actions expand each selected file into
//! its burst group so companions are not left behind.

use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use rustc_hash::FxHashSet;

use crate::models::{DisplayEntry, FileCategory, Locator, SearchResult};

/// Capture-device prefix followed by an 8-digit date and 6-digit time.
fn burst_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(IMG|VID|PANO|DSC)_\d{8}_\d{6}").expect("burst pattern is valid")
    })
}

/// The burst base name of a file, if its name follows a capture-device
/// convention.
pub fn burst_base_name(file_name: &str) -> Option<&str> {
    burst_pattern().find(file_name).map(|m| m.as_str())
}

/// Expand one target into its burst group among the displayed results.
///
/// Siblings share the target's parent directory and start with its burst
/// base name. A target without a resolvable path, or whose name does not
/// match the burst convention, yields just itself.
pub fn find_siblings(target: &SearchResult, entries: &[DisplayEntry]) -> Vec<SearchResult> {
    let mut siblings = vec![target.clone()];
    let Some(path) = &target.path else {
        return siblings;
    };
    let Some(base) = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(burst_base_name)
    else {
        return siblings;
    };
    let Some(parent) = path.parent() else {
        return siblings;
    };

    for entry in entries {
        let Some(other) = entry.as_item() else {
            continue;
        };
        let Some(other_path) = &other.path else {
            continue;
        };
        if other_path == path || other_path.parent() != Some(parent) {
            continue;
        }
        let name_matches = other_path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(base));
        if name_matches {
            siblings.push(other.clone());
        }
    }
    siblings
}

/// Union of the burst groups of every selected target, deduplicated.
///
/// The returned set is what a destructive action will operate on; compare
/// its length against `selected.len()` to warn the user about scope growth.
pub fn expand_selection(
    selected: &[SearchResult],
    entries: &[DisplayEntry],
) -> Vec<SearchResult> {
    let mut seen: FxHashSet<Locator> = FxHashSet::default();
    let mut expanded = Vec::new();
    for target in selected {
        for sibling in find_siblings(target, entries) {
            if seen.insert(sibling.locator.clone()) {
                expanded.push(sibling);
            }
        }
    }
    expanded
}

/// Displayed files sharing the target's parent directory and file category,
/// sorted by path. Used to build viewer playlists around a file.
pub fn co_located_by_category(
    target: &SearchResult,
    entries: &[DisplayEntry],
) -> Vec<PathBuf> {
    let Some(path) = &target.path else {
        return Vec::new();
    };
    let Some(parent) = path.parent() else {
        return vec![path.clone()];
    };
    let category = FileCategory::of(&target.display_name);

    let mut paths: Vec<PathBuf> = entries
        .iter()
        .filter_map(DisplayEntry::as_item)
        .filter_map(|item| item.path.clone())
        .filter(|p| p.parent() == Some(parent))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| FileCategory::of(n) == category)
        })
        .collect();
    paths.sort();
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    fn displayed(names: &[&str]) -> Vec<DisplayEntry> {
        names
            .iter()
            .map(|name| {
                DisplayEntry::Item(SearchResult::direct(
                    PathBuf::from(format!("/dcim/Camera/{name}")),
                    (*name).to_string(),
                    0,
                ))
            })
            .collect()
    }

    fn item(entries: &[DisplayEntry], index: usize) -> &SearchResult {
        entries[index].as_item().expect("item entry")
    }

    #[test]
    fn test_burst_base_name() {
        assert_eq!(
            burst_base_name("IMG_20230115_143022.jpg"),
            Some("IMG_20230115_143022")
        );
        assert_eq!(
            burst_base_name("VID_20230115_143022_edit.mp4"),
            Some("VID_20230115_143022")
        );
        assert_eq!(burst_base_name("IMG_2023_14.jpg"), None);
        assert_eq!(burst_base_name("holiday.jpg"), None);
    }

    #[test]
    fn test_paired_motion_video_is_a_sibling() {
        let entries = displayed(&[
            "IMG_20230115_143022.jpg",
            "IMG_20230115_143022.mp4",
            "IMG_20230116_090000.jpg",
        ]);
        let siblings = find_siblings(item(&entries, 0), &entries);
        let names: Vec<_> = siblings.iter().map(|s| s.display_name.clone()).collect();
        assert_eq!(
            names,
            vec![
                "IMG_20230115_143022.jpg".to_string(),
                "IMG_20230115_143022.mp4".to_string()
            ]
        );
    }

    #[test]
    fn test_non_matching_name_is_a_singleton() {
        let entries = displayed(&["holiday.jpg", "holiday.mp4"]);
        let siblings = find_siblings(item(&entries, 0), &entries);
        assert_eq!(siblings.len(), 1);
        assert_eq!(siblings[0].display_name, "holiday.jpg");
    }

    #[test]
    fn test_sibling_must_share_parent_directory() {
        let mut entries = displayed(&["IMG_20230115_143022.jpg"]);
        entries.push(DisplayEntry::Item(SearchResult::direct(
            PathBuf::from("/dcim/Other/IMG_20230115_143022.mp4"),
            "IMG_20230115_143022.mp4".into(),
            0,
        )));
        let siblings = find_siblings(item(&entries, 0), &entries);
        assert_eq!(siblings.len(), 1);
    }

    #[test]
    fn test_expand_selection_dedupes_shared_siblings() {
        let entries = displayed(&[
            "IMG_20230115_143022.jpg",
            "IMG_20230115_143022.mp4",
        ]);
        // Selecting both members of the pair must not double-count either.
        let selected = vec![item(&entries, 0).clone(), item(&entries, 1).clone()];
        let expanded = expand_selection(&selected, &entries);
        assert_eq!(expanded.len(), 2);
    }

    #[test]
    fn test_pathless_target_is_singleton() {
        let entries = displayed(&["IMG_20230115_143022.jpg"]);
        let mut target = item(&entries, 0).clone();
        target.path = None;
        let siblings = find_siblings(&target, &entries);
        assert_eq!(siblings.len(), 1);
    }

    #[test]
    fn test_co_located_by_category_keeps_kind_and_sorts() {
        let entries = displayed(&[
            "IMG_20230115_143022.jpg",
            "IMG_20230115_143022.mp4",
            "beach.jpg",
        ]);
        let paths = co_located_by_category(item(&entries, 0), &entries);
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/dcim/Camera/IMG_20230115_143022.jpg"),
                PathBuf::from("/dcim/Camera/beach.jpg"),
            ]
        );
    }
}
