use std::fs;
use std::path::PathBuf;

use chrono::{Local, LocalResult, TimeZone};
use serde::{Deserialize, Serialize};

pub(crate) const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];
pub(crate) const VIDEO_EXTENSIONS: &[&str] = &["mp4", "3gp", "mkv", "webm", "avi"];
pub(crate) const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "m4a", "aac", "flac"];
pub(crate) const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "rtf", "csv", "json", "xml",
    "html", "js", "css", "java", "kt", "py", "c", "cpp", "h", "cs", "php", "rb", "go", "swift",
    "sh", "bat", "ps1", "ini", "cfg", "conf", "md", "prop", "gradle", "pro", "sql",
];
pub(crate) const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "rar", "7z", "tar", "gz"];

/// Category reported by the index store for a row.
///
/// Unrecognized store categories decode to `Other`; the row is still
/// returned with a generic locator rather than dropped.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    Image,
    Video,
    Audio,
    Other,
}

impl MediaCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaCategory::Image => "image",
            MediaCategory::Video => "video",
            MediaCategory::Audio => "audio",
            MediaCategory::Other => "other",
        }
    }

    pub fn parse(value: &str) -> MediaCategory {
        match value {
            "image" => MediaCategory::Image,
            "video" => MediaCategory::Video,
            "audio" => MediaCategory::Audio,
            _ => MediaCategory::Other,
        }
    }
}

/// File category derived from the file name extension.
///
/// Used by the type filter during the fallback filesystem scan and for
/// grouping co-located files by kind.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Image,
    Video,
    Audio,
    Document,
    Archive,
    Other,
}

impl FileCategory {
    pub fn of(file_name: &str) -> FileCategory {
        // A leading dot is a hidden-file marker, not an extension separator.
        let ext = match file_name.rfind('.') {
            Some(i) if i > 0 => file_name[i + 1..].to_ascii_lowercase(),
            _ => String::new(),
        };
        let ext = ext.as_str();
        if IMAGE_EXTENSIONS.contains(&ext) {
            FileCategory::Image
        } else if VIDEO_EXTENSIONS.contains(&ext) {
            FileCategory::Video
        } else if AUDIO_EXTENSIONS.contains(&ext) {
            FileCategory::Audio
        } else if DOCUMENT_EXTENSIONS.contains(&ext) {
            FileCategory::Document
        } else if ARCHIVE_EXTENSIONS.contains(&ext) {
            FileCategory::Archive
        } else {
            FileCategory::Other
        }
    }
}

/// User-facing type filter applied to a query.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    #[default]
    All,
    Images,
    Videos,
    Documents,
    Archives,
    Other,
}

impl TypeFilter {
    /// Extension-based match used when no store category is available.
    pub fn matches_name(&self, file_name: &str) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Images => FileCategory::of(file_name) == FileCategory::Image,
            TypeFilter::Videos => FileCategory::of(file_name) == FileCategory::Video,
            TypeFilter::Documents => FileCategory::of(file_name) == FileCategory::Document,
            TypeFilter::Archives => FileCategory::of(file_name) == FileCategory::Archive,
            TypeFilter::Other => !matches!(
                FileCategory::of(file_name),
                FileCategory::Image
                    | FileCategory::Video
                    | FileCategory::Document
                    | FileCategory::Archive
            ),
        }
    }
}

/// Structured filter produced by the query parser.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct QueryFilter {
    /// Inclusive epoch-second bounds on last-modified time.
    pub date_range: Option<(i64, i64)>,
    /// Case-insensitive substring match against the full path.
    pub folder: Option<String>,
    pub type_filter: TypeFilter,
}

/// Opaque content locator for a search result.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// Row in the index store.
    Indexed { id: i64, category: MediaCategory },
    /// File found by the fallback filesystem scan.
    Direct(PathBuf),
}

/// A single file matched by a query.
///
/// `last_modified_ms` is the authoritative sort and grouping key.
/// Results start excluded; the user must explicitly toggle a result before
/// it takes part in any destructive action.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SearchResult {
    pub locator: Locator,
    pub path: Option<PathBuf>,
    pub display_name: String,
    pub last_modified_ms: i64,
    pub included: bool,
}

impl SearchResult {
    /// Result backed by a file found on disk.
    pub fn direct(path: PathBuf, display_name: String, last_modified_ms: i64) -> SearchResult {
        SearchResult {
            locator: Locator::Direct(path.clone()),
            path: Some(path),
            display_name,
            last_modified_ms,
            included: false,
        }
    }

    /// Calendar-day label used for grouping, e.g. "January 15, 2023".
    pub fn day_label(&self) -> String {
        match Local.timestamp_millis_opt(self.last_modified_ms) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => {
                dt.format("%B %-d, %Y").to_string()
            }
            LocalResult::None => String::from("Unknown date"),
        }
    }
}

/// Grouping row for one calendar day.
///
/// `checked` is derived from the run of items below the header. It is never
/// authoritative: item-level state always wins on the next recompute.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DateHeader {
    pub label: String,
    pub checked: bool,
}

impl DateHeader {
    pub fn new(label: String) -> DateHeader {
        DateHeader {
            label,
            checked: false,
        }
    }
}

/// One entry of the display list.
///
/// Invariant: every header is immediately followed by at least one item
/// before the next header or end of list. Pruning restores this after
/// removals.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum DisplayEntry {
    Header(DateHeader),
    Item(SearchResult),
}

impl DisplayEntry {
    pub fn as_item(&self) -> Option<&SearchResult> {
        match self {
            DisplayEntry::Item(result) => Some(result),
            DisplayEntry::Header(_) => None,
        }
    }

    pub fn is_header(&self) -> bool {
        matches!(self, DisplayEntry::Header(_))
    }
}

/// Aggregate details for a set of results (the "details" readout).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct SelectionSummary {
    pub count: usize,
    /// Total size of the resolvable files; unresolvable or vanished files
    /// contribute zero bytes but still count.
    pub total_bytes: u64,
}

impl SelectionSummary {
    pub fn for_results(results: &[SearchResult]) -> SelectionSummary {
        let mut summary = SelectionSummary::default();
        for result in results {
            summary.count += 1;
            if let Some(path) = &result.path {
                if let Ok(meta) = fs::metadata(path) {
                    summary.total_bytes += meta.len();
                }
            }
        }
        summary
    }
}
