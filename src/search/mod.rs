//! Search pipeline
//!
//! This module turns free text into displayed results:
//! - Query parsing (date expressions, volume hints, folder words)
//! - Paged index store retrieval with a filesystem-scan fallback
//! - Date grouping of the flat result list
//! - Folder-name autocompletion with last-writer-wins delivery

pub mod coordinator;
pub mod fallback;
pub mod grouper;
pub mod query_parser;
pub mod store;
pub mod suggestions;

pub use coordinator::{SearchCoordinator, PAGE_SIZE};
pub use fallback::FallbackScanner;
pub use grouper::{flatten, group_results};
pub use query_parser::{parse_query, parse_query_at};
pub use store::{IndexRow, IndexStore, SqliteIndexStore};
pub use suggestions::{FolderSuggester, LatestSuggestions};
