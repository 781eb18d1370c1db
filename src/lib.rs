//! Local file search and selection engine.
//!
//! Turns free-text queries like "3 days ago camera" into structured filters,
//! executes them against a metadata index with a deep filesystem scan as the
//! fallback, groups the results under calendar-day headers, and orchestrates
//! selection-driven recycle, delete and hide operations with capture-burst
//! sibling expansion.

pub mod background;
pub mod error;
pub mod models;
pub mod ops;
pub mod search;
pub mod session;
pub mod siblings;

pub use background::{QueryOutcome, SearchWorker};
pub use error::{EngineError, MoveFailure};
pub use models::{
    DateHeader, DisplayEntry, FileCategory, Locator, MediaCategory, QueryFilter, SearchResult,
    SelectionSummary, TypeFilter,
};
pub use ops::{
    BulkAction, DeleteExecutor, DeletionOrchestrator, DeletionPlan, HideExecutor, Outcome,
    PendingAction, PrimaryVolume, RecycleBin, RecycleReport, Submission, VolumeAccess,
};
pub use search::{
    parse_query, FallbackScanner, FolderSuggester, IndexStore, LatestSuggestions,
    SearchCoordinator, SqliteIndexStore,
};
pub use session::SearchSession;
