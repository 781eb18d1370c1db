use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Errors that abort an operation outright.
///
/// Per-file trouble during a bulk move is not an `EngineError`; it is
/// recorded as a [`MoveFailure`] in the batch report and the batch keeps
/// going. Only structural problems (the store is broken, the recycle
/// directory cannot be created, a batch is already running) surface here.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("index store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("index store lock poisoned")]
    StorePoisoned,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("recycle directory {path} could not be created: {source}")]
    RecycleDirUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("a bulk file operation is already in progress")]
    OperationInProgress,

    #[error("volume permission was declined")]
    PermissionDeclined,
}

/// Why a single file could not be moved to the recycle bin.
///
/// These are recovered locally: the file is counted as failed and the rest
/// of the batch continues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MoveFailure {
    /// The result carries no usable filesystem path.
    UnresolvedPath,
    /// The source file disappeared before the move.
    SourceMissing,
    /// Copying to the recycle bin failed; nothing was committed.
    CopyFailed(String),
    /// The copy succeeded but the source could not be removed. The partial
    /// destination copy has been deleted and the original is untouched.
    SourceDeleteFailed(String),
}
