//! Destructive file operations
//!
//! The engine never performs privileged deletion or hiding itself; it
//! marshals path lists across the narrow trait boundaries defined here.
//! Only the recycle move is executed in-crate.

pub mod delete;
pub mod recycle;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::EngineError;

pub use delete::{BulkAction, DeletionOrchestrator, DeletionPlan, Outcome, PendingAction, Submission};
pub use recycle::{RecycleBin, RecycleReport};

/// Completion callback invoked with the number of files actually deleted.
pub type CompletionCallback = Box<dyn FnOnce(usize) + Send>;

/// Privileged delete execution boundary. Deletion happens asynchronously on
/// the implementor's side; the count of deleted files comes back through the
/// callback.
pub trait DeleteExecutor: Send + Sync {
    fn delete(&self, paths: Vec<PathBuf>, on_complete: CompletionCallback);
}

/// External hide capability. The engine only hands over the path list.
pub trait HideExecutor: Send + Sync {
    fn hide(&self, paths: Vec<PathBuf>) -> Result<(), EngineError>;
}

/// Access broker for protected (removable or otherwise volume-scoped)
/// storage.
///
/// When a path requires a grant the holder of the grant also performs the
/// source removal during a copy-then-delete move, since plain unlinking is
/// what the protection prevents.
pub trait VolumeAccess: Send + Sync {
    /// Does this path live on a volume needing an explicit access grant?
    fn requires_grant(&self, path: &Path) -> bool;

    /// Has the user granted access to the protected volume?
    fn has_grant(&self) -> bool;

    /// Remove a file using whatever scoped access the volume demands.
    fn remove(&self, path: &Path) -> Result<(), EngineError>;
}

/// Default broker: everything is primary storage, nothing is protected.
pub struct PrimaryVolume;

impl VolumeAccess for PrimaryVolume {
    fn requires_grant(&self, _path: &Path) -> bool {
        false
    }

    fn has_grant(&self) -> bool {
        true
    }

    fn remove(&self, path: &Path) -> Result<(), EngineError> {
        fs::remove_file(path)?;
        Ok(())
    }
}
