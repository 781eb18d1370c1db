//! Recycle-bin moves.
//!
//! The recycle bin is one flat directory; origin subdirectories are not
//! mirrored. Moves are collision-safe and failure-safe: a name clash gets a
//! timestamp disambiguator instead of an overwrite, and a move can never
//! leave both a duplicate and the original, nor silently lose the original.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;

use crate::error::{EngineError, MoveFailure};
use crate::models::SearchResult;
use crate::ops::VolumeAccess;

/// Outcome of one recycle batch. The user-visible result is always the
/// exact succeeded-vs-attempted pair.
#[derive(Debug, Clone, Serialize, Default)]
pub struct RecycleReport {
    pub attempted: usize,
    /// Files renamed with a disambiguator because of a name collision.
    pub renamed: usize,
    /// Source paths successfully moved, used to drop them from the display
    /// list afterwards.
    pub moved: Vec<PathBuf>,
    /// Per-file failures, keyed by path (or display name when the path
    /// could not be resolved).
    pub failures: Vec<(String, MoveFailure)>,
}

impl RecycleReport {
    pub fn succeeded(&self) -> usize {
        self.moved.len()
    }
}

pub struct RecycleBin {
    dir: PathBuf,
}

impl RecycleBin {
    pub fn new(dir: PathBuf) -> RecycleBin {
        RecycleBin { dir }
    }

    /// Flat recycle directory under the user's primary storage.
    pub fn default_location() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("FilesiftRecycleBin")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Failing to create the recycle directory is structural: the whole
    /// batch aborts with zero files processed.
    fn ensure(&self) -> Result<(), EngineError> {
        fs::create_dir_all(&self.dir).map_err(|source| EngineError::RecycleDirUnavailable {
            path: self.dir.clone(),
            source,
        })
    }

    /// Move every target into the recycle bin, one file at a time.
    ///
    /// The batch is not cancellable mid-flight: each per-file move runs to
    /// completion and is recorded independently, so the report is exact even
    /// if the caller loses interest.
    pub fn move_batch(
        &self,
        targets: &[SearchResult],
        volumes: &dyn VolumeAccess,
    ) -> Result<RecycleReport, EngineError> {
        self.ensure()?;

        let mut report = RecycleReport {
            attempted: targets.len(),
            ..Default::default()
        };
        for target in targets {
            let Some(source) = &target.path else {
                report
                    .failures
                    .push((target.display_name.clone(), MoveFailure::UnresolvedPath));
                continue;
            };
            match self.move_one(source, volumes) {
                Ok(renamed) => {
                    if renamed {
                        report.renamed += 1;
                    }
                    report.moved.push(source.clone());
                }
                Err(failure) => {
                    log::warn!(
                        "failed to move {} to recycle bin: {failure:?}",
                        source.display()
                    );
                    report
                        .failures
                        .push((source.display().to_string(), failure));
                }
            }
        }
        Ok(report)
    }

    fn move_one(&self, source: &Path, volumes: &dyn VolumeAccess) -> Result<bool, MoveFailure> {
        if !source.exists() {
            return Err(MoveFailure::SourceMissing);
        }
        let dest = self.destination_for(source);
        let renamed = dest.file_name() != source.file_name();

        if volumes.requires_grant(source) {
            copy_verify_delete(source, &dest, volumes)?;
        } else {
            // Same logical volume: atomic rename. A cross-device rename
            // error falls through to the copy path.
            if fs::rename(source, &dest).is_err() {
                copy_verify_delete(source, &dest, volumes)?;
            }
        }
        Ok(renamed)
    }

    /// Destination inside the flat recycle directory. A name collision gets
    /// a millisecond timestamp inserted before the extension; nothing is
    /// ever overwritten. Several collisions within one millisecond get an
    /// extra counter suffix, so same-named files recycled back to back each
    /// land under a distinct name.
    fn destination_for(&self, source: &Path) -> PathBuf {
        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| String::from("recycled"));
        let dest = self.dir.join(&file_name);
        if !dest.exists() {
            return dest;
        }

        let (stem, ext) = match file_name.rfind('.') {
            Some(i) if i > 0 => (&file_name[..i], &file_name[i..]),
            _ => (file_name.as_str(), ""),
        };
        let stamp = Utc::now().timestamp_millis();
        let mut candidate = self.dir.join(format!("{stem}_{stamp}{ext}"));
        let mut attempt = 1;
        while candidate.exists() {
            candidate = self.dir.join(format!("{stem}_{stamp}_{attempt}{ext}"));
            attempt += 1;
        }
        candidate
    }
}

/// Copy the source to the destination, verify the copy by length, then
/// remove the source through the volume broker. If the source removal
/// fails, the destination copy is deleted and the original stays
/// authoritative.
fn copy_verify_delete(
    source: &Path,
    dest: &Path,
    volumes: &dyn VolumeAccess,
) -> Result<(), MoveFailure> {
    if let Err(e) = fs::copy(source, dest) {
        let _ = fs::remove_file(dest);
        return Err(MoveFailure::CopyFailed(e.to_string()));
    }

    let lengths = (
        fs::metadata(source).map(|m| m.len()),
        fs::metadata(dest).map(|m| m.len()),
    );
    match lengths {
        (Ok(src_len), Ok(dst_len)) if src_len == dst_len => {}
        _ => {
            let _ = fs::remove_file(dest);
            return Err(MoveFailure::CopyFailed(String::from(
                "destination size mismatch after copy",
            )));
        }
    }

    if let Err(e) = volumes.remove(source) {
        let _ = fs::remove_file(dest);
        return Err(MoveFailure::SourceDeleteFailed(e.to_string()));
    }
    Ok(())
}
