//! Destructive action orchestration.
//!
//! A [`DeletionPlan`] captures what a destructive action will touch: the
//! explicitly selected results expanded through their burst siblings. The
//! orchestrator gates the plan on volume permission, then runs one of the
//! three terminal strategies with per-file accounting.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::error::EngineError;
use crate::models::SearchResult;
use crate::ops::recycle::{RecycleBin, RecycleReport};
use crate::ops::{DeleteExecutor, HideExecutor, VolumeAccess};
use crate::session::SearchSession;
use crate::siblings;

/// The three terminal strategies over a resolved target set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BulkAction {
    PermanentDelete,
    Recycle,
    Hide,
}

/// Resolved target set plus the counts needed for the confirmation prompt.
#[derive(Debug, Clone)]
pub struct DeletionPlan {
    pub targets: Vec<SearchResult>,
    /// Results the user explicitly included.
    pub selected_count: usize,
    /// Size of the sibling-expanded working set.
    pub expanded_count: usize,
}

impl DeletionPlan {
    /// Build a plan from the session's current selection, unioning in the
    /// burst siblings of every selected target.
    pub fn build(session: &SearchSession) -> DeletionPlan {
        let selected = session.selected();
        let targets = siblings::expand_selection(&selected, session.entries());
        DeletionPlan {
            selected_count: selected.len(),
            expanded_count: targets.len(),
            targets,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// How many companions the sibling expansion pulled in.
    pub fn sibling_growth(&self) -> usize {
        self.expanded_count - self.selected_count
    }
}

/// Terminal result of a submitted action.
#[derive(Debug)]
pub enum Outcome {
    /// Paths were handed to the privileged deleter; the deleted count
    /// arrives later through the completion listener.
    DeleteStarted { submitted: usize, unresolved: usize },
    Recycled(RecycleReport),
    Hidden { hidden: usize, unresolved: usize },
}

/// What happened to a submission.
#[derive(Debug)]
pub enum Submission {
    /// Benign no-op: the plan had no targets.
    NothingSelected,
    /// A protected volume needs a grant first; the action is parked as a
    /// continuation.
    AwaitingGrant(PendingAction),
    Done(Outcome),
}

/// A destructive action deferred on a volume permission grant.
///
/// `resume` re-runs the whole action once the grant is in place; `abort`
/// drops it atomically with nothing committed.
#[derive(Debug)]
pub struct PendingAction {
    plan: DeletionPlan,
    action: BulkAction,
}

impl PendingAction {
    pub fn plan(&self) -> &DeletionPlan {
        &self.plan
    }

    pub fn action(&self) -> BulkAction {
        self.action
    }

    pub fn resume(self, orchestrator: &DeletionOrchestrator) -> Result<Outcome, EngineError> {
        if !orchestrator.volumes.has_grant() {
            return Err(EngineError::PermissionDeclined);
        }
        orchestrator.run(self.plan, self.action)
    }

    pub fn abort(self) {
        log::info!(
            "aborting pending {:?} of {} file(s), nothing was committed",
            self.action,
            self.plan.expanded_count
        );
    }
}

pub struct DeletionOrchestrator {
    recycle: RecycleBin,
    volumes: Arc<dyn VolumeAccess>,
    deleter: Arc<dyn DeleteExecutor>,
    hider: Arc<dyn HideExecutor>,
    on_delete_complete: Arc<dyn Fn(usize) + Send + Sync>,
}

impl DeletionOrchestrator {
    pub fn new(
        recycle: RecycleBin,
        volumes: Arc<dyn VolumeAccess>,
        deleter: Arc<dyn DeleteExecutor>,
        hider: Arc<dyn HideExecutor>,
        on_delete_complete: Arc<dyn Fn(usize) + Send + Sync>,
    ) -> DeletionOrchestrator {
        DeletionOrchestrator {
            recycle,
            volumes,
            deleter,
            hider,
            on_delete_complete,
        }
    }

    /// Submit a plan for execution. An empty plan is a benign no-op; a plan
    /// touching an ungranted protected volume comes back as a pending
    /// continuation instead of running partially.
    pub fn submit(
        &self,
        plan: DeletionPlan,
        action: BulkAction,
    ) -> Result<Submission, EngineError> {
        if plan.is_empty() {
            return Ok(Submission::NothingSelected);
        }
        if self.needs_grant(&plan) && !self.volumes.has_grant() {
            log::info!(
                "{:?} deferred: protected volume requires an access grant",
                action
            );
            return Ok(Submission::AwaitingGrant(PendingAction { plan, action }));
        }
        self.run(plan, action).map(Submission::Done)
    }

    fn needs_grant(&self, plan: &DeletionPlan) -> bool {
        plan.targets
            .iter()
            .filter_map(|t| t.path.as_deref())
            .any(|path| self.volumes.requires_grant(path))
    }

    fn run(&self, plan: DeletionPlan, action: BulkAction) -> Result<Outcome, EngineError> {
        match action {
            BulkAction::PermanentDelete => Ok(self.permanent_delete(&plan)),
            BulkAction::Recycle => {
                let report = self.recycle.move_batch(&plan.targets, self.volumes.as_ref())?;
                Ok(Outcome::Recycled(report))
            }
            BulkAction::Hide => self.hide(&plan),
        }
    }

    /// Marshal the resolvable paths to the privileged deleter. Targets
    /// without a path are counted under "could not resolve".
    fn permanent_delete(&self, plan: &DeletionPlan) -> Outcome {
        let (paths, unresolved) = resolve_paths(&plan.targets);
        let submitted = paths.len();
        if submitted > 0 {
            let listener = Arc::clone(&self.on_delete_complete);
            self.deleter
                .delete(paths, Box::new(move |count| listener(count)));
        }
        Outcome::DeleteStarted {
            submitted,
            unresolved,
        }
    }

    fn hide(&self, plan: &DeletionPlan) -> Result<Outcome, EngineError> {
        let (paths, unresolved) = resolve_paths(&plan.targets);
        let hidden = paths.len();
        if hidden > 0 {
            self.hider.hide(paths)?;
        }
        Ok(Outcome::Hidden { hidden, unresolved })
    }
}

fn resolve_paths(targets: &[SearchResult]) -> (Vec<PathBuf>, usize) {
    let mut paths = Vec::with_capacity(targets.len());
    let mut unresolved = 0;
    for target in targets {
        match &target.path {
            Some(path) => paths.push(path.clone()),
            None => unresolved += 1,
        }
    }
    (paths, unresolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::ops::{CompletionCallback, PrimaryVolume};

    #[derive(Default)]
    struct RecordingDeleter {
        received: Mutex<Vec<PathBuf>>,
    }

    impl DeleteExecutor for RecordingDeleter {
        fn delete(&self, paths: Vec<PathBuf>, on_complete: CompletionCallback) {
            let count = paths.len();
            self.received.lock().unwrap().extend(paths);
            on_complete(count);
        }
    }

    #[derive(Default)]
    struct RecordingHider {
        received: Mutex<Vec<PathBuf>>,
    }

    impl HideExecutor for RecordingHider {
        fn hide(&self, paths: Vec<PathBuf>) -> Result<(), EngineError> {
            self.received.lock().unwrap().extend(paths);
            Ok(())
        }
    }

    /// Protected volume whose grant state is fixed at construction.
    struct GatedVolume {
        granted: bool,
    }

    impl VolumeAccess for GatedVolume {
        fn requires_grant(&self, _path: &Path) -> bool {
            true
        }

        fn has_grant(&self) -> bool {
            self.granted
        }

        fn remove(&self, path: &Path) -> Result<(), EngineError> {
            std::fs::remove_file(path)?;
            Ok(())
        }
    }

    struct Fixture {
        orchestrator: DeletionOrchestrator,
        deleter: Arc<RecordingDeleter>,
        hider: Arc<RecordingHider>,
        completions: Arc<AtomicUsize>,
        _tmp: tempfile::TempDir,
    }

    fn fixture_with_volumes(volumes: Arc<dyn VolumeAccess>) -> Fixture {
        let tmp = tempfile::tempdir().unwrap();
        let deleter = Arc::new(RecordingDeleter::default());
        let hider = Arc::new(RecordingHider::default());
        let completions = Arc::new(AtomicUsize::new(0));
        let completions_out = Arc::clone(&completions);
        let orchestrator = DeletionOrchestrator::new(
            RecycleBin::new(tmp.path().join("bin")),
            volumes,
            deleter.clone(),
            hider.clone(),
            Arc::new(move |count| {
                completions_out.fetch_add(count, Ordering::SeqCst);
            }),
        );
        Fixture {
            orchestrator,
            deleter,
            hider,
            completions,
            _tmp: tmp,
        }
    }

    fn fixture() -> Fixture {
        fixture_with_volumes(Arc::new(PrimaryVolume))
    }

    fn plan_of(paths: &[&str]) -> DeletionPlan {
        let targets: Vec<SearchResult> = paths
            .iter()
            .map(|p| {
                SearchResult::direct(
                    PathBuf::from(p),
                    Path::new(p).file_name().unwrap().to_string_lossy().to_string(),
                    0,
                )
            })
            .collect();
        DeletionPlan {
            selected_count: targets.len(),
            expanded_count: targets.len(),
            targets,
        }
    }

    #[test]
    fn test_empty_plan_is_a_benign_no_op() {
        let f = fixture();
        let submission = f
            .orchestrator
            .submit(plan_of(&[]), BulkAction::PermanentDelete)
            .unwrap();
        assert!(matches!(submission, Submission::NothingSelected));
        assert!(f.deleter.received.lock().unwrap().is_empty());
    }

    #[test]
    fn test_permanent_delete_marshals_paths_and_reports_count() {
        let f = fixture();
        let mut plan = plan_of(&["/files/a.jpg", "/files/b.jpg"]);
        plan.targets.push(SearchResult {
            path: None,
            ..plan.targets[0].clone()
        });
        plan.expanded_count = 3;

        let submission = f
            .orchestrator
            .submit(plan, BulkAction::PermanentDelete)
            .unwrap();
        match submission {
            Submission::Done(Outcome::DeleteStarted {
                submitted,
                unresolved,
            }) => {
                assert_eq!(submitted, 2);
                assert_eq!(unresolved, 1);
            }
            other => panic!("unexpected submission: {other:?}"),
        }
        assert_eq!(f.deleter.received.lock().unwrap().len(), 2);
        assert_eq!(f.completions.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_hide_marshals_paths() {
        let f = fixture();
        let submission = f
            .orchestrator
            .submit(plan_of(&["/files/a.jpg"]), BulkAction::Hide)
            .unwrap();
        assert!(matches!(
            submission,
            Submission::Done(Outcome::Hidden {
                hidden: 1,
                unresolved: 0
            })
        ));
        assert_eq!(f.hider.received.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_ungranted_protected_volume_defers_the_action() {
        let f = fixture_with_volumes(Arc::new(GatedVolume { granted: false }));
        let submission = f
            .orchestrator
            .submit(plan_of(&["/sdcard/a.jpg"]), BulkAction::Recycle)
            .unwrap();
        let pending = match submission {
            Submission::AwaitingGrant(pending) => pending,
            other => panic!("expected pending action, got {other:?}"),
        };
        assert_eq!(pending.plan().expanded_count, 1);
        assert_eq!(pending.action(), BulkAction::Recycle);

        // Declined grant: abort commits nothing.
        pending.abort();
        assert!(f.deleter.received.lock().unwrap().is_empty());
    }

    #[test]
    fn test_resume_without_grant_is_refused() {
        let f = fixture_with_volumes(Arc::new(GatedVolume { granted: false }));
        let submission = f
            .orchestrator
            .submit(plan_of(&["/sdcard/a.jpg"]), BulkAction::Hide)
            .unwrap();
        let pending = match submission {
            Submission::AwaitingGrant(pending) => pending,
            other => panic!("expected pending action, got {other:?}"),
        };
        assert!(matches!(
            pending.resume(&f.orchestrator),
            Err(EngineError::PermissionDeclined)
        ));
    }

    #[test]
    fn test_recycled_paths_drop_out_of_the_session() {
        let f = fixture();
        let dir = f._tmp.path().to_path_buf();
        let mut results = Vec::new();
        for name in ["x.jpg", "y.jpg"] {
            let path = dir.join(name);
            std::fs::write(&path, b"data").unwrap();
            results.push(SearchResult::direct(
                path,
                name.to_string(),
                10 * 86_400_000 + 43_200_000,
            ));
        }
        let mut session = SearchSession::new();
        session.replace_results(results);
        session.set_header(0, true).unwrap();

        // Full batch lifecycle: busy gate on, plan, recycle, prune, gate off.
        session.begin_operation().unwrap();
        let plan = DeletionPlan::build(&session);
        assert_eq!(plan.selected_count, 2);
        let submission = f.orchestrator.submit(plan, BulkAction::Recycle).unwrap();
        let report = match submission {
            Submission::Done(Outcome::Recycled(report)) => report,
            other => panic!("unexpected submission: {other:?}"),
        };
        session.remove_by_paths(&report.moved);
        session.finish_operation();

        assert_eq!(report.succeeded(), 2);
        // Both items and their emptied header are gone.
        assert!(session.is_empty());
        assert!(!session.is_busy());
    }

    #[test]
    fn test_recycle_runs_once_grant_is_held() {
        let f = fixture_with_volumes(Arc::new(GatedVolume { granted: true }));
        let dir = f._tmp.path().to_path_buf();
        let src = dir.join("on_card.jpg");
        std::fs::write(&src, b"data").unwrap();

        let submission = f
            .orchestrator
            .submit(plan_of(&[src.to_str().unwrap()]), BulkAction::Recycle)
            .unwrap();
        match submission {
            Submission::Done(Outcome::Recycled(report)) => {
                assert_eq!(report.succeeded(), 1);
                assert_eq!(report.attempted, 1);
            }
            other => panic!("unexpected submission: {other:?}"),
        }
        assert!(!src.exists());
        assert!(dir.join("bin").join("on_card.jpg").exists());
    }
}
