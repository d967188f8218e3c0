//! Run lifecycle: plan, check free space, copy, record history.
//!
//! An [`Orchestrator`] owns a single run slot and a one-thread worker pool.
//! At most one run occupies the slot; [`Orchestrator::start_run`] rejects new
//! requests while it is taken instead of queueing them. The slot is released
//! only after the run's history entry has been appended, and before the final
//! `Completed` event is published, so a caller reacting to that event may
//! immediately start another run.
//!
//! A panic inside the run, including one raised by the caller's notifier, is
//! recorded as a failed run.

use super::execute::{self, CancelToken, ExecutionResult};
use super::history::{self, HistoryLog};
use super::plan;
use super::space::{SystemVolume, VolumeSpace};
use crate::models::{CopyAction, Progress, RunEvent, RunOutcome, RunState};
use crate::source::RemoteFileSource;
use crate::{Error, Result};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// Callback receiving every event of a run, invoked on the worker thread.
pub type EventNotifier = Arc<dyn Fn(&RunEvent) + Send + Sync>;

/// Identifies one started run; pass it to [`Orchestrator::cancel_run`].
#[derive(Debug, Clone)]
pub struct RunHandle {
    id: u64,
    cancel: CancelToken,
}

impl RunHandle {
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Default)]
struct Slot {
    state: RunState,
    run_id: u64,
}

#[derive(Debug, Default)]
struct Shared {
    slot: Mutex<Slot>,
    idle: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, run_id: u64, state: RunState) {
        let mut slot = self.lock();
        if slot.run_id == run_id && slot.state.is_active() {
            log::debug!("Run {run_id}: {} -> {state}", slot.state);
            slot.state = state;
        }
    }

    fn release(&self, run_id: u64) {
        let mut slot = self.lock();
        if slot.run_id == run_id && slot.state.is_active() {
            slot.state = RunState::Idle;
            self.idle.notify_all();
        }
    }
}

/// Returns the slot to idle even if the run unwinds.
struct SlotGuard {
    shared: Arc<Shared>,
    run_id: u64,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.shared.release(self.run_id);
    }
}

/// Everything one background run needs, moved onto the worker.
struct RunJob {
    run_id: u64,
    source: Arc<dyn RemoteFileSource>,
    source_root: String,
    destination_root: PathBuf,
    notifier: EventNotifier,
    cancel: CancelToken,
    shared: Arc<Shared>,
    history: HistoryLog,
    space: Arc<dyn VolumeSpace>,
}

impl RunJob {
    fn emit(&self, event: RunEvent) {
        (self.notifier)(&event);
    }

    fn status(&self, message: impl Into<String>) {
        self.emit(RunEvent::Status(message.into()));
    }

    fn run(self) {
        let guard = SlotGuard {
            shared: Arc::clone(&self.shared),
            run_id: self.run_id,
        };

        let mut progress: Option<Progress> = None;
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.drive(&mut progress)))
            .unwrap_or_else(|payload| Err(Error::Panicked(panic_message(payload.as_ref()))));

        let (outcome, terminal, message, error_message) = match result {
            Ok(ExecutionResult::Completed) => (
                RunOutcome::Completed,
                RunState::Completed,
                "Backup completed successfully!".to_string(),
                None,
            ),
            Ok(ExecutionResult::Cancelled) => (
                RunOutcome::Cancelled,
                RunState::Cancelled,
                "Backup cancelled".to_string(),
                None,
            ),
            Err(e) => {
                log::error!("Backup of {} failed: {e}", self.source_root);
                (
                    RunOutcome::Failed,
                    RunState::Failed,
                    format!("Backup failed: {e}"),
                    Some(e.to_string()),
                )
            }
        };

        self.shared.set_state(self.run_id, terminal);
        history::record_run(
            &self.history,
            &self.source_root,
            &self.destination_root.display().to_string(),
            progress.as_ref(),
            outcome,
            error_message,
        );

        self.emit_final(RunEvent::Status(message));
        drop(guard);
        self.emit_final(RunEvent::Completed {
            success: outcome == RunOutcome::Completed,
        });
    }

    /// Terminal events must not unwind past the history entry already written.
    fn emit_final(&self, event: RunEvent) {
        if panic::catch_unwind(AssertUnwindSafe(|| self.emit(event))).is_err() {
            log::error!("Event notifier panicked for run {}", self.run_id);
        }
    }

    fn drive(&self, progress: &mut Option<Progress>) -> Result<ExecutionResult> {
        self.status("Analyzing files...");
        let plan = plan::plan(&*self.source, &self.source_root, &self.destination_root)?;

        self.shared.set_state(self.run_id, RunState::CopySpaceCheck);
        if plan.total_bytes > 0 {
            let available = self.space.available_space(&self.destination_root)?;
            if available < plan.total_bytes {
                return Err(Error::InsufficientSpace {
                    needed: plan.total_bytes,
                    available,
                });
            }
        }

        self.shared.set_state(self.run_id, RunState::Copying);
        self.status("Starting backup...");

        let progress = progress.insert(Progress::for_plan(&plan));
        self.emit(RunEvent::Progress(*progress));

        execute::execute(
            &plan,
            &*self.source,
            &self.destination_root,
            progress,
            &mut |action: &CopyAction| {
                let name = action.destination_path.file_name().map_or_else(
                    || action.source_path.clone(),
                    |n| n.to_string_lossy().to_string(),
                );
                self.status(format!("Copying: {name}"));
            },
            &mut |snapshot: &Progress| self.emit(RunEvent::Progress(*snapshot)),
            &self.cancel,
        )
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Facade sequencing planner, space check, executor and history recording on
/// a dedicated background worker.
pub struct Orchestrator {
    pool: rayon::ThreadPool,
    shared: Arc<Shared>,
    history: HistoryLog,
    space: Arc<dyn VolumeSpace>,
    next_id: AtomicU64,
}

impl Orchestrator {
    /// Create an orchestrator appending to the caller-owned `history`.
    pub fn new(history: HistoryLog) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .thread_name(|_| "nasbak-run".to_string())
            .panic_handler(|_| log::error!("Backup worker panicked; run slot released"))
            .build()
            .map_err(|e| Error::Io(std::io::Error::other(e)))?;

        Ok(Self {
            pool,
            shared: Arc::new(Shared::default()),
            history,
            space: Arc::new(SystemVolume),
            next_id: AtomicU64::new(1),
        })
    }

    /// Replace the free-space probe used before copying.
    #[must_use]
    pub fn with_volume_space(mut self, space: Arc<dyn VolumeSpace>) -> Self {
        self.space = space;
        self
    }

    #[must_use]
    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Start a run in the background.
    ///
    /// Fails immediately with [`Error::AlreadyRunning`] while another run
    /// occupies the slot; the active run is left untouched.
    pub fn start_run(
        &self,
        source: Arc<dyn RemoteFileSource>,
        source_root: &str,
        destination_root: &Path,
        notifier: EventNotifier,
    ) -> Result<RunHandle> {
        let run_id = {
            let mut slot = self.shared.lock();
            if slot.state.is_active() {
                log::warn!("Rejecting backup request: run {} is {}", slot.run_id, slot.state);
                return Err(Error::AlreadyRunning);
            }
            let run_id = self.next_id.fetch_add(1, Ordering::Relaxed);
            slot.run_id = run_id;
            slot.state = RunState::Planning;
            run_id
        };

        let cancel = CancelToken::new();
        let job = RunJob {
            run_id,
            source,
            source_root: source_root.to_string(),
            destination_root: destination_root.to_path_buf(),
            notifier,
            cancel: cancel.clone(),
            shared: Arc::clone(&self.shared),
            history: self.history.clone(),
            space: Arc::clone(&self.space),
        };

        log::info!(
            "Starting backup run {run_id}: {source_root} -> {}",
            destination_root.display()
        );
        self.pool.spawn(move || job.run());

        Ok(RunHandle { id: run_id, cancel })
    }

    /// Ask the run to stop at its next action boundary.
    pub fn cancel_run(&self, handle: &RunHandle) {
        let slot = self.shared.lock();
        if slot.run_id == handle.id && slot.state.is_active() {
            log::info!("Cancellation requested for run {}", handle.id);
            handle.cancel.cancel();
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.lock().state.is_active()
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.shared.lock().state
    }

    /// Block until no run occupies the slot.
    pub fn wait_idle(&self) {
        let mut slot = self.shared.lock();
        while slot.state.is_active() {
            slot = self
                .shared
                .idle
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}
