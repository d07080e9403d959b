//! Debounced, best-effort background persistence.
//!
//! Every answer change schedules a save of the full answer set. Only the last
//! schedule within the trailing debounce window reaches the backend; earlier
//! ones are superseded, not queued. Failures are logged and swallowed, except
//! a backend report that the response is already completed: that disables the
//! scheduler for good and is surfaced through `remote_completed`.
//!
//! Every write happens under a write gate. `pause` takes the gate, so once it
//! returns no save is in flight and none starts until `resume`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use questionnaire_types::{AnswersPayload, QuestionnaireBackend, QuestionnaireId};
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

/// What the scheduler is currently doing, for a saving indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveStatus {
    Idle,
    /// A save is waiting for the debounce window to pass.
    Pending,
    Saving,
    Saved,
    /// The last save failed; the next change will try again.
    Failed,
    /// Cancelled or stopped by a completed response. Terminal.
    Disabled,
}

enum Command {
    Schedule(AnswersPayload),
    /// Drop the pending payload and its deadline.
    Discard,
}

struct Shared {
    disabled: AtomicBool,
    paused: AtomicBool,
    remote_completed: AtomicBool,
    write_gate: Mutex<()>,
    status_tx: watch::Sender<AutosaveStatus>,
}

impl Shared {
    fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    fn may_write(&self) -> bool {
        !self.is_disabled() && !self.paused.load(Ordering::SeqCst)
    }

    fn disable(&self) {
        self.disabled.store(true, Ordering::SeqCst);
        self.status_tx.send_replace(AutosaveStatus::Disabled);
    }

    fn publish(&self, status: AutosaveStatus) {
        if self.is_disabled() {
            self.status_tx.send_replace(AutosaveStatus::Disabled);
        } else {
            self.status_tx.send_replace(status);
        }
    }
}

/// Owns the debounce timer and the worker task of one session.
///
/// Must be created inside a tokio runtime. Dropping the scheduler cancels it
/// and aborts the worker, so no write fires after teardown.
pub struct AutosaveScheduler {
    shared: Arc<Shared>,
    command_tx: mpsc::UnboundedSender<Command>,
    worker: JoinHandle<()>,
}

impl AutosaveScheduler {
    /// Spawn the worker task for `questionnaire`.
    pub fn spawn(
        backend: Arc<dyn QuestionnaireBackend>,
        questionnaire: QuestionnaireId,
        debounce: Duration,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (status_tx, _) = watch::channel(AutosaveStatus::Idle);
        let shared = Arc::new(Shared {
            disabled: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            remote_completed: AtomicBool::new(false),
            write_gate: Mutex::new(()),
            status_tx,
        });

        let worker = tokio::spawn(run_autosave_loop(
            backend,
            questionnaire,
            debounce,
            shared.clone(),
            command_rx,
        ));

        Self {
            shared,
            command_tx,
            worker,
        }
    }

    /// Schedule a save of `payload`, superseding any pending one.
    ///
    /// Never blocks. Does nothing once the scheduler is disabled.
    pub fn schedule(&self, payload: AnswersPayload) {
        if self.shared.is_disabled() {
            debug!("autosave disabled, dropping schedule");
            return;
        }
        // The worker only goes away after cancel or teardown.
        let _ = self.command_tx.send(Command::Schedule(payload));
    }

    /// Cancel the pending save and disable the scheduler permanently.
    ///
    /// Takes effect before returning: the worker checks the flag right before
    /// every write.
    pub fn cancel(&self) {
        if !self.shared.is_disabled() {
            debug!("cancelling autosave");
        }
        self.shared.disable();
        let _ = self.command_tx.send(Command::Discard);
    }

    /// Drop the pending save and wait for an in-flight one to finish.
    ///
    /// No save is written until `resume`. Used around finalize, which must
    /// not race a partial save.
    pub async fn pause(&self) {
        self.shared.paused.store(true, Ordering::SeqCst);
        let _ = self.command_tx.send(Command::Discard);
        let _gate = self.shared.write_gate.lock().await;
        debug!("autosave paused");
    }

    /// Allow saves again after `pause`. The caller reschedules what it wants saved.
    pub fn resume(&self) {
        self.shared.paused.store(false, Ordering::SeqCst);
        self.shared.publish(AutosaveStatus::Idle);
    }

    pub fn is_disabled(&self) -> bool {
        self.shared.is_disabled()
    }

    /// Whether the backend rejected a save because the response is completed.
    pub fn remote_completed(&self) -> bool {
        self.shared.remote_completed.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> AutosaveStatus {
        *self.shared.status_tx.borrow()
    }

    /// Subscribe to status changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AutosaveStatus> {
        self.shared.status_tx.subscribe()
    }
}

impl Drop for AutosaveScheduler {
    fn drop(&mut self) {
        self.cancel();
        self.worker.abort();
    }
}

impl std::fmt::Debug for AutosaveScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutosaveScheduler")
            .field("status", &self.status())
            .field("remote_completed", &self.remote_completed())
            .finish()
    }
}

enum Event {
    Command(Option<Command>),
    DeadlineElapsed,
}

async fn run_autosave_loop(
    backend: Arc<dyn QuestionnaireBackend>,
    questionnaire: QuestionnaireId,
    debounce: Duration,
    shared: Arc<Shared>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    let mut pending: Option<AnswersPayload> = None;
    let mut deadline: Option<Instant> = None;

    loop {
        let event = match deadline {
            Some(at) => tokio::select! {
                command = commands.recv() => Event::Command(command),
                _ = time::sleep_until(at) => Event::DeadlineElapsed,
            },
            None => Event::Command(commands.recv().await),
        };

        match event {
            Event::Command(Some(Command::Schedule(payload))) => {
                pending = Some(payload);
                deadline = Some(Instant::now() + debounce);
                shared.publish(AutosaveStatus::Pending);
            }
            Event::Command(Some(Command::Discard)) => {
                pending = None;
                deadline = None;
            }
            Event::Command(None) => break,
            Event::DeadlineElapsed => {
                deadline = None;
                let Some(payload) = pending.take() else {
                    continue;
                };
                let _gate = shared.write_gate.lock().await;
                if !shared.may_write() {
                    continue;
                }
                if !save(backend.as_ref(), &questionnaire, &payload, &shared).await {
                    break;
                }
            }
        }
    }

    debug!(questionnaire = %questionnaire, "autosave worker stopped");
}

/// Write one payload. Returns whether the worker should keep running.
async fn save(
    backend: &dyn QuestionnaireBackend,
    questionnaire: &QuestionnaireId,
    payload: &AnswersPayload,
    shared: &Shared,
) -> bool {
    shared.publish(AutosaveStatus::Saving);
    match backend.save_progress(questionnaire, payload).await {
        Ok(()) => {
            debug!(
                questionnaire = %questionnaire,
                answers = payload.len(),
                "autosaved"
            );
            shared.publish(AutosaveStatus::Saved);
            true
        }
        Err(err) if err.is_already_completed() => {
            info!(
                questionnaire = %questionnaire,
                "backend reports response completed, disabling autosave"
            );
            shared.remote_completed.store(true, Ordering::SeqCst);
            shared.disable();
            false
        }
        Err(err) => {
            warn!(questionnaire = %questionnaire, "autosave failed: {err}");
            shared.publish(AutosaveStatus::Failed);
            true
        }
    }
}
