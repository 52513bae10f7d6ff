//! Workflow orchestration.

use std::sync::Arc;

use parking_lot::Mutex;
use qr_checkin_sdk::{
    CameraEngine, Presenter, Symbology, UserPrompt, ValidationClient, WorkflowError,
    WorkflowSnapshot,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use super::error::TransitionError;
use super::machine::{self, Effect, Event, Step};
use super::permission::PermissionGate;
use super::scan::ScanSession;

struct Current {
    snapshot: WorkflowSnapshot,
    /// Cancels the capture of the current attempt.
    cancel: CancellationToken,
    /// Bumped on every state change, orders publication.
    seq: u64,
}

enum ApplyError {
    /// The event belongs to an attempt that has been superseded.
    Stale,
    Rejected(TransitionError),
}

/// Drives scan attempts through permission, capture, lookup and confirm.
///
/// Every event is tagged with the attempt it belongs to. Results arriving for
/// an older attempt are discarded, so a new scan request always wins over
/// in-flight work of the previous one.
pub struct WorkflowController {
    gate: PermissionGate,
    scanner: ScanSession,
    validator: Arc<dyn ValidationClient>,
    presenter: Arc<dyn Presenter>,
    symbology: Symbology,
    current: Mutex<Current>,
    /// Sequence number of the last step handed to the presenter.
    published: Mutex<u64>,
}

impl WorkflowController {
    #[must_use]
    pub fn new(
        engine: Arc<dyn CameraEngine>,
        prompt: Arc<dyn UserPrompt>,
        validator: Arc<dyn ValidationClient>,
        presenter: Arc<dyn Presenter>,
        symbology: Symbology,
    ) -> Self {
        Self {
            gate: PermissionGate::new(Arc::clone(&engine), prompt),
            scanner: ScanSession::new(engine),
            validator,
            presenter,
            symbology,
            current: Mutex::new(Current {
                snapshot: WorkflowSnapshot::default(),
                cancel: CancellationToken::new(),
                seq: 0,
            }),
            published: Mutex::new(0),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> WorkflowSnapshot {
        self.current.lock().snapshot.clone()
    }

    #[must_use]
    pub fn is_scanner_active(&self) -> bool {
        self.scanner.is_active()
    }

    /// Start a new scan attempt and drive it until it settles.
    ///
    /// Any attempt in progress is superseded: its capture is cancelled and
    /// its late results are ignored.
    ///
    /// # Errors
    /// Returns [`WorkflowError::Superseded`] if another scan request replaced
    /// this attempt before it settled.
    #[instrument(skip(self))]
    pub async fn request_scan(&self) -> Result<WorkflowSnapshot, WorkflowError> {
        let (step, cancel) = self.begin_attempt();
        let attempt = step.state.attempt;
        info!(attempt, "scan attempt started");
        self.drive(attempt, &cancel, step).await
    }

    /// Check in the record shown by the current attempt.
    ///
    /// Issues exactly one validate lookup.
    ///
    /// # Errors
    /// Returns [`WorkflowError::ConfirmUnavailable`] unless the current
    /// attempt is done with a found record that is not validated yet, and
    /// [`WorkflowError::Superseded`] if a scan request replaced the attempt
    /// while the validate call was in flight.
    #[instrument(skip(self))]
    pub async fn confirm(&self) -> Result<WorkflowSnapshot, WorkflowError> {
        let (attempt, cancel) = {
            let current = self.current.lock();
            (current.snapshot.attempt, current.cancel.clone())
        };
        let step = match self.apply(attempt, Event::ConfirmRequested) {
            Ok(step) => step,
            Err(ApplyError::Stale) => return Err(WorkflowError::Superseded { attempt }),
            Err(ApplyError::Rejected(TransitionError::ConfirmUnavailable { phase })) => {
                debug!(attempt, %phase, "confirm ignored");
                return Err(WorkflowError::ConfirmUnavailable { phase });
            }
            Err(ApplyError::Rejected(e)) => {
                error!(attempt, error = %e, "confirm rejected");
                return Err(WorkflowError::ConfirmUnavailable {
                    phase: self.snapshot().phase,
                });
            }
        };
        info!(attempt, "check-in confirmed");
        self.drive(attempt, &cancel, step).await
    }

    /// Abort the capture of the current attempt, if any.
    ///
    /// The attempt settles in `Idle` without an alert.
    pub fn cancel(&self) {
        let current = self.current.lock();
        debug!(attempt = current.snapshot.attempt, "cancel requested");
        current.cancel.cancel();
    }

    fn begin_attempt(&self) -> (Step, CancellationToken) {
        let (step, seq, cancel) = {
            let mut current = self.current.lock();
            current.cancel.cancel();
            current.cancel = CancellationToken::new();
            let step = machine::begin(&current.snapshot);
            current.snapshot = step.state.clone();
            current.seq += 1;
            (step, current.seq, current.cancel.clone())
        };
        self.publish(seq, &step);
        // Force-release the camera still held by a superseded capture.
        self.scanner.stop();
        (step, cancel)
    }

    async fn drive(
        &self,
        attempt: u64,
        cancel: &CancellationToken,
        mut step: Step,
    ) -> Result<WorkflowSnapshot, WorkflowError> {
        loop {
            let event = match step.effect {
                Effect::None => return Ok(step.state),
                Effect::ResolvePermission => Event::PermissionResolved(self.gate.resolve().await),
                Effect::OpenScanner => {
                    Event::ScanFinished(self.scanner.start(self.symbology, cancel).await)
                }
                Effect::Lookup { identifier, mode } => {
                    Event::LookupFinished(self.validator.lookup(&identifier, mode).await)
                }
            };
            step = match self.apply(attempt, event) {
                Ok(next) => next,
                Err(ApplyError::Stale) => return Err(WorkflowError::Superseded { attempt }),
                Err(ApplyError::Rejected(e)) => {
                    error!(attempt, error = %e, "workflow event rejected");
                    return Ok(self.snapshot());
                }
            };
        }
    }

    /// Apply `event` to the snapshot of `attempt` and publish the result.
    fn apply(&self, attempt: u64, event: Event) -> Result<Step, ApplyError> {
        let name = event.name();
        let (step, seq) = {
            let mut current = self.current.lock();
            if current.snapshot.attempt != attempt {
                debug!(
                    attempt,
                    current = current.snapshot.attempt,
                    event = name,
                    "discarding stale event"
                );
                return Err(ApplyError::Stale);
            }
            let step = machine::step(&current.snapshot, event).map_err(ApplyError::Rejected)?;
            current.snapshot = step.state.clone();
            current.seq += 1;
            (step, current.seq)
        };
        debug!(attempt, event = name, phase = %step.state.phase, "workflow transition");
        self.publish(seq, &step);
        Ok(step)
    }

    /// Hand `step` to the presenter unless a later step was already shown.
    ///
    /// Runs outside the state lock, so presenters may read [`Self::snapshot`].
    fn publish(&self, seq: u64, step: &Step) {
        let mut published = self.published.lock();
        if *published >= seq {
            debug!(seq, last = *published, "skipping outdated render");
            return;
        }
        *published = seq;
        self.presenter.render(&step.state);
        if let Some(alert) = &step.alert {
            self.presenter.alert(alert);
        }
    }
}
