//! Domain errors of the workflow core.

use qr_checkin_sdk::{CameraError, SessionPhase};
use thiserror::Error;

/// Failure of [`ScanSession::start`](super::scan::ScanSession::start).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// A scan session is already active; the caller must stop it first.
    #[error("a scan session is already active")]
    AlreadyActive,

    /// The camera engine failed during the capture.
    #[error(transparent)]
    Camera(#[from] CameraError),
}

/// Event not accepted by the state machine in the current phase.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// Confirm requested while no confirmable outcome is shown.
    #[error("confirm is not available in phase {phase}")]
    ConfirmUnavailable { phase: SessionPhase },

    /// Event does not belong to the current phase.
    #[error("unexpected event '{event}' in phase {phase}")]
    Unexpected {
        phase: SessionPhase,
        event: &'static str,
    },
}
