//! Workflow state machine.
//!
//! `step` is a pure transition function: given the current snapshot and an
//! event it returns the complete next snapshot, the effect the controller must
//! run next, and the alert to show, or rejects the event. Nothing is mutated
//! in place; the controller swaps whole snapshots.
//!
//! ```text
//!  Idle ──scan──▶ AwaitingPermission ──granted──▶ Scanning ──decoded──▶ Processing ──▶ Done
//!   ▲                  │ not granted               │ empty/cancelled/failed              │
//!   └──────────────────┴───────────────────────────┘                 ◀──confirm──────────┘
//! ```

use qr_checkin_sdk::{
    Alert, Fault, Identifier, LookupMode, LookupReport, PermissionState, QR_NOT_SUPPORTED,
    SessionPhase, ValidationOutcome, WorkflowSnapshot,
};

use super::error::{ScanError, TransitionError};
use super::messages;
use super::scan::ScanOutcome;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The user asked for a new scan. Accepted in every phase.
    ScanRequested,
    PermissionResolved(PermissionState),
    ScanFinished(Result<ScanOutcome, ScanError>),
    LookupFinished(LookupReport),
    /// The user confirmed the check-in of the shown record.
    ConfirmRequested,
}

impl Event {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ScanRequested => "scan_requested",
            Self::PermissionResolved(_) => "permission_resolved",
            Self::ScanFinished(_) => "scan_finished",
            Self::LookupFinished(_) => "lookup_finished",
            Self::ConfirmRequested => "confirm_requested",
        }
    }
}

/// Work the controller performs after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    ResolvePermission,
    OpenScanner,
    Lookup {
        identifier: Identifier,
        mode: LookupMode,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub state: WorkflowSnapshot,
    pub effect: Effect,
    pub alert: Option<Alert>,
}

impl Step {
    fn new(state: WorkflowSnapshot, effect: Effect) -> Self {
        Self {
            state,
            effect,
            alert: None,
        }
    }

    fn with_alert(state: WorkflowSnapshot, alert: Alert) -> Self {
        Self {
            state,
            effect: Effect::None,
            alert: Some(alert),
        }
    }
}

/// Start a new attempt from any phase.
///
/// The previous outcome, identifier and permission are dropped; the attempt
/// number moves forward so late results of older attempts can be told apart.
#[must_use]
pub fn begin(state: &WorkflowSnapshot) -> Step {
    let next = WorkflowSnapshot {
        attempt: state.attempt + 1,
        phase: SessionPhase::AwaitingPermission,
        permission: PermissionState::Unknown,
        identifier: None,
        outcome: ValidationOutcome::empty(),
        fault: None,
    };
    Step::new(next, Effect::ResolvePermission)
}

/// Apply `event` to `state`.
///
/// # Errors
/// Returns [`TransitionError::ConfirmUnavailable`] for a confirm outside a
/// confirmable `Done` state and [`TransitionError::Unexpected`] for any other
/// event that does not belong to the current phase.
pub fn step(state: &WorkflowSnapshot, event: Event) -> Result<Step, TransitionError> {
    match (state.phase, event) {
        (_, Event::ScanRequested) => Ok(begin(state)),
        (SessionPhase::AwaitingPermission, Event::PermissionResolved(permission)) => {
            Ok(permission_resolved(state, permission))
        }
        (SessionPhase::Scanning, Event::ScanFinished(result)) => Ok(scan_finished(state, result)),
        (SessionPhase::Processing, Event::LookupFinished(report)) => {
            Ok(lookup_finished(state, report))
        }
        (SessionPhase::Done, Event::ConfirmRequested) => confirm(state),
        (phase, Event::ConfirmRequested) => Err(TransitionError::ConfirmUnavailable { phase }),
        (phase, event) => Err(TransitionError::Unexpected {
            phase,
            event: event.name(),
        }),
    }
}

fn permission_resolved(state: &WorkflowSnapshot, permission: PermissionState) -> Step {
    // Not granted: the permission dialogs already informed the user.
    let (phase, effect) = if permission.is_granted() {
        (SessionPhase::Scanning, Effect::OpenScanner)
    } else {
        (SessionPhase::Idle, Effect::None)
    };
    let next = WorkflowSnapshot {
        phase,
        permission,
        ..state.clone()
    };
    Step::new(next, effect)
}

fn scan_finished(state: &WorkflowSnapshot, result: Result<ScanOutcome, ScanError>) -> Step {
    let idle = WorkflowSnapshot {
        phase: SessionPhase::Idle,
        ..state.clone()
    };
    match result {
        Ok(ScanOutcome::Decoded(identifier)) => {
            let next = WorkflowSnapshot {
                phase: SessionPhase::Processing,
                identifier: Some(identifier.clone()),
                ..state.clone()
            };
            Step::new(
                next,
                Effect::Lookup {
                    identifier,
                    mode: LookupMode::ReadOnly,
                },
            )
        }
        Ok(ScanOutcome::Rejected { .. }) => Step::with_alert(
            WorkflowSnapshot {
                outcome: ValidationOutcome::placeholder(QR_NOT_SUPPORTED),
                fault: Some(Fault::MalformedScan),
                ..idle
            },
            messages::qr_not_recognized(),
        ),
        Ok(ScanOutcome::NoContent) => Step::new(idle, Effect::None),
        Err(_) => Step::with_alert(
            WorkflowSnapshot {
                fault: Some(Fault::ScannerFailure),
                ..idle
            },
            messages::camera_unavailable(),
        ),
    }
}

fn lookup_finished(state: &WorkflowSnapshot, report: LookupReport) -> Step {
    let (fault, alert) = match (&report.failure, report.outcome.is_found()) {
        (Some(_), _) => (Some(Fault::Transient), Some(messages::transient_error())),
        (None, true) => (None, None),
        (None, false) => (Some(Fault::NotFound), Some(messages::information_not_found())),
    };
    let next = WorkflowSnapshot {
        phase: SessionPhase::Done,
        outcome: report.outcome,
        fault,
        ..state.clone()
    };
    Step {
        state: next,
        effect: Effect::None,
        alert,
    }
}

fn confirm(state: &WorkflowSnapshot) -> Result<Step, TransitionError> {
    let identifier = match &state.identifier {
        Some(identifier) if state.outcome.is_confirmable() => identifier.clone(),
        _ => {
            return Err(TransitionError::ConfirmUnavailable {
                phase: state.phase,
            });
        }
    };
    // The shown record stays visible until the validate call replaces it.
    let next = WorkflowSnapshot {
        phase: SessionPhase::Processing,
        fault: None,
        ..state.clone()
    };
    Ok(Step::new(
        next,
        Effect::Lookup {
            identifier,
            mode: LookupMode::Validate,
        },
    ))
}
