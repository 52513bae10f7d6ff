//! Collaborator traits of the QR check-in workflow.
//!
//! The workflow core depends only on these contracts: the camera engine, the
//! confirmation dialogs, the remote validation service and the presentation
//! layer are supplied by the embedding application.

use async_trait::async_trait;

use crate::error::CameraError;
use crate::models::{
    Alert, CameraPermission, Identifier, LookupMode, LookupReport, Symbology, WorkflowSnapshot,
};

/// Camera/barcode engine contract.
///
/// Methods on the release path (`show_background`, `stop_scan`) are
/// synchronous so they can run from drop guards.
#[async_trait]
pub trait CameraEngine: Send + Sync {
    /// Put the engine into the prepared state. Idempotent.
    fn prepare(&self);

    /// Query the camera permission.
    ///
    /// With `force = false` no system prompt is shown. With `force = true`
    /// the system prompt is issued if the platform still allows it.
    async fn check_permission(&self, force: bool) -> Result<CameraPermission, CameraError>;

    /// Deep-link to the application settings page of the platform.
    async fn open_app_settings(&self) -> Result<(), CameraError>;

    /// Hide background UI obstructing the camera preview.
    fn hide_background(&self);

    /// Restore background UI hidden by `hide_background`.
    fn show_background(&self);

    /// Capture a single code restricted to `formats`.
    ///
    /// Resolves with `None` if the capture ends without content (stopped or
    /// dismissed by the user).
    async fn start_scan(&self, formats: &[Symbology]) -> Result<Option<String>, CameraError>;

    /// Stop any capture in progress and release the camera.
    fn stop_scan(&self);
}

/// Confirmation dialogs.
#[async_trait]
pub trait UserPrompt: Send + Sync {
    /// Ask the user to confirm `message`; `true` if accepted.
    async fn confirm(&self, message: &str) -> bool;
}

/// Remote person lookup and check-in.
///
/// Never fails across this boundary: transport failures are reported in
/// [`LookupReport::failure`] next to a placeholder outcome.
///
/// Implementations must not retry `LookupMode::Validate` calls.
#[async_trait]
pub trait ValidationClient: Send + Sync {
    async fn lookup(&self, identifier: &Identifier, mode: LookupMode) -> LookupReport;
}

/// Presentation layer.
///
/// Renders snapshots and shows alerts; never mutates workflow state.
/// Calls arrive in state order, outside the controller's state lock, so an
/// implementation may read the controller's current snapshot.
pub trait Presenter: Send + Sync {
    fn render(&self, snapshot: &WorkflowSnapshot);

    fn alert(&self, alert: &Alert);
}
