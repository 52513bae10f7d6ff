//! Camera permission negotiation.

use std::sync::Arc;

use qr_checkin_sdk::{CameraEngine, CameraPermission, PermissionState, UserPrompt};
use tracing::{debug, instrument, warn};

use super::messages::{CAMERA_RATIONALE, SETTINGS_RATIONALE};

/// Resolves whether camera access is usable for the current scan attempt.
///
/// Each `resolve` call is exactly one resolution pass. It never retries and
/// never polls; after a settings deep-link the caller re-resolves on its next
/// attempt.
pub struct PermissionGate {
    engine: Arc<dyn CameraEngine>,
    prompt: Arc<dyn UserPrompt>,
}

impl PermissionGate {
    #[must_use]
    pub fn new(engine: Arc<dyn CameraEngine>, prompt: Arc<dyn UserPrompt>) -> Self {
        Self { engine, prompt }
    }

    #[instrument(skip_all)]
    pub async fn resolve(&self) -> PermissionState {
        let status = match self.engine.check_permission(false).await {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "camera permission status unavailable");
                return PermissionState::Unknown;
            }
        };
        debug!(?status, "camera permission status");

        match status {
            CameraPermission::Granted => return PermissionState::Granted,
            CameraPermission::Denied => {
                if self.prompt.confirm(SETTINGS_RATIONALE).await {
                    if let Err(e) = self.engine.open_app_settings().await {
                        warn!(error = %e, "failed to open app settings");
                    }
                }
                return PermissionState::Denied;
            }
            CameraPermission::NeverAsked => {
                if !self.prompt.confirm(CAMERA_RATIONALE).await {
                    return PermissionState::NotYetAsked;
                }
            }
            CameraPermission::Restricted | CameraPermission::Unknown => {
                return PermissionState::Restricted;
            }
            CameraPermission::Prompt => {}
        }

        match self.engine.check_permission(true).await {
            Ok(CameraPermission::Granted) => PermissionState::Granted,
            Ok(status) => {
                debug!(?status, "camera permission request declined");
                PermissionState::Denied
            }
            Err(e) => {
                warn!(error = %e, "camera permission request failed");
                PermissionState::Denied
            }
        }
    }
}
