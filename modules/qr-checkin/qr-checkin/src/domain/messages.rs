//! User-facing texts of the workflow.

use qr_checkin_sdk::Alert;

/// Shown before deep-linking to the settings page after a denial.
pub const SETTINGS_RATIONALE: &str =
    "If you want to grant permission for using your camera, enable it in the app settings.";

/// Shown before the system permission prompt is issued for the first time.
pub const CAMERA_RATIONALE: &str =
    "We need your permission to use your camera to be able to scan barcodes.";

const ERROR_TITLE: &str = "Error";

#[must_use]
pub fn qr_not_recognized() -> Alert {
    Alert::new(
        ERROR_TITLE,
        "QR not recognized",
        "This QR does not appear to be valid.",
    )
}

#[must_use]
pub fn information_not_found() -> Alert {
    Alert::new(
        ERROR_TITLE,
        "Information not found",
        "We could not find any information, check the QR and try again.",
    )
}

#[must_use]
pub fn transient_error() -> Alert {
    Alert::new(
        ERROR_TITLE,
        "Transient error, try again",
        "An error occurred while processing your request, please try again.",
    )
}

#[must_use]
pub fn camera_unavailable() -> Alert {
    Alert::new(
        ERROR_TITLE,
        "Camera unavailable",
        "The camera could not be started, please try again.",
    )
}
