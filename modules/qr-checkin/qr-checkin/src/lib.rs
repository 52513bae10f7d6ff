//! QR Check-in Module Implementation
//!
//! Scan-permission-validate workflow: a scan attempt negotiates camera
//! permission, captures one QR code, looks the decoded identifier up, and lets
//! the operator confirm the check-in.
//!
//! The public contract is defined in `qr-checkin-sdk` and re-exported here.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub use qr_checkin_sdk::{
    Alert, CameraEngine, CameraError, CameraPermission, CheckIn, Fault, INFORMATION_NOT_FOUND,
    Identifier, IdentifierError, LookupFailure, LookupMode, LookupReport, PermissionState,
    PersonRecord, Presenter, QR_NOT_SUPPORTED, SessionPhase, Symbology, UserPrompt,
    ValidationClient, ValidationOutcome, WorkflowError, WorkflowSnapshot,
};

pub mod config;
pub mod domain;
pub mod infra;

pub use config::CheckinConfig;
pub use domain::controller::WorkflowController;
pub use domain::permission::PermissionGate;
pub use domain::scan::{ScanOutcome, ScanSession};
pub use infra::HttpValidationClient;
