//! QR check-in SDK
//!
//! This crate provides the public contract of the scan-permission-validate
//! workflow: the collaborator traits the workflow core depends on, the models
//! it exchanges with them, and the error definitions.
//!
//! ## Collaborator traits
//!
//! - `CameraEngine` - camera/barcode engine (permissions, background, capture)
//! - `UserPrompt` - confirmation dialogs shown before permission requests
//! - `ValidationClient` - remote person lookup and check-in
//! - `Presenter` - renders workflow snapshots and dispatches alerts
//!
//! ## Usage
//!
//! ```ignore
//! use qr_checkin_sdk::{Identifier, LookupMode, ValidationClient};
//!
//! let identifier = Identifier::parse("42")?;
//! let report = client.lookup(&identifier, LookupMode::ReadOnly).await;
//! if report.outcome.is_found() {
//!     println!("{}", report.outcome.record().full_name());
//! }
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod api;
pub mod error;
pub mod models;

// Collaborator traits
pub use api::{CameraEngine, Presenter, UserPrompt, ValidationClient};

// Error types
pub use error::{CameraError, IdentifierError, LookupFailure, WorkflowError};

// Models
pub use models::{
    Alert, CameraPermission, CheckIn, Fault, INFORMATION_NOT_FOUND, Identifier, LookupMode,
    LookupReport, PermissionState, PersonRecord, QR_NOT_SUPPORTED, SessionPhase, Symbology,
    ValidationOutcome, WorkflowSnapshot,
};
