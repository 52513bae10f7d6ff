//! Public models for the QR check-in workflow.
//!
//! These are transport-agnostic data structures that define the contract
//! between the workflow core and its collaborators.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{IdentifierError, LookupFailure};

/// Placeholder first name of an outcome whose lookup found nothing.
pub const INFORMATION_NOT_FOUND: &str = "information not found";

/// Placeholder first name of an outcome whose scanned payload was rejected.
pub const QR_NOT_SUPPORTED: &str = "QR not supported";

/// Decoded QR payload used as the lookup key.
///
/// Always non-empty; surrounding whitespace is trimmed on capture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    /// Parse a raw scanned payload.
    ///
    /// # Errors
    /// Returns [`IdentifierError::Empty`] if the payload is empty after trimming.
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(IdentifierError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Person record returned by the lookup service.
///
/// `first_name` is the only field guaranteed present. A non-empty
/// `first_name` means a lookup result exists.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PersonRecord {
    pub id: Option<String>,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl PersonRecord {
    /// Record carrying only a first name.
    #[must_use]
    pub fn named(first_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            ..Self::default()
        }
    }

    /// First and last name joined by a space.
    #[must_use]
    pub fn full_name(&self) -> String {
        match self.last_name.as_deref() {
            Some(last) if !last.is_empty() => format!("{} {last}", self.first_name),
            _ => self.first_name.clone(),
        }
    }
}

/// Whether a lookup only reads the record or also checks the person in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupMode {
    /// Read the record; never mutates the remote system.
    ReadOnly,
    /// Mark the record as checked in. Not idempotent.
    Validate,
}

impl LookupMode {
    #[must_use]
    pub const fn is_validate(self) -> bool {
        matches!(self, Self::Validate)
    }
}

impl fmt::Display for LookupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly => f.write_str("read_only"),
            Self::Validate => f.write_str("validate"),
        }
    }
}

/// Check-in state of a found record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckIn {
    /// Not checked in yet; the confirm action is offered.
    #[default]
    Pending,
    /// Already checked in, optionally with the check-in time.
    Validated { at: Option<DateTime<Utc>> },
}

/// Normalized result of a lookup/validate call.
///
/// Fields are only reachable through the constructors, which keep the
/// invariant: an outcome that is not found carries a placeholder first name,
/// is not validated and has no validation time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationOutcome {
    record: PersonRecord,
    check_in: CheckIn,
    found: bool,
}

impl ValidationOutcome {
    /// Outcome at the start of a scan attempt: nothing to show.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Not-found outcome whose first name is a human readable placeholder.
    ///
    /// Blank text falls back to [`INFORMATION_NOT_FOUND`].
    #[must_use]
    pub fn placeholder(text: impl Into<String>) -> Self {
        let text = text.into();
        let text = if text.trim().is_empty() {
            INFORMATION_NOT_FOUND.to_owned()
        } else {
            text
        };
        Self {
            record: PersonRecord::named(text),
            check_in: CheckIn::Pending,
            found: false,
        }
    }

    /// Placeholder outcome for a lookup that found nothing or failed.
    #[must_use]
    pub fn not_found() -> Self {
        Self::placeholder(INFORMATION_NOT_FOUND)
    }

    /// Outcome for a record present in the lookup response.
    ///
    /// A record with an empty first name is not a result and yields
    /// [`Self::not_found`].
    #[must_use]
    pub fn found(record: PersonRecord, check_in: CheckIn) -> Self {
        if record.first_name.is_empty() {
            return Self::not_found();
        }
        Self {
            record,
            check_in,
            found: true,
        }
    }

    #[must_use]
    pub fn record(&self) -> &PersonRecord {
        &self.record
    }

    #[must_use]
    pub fn is_found(&self) -> bool {
        self.found
    }

    #[must_use]
    pub fn check_in(&self) -> CheckIn {
        self.check_in
    }

    #[must_use]
    pub fn was_already_validated(&self) -> bool {
        matches!(self.check_in, CheckIn::Validated { .. })
    }

    #[must_use]
    pub fn validated_at(&self) -> Option<DateTime<Utc>> {
        match self.check_in {
            CheckIn::Validated { at } => at,
            CheckIn::Pending => None,
        }
    }

    /// Whether there is anything to render (record or placeholder).
    #[must_use]
    pub fn has_result(&self) -> bool {
        !self.record.first_name.is_empty()
    }

    /// Whether the confirm action applies to this outcome.
    #[must_use]
    pub fn is_confirmable(&self) -> bool {
        self.found && !self.was_already_validated()
    }
}

/// Result of one `ValidationClient::lookup` call.
///
/// `failure` is the side-channel signal for transport/protocol failures; it
/// is `None` both for found records and for empty payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupReport {
    pub outcome: ValidationOutcome,
    pub failure: Option<LookupFailure>,
}

impl LookupReport {
    #[must_use]
    pub fn found(record: PersonRecord, check_in: CheckIn) -> Self {
        Self {
            outcome: ValidationOutcome::found(record, check_in),
            failure: None,
        }
    }

    #[must_use]
    pub fn not_found() -> Self {
        Self {
            outcome: ValidationOutcome::not_found(),
            failure: None,
        }
    }

    #[must_use]
    pub fn failed(failure: LookupFailure) -> Self {
        Self {
            outcome: ValidationOutcome::not_found(),
            failure: Some(failure),
        }
    }
}

/// Camera access as resolved by the workflow for one scan attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PermissionState {
    Granted,
    Denied,
    Restricted,
    /// Not resolved yet, or the engine could not report a status.
    #[default]
    Unknown,
    /// The user declined the rationale before the system was asked.
    NotYetAsked,
}

impl PermissionState {
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Raw camera permission status reported by a camera engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraPermission {
    Granted,
    Denied,
    /// The user has never been asked.
    NeverAsked,
    /// Platform-imposed restriction (parental controls, MDM, ...).
    Restricted,
    Unknown,
    /// Not granted yet but may be requested.
    Prompt,
}

/// Phase of the current scan attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    AwaitingPermission,
    Scanning,
    Processing,
    Done,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::AwaitingPermission => "awaiting_permission",
            Self::Scanning => "scanning",
            Self::Processing => "processing",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Barcode format requested from the camera engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbology {
    #[default]
    QrCode,
}

/// Error sub-state an attempt ended in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    /// Scanned payload failed the identifier check.
    MalformedScan,
    /// Camera engine failed during the scan.
    ScannerFailure,
    /// Lookup service has no record for the identifier.
    NotFound,
    /// Transport or protocol failure during lookup/validate.
    Transient,
}

/// User-facing alert dispatched through the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub subtitle: String,
    pub message: String,
}

impl Alert {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        subtitle: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            message: message.into(),
        }
    }
}

/// Observable state of the workflow, replaced atomically on every transition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkflowSnapshot {
    /// Number of the scan attempt this state belongs to (0 before the first).
    pub attempt: u64,
    pub phase: SessionPhase,
    pub permission: PermissionState,
    /// Identifier captured by the current attempt.
    pub identifier: Option<Identifier>,
    pub outcome: ValidationOutcome,
    pub fault: Option<Fault>,
}
