#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

//! Shared test collaborators for workflow integration tests

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use qr_checkin::{
    Alert, CameraEngine, CameraError, CameraPermission, CheckIn, Identifier, LookupFailure,
    LookupMode, LookupReport, PersonRecord, Presenter, Symbology, UserPrompt, ValidationClient,
    WorkflowController, WorkflowSnapshot,
};
use tokio::sync::Notify;

pub enum Capture {
    Content(&'static str),
    Nothing,
    Fail,
    Hang,
}

#[derive(Default)]
struct CameraState {
    captures: VecDeque<Capture>,
    background_hidden: bool,
    scans_started: u32,
    scans_stopped: u32,
    settings_opened: u32,
}

/// Camera engine with a fixed permission status and scripted captures
pub struct FakeCamera {
    status: CameraPermission,
    forced: CameraPermission,
    state: Mutex<CameraState>,
}

impl FakeCamera {
    pub fn granted() -> Self {
        Self::with_permission(CameraPermission::Granted, CameraPermission::Granted)
    }

    pub fn with_permission(status: CameraPermission, forced: CameraPermission) -> Self {
        Self {
            status,
            forced,
            state: Mutex::new(CameraState::default()),
        }
    }

    pub fn with_capture(self, capture: Capture) -> Self {
        self.state.lock().captures.push_back(capture);
        self
    }

    pub fn push(&self, capture: Capture) {
        self.state.lock().captures.push_back(capture);
    }

    pub fn background_hidden(&self) -> bool {
        self.state.lock().background_hidden
    }

    pub fn scans_started(&self) -> u32 {
        self.state.lock().scans_started
    }

    pub fn scans_stopped(&self) -> u32 {
        self.state.lock().scans_stopped
    }

    pub fn settings_opened(&self) -> u32 {
        self.state.lock().settings_opened
    }
}

#[async_trait]
impl CameraEngine for FakeCamera {
    fn prepare(&self) {}

    async fn check_permission(&self, force: bool) -> Result<CameraPermission, CameraError> {
        Ok(if force { self.forced } else { self.status })
    }

    async fn open_app_settings(&self) -> Result<(), CameraError> {
        self.state.lock().settings_opened += 1;
        Ok(())
    }

    fn hide_background(&self) {
        self.state.lock().background_hidden = true;
    }

    fn show_background(&self) {
        self.state.lock().background_hidden = false;
    }

    async fn start_scan(&self, formats: &[Symbology]) -> Result<Option<String>, CameraError> {
        assert_eq!(formats, [Symbology::QrCode]);
        let capture = {
            let mut state = self.state.lock();
            state.scans_started += 1;
            state.captures.pop_front().unwrap_or(Capture::Nothing)
        };
        match capture {
            Capture::Content(raw) => Ok(Some(raw.to_owned())),
            Capture::Nothing => Ok(None),
            Capture::Fail => Err(CameraError::engine("sensor fault")),
            Capture::Hang => std::future::pending().await,
        }
    }

    fn stop_scan(&self) {
        self.state.lock().scans_stopped += 1;
    }
}

#[derive(Default)]
struct ValidatorState {
    records: HashMap<String, PersonRecord>,
    validated: HashMap<String, DateTime<Utc>>,
    failures: VecDeque<LookupFailure>,
    calls: Vec<(String, LookupMode)>,
    hold: Option<Arc<Notify>>,
}

/// In-memory lookup service that checks people in on validate calls
#[derive(Default)]
pub struct FakeValidator {
    state: Mutex<ValidatorState>,
}

impl FakeValidator {
    pub fn with_record(self, id: &str, first_name: &str, last_name: &str) -> Self {
        let record = PersonRecord {
            id: Some(id.to_owned()),
            email: Some(format!("{}@example.com", first_name.to_lowercase())),
            first_name: first_name.to_owned(),
            last_name: Some(last_name.to_owned()),
            avatar_url: None,
        };
        self.state.lock().records.insert(id.to_owned(), record);
        self
    }

    pub fn already_validated(self, id: &str, at: DateTime<Utc>) -> Self {
        self.state.lock().validated.insert(id.to_owned(), at);
        self
    }

    pub fn fail_next(&self, failure: LookupFailure) {
        self.state.lock().failures.push_back(failure);
    }

    /// The next lookup waits until the returned notify fires.
    pub fn hold_next(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.state.lock().hold = Some(notify.clone());
        notify
    }

    pub fn calls(&self) -> Vec<(String, LookupMode)> {
        self.state.lock().calls.clone()
    }

    pub fn validate_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|(_, mode)| mode.is_validate())
            .count()
    }
}

#[async_trait]
impl ValidationClient for FakeValidator {
    async fn lookup(&self, identifier: &Identifier, mode: LookupMode) -> LookupReport {
        let hold = {
            let mut state = self.state.lock();
            state.calls.push((identifier.as_str().to_owned(), mode));
            state.hold.take()
        };
        if let Some(hold) = hold {
            hold.notified().await;
        }

        let mut state = self.state.lock();
        if let Some(failure) = state.failures.pop_front() {
            return LookupReport::failed(failure);
        }
        let Some(record) = state.records.get(identifier.as_str()).cloned() else {
            return LookupReport::not_found();
        };
        if let Some(at) = state.validated.get(identifier.as_str()) {
            return LookupReport::found(record, CheckIn::Validated { at: Some(*at) });
        }
        if mode.is_validate() {
            let at = Utc::now();
            state.validated.insert(identifier.as_str().to_owned(), at);
            return LookupReport::found(record, CheckIn::Validated { at: Some(at) });
        }
        LookupReport::found(record, CheckIn::Pending)
    }
}

/// Presenter recording everything it is asked to show
#[derive(Default)]
pub struct RecordingPresenter {
    snapshots: Mutex<Vec<WorkflowSnapshot>>,
    alerts: Mutex<Vec<Alert>>,
}

impl RecordingPresenter {
    pub fn snapshots(&self) -> Vec<WorkflowSnapshot> {
        self.snapshots.lock().clone()
    }

    pub fn last(&self) -> WorkflowSnapshot {
        self.snapshots.lock().last().cloned().unwrap()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().clone()
    }
}

impl Presenter for RecordingPresenter {
    fn render(&self, snapshot: &WorkflowSnapshot) {
        self.snapshots.lock().push(snapshot.clone());
    }

    fn alert(&self, alert: &Alert) {
        self.alerts.lock().push(alert.clone());
    }
}

/// Prompt answering every dialog the same way
pub struct ScriptedPrompt {
    answer: bool,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().clone()
    }
}

#[async_trait]
impl UserPrompt for ScriptedPrompt {
    async fn confirm(&self, message: &str) -> bool {
        self.asked.lock().push(message.to_owned());
        self.answer
    }
}

pub struct Harness {
    pub controller: Arc<WorkflowController>,
    pub camera: Arc<FakeCamera>,
    pub validator: Arc<FakeValidator>,
    pub presenter: Arc<RecordingPresenter>,
    pub prompt: Arc<ScriptedPrompt>,
}

impl Harness {
    pub fn new(camera: FakeCamera, validator: FakeValidator) -> Self {
        Self::with_prompt(camera, validator, ScriptedPrompt::answering(true))
    }

    pub fn with_prompt(camera: FakeCamera, validator: FakeValidator, prompt: ScriptedPrompt) -> Self {
        let camera = Arc::new(camera);
        let validator = Arc::new(validator);
        let presenter = Arc::new(RecordingPresenter::default());
        let prompt = Arc::new(prompt);
        let controller = Arc::new(WorkflowController::new(
            camera.clone(),
            prompt.clone(),
            validator.clone(),
            presenter.clone(),
            Symbology::QrCode,
        ));
        Self {
            controller,
            camera,
            validator,
            presenter,
            prompt,
        }
    }

    /// The camera is released and the background restored.
    pub fn assert_camera_released(&self) {
        assert!(!self.controller.is_scanner_active());
        assert!(!self.camera.background_hidden());
    }
}

/// Yield to other tasks until `condition` holds.
pub async fn eventually(condition: impl Fn() -> bool) {
    for _ in 0..10_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
