//! Terminal stand-ins for the camera, dialogs and screen.
//!
//! The operator types the decoded QR payload instead of pointing a camera at
//! it. Camera permission is simulated in memory, starting as never asked.

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use qr_checkin::{
    Alert, CameraEngine, CameraError, CameraPermission, Presenter, Symbology, UserPrompt,
    WorkflowSnapshot,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;

use crate::view;

const CANCEL_WORD: &str = "cancel";

/// Line-oriented access to stdin shared by every terminal collaborator.
pub struct Console {
    lines: tokio::sync::Mutex<Lines<BufReader<Stdin>>>,
}

impl Console {
    pub fn new() -> Self {
        Self {
            lines: tokio::sync::Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    /// Print `prompt` and read one trimmed line; `None` at end of input.
    pub async fn ask(&self, prompt: &str) -> std::io::Result<Option<String>> {
        let mut lines = self.lines.lock().await;
        print!("{prompt}");
        std::io::stdout().flush()?;
        Ok(lines.next_line().await?.map(|line| line.trim().to_owned()))
    }

    /// Ask a yes/no question; anything but `y`/`yes` is a no.
    pub async fn ask_yes_no(&self, question: &str) -> bool {
        match self.ask(&format!("{question} [y/n] ")).await {
            Ok(Some(answer)) => matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"),
            Ok(None) => false,
            Err(e) => {
                debug!(error = %e, "failed to read answer");
                false
            }
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

pub struct TerminalCamera {
    console: Arc<Console>,
    permission: Mutex<CameraPermission>,
}

impl TerminalCamera {
    pub fn new(console: Arc<Console>) -> Self {
        Self {
            console,
            permission: Mutex::new(CameraPermission::NeverAsked),
        }
    }

    fn set_permission(&self, permission: CameraPermission) {
        *self.permission.lock() = permission;
    }
}

#[async_trait]
impl CameraEngine for TerminalCamera {
    fn prepare(&self) {}

    async fn check_permission(&self, force: bool) -> Result<CameraPermission, CameraError> {
        let current = *self.permission.lock();
        if !force || !matches!(current, CameraPermission::NeverAsked | CameraPermission::Prompt) {
            return Ok(current);
        }
        let granted = self
            .console
            .ask_yes_no("Allow qr-checkin to use the camera?")
            .await;
        let decided = if granted {
            CameraPermission::Granted
        } else {
            CameraPermission::Denied
        };
        self.set_permission(decided);
        Ok(decided)
    }

    async fn open_app_settings(&self) -> Result<(), CameraError> {
        if self.console.ask_yes_no("Settings: enable camera access?").await {
            self.set_permission(CameraPermission::Granted);
            println!("Camera access enabled. Type 'scan' to try again.");
        }
        Ok(())
    }

    fn hide_background(&self) {
        debug!("camera preview shown");
    }

    fn show_background(&self) {
        debug!("camera preview hidden");
    }

    async fn start_scan(&self, formats: &[Symbology]) -> Result<Option<String>, CameraError> {
        debug!(formats = formats.len(), "waiting for scanned payload");
        let line = self
            .console
            .ask(&format!("Scan QR (type the payload, or '{CANCEL_WORD}'): "))
            .await
            .map_err(|e| CameraError::unavailable(e.to_string()))?;
        Ok(line.filter(|payload| !payload.eq_ignore_ascii_case(CANCEL_WORD)))
    }

    fn stop_scan(&self) {}
}

pub struct TerminalPrompt {
    console: Arc<Console>,
}

impl TerminalPrompt {
    pub fn new(console: Arc<Console>) -> Self {
        Self { console }
    }
}

#[async_trait]
impl UserPrompt for TerminalPrompt {
    async fn confirm(&self, message: &str) -> bool {
        self.console.ask_yes_no(message).await
    }
}

pub struct TerminalPresenter;

impl Presenter for TerminalPresenter {
    fn render(&self, snapshot: &WorkflowSnapshot) {
        debug!(attempt = snapshot.attempt, phase = %snapshot.phase, "render");
        for line in view::snapshot_lines(snapshot) {
            println!("{line}");
        }
    }

    fn alert(&self, alert: &Alert) {
        for line in view::alert_lines(alert) {
            println!("{line}");
        }
    }
}
