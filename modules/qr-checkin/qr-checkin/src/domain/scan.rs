//! Scan session lifecycle.
//!
//! A session owns the camera engine and the "scanner active" flag for the
//! duration of one capture. The flag is a numbered lease: `start` acquires it
//! and releases it on every exit path (decoded, empty, failed, cancelled, or
//! the future being dropped). `stop` force-releases whatever lease is current;
//! an older lease released afterwards touches nothing.

use std::sync::Arc;

use parking_lot::Mutex;
use qr_checkin_sdk::{CameraEngine, Identifier, Symbology};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::error::ScanError;

/// What a finished capture produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// A usable identifier was decoded.
    Decoded(Identifier),
    /// The engine reported content that is not a usable identifier.
    Rejected { raw: String },
    /// The capture ended without content (stopped, cancelled, dismissed).
    NoContent,
}

#[derive(Debug, Default)]
struct Leases {
    active: Option<u64>,
    issued: u64,
}

pub struct ScanSession {
    engine: Arc<dyn CameraEngine>,
    leases: Mutex<Leases>,
}

impl ScanSession {
    #[must_use]
    pub fn new(engine: Arc<dyn CameraEngine>) -> Self {
        Self {
            engine,
            leases: Mutex::new(Leases::default()),
        }
    }

    /// Whether the "scanner active" flag is currently set.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.leases.lock().active.is_some()
    }

    /// Run one single-shot capture restricted to `symbology`.
    ///
    /// Cancelling `cancel` ends the capture with [`ScanOutcome::NoContent`].
    /// An already cancelled token returns at once without touching the camera.
    ///
    /// # Errors
    /// Returns [`ScanError::AlreadyActive`] if another session holds the
    /// camera, or [`ScanError::Camera`] if the engine fails. The camera is
    /// released in both cases.
    #[instrument(skip(self, cancel))]
    pub async fn start(
        &self,
        symbology: Symbology,
        cancel: &CancellationToken,
    ) -> Result<ScanOutcome, ScanError> {
        if cancel.is_cancelled() {
            debug!("capture cancelled before start");
            return Ok(ScanOutcome::NoContent);
        }
        let lease = self.acquire()?;
        self.engine.prepare();
        self.engine.hide_background();
        debug!(lease = lease.id, "scan session started");

        let formats = [symbology];
        let captured = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(lease = lease.id, "scan session cancelled");
                Ok(None)
            }
            result = self.engine.start_scan(&formats) => result,
        };
        drop(lease);

        Ok(match captured? {
            None => ScanOutcome::NoContent,
            Some(raw) => match Identifier::parse(&raw) {
                Ok(identifier) => ScanOutcome::Decoded(identifier),
                Err(_) => ScanOutcome::Rejected { raw },
            },
        })
    }

    /// Restore the background, clear the flag and release the camera.
    ///
    /// No-op if no session is active.
    pub fn stop(&self) {
        let released = self.leases.lock().active.take();
        if let Some(id) = released {
            self.release_engine(id);
        }
    }

    fn acquire(&self) -> Result<ActiveScan<'_>, ScanError> {
        let mut leases = self.leases.lock();
        if leases.active.is_some() {
            return Err(ScanError::AlreadyActive);
        }
        leases.issued += 1;
        let id = leases.issued;
        leases.active = Some(id);
        Ok(ActiveScan { session: self, id })
    }

    fn release(&self, id: u64) {
        let mut leases = self.leases.lock();
        if leases.active != Some(id) {
            return;
        }
        leases.active = None;
        drop(leases);
        self.release_engine(id);
    }

    fn release_engine(&self, id: u64) {
        self.engine.show_background();
        self.engine.stop_scan();
        debug!(lease = id, "scan session released");
    }
}

/// Lease held by a running `start`; releases the camera when dropped.
struct ActiveScan<'a> {
    session: &'a ScanSession,
    id: u64,
}

impl Drop for ActiveScan<'_> {
    fn drop(&mut self) {
        self.session.release(self.id);
    }
}
