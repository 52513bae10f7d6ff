#[cfg(test)]
mod tests {
    use super::super::error::ScanError;
    use super::super::scan::{ScanOutcome, ScanSession};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use qr_checkin_sdk::{CameraEngine, CameraError, CameraPermission, Identifier, Symbology};
    use std::collections::VecDeque;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    enum Capture {
        Content(&'static str),
        Nothing,
        Fail,
        Hang,
    }

    #[derive(Default)]
    struct EngineState {
        captures: VecDeque<Capture>,
        background_hidden: bool,
        prepared: u32,
        stopped: u32,
        formats: Vec<Vec<Symbology>>,
    }

    // Camera engine replaying scripted captures
    #[derive(Default)]
    struct ScriptedEngine {
        state: Mutex<EngineState>,
    }

    impl ScriptedEngine {
        fn with(captures: impl IntoIterator<Item = Capture>) -> Arc<Self> {
            let engine = Self::default();
            engine.state.lock().captures = captures.into_iter().collect();
            Arc::new(engine)
        }

        fn background_hidden(&self) -> bool {
            self.state.lock().background_hidden
        }

        fn stopped(&self) -> u32 {
            self.state.lock().stopped
        }
    }

    #[async_trait]
    impl CameraEngine for ScriptedEngine {
        fn prepare(&self) {
            self.state.lock().prepared += 1;
        }

        async fn check_permission(&self, _force: bool) -> Result<CameraPermission, CameraError> {
            Ok(CameraPermission::Granted)
        }

        async fn open_app_settings(&self) -> Result<(), CameraError> {
            Ok(())
        }

        fn hide_background(&self) {
            self.state.lock().background_hidden = true;
        }

        fn show_background(&self) {
            self.state.lock().background_hidden = false;
        }

        async fn start_scan(&self, formats: &[Symbology]) -> Result<Option<String>, CameraError> {
            let capture = {
                let mut state = self.state.lock();
                state.formats.push(formats.to_vec());
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
            self.state.lock().stopped += 1;
        }
    }

    async fn wait_until_active(session: &ScanSession) {
        while !session.is_active() {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_decoded_capture_releases_camera() {
        let engine = ScriptedEngine::with([Capture::Content("  42 ")]);
        let session = ScanSession::new(engine.clone());

        let outcome = session
            .start(Symbology::QrCode, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome, ScanOutcome::Decoded(Identifier::parse("42").unwrap()));
        assert!(!session.is_active());
        assert!(!engine.background_hidden());
        assert_eq!(engine.stopped(), 1);
        let state = engine.state.lock();
        assert_eq!(state.prepared, 1);
        assert_eq!(state.formats, vec![vec![Symbology::QrCode]]);
    }

    #[tokio::test]
    async fn test_blank_content_is_rejected() {
        let engine = ScriptedEngine::with([Capture::Content(" \n")]);
        let session = ScanSession::new(engine.clone());

        let outcome = session
            .start(Symbology::QrCode, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ScanOutcome::Rejected {
                raw: " \n".to_owned()
            }
        );
        assert!(!session.is_active());
    }

    #[tokio::test]
    async fn test_empty_capture_yields_no_content() {
        let engine = ScriptedEngine::with([Capture::Nothing]);
        let session = ScanSession::new(engine.clone());

        let outcome = session
            .start(Symbology::QrCode, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome, ScanOutcome::NoContent);
        assert!(!engine.background_hidden());
    }

    #[tokio::test]
    async fn test_engine_failure_still_releases_camera() {
        let engine = ScriptedEngine::with([Capture::Fail]);
        let session = ScanSession::new(engine.clone());

        let result = session
            .start(Symbology::QrCode, &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(ScanError::Camera(_))));
        assert!(!session.is_active());
        assert!(!engine.background_hidden());
        assert_eq!(engine.stopped(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_capture_yields_no_content() {
        let engine = ScriptedEngine::with([Capture::Hang]);
        let session = Arc::new(ScanSession::new(engine.clone()));
        let token = CancellationToken::new();

        let task = {
            let session = session.clone();
            let token = token.clone();
            tokio::spawn(async move { session.start(Symbology::QrCode, &token).await })
        };
        wait_until_active(&session).await;
        assert!(engine.background_hidden());

        token.cancel();
        let outcome = task.await.unwrap().unwrap();

        assert_eq!(outcome, ScanOutcome::NoContent);
        assert!(!session.is_active());
        assert!(!engine.background_hidden());
    }

    #[tokio::test]
    async fn test_cancelled_token_never_takes_the_camera() {
        let engine = ScriptedEngine::with([Capture::Hang, Capture::Content("7")]);
        let session = Arc::new(ScanSession::new(engine.clone()));
        let token = CancellationToken::new();

        let task = {
            let session = session.clone();
            let token = token.clone();
            tokio::spawn(async move { session.start(Symbology::QrCode, &token).await })
        };
        wait_until_active(&session).await;

        let cancelled = CancellationToken::new();
        cancelled.cancel();
        let late = session.start(Symbology::QrCode, &cancelled).await;

        assert_eq!(late, Ok(ScanOutcome::NoContent));
        assert!(session.is_active());
        assert!(engine.background_hidden());
        assert_eq!(engine.state.lock().prepared, 1);

        token.cancel();
        task.await.unwrap().unwrap();
        assert!(!session.is_active());
        assert_eq!(engine.stopped(), 1);
    }

    #[tokio::test]
    async fn test_second_start_while_active_is_refused() {
        let engine = ScriptedEngine::with([Capture::Hang, Capture::Content("7")]);
        let session = Arc::new(ScanSession::new(engine.clone()));
        let token = CancellationToken::new();

        let task = {
            let session = session.clone();
            let token = token.clone();
            tokio::spawn(async move { session.start(Symbology::QrCode, &token).await })
        };
        wait_until_active(&session).await;

        let second = session
            .start(Symbology::QrCode, &CancellationToken::new())
            .await;
        assert_eq!(second, Err(ScanError::AlreadyActive));
        // The refused start must not release the running capture
        assert!(session.is_active());
        assert!(engine.background_hidden());

        token.cancel();
        task.await.unwrap().unwrap();
        assert!(!session.is_active());
    }

    #[tokio::test]
    async fn test_dropped_capture_releases_camera() {
        let engine = ScriptedEngine::with([Capture::Hang]);
        let session = Arc::new(ScanSession::new(engine.clone()));

        let task = {
            let session = session.clone();
            tokio::spawn(async move {
                session
                    .start(Symbology::QrCode, &CancellationToken::new())
                    .await
            })
        };
        wait_until_active(&session).await;

        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());

        assert!(!session.is_active());
        assert!(!engine.background_hidden());
        assert_eq!(engine.stopped(), 1);
    }

    #[tokio::test]
    async fn test_stop_then_late_release_keeps_new_capture() {
        let engine = ScriptedEngine::with([Capture::Hang, Capture::Hang]);
        let session = Arc::new(ScanSession::new(engine.clone()));
        let spawn_capture = |token: CancellationToken| {
            let session = session.clone();
            tokio::spawn(async move { session.start(Symbology::QrCode, &token).await })
        };

        let first = spawn_capture(CancellationToken::new());
        wait_until_active(&session).await;

        session.stop();
        assert!(!session.is_active());
        assert!(!engine.background_hidden());
        assert_eq!(engine.stopped(), 1);

        let token = CancellationToken::new();
        let second = spawn_capture(token.clone());
        wait_until_active(&session).await;

        // The first capture unwinding must not touch the second lease
        first.abort();
        let _ = first.await;
        assert!(session.is_active());
        assert!(engine.background_hidden());
        assert_eq!(engine.stopped(), 1);

        token.cancel();
        assert_eq!(second.await.unwrap().unwrap(), ScanOutcome::NoContent);
        assert!(!session.is_active());
        assert_eq!(engine.stopped(), 2);
    }

    #[test]
    fn test_stop_without_session_is_noop() {
        let engine = ScriptedEngine::with([]);
        let session = ScanSession::new(engine.clone());

        session.stop();

        assert_eq!(engine.stopped(), 0);
        assert!(!session.is_active());
    }
}
