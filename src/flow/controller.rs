//! The record/stop/preview state machine.
//!
//! States cycle idle → recording → preview → idle with no skipping. The
//! state enum carries its data: the recording state owns the opaque capture
//! session handle, the preview state owns the captured video reference, so
//! a video reference can only exist in preview.
//!
//! All transitions happen on the caller's task. The capture driver's start
//! and stop suspend; the flow commits a transition only after the awaited
//! call resolves, ignores re-entrant presses while one is outstanding, and
//! swaps the state out of recording before awaiting stop so that frame
//! sampling halts immediately.

use std::time::Duration;

use crate::capture::{CaptureDriver, CaptureError, VideoHandle};
use crate::counter::RepCounter;
use crate::exercise::ExerciseId;
use crate::upload::UploadSink;

use super::permissions::{PermissionProvider, PermissionStatus};

/// Errors surfaced by the recording flow.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// Camera/microphone access was denied; terminal for the session
    #[error("camera and microphone access denied")]
    PermissionDenied,
    /// Capture could not start; the flow stays in idle
    #[error("failed to start capture: {0}")]
    CaptureStart(#[source] CaptureError),
    /// Capture could not stop cleanly; the session is discarded
    #[error("failed to stop capture: {0}")]
    CaptureStop(#[source] CaptureError),
}

/// Display-only view of the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Recording,
    Preview,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Idle => write!(f, "idle"),
            Stage::Recording => write!(f, "recording"),
            Stage::Preview => write!(f, "preview"),
        }
    }
}

enum State<S> {
    Idle,
    Recording { session: S },
    Preview { video: VideoHandle },
}

/// Drives one assessment session from exercise selection through upload.
pub struct RecordingFlow<D: CaptureDriver, C: RepCounter, U: UploadSink> {
    driver: D,
    counter: C,
    uploads: U,
    exercise: ExerciseId,
    state: State<D::Session>,
    permission: PermissionStatus,
    rep_count: u32,
    /// An async start/stop is outstanding; further presses are ignored
    busy: bool,
    /// Deadline for a single capture start or stop call
    op_timeout: Duration,
}

impl<D: CaptureDriver, C: RepCounter, U: UploadSink> RecordingFlow<D, C, U> {
    pub fn new(driver: D, counter: C, uploads: U, op_timeout: Duration) -> Self {
        Self {
            driver,
            counter,
            uploads,
            exercise: ExerciseId::Pushups,
            state: State::Idle,
            permission: PermissionStatus::Unknown,
            rep_count: 0,
            busy: false,
            op_timeout,
        }
    }

    /// Resolves camera + microphone access once, at screen entry.
    ///
    /// Record/stop presses stay inert until this returns `Granted`.
    pub async fn resolve_permissions<P: PermissionProvider>(
        &mut self,
        provider: &P,
    ) -> PermissionStatus {
        self.permission = match provider.request().await {
            Ok(permissions) if permissions.granted() => PermissionStatus::Granted,
            Ok(permissions) => {
                tracing::warn!(
                    "Permission denied: camera={}, microphone={}",
                    permissions.camera,
                    permissions.microphone
                );
                PermissionStatus::Denied
            }
            Err(e) => {
                tracing::warn!("Permission request failed: {e}");
                PermissionStatus::Denied
            }
        };
        self.permission
    }

    /// Changes the selected exercise. Only honored while idle.
    pub fn select_exercise(&mut self, exercise: ExerciseId) {
        if matches!(self.state, State::Idle) && !self.busy {
            self.exercise = exercise;
        } else {
            tracing::debug!("Ignored exercise change outside idle");
        }
    }

    /// Handles a record press: starts capture and enters recording.
    ///
    /// Ignored unless idle with permissions granted and no start already
    /// outstanding. On failure the flow stays in idle with no session state
    /// left behind.
    pub async fn press_record(&mut self) -> Result<(), FlowError> {
        match self.permission {
            PermissionStatus::Granted => {}
            PermissionStatus::Denied => return Err(FlowError::PermissionDenied),
            PermissionStatus::Unknown => return Ok(()),
        }
        if self.busy || !matches!(self.state, State::Idle) {
            tracing::debug!("Ignored record press (busy or not idle)");
            return Ok(());
        }

        self.rep_count = 0;
        self.counter.reset();

        self.busy = true;
        let started = tokio::time::timeout(self.op_timeout, self.driver.start()).await;
        self.busy = false;

        match started {
            Ok(Ok(session)) => {
                tracing::info!("Recording started: {}", self.exercise.id());
                self.state = State::Recording { session };
                Ok(())
            }
            Ok(Err(e)) => {
                tracing::warn!("Capture start failed: {e}");
                Err(FlowError::CaptureStart(e))
            }
            Err(_) => {
                tracing::warn!("Capture start timed out after {:?}", self.op_timeout);
                Err(FlowError::CaptureStart(CaptureError::Timeout(self.op_timeout)))
            }
        }
    }

    /// Handles a stop press (or external stop signal): ends capture and
    /// enters preview with the produced video reference.
    ///
    /// The state leaves recording before the driver is awaited, so sampling
    /// halts immediately. A stop failure is fatal to the session: the flow
    /// reverts to idle and any partial video is discarded by the driver.
    pub async fn press_stop(&mut self) -> Result<(), FlowError> {
        if self.busy {
            tracing::debug!("Ignored stop press while an operation is outstanding");
            return Ok(());
        }
        let session = match std::mem::replace(&mut self.state, State::Idle) {
            State::Recording { session } => session,
            other => {
                self.state = other;
                return Ok(());
            }
        };

        self.busy = true;
        let stopped = tokio::time::timeout(self.op_timeout, self.driver.stop(session)).await;
        self.busy = false;

        match stopped {
            Ok(Ok(video)) => {
                tracing::info!("Recording stopped: {video}");
                self.state = State::Preview { video };
                Ok(())
            }
            Ok(Err(e)) => {
                tracing::error!("Capture stop failed, discarding session: {e}");
                self.rep_count = 0;
                self.counter.reset();
                Err(FlowError::CaptureStop(e))
            }
            Err(_) => {
                tracing::error!("Capture stop timed out after {:?}", self.op_timeout);
                self.rep_count = 0;
                self.counter.reset();
                Err(FlowError::CaptureStop(CaptureError::Timeout(self.op_timeout)))
            }
        }
    }

    /// One sampling tick: grabs a still frame and forwards it to the rep
    /// counter. A no-op outside the recording state.
    pub async fn sample(&mut self) {
        let State::Recording { session } = &mut self.state else {
            return;
        };
        match self.driver.still_frame(session).await {
            Ok(Some(frame)) => self.counter.process_frame(&frame),
            Ok(None) => {}
            Err(e) => tracing::warn!("Frame sampling failed: {e}"),
        }
    }

    /// Applies a count reported by the rep counter.
    ///
    /// Counts arriving after the state has left recording are dropped, so a
    /// callback pending at stop time cannot change the displayed count.
    /// Within a session the count never regresses.
    pub fn apply_count(&mut self, count: u32) {
        if matches!(self.state, State::Recording { .. }) {
            if count > self.rep_count {
                self.rep_count = count;
            }
        } else {
            tracing::debug!("Dropped stale count {count} outside recording");
        }
    }

    /// Discards the preview video and returns to idle for another attempt.
    pub fn retake(&mut self) {
        if !matches!(self.state, State::Preview { .. }) {
            return;
        }
        if let State::Preview { video } = std::mem::replace(&mut self.state, State::Idle) {
            video.discard();
            self.rep_count = 0;
            self.counter.reset();
            tracing::info!("Retake: session discarded");
        }
    }

    /// Hands the preview video to the upload sink and returns to idle.
    ///
    /// The handoff is a fire-and-forget notification; the session is
    /// discarded regardless of the upload's eventual outcome.
    pub fn upload(&mut self) {
        if !matches!(self.state, State::Preview { .. }) {
            return;
        }
        if let State::Preview { video } = std::mem::replace(&mut self.state, State::Idle) {
            tracing::info!("Uploading {video} ({} reps)", self.rep_count);
            self.uploads.upload(video, self.exercise, self.rep_count);
            self.rep_count = 0;
            self.counter.reset();
        }
    }

    pub fn stage(&self) -> Stage {
        match self.state {
            State::Idle => Stage::Idle,
            State::Recording { .. } => Stage::Recording,
            State::Preview { .. } => Stage::Preview,
        }
    }

    pub fn exercise(&self) -> ExerciseId {
        self.exercise
    }

    pub fn rep_count(&self) -> u32 {
        self.rep_count
    }

    pub fn permission(&self) -> PermissionStatus {
        self.permission
    }

    /// The captured video reference; `Some` only in preview.
    pub fn video(&self) -> Option<&VideoHandle> {
        match &self.state {
            State::Preview { video } => Some(video),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Frame;
    use crate::flow::permissions::MediaPermissions;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct DriverLog {
        starts: u32,
        stops: u32,
        frames_served: u32,
    }

    struct MockDriver {
        fail_start: bool,
        fail_stop: bool,
        hang_start: bool,
        video: &'static str,
        log: Arc<Mutex<DriverLog>>,
    }

    impl MockDriver {
        fn ok(video: &'static str) -> (Self, Arc<Mutex<DriverLog>>) {
            let log = Arc::new(Mutex::new(DriverLog::default()));
            (
                Self {
                    fail_start: false,
                    fail_stop: false,
                    hang_start: false,
                    video,
                    log: Arc::clone(&log),
                },
                log,
            )
        }

        fn failing_start() -> Self {
            Self {
                fail_start: true,
                fail_stop: false,
                hang_start: false,
                video: "unused",
                log: Arc::new(Mutex::new(DriverLog::default())),
            }
        }

        fn failing_stop() -> Self {
            Self {
                fail_start: false,
                fail_stop: true,
                hang_start: false,
                video: "unused",
                log: Arc::new(Mutex::new(DriverLog::default())),
            }
        }

        fn hanging_start() -> Self {
            Self {
                fail_start: false,
                fail_stop: false,
                hang_start: true,
                video: "unused",
                log: Arc::new(Mutex::new(DriverLog::default())),
            }
        }
    }

    impl CaptureDriver for MockDriver {
        type Session = ();

        async fn start(&mut self) -> Result<(), CaptureError> {
            if self.hang_start {
                std::future::pending::<()>().await;
            }
            self.log.lock().unwrap().starts += 1;
            if self.fail_start {
                Err(CaptureError::Device("device busy".to_string()))
            } else {
                Ok(())
            }
        }

        async fn stop(&mut self, _session: ()) -> Result<VideoHandle, CaptureError> {
            self.log.lock().unwrap().stops += 1;
            if self.fail_stop {
                Err(CaptureError::NoVideo)
            } else {
                Ok(VideoHandle::new(PathBuf::from(self.video)))
            }
        }

        async fn still_frame(&mut self, _session: &mut ()) -> Result<Option<Frame>, CaptureError> {
            self.log.lock().unwrap().frames_served += 1;
            Ok(Some(Frame {
                width: 2,
                height: 2,
                luma: vec![128; 4],
            }))
        }
    }

    #[derive(Default)]
    struct CounterLog {
        frames: u32,
        resets: u32,
    }

    struct MockCounter {
        log: Arc<Mutex<CounterLog>>,
    }

    impl MockCounter {
        fn new() -> (Self, Arc<Mutex<CounterLog>>) {
            let log = Arc::new(Mutex::new(CounterLog::default()));
            (Self { log: Arc::clone(&log) }, log)
        }
    }

    impl RepCounter for MockCounter {
        fn process_frame(&mut self, _frame: &Frame) {
            self.log.lock().unwrap().frames += 1;
        }

        fn reset(&mut self) {
            self.log.lock().unwrap().resets += 1;
        }
    }

    #[derive(Clone)]
    struct MockSink {
        uploads: Arc<Mutex<Vec<(String, ExerciseId, u32)>>>,
    }

    impl MockSink {
        fn new() -> Self {
            Self {
                uploads: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl UploadSink for MockSink {
        fn upload(&self, video: VideoHandle, exercise: ExerciseId, reps: u32) {
            self.uploads
                .lock()
                .unwrap()
                .push((video.to_string(), exercise, reps));
        }
    }

    struct Grant(bool);

    impl PermissionProvider for Grant {
        async fn request(&self) -> anyhow::Result<MediaPermissions> {
            Ok(MediaPermissions {
                camera: self.0,
                microphone: self.0,
            })
        }
    }

    const OP_TIMEOUT: Duration = Duration::from_secs(10);

    async fn granted_flow(
        driver: MockDriver,
    ) -> (
        RecordingFlow<MockDriver, MockCounter, MockSink>,
        Arc<Mutex<CounterLog>>,
        MockSink,
    ) {
        let (counter, counter_log) = MockCounter::new();
        let sink = MockSink::new();
        let mut flow = RecordingFlow::new(driver, counter, sink.clone(), OP_TIMEOUT);
        flow.resolve_permissions(&Grant(true)).await;
        (flow, counter_log, sink)
    }

    #[tokio::test]
    async fn test_exercise_selection_only_in_idle() {
        let (driver, _) = MockDriver::ok("video-1");
        let (mut flow, _, _) = granted_flow(driver).await;

        flow.select_exercise(ExerciseId::Situps);
        assert_eq!(flow.exercise(), ExerciseId::Situps);

        flow.press_record().await.unwrap();
        flow.select_exercise(ExerciseId::Jump);
        assert_eq!(flow.exercise(), ExerciseId::Situps);

        flow.press_stop().await.unwrap();
        flow.select_exercise(ExerciseId::Pullups);
        assert_eq!(flow.exercise(), ExerciseId::Situps);

        flow.retake();
        flow.select_exercise(ExerciseId::Pullups);
        assert_eq!(flow.exercise(), ExerciseId::Pullups);
    }

    #[tokio::test]
    async fn test_count_zero_on_entering_recording_and_after_retake() {
        let (driver, _) = MockDriver::ok("video-1");
        let (mut flow, counter_log, _) = granted_flow(driver).await;

        flow.press_record().await.unwrap();
        assert_eq!(flow.rep_count(), 0);
        assert_eq!(counter_log.lock().unwrap().resets, 1);

        flow.apply_count(7);
        assert_eq!(flow.rep_count(), 7);

        flow.press_stop().await.unwrap();
        flow.retake();
        assert_eq!(flow.rep_count(), 0);
        assert_eq!(counter_log.lock().unwrap().resets, 2);
    }

    #[tokio::test]
    async fn test_stale_count_after_leaving_recording_is_dropped() {
        let (driver, _) = MockDriver::ok("video-1");
        let (mut flow, _, _) = granted_flow(driver).await;

        flow.press_record().await.unwrap();
        flow.apply_count(3);
        flow.press_stop().await.unwrap();
        assert_eq!(flow.stage(), Stage::Preview);

        // A callback that was pending at stop time arrives late
        flow.apply_count(4);
        assert_eq!(flow.rep_count(), 3);

        flow.retake();
        flow.apply_count(5);
        assert_eq!(flow.rep_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_start_reverts_to_idle_without_side_effects() {
        let (mut flow, _, _) = granted_flow(MockDriver::failing_start()).await;

        let err = flow.press_record().await.unwrap_err();
        assert!(matches!(err, FlowError::CaptureStart(_)));
        assert_eq!(flow.stage(), Stage::Idle);
        assert_eq!(flow.rep_count(), 0);
        assert!(flow.video().is_none());
    }

    #[tokio::test]
    async fn test_video_reference_exists_only_in_preview() {
        let (driver, _) = MockDriver::ok("video-1");
        let (mut flow, _, _) = granted_flow(driver).await;

        assert!(flow.video().is_none());
        flow.press_record().await.unwrap();
        assert!(flow.video().is_none());
        flow.press_stop().await.unwrap();
        assert!(flow.video().is_some());
    }

    #[tokio::test]
    async fn test_record_stop_retake_scenario() {
        let (driver, _) = MockDriver::ok("video-1");
        let (mut flow, _, _) = granted_flow(driver).await;

        flow.press_record().await.unwrap();
        assert_eq!(flow.stage(), Stage::Recording);
        assert_eq!(flow.rep_count(), 0);

        flow.press_stop().await.unwrap();
        assert_eq!(flow.stage(), Stage::Preview);
        assert_eq!(flow.video().unwrap().to_string(), "video-1");

        flow.retake();
        assert_eq!(flow.stage(), Stage::Idle);
        assert!(flow.video().is_none());
        assert_eq!(flow.rep_count(), 0);
    }

    #[tokio::test]
    async fn test_counts_progress_across_sampling_ticks() {
        let (driver, driver_log) = MockDriver::ok("video-1");
        let (mut flow, counter_log, _) = granted_flow(driver).await;

        flow.press_record().await.unwrap();
        for reported in 1..=3u32 {
            flow.sample().await;
            flow.apply_count(reported);
            assert_eq!(flow.rep_count(), reported);
        }
        assert_eq!(driver_log.lock().unwrap().frames_served, 3);
        assert_eq!(counter_log.lock().unwrap().frames, 3);
    }

    #[tokio::test]
    async fn test_sampling_is_inert_outside_recording() {
        let (driver, driver_log) = MockDriver::ok("video-1");
        let (mut flow, counter_log, _) = granted_flow(driver).await;

        flow.sample().await;
        flow.press_record().await.unwrap();
        flow.press_stop().await.unwrap();
        flow.sample().await;
        flow.retake();
        flow.sample().await;

        assert_eq!(driver_log.lock().unwrap().frames_served, 0);
        assert_eq!(counter_log.lock().unwrap().frames, 0);
    }

    #[tokio::test]
    async fn test_record_press_ignored_while_recording() {
        let (driver, driver_log) = MockDriver::ok("video-1");
        let (mut flow, _, _) = granted_flow(driver).await;

        flow.press_record().await.unwrap();
        flow.press_record().await.unwrap();
        assert_eq!(driver_log.lock().unwrap().starts, 1);
    }

    #[tokio::test]
    async fn test_stop_press_ignored_in_idle_and_preview() {
        let (driver, driver_log) = MockDriver::ok("video-1");
        let (mut flow, _, _) = granted_flow(driver).await;

        flow.press_stop().await.unwrap();
        assert_eq!(flow.stage(), Stage::Idle);

        flow.press_record().await.unwrap();
        flow.press_stop().await.unwrap();
        flow.press_stop().await.unwrap();
        assert_eq!(flow.stage(), Stage::Preview);
        assert_eq!(driver_log.lock().unwrap().stops, 1);
    }

    #[tokio::test]
    async fn test_permission_denied_keeps_controls_inert() {
        let (driver, driver_log) = MockDriver::ok("video-1");
        let (counter, _) = MockCounter::new();
        let mut flow = RecordingFlow::new(driver, counter, MockSink::new(), OP_TIMEOUT);

        // Unresolved permissions: press silently ignored
        flow.press_record().await.unwrap();
        assert_eq!(flow.stage(), Stage::Idle);

        flow.resolve_permissions(&Grant(false)).await;
        assert_eq!(flow.permission(), PermissionStatus::Denied);
        let err = flow.press_record().await.unwrap_err();
        assert!(matches!(err, FlowError::PermissionDenied));
        assert_eq!(flow.stage(), Stage::Idle);
        assert_eq!(driver_log.lock().unwrap().starts, 0);
    }

    #[tokio::test]
    async fn test_stop_failure_discards_session() {
        let (mut flow, _, _) = granted_flow(MockDriver::failing_stop()).await;

        flow.press_record().await.unwrap();
        flow.apply_count(5);
        let err = flow.press_stop().await.unwrap_err();
        assert!(matches!(err, FlowError::CaptureStop(_)));
        assert_eq!(flow.stage(), Stage::Idle);
        assert!(flow.video().is_none());
        assert_eq!(flow.rep_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_that_never_resolves_times_out() {
        let (mut flow, _, _) = granted_flow(MockDriver::hanging_start()).await;

        let err = flow.press_record().await.unwrap_err();
        assert!(matches!(
            err,
            FlowError::CaptureStart(CaptureError::Timeout(_))
        ));
        assert_eq!(flow.stage(), Stage::Idle);
    }

    #[tokio::test]
    async fn test_retake_and_upload_are_inert_outside_preview() {
        let (driver, _) = MockDriver::ok("video-1");
        let (mut flow, _, sink) = granted_flow(driver).await;

        flow.retake();
        flow.upload();
        assert_eq!(flow.stage(), Stage::Idle);

        flow.press_record().await.unwrap();
        flow.retake();
        flow.upload();
        assert_eq!(flow.stage(), Stage::Recording);
        assert!(sink.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_notifies_sink_and_resets() {
        let (driver, _) = MockDriver::ok("video-1");
        let (mut flow, counter_log, sink) = granted_flow(driver).await;

        flow.select_exercise(ExerciseId::Pullups);
        flow.press_record().await.unwrap();
        flow.apply_count(9);
        flow.press_stop().await.unwrap();
        flow.upload();

        assert_eq!(flow.stage(), Stage::Idle);
        assert!(flow.video().is_none());
        assert_eq!(flow.rep_count(), 0);
        assert_eq!(counter_log.lock().unwrap().resets, 2);

        let uploads = sink.uploads.lock().unwrap();
        assert_eq!(
            uploads.as_slice(),
            &[("video-1".to_string(), ExerciseId::Pullups, 9)]
        );
    }
}
