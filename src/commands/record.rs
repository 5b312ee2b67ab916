//! The recording studio command.
//!
//! Wires the recording flow to its production collaborators (ffmpeg camera,
//! configured rep counter, upload sink, device permission probe) and drives
//! it from the terminal UI loop. Supports an external stop trigger via
//! SIGUSR1.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::assessment::AssessmentStore;
use crate::capture::FfmpegCamera;
use crate::commands::data_dir;
use crate::config::{CounterMode, KhelConfig};
use crate::counter::{CountCallback, MotionCounter, PacedCounter, RepCounter};
use crate::exercise::ExerciseId;
use crate::flow::{DeviceProbe, PermissionStatus, RecordingFlow, Stage};
use crate::ui::{ErrorScreen, RecordCommand, RecordTui, RecordView};
use crate::upload::{ArchiveUploadSink, HttpUploadSink, UploadSink};

/// Handles the recording studio flow.
///
/// Resolves permissions, then loops over input, frame sampling and
/// rendering until the user leaves the screen. Completed uploads are
/// recorded in the assessment history.
pub async fn handle_record() -> Result<(), anyhow::Error> {
    tracing::info!("=== khel Recording Studio Started ===");

    let config_data = match KhelConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err}");
            let error_message = format!(
                "Configuration Error:\n\n{err}\n\nPlease check your ~/.config/khel/khel.toml file and try again."
            );
            let mut error_screen = ErrorScreen::new()?;
            error_screen.show_error(&error_message)?;
            error_screen.cleanup()?;
            return Err(anyhow::anyhow!("Configuration error: {err}"));
        }
    };

    tracing::info!(
        "Configuration loaded: device={}, counter={}, sample_interval={}ms, op_timeout={}s",
        config_data.capture.device,
        config_data.counter.mode,
        config_data.capture.sample_interval_ms,
        config_data.capture.op_timeout_secs
    );

    let data_dir = data_dir()?;
    let mut assessments = AssessmentStore::new(&data_dir)?;

    let driver = FfmpegCamera::new(
        config_data.capture.device.clone(),
        if config_data.capture.audio_device.is_empty() {
            None
        } else {
            Some(config_data.capture.audio_device.clone())
        },
        config_data.capture.video_size.clone(),
        config_data.capture.framerate,
        config_data.capture.sample_width,
        config_data.capture.sample_height,
    );

    // Counter results come back through this channel so stale callbacks can
    // be dropped once the flow has left the recording state
    let (count_tx, mut count_rx) = tokio::sync::mpsc::unbounded_channel::<u32>();
    let callback: CountCallback = Box::new(move |count| {
        let _ = count_tx.send(count);
    });

    let counter: Box<dyn RepCounter + Send> = match config_data.counter.mode {
        CounterMode::Motion => Box::new(MotionCounter::new(callback)),
        CounterMode::Paced => Box::new(PacedCounter::new(callback)),
    };

    let sink: Box<dyn UploadSink + Send> = if config_data.upload.endpoint.is_empty() {
        Box::new(ArchiveUploadSink::new(data_dir.join("videos")))
    } else {
        Box::new(HttpUploadSink::new(config_data.upload.endpoint.clone()))
    };

    let mut flow = RecordingFlow::new(
        driver,
        counter,
        sink,
        Duration::from_secs(config_data.capture.op_timeout_secs),
    );

    // Permission gate: the state machine stays inert until this resolves
    let probe = DeviceProbe::new(config_data.capture.device.clone());
    if flow.resolve_permissions(&probe).await != PermissionStatus::Granted {
        tracing::error!("Camera/microphone access denied");
        let mut error_screen = ErrorScreen::new()?;
        error_screen.show_error(
            "No camera or microphone access.\n\nCheck that your capture device exists and is not in use, then try again.",
        )?;
        error_screen.cleanup()?;
        return Err(anyhow::anyhow!("Camera/microphone access denied"));
    }

    let mut tui = RecordTui::new()?;

    let stop_signal = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGUSR1, Arc::clone(&stop_signal))
        .map_err(|e| anyhow::anyhow!("Failed to register signal handler: {e}"))?;

    let sample_interval = Duration::from_millis(config_data.capture.sample_interval_ms);
    let mut last_sample = Instant::now();
    let mut recording_started: Option<Instant> = None;
    let mut notice: Option<String> = None;

    tracing::debug!("Entering recording loop");

    loop {
        // External stop trigger behaves like a stop press
        if stop_signal.swap(false, Ordering::Relaxed) && flow.stage() == Stage::Recording {
            tracing::info!("Received SIGUSR1: stopping recording via external trigger");
            if let Err(e) = flow.press_stop().await {
                notice = Some(format!("Recording failed: {e}"));
            }
            recording_started = None;
        }

        match tui.handle_input()? {
            RecordCommand::Continue => {}
            RecordCommand::ToggleRecord => match flow.stage() {
                Stage::Idle => {
                    notice = None;
                    match flow.press_record().await {
                        Ok(()) => {
                            if flow.stage() == Stage::Recording {
                                recording_started = Some(Instant::now());
                                last_sample = Instant::now();
                            }
                        }
                        Err(e) => {
                            notice = Some(format!("Could not start capture: {e}"));
                        }
                    }
                }
                Stage::Recording => {
                    if let Err(e) = flow.press_stop().await {
                        notice = Some(format!("Recording failed: {e}"));
                    }
                    recording_started = None;
                }
                Stage::Preview => {}
            },
            RecordCommand::Upload => {
                if flow.stage() == Stage::Preview {
                    if let Some(video) = flow.video() {
                        let video_path = video.to_string();
                        if let Err(e) = assessments.save_assessment(
                            flow.exercise(),
                            flow.rep_count(),
                            Some(&video_path),
                        ) {
                            tracing::warn!("Failed to record assessment: {e}");
                        }
                    }
                    flow.upload();
                    notice = Some("Assessment submitted".to_string());
                }
            }
            RecordCommand::Retake => {
                if flow.stage() == Stage::Preview {
                    flow.retake();
                    notice = None;
                }
            }
            RecordCommand::SelectPrev => {
                flow.select_exercise(neighbor(flow.exercise(), -1));
            }
            RecordCommand::SelectNext => {
                flow.select_exercise(neighbor(flow.exercise(), 1));
            }
            RecordCommand::Cancel => break,
        }

        // Fixed-period frame sampling, active only while recording
        if flow.stage() == Stage::Recording && last_sample.elapsed() >= sample_interval {
            flow.sample().await;
            last_sample = Instant::now();
        }

        // Apply counter callbacks; the flow drops any that arrive late
        while let Ok(count) = count_rx.try_recv() {
            flow.apply_count(count);
        }

        let view = RecordView {
            stage: flow.stage(),
            exercise: flow.exercise(),
            rep_count: flow.rep_count(),
            video: flow.video(),
            elapsed: recording_started
                .map(|start| start.elapsed())
                .unwrap_or_default(),
            notice: notice.clone(),
        };
        tui.render(&view)?;
    }

    // Leaving mid-session: shut the capture down and discard the take
    match flow.stage() {
        Stage::Recording => {
            if let Err(e) = flow.press_stop().await {
                tracing::warn!("Stop on exit failed: {e}");
            }
            flow.retake();
        }
        Stage::Preview => flow.retake(),
        Stage::Idle => {}
    }

    tui.cleanup()?;

    tracing::info!("=== khel Recording Studio Exited ===");
    Ok(())
}

/// Steps through the exercise catalog relative to the current selection.
fn neighbor(current: ExerciseId, step: i32) -> ExerciseId {
    let catalog = ExerciseId::all();
    let index = catalog.iter().position(|e| *e == current).unwrap_or(0) as i32;
    let next = (index + step).rem_euclid(catalog.len() as i32) as usize;
    catalog[next]
}
