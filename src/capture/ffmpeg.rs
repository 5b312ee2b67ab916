//! FFmpeg-backed camera capture.
//!
//! Records camera (and optionally microphone) input by driving an ffmpeg
//! child process. A single ffmpeg invocation produces two outputs: the
//! encoded video file, and a downscaled grayscale rawvideo stream on stdout
//! that feeds the live rep counter. A background reader keeps only the most
//! recent frame; `still_frame` hands it to the sampling loop.

use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};

use super::{CaptureDriver, CaptureError, Frame, VideoHandle};

/// How long to wait for ffmpeg to finalize the container after `q`.
const STOP_GRACE: Duration = Duration::from_secs(3);

/// How long to wait after spawn before declaring the capture started.
/// A device that is busy or missing makes ffmpeg exit within this window.
const START_PROBE: Duration = Duration::from_millis(500);

/// Locates the ffmpeg binary on the system.
///
/// Checks standard installation locations per platform before falling back
/// to a PATH search, so capture works even under a limited PATH.
pub fn find_ffmpeg() -> Result<PathBuf> {
    let candidates = if cfg!(target_os = "macos") {
        vec![
            PathBuf::from("/opt/homebrew/bin/ffmpeg"),
            PathBuf::from("/usr/local/bin/ffmpeg"),
            PathBuf::from("/usr/bin/ffmpeg"),
        ]
    } else if cfg!(target_os = "linux") {
        vec![
            PathBuf::from("/usr/bin/ffmpeg"),
            PathBuf::from("/usr/local/bin/ffmpeg"),
            PathBuf::from("/snap/bin/ffmpeg"),
        ]
    } else {
        vec![]
    };

    for path in candidates {
        if path.exists() {
            tracing::debug!("Found ffmpeg at: {}", path.display());
            return Ok(path);
        }
    }

    let search_cmd = if cfg!(target_os = "windows") { "where" } else { "which" };
    let output = std::process::Command::new(search_cmd)
        .arg("ffmpeg")
        .output()
        .map_err(|e| anyhow!("Failed to search PATH for ffmpeg: {e}"))?;

    if output.status.success() {
        let path_str = String::from_utf8_lossy(&output.stdout);
        let path = PathBuf::from(path_str.trim());
        if !path.as_os_str().is_empty() {
            tracing::debug!("Found ffmpeg in PATH at: {}", path.display());
            return Ok(path);
        }
    }

    Err(anyhow!(
        "ffmpeg not found. Please install ffmpeg:\n\
         macOS: brew install ffmpeg\n\
         Linux: apt install ffmpeg (Debian/Ubuntu) or dnf install ffmpeg (Fedora)"
    ))
}

/// Camera capture driver backed by an ffmpeg child process.
pub struct FfmpegCamera {
    /// Camera device: "default" or a device node / avfoundation index
    device: String,
    /// Optional audio input device (e.g. "default" for ALSA)
    audio_device: Option<String>,
    /// Recorded video size, e.g. "640x480"
    video_size: String,
    /// Recorded frame rate
    framerate: u32,
    /// Width of the downscaled sampling frames
    sample_width: u32,
    /// Height of the downscaled sampling frames
    sample_height: u32,
}

/// Live capture session handle, owned by the recording flow.
pub struct CameraSession {
    child: Child,
    video_path: PathBuf,
    latest_frame: Arc<Mutex<Option<Frame>>>,
    reader: tokio::task::JoinHandle<()>,
}

impl FfmpegCamera {
    pub fn new(
        device: String,
        audio_device: Option<String>,
        video_size: String,
        framerate: u32,
        sample_width: u32,
        sample_height: u32,
    ) -> Self {
        Self {
            device,
            audio_device,
            video_size,
            framerate,
            sample_width,
            sample_height,
        }
    }

    /// Resolves "default" to the platform's default camera input.
    fn resolve_device(&self) -> String {
        if self.device != "default" {
            return self.device.clone();
        }
        if cfg!(target_os = "macos") {
            "0:none".to_string()
        } else {
            "/dev/video0".to_string()
        }
    }

    /// Platform demuxer name for camera input.
    fn input_format() -> &'static str {
        if cfg!(target_os = "macos") {
            "avfoundation"
        } else if cfg!(target_os = "windows") {
            "dshow"
        } else {
            "v4l2"
        }
    }

    fn video_output_path() -> PathBuf {
        std::env::temp_dir().join(format!("khel-recording-{}.mp4", std::process::id()))
    }
}

impl CaptureDriver for FfmpegCamera {
    type Session = CameraSession;

    async fn start(&mut self) -> Result<CameraSession, CaptureError> {
        let ffmpeg_path =
            find_ffmpeg().map_err(|e| CaptureError::Device(e.to_string()))?;
        let device = self.resolve_device();
        let video_path = Self::video_output_path();

        tracing::info!("Capture device: {} ({})", device, Self::input_format());

        let mut cmd = Command::new(&ffmpeg_path);
        cmd.arg("-loglevel")
            .arg("error")
            .arg("-f")
            .arg(Self::input_format())
            .arg("-framerate")
            .arg(self.framerate.to_string())
            .arg("-video_size")
            .arg(&self.video_size)
            .arg("-i")
            .arg(&device);

        if let Some(audio) = &self.audio_device {
            if cfg!(target_os = "linux") {
                cmd.arg("-f").arg("alsa").arg("-i").arg(audio);
            }
        }

        // First output: the recorded video file
        cmd.arg("-map").arg("0:v");
        if self.audio_device.is_some() && cfg!(target_os = "linux") {
            cmd.arg("-map").arg("1:a");
        }
        cmd.arg("-y").arg(&video_path);

        // Second output: 2 fps grayscale sampling frames on stdout
        cmd.arg("-map")
            .arg("0:v")
            .arg("-vf")
            .arg(format!(
                "fps=2,scale={}:{}",
                self.sample_width, self.sample_height
            ))
            .arg("-pix_fmt")
            .arg("gray")
            .arg("-f")
            .arg("rawvideo")
            .arg("pipe:1");

        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        let mut child = cmd.spawn()?;

        // A busy or missing device makes ffmpeg exit almost immediately
        tokio::time::sleep(START_PROBE).await;
        if let Some(status) = child.try_wait()? {
            return Err(CaptureError::Device(format!(
                "ffmpeg exited at startup with {status} (device busy or unavailable?)"
            )));
        }

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CaptureError::Device("ffmpeg stdout unavailable".to_string()))?;

        let latest_frame: Arc<Mutex<Option<Frame>>> = Arc::new(Mutex::new(None));
        let frame_slot = Arc::clone(&latest_frame);
        let (width, height) = (self.sample_width, self.sample_height);
        let frame_len = (width * height) as usize;

        let reader = tokio::spawn(async move {
            let mut stdout = stdout;
            let mut buf = vec![0u8; frame_len];
            loop {
                match stdout.read_exact(&mut buf).await {
                    Ok(_) => {
                        *frame_slot.lock().unwrap() = Some(Frame {
                            width,
                            height,
                            luma: buf.clone(),
                        });
                    }
                    Err(_) => break,
                }
            }
            tracing::debug!("Frame reader finished");
        });

        tracing::debug!(
            "Capture started: {} at {} fps, sampling {}x{}",
            video_path.display(),
            self.framerate,
            width,
            height
        );

        Ok(CameraSession {
            child,
            video_path,
            latest_frame,
            reader,
        })
    }

    async fn stop(&mut self, mut session: CameraSession) -> Result<VideoHandle, CaptureError> {
        // Ask ffmpeg to finalize cleanly; fall back to kill if it hangs
        if let Some(mut stdin) = session.child.stdin.take() {
            let _ = stdin.write_all(b"q").await;
            let _ = stdin.flush().await;
        }

        match tokio::time::timeout(STOP_GRACE, session.child.wait()).await {
            Ok(Ok(status)) => {
                tracing::info!("Capture stopped: {status}");
            }
            Ok(Err(e)) => return Err(CaptureError::Process(e)),
            Err(_) => {
                tracing::warn!("ffmpeg did not exit within {STOP_GRACE:?}, killing");
                session.child.kill().await?;
            }
        }

        session.reader.abort();

        let metadata = std::fs::metadata(&session.video_path);
        match metadata {
            Ok(m) if m.len() > 0 => {
                tracing::info!(
                    "Video saved: {} ({} bytes)",
                    session.video_path.display(),
                    m.len()
                );
                Ok(VideoHandle::new(session.video_path))
            }
            _ => Err(CaptureError::NoVideo),
        }
    }

    async fn still_frame(
        &mut self,
        session: &mut CameraSession,
    ) -> Result<Option<Frame>, CaptureError> {
        Ok(session.latest_frame.lock().unwrap().take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_ffmpeg() {
        // Succeeds wherever ffmpeg is installed
        match find_ffmpeg() {
            Ok(path) => println!("Found ffmpeg at: {}", path.display()),
            Err(e) => println!("ffmpeg not found (expected on CI): {e}"),
        }
    }

    #[test]
    fn test_resolve_default_device() {
        let camera = FfmpegCamera::new(
            "default".to_string(),
            None,
            "640x480".to_string(),
            30,
            160,
            120,
        );
        let device = camera.resolve_device();
        assert!(!device.is_empty());
        assert_ne!(device, "default");
    }

    #[test]
    fn test_explicit_device_passthrough() {
        let camera = FfmpegCamera::new(
            "/dev/video2".to_string(),
            None,
            "640x480".to_string(),
            30,
            160,
            120,
        );
        assert_eq!(camera.resolve_device(), "/dev/video2");
    }
}
