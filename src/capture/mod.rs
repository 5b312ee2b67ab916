//! Video capture for khel.
//!
//! Defines the capture driver contract used by the recording flow, plus the
//! ffmpeg-backed camera implementation. The driver hands out an opaque
//! session handle on start; the handle is owned exclusively by the flow for
//! the lifetime of the recording and is consumed on stop.

pub mod ffmpeg;

pub use ffmpeg::{find_ffmpeg, FfmpegCamera};

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Errors surfaced by capture drivers.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The configured camera device could not be opened
    #[error("capture device unavailable: {0}")]
    Device(String),
    /// The capture process could not be spawned or failed mid-recording
    #[error("capture process error: {0}")]
    Process(#[from] std::io::Error),
    /// A start or stop call did not resolve within the configured deadline
    #[error("capture operation timed out after {0:?}")]
    Timeout(Duration),
    /// Recording stopped but produced no usable video file
    #[error("no video was produced")]
    NoVideo,
}

/// A single sampled camera frame: 8-bit luma plane plus dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub luma: Vec<u8>,
}

impl Frame {
    /// Mean luma over the whole frame, 0-255.
    pub fn mean_luma(&self) -> f32 {
        if self.luma.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.luma.iter().map(|&p| p as u64).sum();
        sum as f32 / self.luma.len() as f32
    }
}

/// Opaque reference to a captured video.
///
/// Produced by a successful stop; exists only while the flow is in preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoHandle {
    path: PathBuf,
}

impl VideoHandle {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Releases the captured video, deleting the backing file if present.
    pub fn discard(self) {
        if self.path.exists() {
            if let Err(e) = std::fs::remove_file(&self.path) {
                tracing::warn!("Failed to remove discarded video {}: {e}", self.path.display());
            } else {
                tracing::debug!("Discarded video {}", self.path.display());
            }
        }
    }
}

impl std::fmt::Display for VideoHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Contract between the recording flow and a camera backend.
///
/// `start` acquires the device and returns the opaque session handle;
/// `stop` consumes the handle and yields the captured video reference;
/// `still_frame` grabs the most recent sampled frame while recording.
/// All three suspend on the underlying driver; the flow enforces timeouts
/// and re-entrancy on top of this contract.
#[allow(async_fn_in_trait)]
pub trait CaptureDriver {
    type Session;

    async fn start(&mut self) -> Result<Self::Session, CaptureError>;

    async fn stop(&mut self, session: Self::Session) -> Result<VideoHandle, CaptureError>;

    async fn still_frame(
        &mut self,
        session: &mut Self::Session,
    ) -> Result<Option<Frame>, CaptureError>;
}
