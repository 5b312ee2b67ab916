//! Upload handoff for captured assessment videos.
//!
//! The recording flow hands a finished video to an upload sink as a
//! fire-and-forget notification; there is no acknowledgement contract.
//! `HttpUploadSink` posts to a configured endpoint, `ArchiveUploadSink`
//! files the video into the local data directory when no endpoint is set.

use chrono::Local;
use std::path::PathBuf;

use crate::capture::VideoHandle;
use crate::exercise::ExerciseId;

/// Receives finished assessment videos from the recording flow.
pub trait UploadSink {
    fn upload(&self, video: VideoHandle, exercise: ExerciseId, reps: u32);
}

impl UploadSink for Box<dyn UploadSink + Send> {
    fn upload(&self, video: VideoHandle, exercise: ExerciseId, reps: u32) {
        (**self).upload(video, exercise, reps);
    }
}

/// Posts videos to a remote assessment endpoint via multipart form data.
pub struct HttpUploadSink {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpUploadSink {
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }
}

impl UploadSink for HttpUploadSink {
    fn upload(&self, video: VideoHandle, exercise: ExerciseId, reps: u32) {
        let endpoint = self.endpoint.clone();
        let client = self.client.clone();

        tokio::spawn(async move {
            let video_data = match tokio::fs::read(video.path()).await {
                Ok(data) => data,
                Err(e) => {
                    tracing::error!("Failed to read video for upload: {e}");
                    return;
                }
            };

            let file_name = video
                .path()
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();

            let file_part = match reqwest::multipart::Part::bytes(video_data)
                .file_name(file_name)
                .mime_str("video/mp4")
            {
                Ok(part) => part,
                Err(e) => {
                    tracing::error!("Failed to build upload part: {e}");
                    return;
                }
            };

            let form = reqwest::multipart::Form::new()
                .part("video", file_part)
                .text("exercise", exercise.id().to_string())
                .text("reps", reps.to_string());

            tracing::debug!("Uploading {} assessment to {endpoint}", exercise.id());

            match client.post(&endpoint).multipart(form).send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::info!("Assessment video uploaded ({})", response.status());
                }
                Ok(response) => {
                    tracing::warn!("Upload endpoint returned {}", response.status());
                }
                Err(e) if e.is_connect() => {
                    tracing::warn!("Upload failed: could not connect to {endpoint}");
                }
                Err(e) if e.is_timeout() => {
                    tracing::warn!("Upload failed: request to {endpoint} timed out");
                }
                Err(e) => {
                    tracing::warn!("Upload failed: {e}");
                }
            }
        });
    }
}

/// Files videos into the local data directory instead of uploading.
pub struct ArchiveUploadSink {
    videos_dir: PathBuf,
}

impl ArchiveUploadSink {
    pub fn new(videos_dir: PathBuf) -> Self {
        Self { videos_dir }
    }
}

impl UploadSink for ArchiveUploadSink {
    fn upload(&self, video: VideoHandle, exercise: ExerciseId, reps: u32) {
        if let Err(e) = std::fs::create_dir_all(&self.videos_dir) {
            tracing::error!("Failed to create videos directory: {e}");
            return;
        }

        let stamp = Local::now().format("%Y%m%d-%H%M%S");
        let target = self
            .videos_dir
            .join(format!("khel-{}-{stamp}.mp4", exercise.id()));

        // Rename fails across filesystems; fall back to copy + remove
        let moved = std::fs::rename(video.path(), &target).or_else(|_| {
            std::fs::copy(video.path(), &target)
                .map(|_| ())
                .and_then(|()| std::fs::remove_file(video.path()))
        });

        match moved {
            Ok(()) => {
                tracing::info!(
                    "Archived {} assessment ({reps} reps) to {}",
                    exercise.id(),
                    target.display()
                );
            }
            Err(e) => {
                tracing::error!("Failed to archive video: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_moves_video_into_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("capture.mp4");
        std::fs::write(&source, b"not really a video").unwrap();

        let videos_dir = dir.path().join("videos");
        let sink = ArchiveUploadSink::new(videos_dir.clone());
        sink.upload(VideoHandle::new(source.clone()), ExerciseId::Pushups, 12);

        assert!(!source.exists());
        let archived: Vec<_> = std::fs::read_dir(&videos_dir).unwrap().collect();
        assert_eq!(archived.len(), 1);
        let name = archived[0].as_ref().unwrap().file_name();
        assert!(name.to_string_lossy().starts_with("khel-pushups-"));
    }
}
