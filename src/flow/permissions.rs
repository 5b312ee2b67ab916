//! Camera and microphone permission gate.
//!
//! Resolves combined camera + microphone access once at recording screen
//! entry. Denial is terminal for the session; the record controls stay inert
//! and the UI shows a blocking message. There is no retry loop.

use anyhow::{anyhow, Result};
use cpal::traits::HostTrait;

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Combined permission state for the recording screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionStatus {
    /// Not yet resolved; controls are inert
    #[default]
    Unknown,
    /// Camera and microphone both accessible
    Granted,
    /// At least one device inaccessible; terminal for the session
    Denied,
}

/// Result of a permission request: each device reported separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaPermissions {
    pub camera: bool,
    pub microphone: bool,
}

impl MediaPermissions {
    /// Both devices must be accessible for recording to proceed.
    pub fn granted(&self) -> bool {
        self.camera && self.microphone
    }
}

/// Contract for resolving media permissions at screen entry.
#[allow(async_fn_in_trait)]
pub trait PermissionProvider {
    async fn request(&self) -> Result<MediaPermissions>;
}

/// Resolves permissions by probing the actual devices.
///
/// There is no OS permission dialog in a terminal context; accessibility of
/// the device nodes is the practical equivalent. The camera check opens the
/// configured V4L2 node on Linux and defers to capture start elsewhere; the
/// microphone check asks cpal for a default input device.
pub struct DeviceProbe {
    camera_device: String,
}

impl DeviceProbe {
    pub fn new(camera_device: String) -> Self {
        Self { camera_device }
    }

    fn camera_accessible(&self) -> bool {
        if cfg!(target_os = "linux") {
            let node = if self.camera_device == "default" {
                "/dev/video0"
            } else {
                &self.camera_device
            };
            match std::fs::OpenOptions::new().read(true).open(node) {
                Ok(_) => true,
                Err(e) => {
                    tracing::warn!("Camera device {node} not accessible: {e}");
                    false
                }
            }
        } else {
            // macOS/Windows surface camera failures at capture start instead
            true
        }
    }

    fn microphone_accessible(&self) -> bool {
        let probe = suppress_alsa_warnings(|| {
            let host = cpal::default_host();
            Ok(host.default_input_device().is_some())
        });
        match probe {
            Ok(found) => {
                if !found {
                    tracing::warn!("No default audio input device found");
                }
                found
            }
            Err(e) => {
                tracing::warn!("Audio host probe failed: {e}");
                false
            }
        }
    }
}

impl PermissionProvider for DeviceProbe {
    async fn request(&self) -> Result<MediaPermissions> {
        let permissions = MediaPermissions {
            camera: self.camera_accessible(),
            microphone: self.microphone_accessible(),
        };
        tracing::info!(
            "Permissions resolved: camera={}, microphone={}",
            permissions.camera,
            permissions.microphone
        );
        Ok(permissions)
    }
}

/// Temporarily redirects stderr to /dev/null to suppress ALSA library warnings on Linux.
/// On non-Linux platforms, this is a no-op since ALSA doesn't exist.
#[cfg(target_os = "linux")]
fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let dev_null = OpenOptions::new()
        .write(true)
        .open("/dev/null")
        .map_err(|e| anyhow!("Failed to open /dev/null: {e}"))?;

    let dev_null_fd = dev_null.as_raw_fd();

    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return Err(anyhow!("Failed to duplicate stderr"));
    }

    let redirect_result = unsafe { libc::dup2(dev_null_fd, libc::STDERR_FILENO) };
    if redirect_result == -1 {
        unsafe { libc::close(old_stderr) };
        return Err(anyhow!("Failed to redirect stderr"));
    }

    let result = f();

    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

/// On non-Linux platforms, no stderr suppression is needed since ALSA doesn't exist.
#[cfg(not(target_os = "linux"))]
fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    f()
}
