//! Recording flow for khel.
//!
//! Owns exercise selection, the permission gate and the
//! idle → recording → preview state machine, and wires sampled frames into
//! the rep counter. Collaborators (capture driver, rep counter, upload sink,
//! permission provider) are injected, so the flow itself is backend-agnostic.

pub mod controller;
pub mod permissions;

pub use controller::{FlowError, RecordingFlow, Stage};
pub use permissions::{DeviceProbe, MediaPermissions, PermissionProvider, PermissionStatus};
