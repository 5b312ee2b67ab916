//! Configuration management for khel.
//!
//! This module handles loading and saving application configuration from
//! TOML files stored in the user's config directory.

pub mod file;

pub use file::{CaptureConfig, CounterConfig, CounterMode, KhelConfig, UploadConfig};
