//! Shared terminal UI pieces for khel.

pub mod error;
pub mod record;

pub use error::ErrorScreen;
pub use record::{RecordCommand, RecordTui, RecordView};

/// Logo rendered in screen headers and command output.
pub const LOGO: &str = " ┃┏ ┃┓ ┏┓ ┃ \n ┛┗ ┛┗ ┗━ ┗┛";
