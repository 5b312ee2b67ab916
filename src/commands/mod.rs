//! Application command handlers for khel.
//!
//! This module organizes command handling into separate submodules, each responsible for a specific
//! application command (recording, dashboard, profile, history viewing).
//!
//! # Commands
//! - `record`: Exercise recording with live rep counting (default)
//! - `dashboard`: Performance stats and score trend
//! - `leaderboard`: National rankings with sport filter
//! - `achievements`: Badge list with category filter
//! - `profile`: View and edit the athlete profile
//! - `history`: Completed-assessment history viewer
//! - `config`: Open configuration file in user's preferred editor
//! - `list_devices`: List available camera and audio input devices
//! - `logs`: Display recent log entries

pub mod achievements;
pub mod config;
pub mod dashboard;
pub mod history;
pub mod leaderboard;
pub mod list_devices;
pub mod logs;
pub mod profile;
pub mod record;

pub use achievements::handle_achievements;
pub use config::handle_config;
pub use dashboard::handle_dashboard;
pub use history::handle_history;
pub use leaderboard::handle_leaderboard;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use profile::handle_profile;
pub use record::handle_record;

use std::path::PathBuf;

/// Data directory for profile, history and archived videos.
pub(crate) fn data_dir() -> Result<PathBuf, anyhow::Error> {
    let dir = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
        .join(".local")
        .join("share")
        .join("khel");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
