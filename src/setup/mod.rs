//! Setup module for initial application configuration.
//!
//! Handles first-run setup: writes the default config file and walks the
//! athlete through creating their local profile. Re-runs on version
//! upgrades so new config keys get their documented defaults.

pub mod version;

use anyhow::anyhow;
use cliclack::{input, intro, outro};
use console::style;

use crate::athlete::{Athlete, AthleteStore};

/// Embedded default configuration template.
const DEFAULT_CONFIG: &str = include_str!("../../environments/khel.toml");

/// Current application version from Cargo.toml
const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Runs the setup process.
///
/// Creates the config directory, writes the default config with a version
/// prefix, and seeds the athlete profile interactively when none exists.
///
/// # Errors
/// Returns an error if file operations fail or the prompts are cancelled.
pub fn run_setup() -> anyhow::Result<()> {
    let config_dir = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".config")
        .join("khel");
    std::fs::create_dir_all(&config_dir)?;

    let config_path = config_dir.join("khel.toml");
    let config_with_version = format!(r#"config_version = "{}""#, CURRENT_VERSION);
    let full_config = format!("{}\n{}", config_with_version, DEFAULT_CONFIG);
    std::fs::write(&config_path, full_config)?;

    let data_dir = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".local")
        .join("share")
        .join("khel");
    std::fs::create_dir_all(&data_dir)?;

    // Only prompt when no profile has been created yet
    if !data_dir.join("athlete.db").exists() {
        onboard_athlete(&data_dir)?;
    }

    Ok(())
}

/// Interactive first-run athlete onboarding.
///
/// Pressing Enter keeps the suggested value for each field.
fn onboard_athlete(data_dir: &std::path::Path) -> anyhow::Result<()> {
    ctrlc::set_handler(move || {}).ok();

    intro(style(" khel ").on_white().black())?;

    let defaults = Athlete::default();

    let name: String = input("Athlete name")
        .default_input(&defaults.name)
        .interact()
        .map_err(|e| anyhow!("Setup cancelled: {e}"))?;

    let age: String = input("Age")
        .default_input(&defaults.age.to_string())
        .validate(|value: &String| {
            value
                .parse::<u32>()
                .map(|_| ())
                .map_err(|_| "Please enter a number")
        })
        .interact()
        .map_err(|e| anyhow!("Setup cancelled: {e}"))?;

    let location: String = input("Location")
        .default_input(&defaults.location)
        .interact()
        .map_err(|e| anyhow!("Setup cancelled: {e}"))?;

    let sport: String = input("Primary sport")
        .default_input(&defaults.sport)
        .interact()
        .map_err(|e| anyhow!("Setup cancelled: {e}"))?;

    let athlete = Athlete {
        name,
        age: age.parse().unwrap_or(defaults.age),
        location,
        sport,
        ..defaults
    };

    let mut store = AthleteStore::new(data_dir)?;
    store.save(&athlete)?;

    outro("Profile ready. Run 'khel' to record your first assessment.")?;
    tracing::info!("Athlete profile created for {}", athlete.name);

    Ok(())
}
