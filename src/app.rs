//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use crate::commands;
use crate::logging;
use anyhow::anyhow;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::process;

/// Checks if setup is needed (version mismatch or missing config) and runs setup if required.
///
/// This is called early in the startup sequence, before command handling.
/// It checks:
/// 1. If config file doesn't exist, runs full setup
/// 2. If config version is older than app version, runs setup and logs migration
/// 3. If config version matches app version, does nothing
async fn check_and_run_setup() -> Result<(), anyhow::Error> {
    let config_path = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".config")
        .join("khel")
        .join("khel.toml");

    let setup_needed = if config_path.exists() {
        crate::setup::version::check_setup_needed(&config_path)?
    } else {
        Some("none (first run)".to_string())
    };

    match setup_needed {
        Some(old_version) => {
            tracing::info!(
                "Setup needed - migrating from version {} to {}",
                old_version,
                env!("CARGO_PKG_VERSION")
            );
            crate::setup::run_setup().map_err(|e| {
                tracing::error!("Setup failed: {e}");
                anyhow!("Setup failed: {e}")
            })?;
            crate::setup::version::update_config_version(&config_path).map_err(|e| {
                tracing::error!("Failed to update config version: {e}");
                anyhow!("Failed to update config version: {e}")
            })?;
            tracing::info!(
                "Setup completed successfully - now at version {}",
                env!("CARGO_PKG_VERSION")
            );
        }
        None => {
            tracing::debug!("Config version up to date ({})", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

/// A terminal-based athletic talent assessment tool with live rep counting
#[derive(Parser)]
#[command(name = "khel")]
#[command(version)]
#[command(about = "\n\n ┃┏ ┃┓ ┏┓ ┃ \n ┛┗ ┛┗ ┗━ ┗┛")]
#[command(
    long_about = "\n\n ┃┏ ┃┓ ┏┓ ┃ \n ┛┗ ┛┗ ┗━ ┗┛\n\nA terminal-based athletic talent assessment tool. Record exercises with\nyour camera, count reps live, and track your performance over time.\n\nDEFAULT COMMAND:\n    If no command is specified, 'record' is used by default.\n\nEXAMPLES:\n    # Open the recording studio\n    $ khel\n    $ khel record\n\n    # Review your performance dashboard\n    $ khel dashboard\n\n    # See the national rankings\n    $ khel leaderboard\n\n    # Browse your completed assessments\n    $ khel history\n\n    # Edit configuration file\n    $ khel config"
)]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/khel/khel.toml\n    Data:               ~/.local/share/khel\n    Logs:               ~/.local/state/khel/khel.log.*"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record an exercise assessment with live rep counting (default)
    ///
    /// Select an exercise, press r to record and again to stop, then upload
    /// or retake from the preview.
    #[command(visible_alias = "r")]
    Record,

    /// View your performance dashboard
    ///
    /// Stats, monthly score trend and assigned tests.
    #[command(visible_alias = "d")]
    Dashboard,

    /// Browse the national leaderboard
    ///
    /// Filter by sport and toggle between rank and score ordering.
    #[command(visible_alias = "l")]
    Leaderboard,

    /// View achievements and badge progress
    #[command(visible_alias = "a")]
    Achievements,

    /// View and edit your athlete profile
    #[command(visible_alias = "p")]
    Profile,

    /// Browse your completed assessments
    ///
    /// Use arrow keys to navigate, Esc to exit.
    #[command(visible_alias = "h")]
    History,

    /// Open configuration file in your preferred editor
    ///
    /// Edit capture settings, counter mode, and upload options.
    /// Uses $EDITOR environment variable or falls back to nano/vim.
    #[command(visible_alias = "c")]
    Config,

    /// List available camera and audio input devices
    ///
    /// Shows device nodes and configurations to help configure
    /// the correct capture device in khel.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    /// Useful for troubleshooting issues.
    Logs,

    /// Generate shell completion script
    ///
    /// Generate completion script for your shell. Save the output to your
    /// shell's completion directory or source it directly.
    ///
    /// Examples:
    ///   khel completions bash > khel.bash
    ///   khel completions zsh > _khel
    ///   khel completions fish > khel.fish
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Exit Codes
/// - 0: Success
/// - 1: General error
/// - 2: Usage error (invalid arguments)
///
/// # Errors
/// - If setup fails
/// - If logging initialization fails
/// - If command execution fails (e.g., recording, history viewing)
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Handle commands that don't need logging or config setup
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "khel", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => {
            return match commands::handle_list_devices() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        Some(Commands::Logs) => {
            return match commands::handle_logs() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        _ => {}
    }

    // Initialize logging for all other commands
    logging::init_logging()?;

    // Check if setup is needed (version check or missing config)
    check_and_run_setup().await?;

    // Route to appropriate command handler
    match cli.command {
        None | Some(Commands::Record) => {
            commands::handle_record().await?;
        }
        Some(Commands::Dashboard) => {
            commands::handle_dashboard().await?;
        }
        Some(Commands::Leaderboard) => {
            commands::handle_leaderboard().await?;
        }
        Some(Commands::Achievements) => {
            commands::handle_achievements().await?;
        }
        Some(Commands::Profile) => {
            commands::handle_profile().await?;
        }
        Some(Commands::History) => {
            commands::handle_history().await?;
        }
        Some(Commands::Config) => {
            commands::handle_config()?;
        }
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
