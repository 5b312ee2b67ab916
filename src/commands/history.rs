//! Assessment history viewer command.

use crate::assessment::{AssessmentStore, AssessmentViewer};
use crate::commands::data_dir;

/// Displays the assessment history viewer.
///
/// # Errors
/// - If the data directory cannot be determined
/// - If the assessment store fails to load entries
pub async fn handle_history() -> Result<(), anyhow::Error> {
    tracing::info!("=== khel History Viewer ===");

    let mut store = AssessmentStore::new(&data_dir()?)?;
    let entries = store.all_assessments()?;

    if entries.is_empty() {
        println!("No assessments recorded yet. Run 'khel' to record your first one.");
        return Ok(());
    }

    let mut viewer = AssessmentViewer::new(entries)?;
    viewer.run()?;

    tracing::debug!("History viewer closed");
    Ok(())
}
