//! Completed-assessment history.
//!
//! Every uploaded recording session becomes an assessment entry: exercise,
//! rep count, video reference and timestamp. Entries are persisted in
//! SQLite and browsable from the history screen.

pub mod storage;
pub mod ui;

pub use storage::{AssessmentEntry, AssessmentStore};
pub use ui::AssessmentViewer;
