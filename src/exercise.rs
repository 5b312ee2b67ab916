//! Exercise catalog definitions and metadata.
//!
//! Defines the fixed set of assessable exercises with their associated
//! display titles, descriptions and icons. The catalog is static and
//! immutable; selection happens on the recording screen.

use serde::{Deserialize, Serialize};

/// Represents a supported assessment exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExerciseId {
    /// Continuous push-ups
    Pushups,
    /// Abdominal crunches
    Situps,
    /// Maximum vertical jump
    Jump,
    /// Upper body pull-ups
    Pullups,
}

impl ExerciseId {
    /// Returns the exercise identifier as a string
    pub fn id(&self) -> &'static str {
        match self {
            ExerciseId::Pushups => "pushups",
            ExerciseId::Situps => "situps",
            ExerciseId::Jump => "jump",
            ExerciseId::Pullups => "pullups",
        }
    }

    /// Returns the display title shown on the recording screen
    pub fn title(&self) -> &'static str {
        match self {
            ExerciseId::Pushups => "Push-ups",
            ExerciseId::Situps => "Sit-ups",
            ExerciseId::Jump => "Vertical Jump",
            ExerciseId::Pullups => "Pull-ups",
        }
    }

    /// Returns a human-readable description of the exercise
    pub fn description(&self) -> &'static str {
        match self {
            ExerciseId::Pushups => "Record continuous push-ups",
            ExerciseId::Situps => "Record abdominal crunches",
            ExerciseId::Jump => "Record maximum jump height",
            ExerciseId::Pullups => "Record upper body strength",
        }
    }

    /// Returns the icon glyph used in the exercise list
    pub fn icon(&self) -> &'static str {
        match self {
            ExerciseId::Pushups => "⛨",
            ExerciseId::Situps => "⌄",
            ExerciseId::Jump => "↥",
            ExerciseId::Pullups => "⌃",
        }
    }

    /// Parses an exercise identifier from its string form
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "pushups" => Some(ExerciseId::Pushups),
            "situps" => Some(ExerciseId::Situps),
            "jump" => Some(ExerciseId::Jump),
            "pullups" => Some(ExerciseId::Pullups),
            _ => None,
        }
    }

    /// Returns the full exercise catalog in display order
    pub fn all() -> &'static [Self] {
        &[
            ExerciseId::Pushups,
            ExerciseId::Situps,
            ExerciseId::Jump,
            ExerciseId::Pullups,
        ]
    }
}

impl std::fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_id_round_trip() {
        for exercise in ExerciseId::all() {
            assert_eq!(ExerciseId::from_id(exercise.id()), Some(*exercise));
        }
    }

    #[test]
    fn test_unknown_id() {
        assert_eq!(ExerciseId::from_id("sprint"), None);
        assert_eq!(ExerciseId::from_id(""), None);
    }

    #[test]
    fn test_catalog_order() {
        let ids: Vec<&str> = ExerciseId::all().iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec!["pushups", "situps", "jump", "pullups"]);
    }
}
