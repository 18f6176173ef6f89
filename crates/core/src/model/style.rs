use serde::{Deserialize, Serialize};
use std::fmt;

/// Preferred way of taking in new material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningStyle {
    Visual,
    Auditory,
    Kinesthetic,
    #[default]
    Unknown,
}

impl LearningStyle {
    /// Short description suitable for a progress screen.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            LearningStyle::Visual => "You learn best through seeing and visual aids",
            LearningStyle::Auditory => "You learn best through listening and verbal communication",
            LearningStyle::Kinesthetic => "You learn best through hands-on activities and movement",
            LearningStyle::Unknown => "Complete an assessment to discover your learning style",
        }
    }
}

impl fmt::Display for LearningStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LearningStyle::Visual => "Visual",
            LearningStyle::Auditory => "Auditory",
            LearningStyle::Kinesthetic => "Kinesthetic",
            LearningStyle::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}
