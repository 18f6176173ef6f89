use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown subject: {raw}")]
pub struct ParseSubjectError {
    raw: String,
}

/// School subjects an assessment can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Subject {
    Mathematics,
    English,
    Science,
    SocialStudies,
    Arts,
}

impl Subject {
    /// Every subject, in display order.
    pub const ALL: [Subject; 5] = [
        Subject::Mathematics,
        Subject::English,
        Subject::Science,
        Subject::SocialStudies,
        Subject::Arts,
    ];

    /// Human-readable name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Subject::Mathematics => "Mathematics",
            Subject::English => "English",
            Subject::Science => "Science",
            Subject::SocialStudies => "Social Studies",
            Subject::Arts => "Arts",
        }
    }

    /// Curriculum standards a subject is reported against.
    #[must_use]
    pub fn standards(self) -> &'static [&'static str] {
        match self {
            Subject::Mathematics => &[
                "Number",
                "Pattern and Function",
                "Shape and Space",
                "Data Handling",
            ],
            Subject::English => &[
                "Reading",
                "Writing",
                "Speaking",
                "Listening",
                "Viewing",
                "Presenting",
            ],
            Subject::Science => &[
                "Living Things",
                "Materials and Matter",
                "Forces and Energy",
                "Earth and Space",
            ],
            Subject::SocialStudies => &[
                "Human Systems",
                "Social Organization",
                "Culture",
                "Time, Continuity and Change",
            ],
            Subject::Arts => &["Visual Arts", "Music", "Drama", "Dance"],
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Subject {
    type Err = ParseSubjectError;

    /// Accepts the display name or the camelCase / snake_case key, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "mathematics" | "math" | "maths" => Ok(Subject::Mathematics),
            "english" => Ok(Subject::English),
            "science" => Ok(Subject::Science),
            "socialstudies" => Ok(Subject::SocialStudies),
            "arts" | "art" => Ok(Subject::Arts),
            _ => Err(ParseSubjectError { raw: s.to_owned() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_subject_has_standards() {
        for subject in Subject::ALL {
            assert!(!subject.standards().is_empty(), "{subject} has no standards");
        }
        assert_eq!(Subject::English.standards().len(), 6);
        assert_eq!(Subject::Arts.standards(), &["Visual Arts", "Music", "Drama", "Dance"]);
    }

    #[test]
    fn parses_display_and_keys() {
        assert_eq!("Social Studies".parse::<Subject>().unwrap(), Subject::SocialStudies);
        assert_eq!("socialStudies".parse::<Subject>().unwrap(), Subject::SocialStudies);
        assert_eq!("social_studies".parse::<Subject>().unwrap(), Subject::SocialStudies);
        assert_eq!("MATH".parse::<Subject>().unwrap(), Subject::Mathematics);
        assert!("history".parse::<Subject>().is_err());
    }

    #[test]
    fn serializes_as_camel_case() {
        let json = serde_json::to_string(&Subject::SocialStudies).unwrap();
        assert_eq!(json, "\"socialStudies\"");
    }
}
