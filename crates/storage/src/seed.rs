//! Built-in sample content: a small question bank and starter learning plans.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tutor_core::model::{
    Difficulty, FocusArea, LearningActivity, MasteryLevel, PlanError, Question, QuestionError,
    ResourceType, Subject, SubjectPlan, WeeklyGoal,
};
use tutor_core::time::one_week_after;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SeedError {
    #[error("invalid seed question: {0}")]
    Question(#[from] QuestionError),
    #[error("invalid seed plan: {0}")]
    Plan(#[from] PlanError),
}

//
// ─── QUESTION BANK ─────────────────────────────────────────────────────────────
//

struct QuestionSeed {
    text: &'static str,
    options: &'static [&'static str],
    correct: usize,
    explanation: &'static str,
    difficulty: Difficulty,
    skill: &'static str,
}

const MATHEMATICS: &[QuestionSeed] = &[
    QuestionSeed {
        text: "What is the sum of 345 and 267?",
        options: &["612", "622", "632", "642"],
        correct: 0,
        explanation: "To add 345 and 267, add the ones, tens, and hundreds places separately.",
        difficulty: Difficulty::Intermediate,
        skill: "Number Operations",
    },
    QuestionSeed {
        text: "If a rectangle has a length of 8 units and a width of 5 units, what is its area?",
        options: &["13 square units", "26 square units", "40 square units", "45 square units"],
        correct: 2,
        explanation: "Area of a rectangle = length × width = 8 × 5 = 40 square units",
        difficulty: Difficulty::Intermediate,
        skill: "Geometry",
    },
    QuestionSeed {
        text: "What is 1/4 of 24?",
        options: &["4", "6", "8", "12"],
        correct: 1,
        explanation: "To find 1/4 of 24, divide 24 by 4: 24 ÷ 4 = 6",
        difficulty: Difficulty::Beginner,
        skill: "Fractions",
    },
];

const ENGLISH: &[QuestionSeed] = &[
    QuestionSeed {
        text: "Which word is a synonym for 'happy'?",
        options: &["sad", "joyful", "angry", "tired"],
        correct: 1,
        explanation: "Joyful means the same as happy - feeling or showing great pleasure.",
        difficulty: Difficulty::Beginner,
        skill: "Vocabulary",
    },
    QuestionSeed {
        text: "Choose the correct spelling:",
        options: &["recieve", "receive", "recive", "recieive"],
        correct: 1,
        explanation: "The correct spelling is 'receive' - 'i' before 'e' except after 'c'",
        difficulty: Difficulty::Intermediate,
        skill: "Spelling",
    },
    QuestionSeed {
        text: "Which sentence uses the correct punctuation?",
        options: &[
            "The cat sat on the mat.",
            "The cat sat on the mat!",
            "The cat sat on the mat?",
            "The cat sat on the mat,",
        ],
        correct: 0,
        explanation: "A simple statement should end with a period.",
        difficulty: Difficulty::Beginner,
        skill: "Grammar",
    },
];

const SCIENCE: &[QuestionSeed] = &[
    QuestionSeed {
        text: "Which of these is a renewable energy source?",
        options: &["Coal", "Oil", "Solar power", "Natural gas"],
        correct: 2,
        explanation: "Solar power is renewable because the sun's energy will continue to be available.",
        difficulty: Difficulty::Intermediate,
        skill: "Energy",
    },
    QuestionSeed {
        text: "What is the main function of leaves in plants?",
        options: &[
            "To absorb water",
            "To make food through photosynthesis",
            "To support the plant",
            "To store food",
        ],
        correct: 1,
        explanation: "Leaves contain chlorophyll which helps plants make their own food through photosynthesis.",
        difficulty: Difficulty::Intermediate,
        skill: "Biology",
    },
    QuestionSeed {
        text: "Which planet is known as the Red Planet?",
        options: &["Venus", "Mars", "Jupiter", "Saturn"],
        correct: 1,
        explanation: "Mars is called the Red Planet because of its reddish appearance due to iron oxide on its surface.",
        difficulty: Difficulty::Beginner,
        skill: "Astronomy",
    },
];

const SOCIAL_STUDIES: &[QuestionSeed] = &[
    QuestionSeed {
        text: "What is the capital of France?",
        options: &["London", "Berlin", "Paris", "Madrid"],
        correct: 2,
        explanation: "Paris is the capital city of France.",
        difficulty: Difficulty::Beginner,
        skill: "Geography",
    },
    QuestionSeed {
        text: "Which ancient civilization built the pyramids?",
        options: &["Romans", "Greeks", "Egyptians", "Mayans"],
        correct: 2,
        explanation: "The ancient Egyptians built the pyramids as tombs for their pharaohs.",
        difficulty: Difficulty::Intermediate,
        skill: "History",
    },
    QuestionSeed {
        text: "What is the main purpose of a map's legend?",
        options: &[
            "To show directions",
            "To explain symbols and colors used on the map",
            "To measure distances",
            "To show the map's scale",
        ],
        correct: 1,
        explanation: "A map's legend explains what the symbols and colors on the map represent.",
        difficulty: Difficulty::Beginner,
        skill: "Map Skills",
    },
];

fn build_questions(seeds: &[QuestionSeed]) -> Result<Vec<Question>, QuestionError> {
    seeds
        .iter()
        .map(|seed| {
            Question::new(
                seed.text,
                seed.options.iter().map(|o| (*o).to_owned()).collect(),
                seed.correct,
                seed.explanation,
                seed.difficulty,
                seed.skill,
            )
        })
        .collect()
}

/// Sample questions keyed by subject. Arts has no questions yet.
///
/// # Errors
///
/// Returns `SeedError::Question` if a built-in question fails validation.
pub fn question_bank() -> Result<HashMap<Subject, Vec<Question>>, SeedError> {
    let mut bank = HashMap::new();
    bank.insert(Subject::Mathematics, build_questions(MATHEMATICS)?);
    bank.insert(Subject::English, build_questions(ENGLISH)?);
    bank.insert(Subject::Science, build_questions(SCIENCE)?);
    bank.insert(Subject::SocialStudies, build_questions(SOCIAL_STUDIES)?);
    Ok(bank)
}

//
// ─── LEARNING PLANS ────────────────────────────────────────────────────────────
//

type ActivitySeed = (&'static str, &'static str, u32, ResourceType);

fn focus_area(
    name: &str,
    description: &str,
    mastery: MasteryLevel,
    activities: &[ActivitySeed],
) -> Result<FocusArea, PlanError> {
    let activities = activities
        .iter()
        .map(|(title, desc, minutes, kind)| LearningActivity::new(*title, *desc, *minutes, *kind))
        .collect();
    FocusArea::new(name, description, mastery, activities)
}

fn goals(now: DateTime<Utc>, entries: &[(&str, &str)]) -> Result<Vec<WeeklyGoal>, PlanError> {
    entries
        .iter()
        .map(|(title, desc)| WeeklyGoal::new(*title, *desc, one_week_after(now)))
        .collect()
}

fn mathematics_plan(now: DateTime<Utc>) -> Result<SubjectPlan, PlanError> {
    let focus_areas = vec![
        focus_area(
            "Number Operations",
            "Adding, subtracting and multiplying whole numbers",
            MasteryLevel::Developing,
            &[
                ("Addition and Subtraction Practice", "Practice adding and subtracting numbers up to 1000", 30, ResourceType::Interactive),
                ("Multiplication Tables", "Learn multiplication tables from 1 to 12", 45, ResourceType::Video),
            ],
        )?,
        focus_area(
            "Fractions",
            "Parts of a whole and equivalent fractions",
            MasteryLevel::Beginner,
            &[
                ("Understanding Fractions", "Learn about numerators, denominators, and equivalent fractions", 40, ResourceType::Interactive),
                ("Fraction Operations", "Practice adding and subtracting fractions with same denominators", 35, ResourceType::Worksheet),
            ],
        )?,
        focus_area(
            "Geometry",
            "Shapes, angles, area and perimeter",
            MasteryLevel::Proficient,
            &[
                ("Shapes and Angles", "Learn about different shapes and their properties", 25, ResourceType::Interactive),
                ("Area and Perimeter", "Calculate area and perimeter of rectangles and squares", 30, ResourceType::Worksheet),
            ],
        )?,
    ];
    let weekly_goals = goals(
        now,
        &[
            ("Master Basic Operations", "Complete all addition and subtraction exercises"),
            ("Learn Fractions", "Understand basic fractions and complete practice exercises"),
        ],
    )?;
    SubjectPlan::new(Subject::Mathematics, 0.4, focus_areas, weekly_goals)
}

fn english_plan(now: DateTime<Utc>) -> Result<SubjectPlan, PlanError> {
    let focus_areas = vec![
        focus_area(
            "Reading Comprehension",
            "Understanding what a passage says",
            MasteryLevel::Proficient,
            &[
                ("Main Idea Practice", "Identify main ideas and supporting details in passages", 25, ResourceType::Interactive),
                ("Reading Strategies", "Learn and practice different reading strategies", 30, ResourceType::Video),
            ],
        )?,
        focus_area(
            "Grammar",
            "Parts of speech and sentence structure",
            MasteryLevel::Developing,
            &[
                ("Parts of Speech", "Learn about nouns, verbs, adjectives, and adverbs", 35, ResourceType::Interactive),
                ("Sentence Structure", "Practice building complete sentences", 30, ResourceType::Worksheet),
            ],
        )?,
        focus_area(
            "Vocabulary",
            "Word families and context clues",
            MasteryLevel::Beginner,
            &[
                ("Word Families", "Learn about word families and patterns", 25, ResourceType::Interactive),
                ("Context Clues", "Use context clues to understand new words", 30, ResourceType::Worksheet),
            ],
        )?,
    ];
    let weekly_goals = goals(
        now,
        &[
            ("Reading Practice", "Read and comprehend grade-level texts"),
            ("Grammar Exercises", "Complete grammar practice worksheets"),
        ],
    )?;
    SubjectPlan::new(Subject::English, 0.3, focus_areas, weekly_goals)
}

fn science_plan(now: DateTime<Utc>) -> Result<SubjectPlan, PlanError> {
    let focus_areas = vec![
        focus_area(
            "Life Science",
            "Plants, animals and their habitats",
            MasteryLevel::Proficient,
            &[
                ("Plant Life Cycle", "Learn about how plants grow and reproduce", 35, ResourceType::Interactive),
                ("Animal Habitats", "Explore different animal habitats and adaptations", 40, ResourceType::Video),
            ],
        )?,
        focus_area(
            "Physical Science",
            "Matter and simple machines",
            MasteryLevel::Developing,
            &[
                ("States of Matter", "Learn about solid, liquid, and gas", 30, ResourceType::Interactive),
                ("Simple Machines", "Explore different types of simple machines", 35, ResourceType::Worksheet),
            ],
        )?,
        focus_area(
            "Earth Science",
            "The solar system and the weather",
            MasteryLevel::Beginner,
            &[
                ("Solar System", "Learn about planets and their characteristics", 40, ResourceType::Interactive),
                ("Weather Patterns", "Understand basic weather patterns and climate", 35, ResourceType::Video),
            ],
        )?,
    ];
    let weekly_goals = goals(
        now,
        &[
            ("Science Experiments", "Complete hands-on science experiments"),
            ("Nature Observation", "Observe and record natural phenomena"),
        ],
    )?;
    SubjectPlan::new(Subject::Science, 0.25, focus_areas, weekly_goals)
}

/// Starter plans for mathematics, english and science, with goals due a week after `now`.
///
/// # Errors
///
/// Returns `SeedError::Plan` if a built-in plan fails validation.
pub fn learning_plans(now: DateTime<Utc>) -> Result<Vec<SubjectPlan>, SeedError> {
    Ok(vec![
        mathematics_plan(now)?,
        english_plan(now)?,
        science_plan(now)?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutor_core::time::fixed_now;

    #[test]
    fn question_bank_builds() {
        let bank = question_bank().unwrap();
        assert_eq!(bank[&Subject::Mathematics].len(), 3);
        assert_eq!(bank[&Subject::SocialStudies].len(), 3);
        assert!(!bank.contains_key(&Subject::Arts));
    }

    #[test]
    fn plans_match_expected_shape() {
        let plans = learning_plans(fixed_now()).unwrap();
        assert_eq!(plans.len(), 3);

        let math = &plans[0];
        assert_eq!(math.subject(), Subject::Mathematics);
        assert!((math.progress() - 0.4).abs() < f64::EPSILON);
        assert_eq!(math.focus_areas().len(), 3);
        assert_eq!(math.weekly_goals().len(), 2);
        assert!(math.focus_areas().iter().all(|a| a.activities().len() == 2));
        assert!(
            math.weekly_goals()
                .iter()
                .all(|g| !g.is_completed() && g.due_date() == one_week_after(fixed_now()))
        );
    }
}
