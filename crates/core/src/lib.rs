#![forbid(unsafe_code)]

pub mod classifier;
pub mod error;
pub mod model;
pub mod recommend;
pub mod scoring;
pub mod time;

pub use classifier::{LearningStyleClassifier, StandardsAffinityClassifier, UnclassifiedStyle};
pub use error::Error;
pub use recommend::{
    PerformanceTier, RecommendationSettings, Recommender, SkillDenominator, recommend,
};
pub use scoring::{ScoreSummary, score};
pub use time::Clock;
