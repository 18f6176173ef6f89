use std::fmt;
use std::sync::Arc;

use serde_json::json;
use services::{AssessmentService, Clock, LearningPlanService};
use storage::{QuestionProvider, Storage};
use tracing_subscriber::EnvFilter;
use tutor_core::model::{Subject, SubjectPlan};
use tutor_core::{RecommendationSettings, SkillDenominator, StandardsAffinityClassifier};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidSubject { raw: String },
    InvalidAnswer { raw: String },
    InvalidThreshold { raw: String },
    InvalidDenominator { raw: String },
    MissingAnswers,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidSubject { raw } => write!(f, "invalid --subject value: {raw}"),
            ArgsError::InvalidAnswer { raw } => write!(f, "invalid answer index: {raw}"),
            ArgsError::InvalidThreshold { raw } => {
                write!(f, "invalid --skill-threshold value: {raw}")
            }
            ArgsError::InvalidDenominator { raw } => {
                write!(f, "invalid TUTOR_SKILL_DENOMINATOR value: {raw} (expected total or per-skill)")
            }
            ArgsError::MissingAnswers => write!(f, "assess requires --answers"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  tutor subjects");
    eprintln!("  tutor assess --answers <i,j,...> [--subject <name>] [--per-skill] [--shuffle]");
    eprintln!("               [--skill-threshold <ratio>]");
    eprintln!("  tutor plan   [--subject <name>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --subject mathematics");
    eprintln!("  --skill-threshold 0.7");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TUTOR_SUBJECT, TUTOR_SKILL_DENOMINATOR (total|per-skill), TUTOR_SHUFFLE,");
    eprintln!("  TUTOR_SKILL_THRESHOLD, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Subjects,
    Assess,
    Plan,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "subjects" => Some(Self::Subjects),
            "assess" => Some(Self::Assess),
            "plan" => Some(Self::Plan),
            _ => None,
        }
    }
}

struct AssessArgs {
    subject: Subject,
    answers: Vec<usize>,
    denominator: SkillDenominator,
    skill_threshold: f64,
    shuffle: bool,
}

fn parse_subject(raw: String) -> Result<Subject, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidSubject { raw })
}

fn parse_answers(raw: &str) -> Result<Vec<usize>, ArgsError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<usize>().map_err(|_| ArgsError::InvalidAnswer {
                raw: part.to_owned(),
            })
        })
        .collect()
}

fn parse_denominator(raw: String) -> Result<SkillDenominator, ArgsError> {
    match raw.trim() {
        "total" => Ok(SkillDenominator::TotalQuestions),
        "per-skill" => Ok(SkillDenominator::QuestionsInSkill),
        _ => Err(ArgsError::InvalidDenominator { raw }),
    }
}

fn parse_threshold(raw: String) -> Result<f64, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidThreshold { raw })
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|value| matches!(value.trim(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn default_subject() -> Result<Subject, ArgsError> {
    std::env::var("TUTOR_SUBJECT")
        .ok()
        .map_or(Ok(Subject::Mathematics), parse_subject)
}

impl AssessArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut subject = default_subject()?;
        let mut denominator = std::env::var("TUTOR_SKILL_DENOMINATOR")
            .ok()
            .map_or(Ok(SkillDenominator::default()), parse_denominator)?;
        let mut skill_threshold = std::env::var("TUTOR_SKILL_THRESHOLD")
            .ok()
            .map_or(Ok(RecommendationSettings::default().skill_ratio_below()), parse_threshold)?;
        let mut shuffle = env_flag("TUTOR_SHUFFLE");
        let mut answers = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--subject" => subject = parse_subject(require_value(args, "--subject")?)?,
                "--answers" => answers = Some(parse_answers(&require_value(args, "--answers")?)?),
                "--skill-threshold" => {
                    skill_threshold = parse_threshold(require_value(args, "--skill-threshold")?)?;
                }
                "--per-skill" => denominator = SkillDenominator::QuestionsInSkill,
                "--shuffle" => shuffle = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            subject,
            answers: answers.ok_or(ArgsError::MissingAnswers)?,
            denominator,
            skill_threshold,
            shuffle,
        })
    }

    fn settings(&self) -> Result<RecommendationSettings, tutor_core::Error> {
        let defaults = RecommendationSettings::default();
        Ok(RecommendationSettings::new(
            defaults.developing_below(),
            defaults.excelling_from(),
            self.skill_threshold,
            self.denominator,
        )?)
    }
}

fn parse_plan_subject(args: &mut impl Iterator<Item = String>) -> Result<Option<Subject>, ArgsError> {
    let mut subject = std::env::var("TUTOR_SUBJECT").ok().map(parse_subject).transpose()?;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--subject" => subject = Some(parse_subject(require_value(args, "--subject")?)?),
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(subject)
}

async fn list_subjects(storage: &Storage) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let mut subjects = Vec::new();
    for subject in Subject::ALL {
        let questions = storage.questions.provide_questions(subject).await?;
        subjects.push(json!({
            "subject": subject,
            "name": subject.display_name(),
            "standards": subject.standards(),
            "questions": questions.len(),
        }));
    }
    Ok(serde_json::Value::Array(subjects))
}

async fn run_assessment(
    storage: &Storage,
    clock: Clock,
    args: &AssessArgs,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let plans = Arc::new(LearningPlanService::new(clock, Arc::clone(&storage.plans)));
    let assessments = AssessmentService::new(
        clock,
        Arc::clone(&storage.questions),
        Arc::clone(&storage.results),
    )
    .with_recommendation_settings(args.settings()?)
    .with_classifier(Arc::new(StandardsAffinityClassifier::default()))
    .with_plan_updates(Arc::clone(&plans))
    .with_shuffle_questions(args.shuffle);

    let mut session = assessments.start_assessment(args.subject).await?;
    let mut completed = None;
    for answer in &args.answers {
        if session.is_complete() {
            tracing::warn!(answer, "ignoring answer after the last question");
            continue;
        }
        completed = assessments.submit_answer(&mut session, *answer).await?.completed;
    }

    match completed {
        Some(done) => {
            let plan = plans.get_plan(args.subject).await?;
            Ok(json!({
                "complete": true,
                "resultId": done.result_id,
                "result": done.result,
                "learningStyle": done.learning_style,
                "learningStyleDescription": done.learning_style.description(),
                "plan": plan,
            }))
        }
        None => {
            let interim = session.interim_result(clock.now())?;
            Ok(json!({
                "complete": false,
                "progress": session.progress(),
                "interimResult": interim,
            }))
        }
    }
}

async fn show_plans(
    storage: &Storage,
    clock: Clock,
    subject: Option<Subject>,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let plans = LearningPlanService::new(clock, Arc::clone(&storage.plans));
    let value = match subject {
        Some(subject) => match plans.get_plan(subject).await? {
            Some(plan) => plan_json(&plan)?,
            None => serde_json::Value::Null,
        },
        None => serde_json::Value::Array(
            plans
                .list_plans()
                .await?
                .iter()
                .map(plan_json)
                .collect::<Result<_, _>>()?,
        ),
    };
    Ok(value)
}

/// A plan as JSON, with the share of completed weekly goals alongside it.
fn plan_json(plan: &SubjectPlan) -> Result<serde_json::Value, serde_json::Error> {
    let mut value = serde_json::to_value(plan)?;
    if let Some(fields) = value.as_object_mut() {
        fields.insert("goalCompletion".to_owned(), json!(plan.goal_completion()));
    }
    Ok(value)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None | Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    let mut iter = argv.into_iter().skip(1);
    let clock = Clock::system();
    let storage = Storage::seeded(clock.now())?;

    let output = match cmd {
        Command::Subjects => list_subjects(&storage).await?,
        Command::Assess => {
            let args = AssessArgs::parse(&mut iter).map_err(|e| {
                print_usage();
                e
            })?;
            run_assessment(&storage, clock, &args).await?
        }
        Command::Plan => {
            let subject = parse_plan_subject(&mut iter).map_err(|e| {
                print_usage();
                e
            })?;
            show_plans(&storage, clock, subject).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tutor=info,services=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> std::vec::IntoIter<String> {
        list.iter()
            .map(|s| (*s).to_owned())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn parses_answer_lists() {
        assert_eq!(parse_answers("0, 2,1").unwrap(), vec![0, 2, 1]);
        assert!(matches!(
            parse_answers("0,x"),
            Err(ArgsError::InvalidAnswer { raw }) if raw == "x"
        ));
    }

    #[test]
    fn assess_flags_override_defaults() {
        let parsed = AssessArgs::parse(&mut args(&[
            "--subject",
            "science",
            "--answers",
            "1,1,1",
            "--per-skill",
            "--skill-threshold",
            "0.5",
        ]))
        .unwrap();
        assert_eq!(parsed.subject, Subject::Science);
        assert_eq!(parsed.answers, vec![1, 1, 1]);
        assert_eq!(parsed.denominator, SkillDenominator::QuestionsInSkill);
        let settings = parsed.settings().unwrap();
        assert!((settings.skill_ratio_below() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn assess_requires_answers() {
        let err = AssessArgs::parse(&mut args(&["--subject", "english"])).err();
        assert!(matches!(err, Some(ArgsError::MissingAnswers)));
    }

    #[test]
    fn out_of_range_threshold_is_a_core_error() {
        let parsed = AssessArgs::parse(&mut args(&["--answers", "0", "--skill-threshold", "1.5"]))
            .unwrap();
        assert!(matches!(
            parsed.settings(),
            Err(tutor_core::Error::Settings(_))
        ));
    }

    #[test]
    fn plan_json_reports_goal_completion() {
        let plans = storage::seed::learning_plans(tutor_core::time::fixed_now()).unwrap();
        let mut plan = plans[0].clone();
        let goal_id = plan.weekly_goals()[0].id();
        assert!(plan.complete_goal(goal_id));

        let value = plan_json(&plan).unwrap();
        assert_eq!(value["goalCompletion"], json!(0.5));
        assert_eq!(value["subject"], json!("mathematics"));
        assert_eq!(value["weeklyGoals"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn denominator_names() {
        assert_eq!(
            parse_denominator("per-skill".into()).unwrap(),
            SkillDenominator::QuestionsInSkill
        );
        assert!(parse_denominator("half".into()).is_err());
    }
}
