use serde::Serialize;

/// Aggregated view of assessment progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

impl AssessmentProgress {
    /// Share of questions answered, `0.0` for an empty assessment.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let fraction = self.answered as f64 / self.total as f64;
        fraction
    }
}
