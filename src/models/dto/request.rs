use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StartQuizRequest {
    #[validate(length(min = 1, max = 64, message = "Valid topic ID required"))]
    pub topic_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    #[validate(length(min = 1, max = 64, message = "Valid quiz session ID required"))]
    pub session_id: String,

    #[validate(length(min = 1, max = 64, message = "Valid question ID required"))]
    pub question_id: String,

    /// Absent when the timer ran out before the user picked an option.
    #[serde(default)]
    #[validate(range(min = 0, max = 3, message = "Answer index must be 0-3"))]
    pub selected_answer_index: Option<u8>,

    #[validate(range(min = 0.0, max = 20.0, message = "Response time must be 0-20 seconds"))]
    pub response_time: f64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CompleteQuizRequest {
    #[validate(length(min = 1, max = 64, message = "Valid quiz session ID required"))]
    pub session_id: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct QuestionPerformanceQuery {
    #[validate(length(min = 1, max = 64, message = "Valid topic ID required"))]
    pub topic_id: Option<String>,

    #[validate(range(min = 1, max = 200, message = "Limit must be 1-200"))]
    pub limit: Option<usize>,
}

/// Time window of an exported report, counted back from now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    #[default]
    All,
    Last7Days,
    Last30Days,
}

impl ReportPeriod {
    /// Earliest completion time included, `None` for no limit.
    pub fn since(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            ReportPeriod::All => None,
            ReportPeriod::Last7Days => Some(now - Duration::days(7)),
            ReportPeriod::Last30Days => Some(now - Duration::days(30)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub period: ReportPeriod,
}
