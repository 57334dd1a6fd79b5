use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{MediaType, ShuffledQuestion, Topic};

/// A topic as shown on the topic picker, with the caller's attempt state.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TopicSummaryDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub question_count: u32,
    pub user_attempts: u32,
    pub max_attempts: u32,
    pub can_retake: bool,
    pub best_score: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopicListDto {
    pub topics: Vec<TopicSummaryDto>,
}

/// A question as presented during a session. Carries the correct index since the
/// client checks answers locally for instant feedback.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SessionQuestionDto {
    pub id: String,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer_index: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
}

impl From<ShuffledQuestion> for SessionQuestionDto {
    fn from(question: ShuffledQuestion) -> Self {
        SessionQuestionDto {
            id: question.id,
            question_text: question.question_text,
            options: question.options,
            correct_answer_index: question.correct_answer_index,
            media_url: question.media_url,
            media_type: question.media_type,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StartSessionDto {
    pub session_id: String,
    pub topic_name: String,
    pub questions: Vec<SessionQuestionDto>,
    pub total_questions: u32,
    pub time_per_question: f64,
    pub attempt_number: u32,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ProgressDto {
    /// 1-based position of the question to answer next.
    pub current_question: u32,
    pub total_questions: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct NextQuestionDto {
    pub is_correct: bool,
    pub next_question: SessionQuestionDto,
    pub progress: ProgressDto,
}

/// Result of submitting one answer: either the next question or the final results.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitAnswerOutcome {
    InProgress(NextQuestionDto),
    Completed(QuizResultDto),
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ScoreSummaryDto {
    pub score: u32,
    pub total_questions: u32,
    pub percentage: f64,
    pub time_spent: f64,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QuestionReviewDto {
    pub question_id: String,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer_index: u8,
    pub user_answer_index: Option<u8>,
    pub is_correct: bool,
    pub response_time: f64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct PerformanceDto {
    pub average_response_time: f64,
    pub unattempted_questions: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizResultDto {
    pub session_id: String,
    pub quiz_results: ScoreSummaryDto,
    pub question_review: Vec<QuestionReviewDto>,
    pub performance: PerformanceDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TopicSummaryDto {
    pub fn new(
        topic: Topic,
        user_attempts: u32,
        max_attempts: u32,
        can_retake: bool,
        best_score: u32,
    ) -> Self {
        TopicSummaryDto {
            id: topic.id,
            name: topic.name,
            description: topic.description,
            question_count: topic.question_count,
            user_attempts,
            max_attempts,
            can_retake,
            best_score,
        }
    }
}
