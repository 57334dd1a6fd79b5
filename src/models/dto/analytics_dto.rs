use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::dto::request::ReportPeriod;

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct OverallStatsDto {
    pub total_quizzes: u32,
    pub average_score: f64,
    pub average_response_time: f64,
    pub total_correct_answers: u32,
    pub total_questions: u32,
    pub unattempted_questions: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecentQuizDto {
    pub session_id: String,
    pub topic_name: String,
    pub score: u32,
    pub completed_at: Option<DateTime<Utc>>,
    pub time_spent: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TopicStatsDto {
    pub topic_id: String,
    pub topic_name: String,
    pub quizzes_taken: u32,
    pub average_score: f64,
    pub average_response_time: f64,
    pub best_score: u32,
    pub last_attempt_date: Option<DateTime<Utc>>,
    /// Failed completed attempts, capped at the attempt limit.
    pub current_attempt_count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardDto {
    pub overall_stats: OverallStatsDto,
    pub recent_quizzes: Vec<RecentQuizDto>,
    pub topic_stats: Vec<TopicStatsDto>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QuestionPerformanceDto {
    pub question_id: String,
    pub question_text: String,
    pub topic_name: String,
    pub times_attempted: u32,
    pub times_correct: u32,
    /// Percentage, 0 to 100.
    pub accuracy_rate: f64,
    pub average_response_time: f64,
    pub last_attempted: DateTime<Utc>,
}

/// Averages are taken per question, so every listed question weighs the same.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct PerformanceSummaryDto {
    pub total_questions_attempted: u32,
    pub overall_accuracy: f64,
    pub average_response_time: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionPerformanceReportDto {
    pub question_performance: Vec<QuestionPerformanceDto>,
    pub summary: PerformanceSummaryDto,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct ReportSummaryDto {
    pub total_quizzes: u32,
    pub average_score: f64,
    pub total_time_spent: f64,
    pub passed_quizzes: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReportQuizDto {
    pub session_id: String,
    pub topic: String,
    pub score: u32,
    pub percentage: f64,
    pub time_spent: f64,
    pub completed_at: Option<DateTime<Utc>>,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReportResponseDto {
    pub session_id: String,
    pub question_id: String,
    pub question_text: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub response_time: f64,
    pub was_attempted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportDto {
    pub period: ReportPeriod,
    pub generated_at: DateTime<Utc>,
    pub user_id: String,
    pub summary: ReportSummaryDto,
    pub quizzes: Vec<ReportQuizDto>,
    pub detailed_responses: Vec<ReportResponseDto>,
}
