use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    constants::quiz_rules::PASS_THRESHOLD,
    models::domain::{question::ShuffledQuestion, question_response::ResponseTally},
};

/// One user's timed attempt at a topic.
///
/// `questions` keeps the presentation order and drives progress; `shuffled_questions`
/// holds one snapshot per entry of `questions`. Score fields only mean something once
/// `is_completed` is set, and they are only ever written through [`QuizSession::complete`].
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct QuizSession {
    pub id: String,
    pub user_id: String,
    pub topic_id: String,
    pub questions: Vec<String>,
    pub shuffled_questions: Vec<ShuffledQuestion>,
    pub started_at: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::models::bson_date::optional"
    )]
    pub completed_at: Option<DateTime<Utc>>,
    pub score: u32,
    pub total_questions: u32,
    pub time_spent: f64, // seconds
    pub attempt_number: u32,
    pub is_completed: bool,
    pub passed_threshold: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    InProgress,
    Completed,
}

impl QuizSession {
    pub fn new(
        user_id: &str,
        topic_id: &str,
        shuffled_questions: Vec<ShuffledQuestion>,
        attempt_number: u32,
    ) -> Self {
        let questions: Vec<String> = shuffled_questions.iter().map(|q| q.id.clone()).collect();

        QuizSession {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            topic_id: topic_id.to_string(),
            total_questions: questions.len() as u32,
            questions,
            shuffled_questions,
            started_at: Utc::now(),
            completed_at: None,
            score: 0,
            time_spent: 0.0,
            attempt_number,
            is_completed: false,
            passed_threshold: false,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.is_completed {
            SessionState::Completed
        } else {
            SessionState::InProgress
        }
    }

    /// Zero-based position of a question in presentation order.
    pub fn position_of(&self, question_id: &str) -> Option<usize> {
        self.questions.iter().position(|id| id == question_id)
    }

    pub fn snapshot(&self, question_id: &str) -> Option<&ShuffledQuestion> {
        self.shuffled_questions.iter().find(|q| q.id == question_id)
    }

    pub fn is_last_position(&self, position: usize) -> bool {
        position + 1 >= self.questions.len()
    }

    /// Moves the session to `Completed`. A completed session is left untouched.
    /// The completion time is kept to the millisecond, the precision it is stored with.
    pub fn complete(&mut self, tally: &ResponseTally, now: DateTime<Utc>) {
        if self.is_completed {
            return;
        }
        self.score = tally.correct;
        self.time_spent = tally.time_spent;
        self.completed_at = Some(now.trunc_subsecs(3));
        self.is_completed = true;
        self.passed_threshold = passes(self.score);
    }

    pub fn percentage(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        f64::from(self.score) / f64::from(self.total_questions) * 100.0
    }

    pub fn average_response_time(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        self.time_spent / f64::from(self.total_questions)
    }
}

pub fn passes(score: u32) -> bool {
    score >= PASS_THRESHOLD
}
