use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::quiz_rules::SECONDS_PER_QUESTION;

/// One ledger entry: the user's answer to one question of one session.
/// Written once by the quiz engine and never updated.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct QuestionResponse {
    pub id: String,
    pub user_id: String,
    pub session_id: String,
    pub question_id: String,
    pub selected_answer_index: Option<u8>,
    pub is_correct: bool,
    pub response_time: f64, // seconds, within [0, SECONDS_PER_QUESTION]
    pub was_attempted: bool,
    pub created_at: DateTime<Utc>,
}

impl QuestionResponse {
    /// Builds the entry for an answer against the snapshot's correct index.
    pub fn record(
        user_id: &str,
        session_id: &str,
        question_id: &str,
        selected_answer_index: Option<u8>,
        response_time: f64,
        correct_answer_index: u8,
    ) -> Self {
        let response_time = clamp_response_time(response_time);
        let is_correct = selected_answer_index == Some(correct_answer_index);
        let was_attempted =
            selected_answer_index.is_some() && response_time < SECONDS_PER_QUESTION;

        QuestionResponse {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
            question_id: question_id.to_string(),
            selected_answer_index,
            is_correct,
            response_time,
            was_attempted,
            created_at: Utc::now(),
        }
    }
}

fn clamp_response_time(seconds: f64) -> f64 {
    if seconds.is_nan() {
        return SECONDS_PER_QUESTION;
    }
    seconds.clamp(0.0, SECONDS_PER_QUESTION)
}

/// Aggregate of a session's ledger entries.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ResponseTally {
    pub correct: u32,
    pub time_spent: f64,
    pub unattempted: u32,
}

impl ResponseTally {
    pub fn from_responses(responses: &[QuestionResponse]) -> Self {
        responses
            .iter()
            .fold(ResponseTally::default(), |mut tally, response| {
                if response.is_correct {
                    tally.correct += 1;
                }
                if !response.was_attempted {
                    tally.unattempted += 1;
                }
                tally.time_spent += response.response_time;
                tally
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_answer_within_time_is_attempted() {
        let response = QuestionResponse::record("u", "s", "q", Some(2), 4.5, 2);

        assert!(response.is_correct);
        assert!(response.was_attempted);
        assert_eq!(response.response_time, 4.5);
    }

    #[test]
    fn timed_out_answer_is_not_attempted_even_if_correct() {
        let response = QuestionResponse::record("u", "s", "q", Some(1), 20.0, 1);

        assert!(response.is_correct);
        assert!(!response.was_attempted);
    }

    #[test]
    fn missing_answer_is_wrong_and_unattempted() {
        let response = QuestionResponse::record("u", "s", "q", None, 20.0, 0);

        assert!(!response.is_correct);
        assert!(!response.was_attempted);
        assert_eq!(response.selected_answer_index, None);
    }

    #[test]
    fn response_time_is_clamped_to_the_question_budget() {
        assert_eq!(
            QuestionResponse::record("u", "s", "q", Some(0), 95.0, 0).response_time,
            SECONDS_PER_QUESTION
        );
        assert_eq!(
            QuestionResponse::record("u", "s", "q", Some(0), -3.0, 0).response_time,
            0.0
        );
        assert_eq!(
            QuestionResponse::record("u", "s", "q", Some(0), f64::NAN, 0).response_time,
            SECONDS_PER_QUESTION
        );
    }

    #[test]
    fn tally_counts_correct_time_and_unattempted() {
        let responses = vec![
            QuestionResponse::record("u", "s", "q1", Some(0), 3.0, 0),
            QuestionResponse::record("u", "s", "q2", Some(1), 5.0, 0),
            QuestionResponse::record("u", "s", "q3", None, 20.0, 2),
        ];

        let tally = ResponseTally::from_responses(&responses);

        assert_eq!(tally.correct, 1);
        assert_eq!(tally.unattempted, 1);
        assert_eq!(tally.time_spent, 28.0);
    }
}
