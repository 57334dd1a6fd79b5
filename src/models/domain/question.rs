use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    constants::quiz_rules::OPTIONS_PER_QUESTION,
    errors::{AppError, AppResult},
};

/// A canonical multiple-choice question as stored in the question bank.
/// Never mutated by the quiz engine; sessions work on [`ShuffledQuestion`] copies.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Question {
    pub id: String,
    pub topic_id: String,
    pub question_text: String,
    pub options: Vec<String>, // exactly four
    pub correct_answer_index: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Copy)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Question {
    pub fn new(
        topic_id: &str,
        question_text: &str,
        options: Vec<String>,
        correct_answer_index: u8,
    ) -> AppResult<Self> {
        if options.len() != OPTIONS_PER_QUESTION {
            return Err(AppError::ValidationError(format!(
                "Question must have exactly {} options, got {}",
                OPTIONS_PER_QUESTION,
                options.len()
            )));
        }
        if usize::from(correct_answer_index) >= OPTIONS_PER_QUESTION {
            return Err(AppError::ValidationError(format!(
                "Correct answer index {} is out of range",
                correct_answer_index
            )));
        }

        Ok(Question {
            id: Uuid::new_v4().to_string(),
            topic_id: topic_id.to_string(),
            question_text: question_text.to_string(),
            options,
            correct_answer_index,
            media_url: None,
            media_type: None,
            difficulty: Difficulty::default(),
            is_active: true,
            created_at: Some(Utc::now()),
        })
    }

    pub fn with_media(mut self, media_url: &str, media_type: MediaType) -> Self {
        self.media_url = Some(media_url.to_string());
        self.media_type = Some(media_type);
        self
    }

    pub fn correct_option(&self) -> Option<&str> {
        self.options
            .get(usize::from(self.correct_answer_index))
            .map(String::as_str)
    }
}

/// Session-scoped copy of a question with its options permuted.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ShuffledQuestion {
    pub id: String,
    pub question_text: String,
    pub options: Vec<String>,
    /// Position of the correct option inside `options`.
    pub correct_answer_index: u8,
    /// Position of the correct option in the canonical question, kept for audit.
    pub original_correct_index: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
}

impl ShuffledQuestion {
    /// Snapshot that keeps the canonical option order.
    pub fn unshuffled(question: &Question) -> Self {
        ShuffledQuestion {
            id: question.id.clone(),
            question_text: question.question_text.clone(),
            options: question.options.clone(),
            correct_answer_index: question.correct_answer_index,
            original_correct_index: question.correct_answer_index,
            media_url: question.media_url.clone(),
            media_type: question.media_type,
        }
    }

    pub fn correct_option(&self) -> Option<&str> {
        self.options
            .get(usize::from(self.correct_answer_index))
            .map(String::as_str)
    }
}
