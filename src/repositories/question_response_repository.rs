use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::{Database, QUESTION_RESPONSES_COLLECTION},
    errors::{AppError, AppResult},
    models::domain::QuestionResponse,
};

const DUPLICATE_KEY_CODE: i32 = 11000;

/// Append-only ledger of answers. One entry per (session, question).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionResponseRepository: Send + Sync {
    /// Fails with `AppError::AlreadyExists` when the question was already answered in the session.
    async fn create(&self, response: QuestionResponse) -> AppResult<QuestionResponse>;
    async fn find_by_session(&self, session_id: &str) -> AppResult<Vec<QuestionResponse>>;
    async fn count_by_session(&self, session_id: &str) -> AppResult<u64>;
    async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<QuestionResponse>>;
}

pub struct MongoQuestionResponseRepository {
    collection: Collection<QuestionResponse>,
}

impl MongoQuestionResponseRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(QUESTION_RESPONSES_COLLECTION);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for question_responses collection");

        let session_question_index = IndexModel::builder()
            .keys(doc! { "session_id": 1, "question_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("session_question_unique".to_string())
                    .build(),
            )
            .build();

        let user_id_index = IndexModel::builder()
            .keys(doc! { "user_id": 1 })
            .options(IndexOptions::builder().name("user_id".to_string()).build())
            .build();

        self.collection.create_index(session_question_index).await?;
        self.collection.create_index(user_id_index).await?;

        log::info!("Successfully created indexes for question_responses collection");
        Ok(())
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}

#[async_trait]
impl QuestionResponseRepository for MongoQuestionResponseRepository {
    async fn create(&self, response: QuestionResponse) -> AppResult<QuestionResponse> {
        match self.collection.insert_one(&response).await {
            Ok(_) => Ok(response),
            Err(err) if is_duplicate_key(&err) => Err(AppError::AlreadyExists(format!(
                "Response for question '{}' in session '{}' already exists",
                response.question_id, response.session_id
            ))),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_session(&self, session_id: &str) -> AppResult<Vec<QuestionResponse>> {
        let responses = self
            .collection
            .find(doc! { "session_id": session_id })
            .sort(doc! { "created_at": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(responses)
    }

    async fn count_by_session(&self, session_id: &str) -> AppResult<u64> {
        let count = self
            .collection
            .count_documents(doc! { "session_id": session_id })
            .await?;
        Ok(count)
    }

    async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<QuestionResponse>> {
        let responses = self
            .collection
            .find(doc! { "user_id": user_id })
            .await?
            .try_collect()
            .await?;
        Ok(responses)
    }
}
