use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::{Database, QUIZ_SESSIONS_COLLECTION},
    errors::{AppError, AppResult},
    models::domain::QuizSession,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizSessionRepository: Send + Sync {
    async fn create(&self, session: QuizSession) -> AppResult<QuizSession>;
    async fn find_by_id_and_user(&self, id: &str, user_id: &str)
        -> AppResult<Option<QuizSession>>;
    /// Like `find_by_id_and_user`, restricted to sessions not yet completed.
    async fn find_open_by_id_and_user(
        &self,
        id: &str,
        user_id: &str,
    ) -> AppResult<Option<QuizSession>>;
    /// Completed sessions for a topic, newest completion first.
    async fn find_completed_by_user_and_topic(
        &self,
        user_id: &str,
        topic_id: &str,
    ) -> AppResult<Vec<QuizSession>>;
    /// Sessions on a topic that were started but never completed.
    async fn count_open_by_user_and_topic(&self, user_id: &str, topic_id: &str)
        -> AppResult<u64>;
    /// Completed sessions across all topics, newest completion first.
    async fn find_completed_by_user(&self, user_id: &str) -> AppResult<Vec<QuizSession>>;
    async fn update(&self, session: QuizSession) -> AppResult<QuizSession>;
}

pub struct MongoQuizSessionRepository {
    collection: Collection<QuizSession>,
}

impl MongoQuizSessionRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(QUIZ_SESSIONS_COLLECTION);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for quiz_sessions collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let user_topic_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "topic_id": 1, "is_completed": 1 })
            .options(
                IndexOptions::builder()
                    .name("user_topic_completed".to_string())
                    .build(),
            )
            .build();

        let completed_at_index = IndexModel::builder()
            .keys(doc! { "completed_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("completed_at".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(user_topic_index).await?;
        self.collection.create_index(completed_at_index).await?;

        log::info!("Successfully created indexes for quiz_sessions collection");
        Ok(())
    }
}

#[async_trait]
impl QuizSessionRepository for MongoQuizSessionRepository {
    async fn create(&self, session: QuizSession) -> AppResult<QuizSession> {
        self.collection.insert_one(&session).await?;
        Ok(session)
    }

    async fn find_by_id_and_user(
        &self,
        id: &str,
        user_id: &str,
    ) -> AppResult<Option<QuizSession>> {
        let session = self
            .collection
            .find_one(doc! { "id": id, "user_id": user_id })
            .await?;
        Ok(session)
    }

    async fn find_open_by_id_and_user(
        &self,
        id: &str,
        user_id: &str,
    ) -> AppResult<Option<QuizSession>> {
        let session = self
            .collection
            .find_one(doc! { "id": id, "user_id": user_id, "is_completed": false })
            .await?;
        Ok(session)
    }

    async fn find_completed_by_user_and_topic(
        &self,
        user_id: &str,
        topic_id: &str,
    ) -> AppResult<Vec<QuizSession>> {
        let sessions = self
            .collection
            .find(doc! {
                "user_id": user_id,
                "topic_id": topic_id,
                "is_completed": true
            })
            .sort(doc! { "completed_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(sessions)
    }

    async fn count_open_by_user_and_topic(
        &self,
        user_id: &str,
        topic_id: &str,
    ) -> AppResult<u64> {
        let count = self
            .collection
            .count_documents(doc! {
                "user_id": user_id,
                "topic_id": topic_id,
                "is_completed": false
            })
            .await?;
        Ok(count)
    }

    async fn find_completed_by_user(&self, user_id: &str) -> AppResult<Vec<QuizSession>> {
        let sessions = self
            .collection
            .find(doc! { "user_id": user_id, "is_completed": true })
            .sort(doc! { "completed_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(sessions)
    }

    async fn update(&self, session: QuizSession) -> AppResult<QuizSession> {
        let result = self
            .collection
            .replace_one(doc! { "id": &session.id }, &session)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Quiz session with id '{}' not found",
                session.id
            )));
        }

        Ok(session)
    }
}
