use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::{Database, QUESTIONS_COLLECTION},
    errors::AppResult,
    models::domain::Question,
    services::shuffle::sample_questions,
};

/// The question bank as seen by the quiz engine.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Uniform random sample of active questions, without replacement.
    /// Returns fewer than `size` when the topic does not have enough.
    async fn sample_active_questions(&self, topic_id: &str, size: usize)
        -> AppResult<Vec<Question>>;
    async fn find_active_questions(&self, topic_id: &str) -> AppResult<Vec<Question>>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Question>>;
    async fn count_active_questions(&self, topic_id: &str) -> AppResult<u64>;
}

pub struct MongoQuestionRepository {
    collection: Collection<Question>,
}

impl MongoQuestionRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(QUESTIONS_COLLECTION);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for questions collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let topic_active_index = IndexModel::builder()
            .keys(doc! { "topic_id": 1, "is_active": 1 })
            .options(
                IndexOptions::builder()
                    .name("topic_active".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(topic_active_index).await?;

        log::info!("Successfully created indexes for questions collection");
        Ok(())
    }
}

#[async_trait]
impl QuestionRepository for MongoQuestionRepository {
    async fn sample_active_questions(
        &self,
        topic_id: &str,
        size: usize,
    ) -> AppResult<Vec<Question>> {
        let active = self.find_active_questions(topic_id).await?;
        let sample = sample_questions(active, size, &mut rand::thread_rng());
        Ok(sample)
    }

    async fn find_active_questions(&self, topic_id: &str) -> AppResult<Vec<Question>> {
        let questions = self
            .collection
            .find(doc! { "topic_id": topic_id, "is_active": true })
            .await?
            .try_collect()
            .await?;
        Ok(questions)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Question>> {
        let question = self.collection.find_one(doc! { "id": id }).await?;
        Ok(question)
    }

    async fn count_active_questions(&self, topic_id: &str) -> AppResult<u64> {
        let count = self
            .collection
            .count_documents(doc! { "topic_id": topic_id, "is_active": true })
            .await?;
        Ok(count)
    }
}
