use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::{Database, TOPICS_COLLECTION},
    errors::AppResult,
    models::domain::Topic,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TopicRepository: Send + Sync {
    async fn find_active(&self) -> AppResult<Vec<Topic>>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Topic>>;
}

pub struct MongoTopicRepository {
    collection: Collection<Topic>,
}

impl MongoTopicRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(TOPICS_COLLECTION);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for topics collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let name_index = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("name_unique".to_string())
                    .build(),
            )
            .build();

        let active_index = IndexModel::builder()
            .keys(doc! { "is_active": 1 })
            .options(IndexOptions::builder().name("is_active".to_string()).build())
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(name_index).await?;
        self.collection.create_index(active_index).await?;

        log::info!("Successfully created indexes for topics collection");
        Ok(())
    }
}

#[async_trait]
impl TopicRepository for MongoTopicRepository {
    async fn find_active(&self) -> AppResult<Vec<Topic>> {
        let topics = self
            .collection
            .find(doc! { "is_active": true })
            .sort(doc! { "name": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(topics)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Topic>> {
        let topic = self.collection.find_one(doc! { "id": id }).await?;
        Ok(topic)
    }
}
