use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::{Database, USERS_COLLECTION},
    errors::AppResult,
    models::domain::UserRetention,
};

/// Identity collaborator: the quiz engine only pushes back data-retention deadlines.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn refresh_retention(&self, user_id: &str, expiry: DateTime<Utc>) -> AppResult<()>;
    async fn find_retention(&self, user_id: &str) -> AppResult<Option<UserRetention>>;
}

pub struct MongoUserRepository {
    collection: Collection<UserRetention>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(USERS_COLLECTION);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        let options = IndexOptions::builder()
            .unique(true)
            .name("user_id_unique".to_string())
            .build();
        let model = IndexModel::builder()
            .keys(doc! { "user_id": 1 })
            .options(options)
            .build();

        self.collection.create_index(model).await?;
        log::info!("Created unique index on user_id field");

        Ok(())
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn refresh_retention(&self, user_id: &str, expiry: DateTime<Utc>) -> AppResult<()> {
        // Stored the same way serde writes `UserRetention::retention_expiry`.
        self.collection
            .update_one(
                doc! { "user_id": user_id },
                doc! { "$set": { "retention_expiry": expiry.to_rfc3339() } },
            )
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn find_retention(&self, user_id: &str) -> AppResult<Option<UserRetention>> {
        let retention = self
            .collection
            .find_one(doc! { "user_id": user_id })
            .await?;
        Ok(retention)
    }
}
