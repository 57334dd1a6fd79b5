use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The part of a user record the quiz engine touches: when their quiz data may be purged.
/// Identity itself (credentials, tokens) is owned by the auth service.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserRetention {
    pub user_id: String,
    pub retention_expiry: DateTime<Utc>,
}

impl UserRetention {
    pub fn new(user_id: &str, retention_expiry: DateTime<Utc>) -> Self {
        UserRetention {
            user_id: user_id.to_string(),
            retention_expiry,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.retention_expiry <= now
    }
}
