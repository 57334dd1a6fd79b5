use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A quiz subject. Administered outside the quiz engine, read-only here.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Topic {
    pub id: String,
    pub name: String, // unique
    pub description: String,
    pub is_active: bool,
    pub question_count: u32, // cached, maintained by whoever seeds questions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Topic {
    pub fn new(name: &str, description: &str) -> Self {
        Topic {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.to_string(),
            is_active: true,
            question_count: 0,
            created_at: Some(Utc::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_topic_is_active_and_empty() {
        let topic = Topic::new("Science", "Physics, chemistry and biology");

        assert!(topic.is_active);
        assert_eq!(topic.question_count, 0);
        assert_eq!(topic.name, "Science");
        assert!(Uuid::parse_str(&topic.id).is_ok());
    }
}
