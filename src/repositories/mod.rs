pub mod question_repository;
pub mod question_response_repository;
pub mod quiz_session_repository;
pub mod topic_repository;
pub mod user_repository;

pub use question_repository::{MongoQuestionRepository, QuestionRepository};
pub use question_response_repository::{
    MongoQuestionResponseRepository, QuestionResponseRepository,
};
pub use quiz_session_repository::{MongoQuizSessionRepository, QuizSessionRepository};
pub use topic_repository::{MongoTopicRepository, TopicRepository};
pub use user_repository::{MongoUserRepository, UserRepository};
