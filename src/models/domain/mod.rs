pub mod question;
pub mod question_response;
pub mod quiz_session;
pub mod topic;
pub mod user;

pub use question::{Difficulty, MediaType, Question, ShuffledQuestion};
pub use question_response::{QuestionResponse, ResponseTally};
pub use quiz_session::{QuizSession, SessionState};
pub use topic::Topic;
pub use user::UserRetention;
