pub mod analytics_service;
pub mod attempt_policy;
pub mod keyed_lock;
pub mod quiz_service;
pub mod shuffle;

pub use analytics_service::AnalyticsService;
pub use quiz_service::QuizService;
