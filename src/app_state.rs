use std::sync::Arc;

use crate::{
    auth::JwtService,
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        MongoQuestionRepository, MongoQuestionResponseRepository, MongoQuizSessionRepository,
        MongoTopicRepository, MongoUserRepository,
    },
    services::{AnalyticsService, QuizService},
};

/// Services shared by every worker. Built once at start-up.
#[derive(Clone)]
pub struct AppState {
    pub quiz_service: Arc<QuizService>,
    pub analytics_service: Arc<AnalyticsService>,
    pub jwt_service: Arc<JwtService>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let topics = Arc::new(MongoTopicRepository::new(&db));
        topics.ensure_indexes().await?;
        let questions = Arc::new(MongoQuestionRepository::new(&db));
        questions.ensure_indexes().await?;
        let sessions = Arc::new(MongoQuizSessionRepository::new(&db));
        sessions.ensure_indexes().await?;
        let responses = Arc::new(MongoQuestionResponseRepository::new(&db));
        responses.ensure_indexes().await?;
        let users = Arc::new(MongoUserRepository::new(&db));
        users.ensure_indexes().await?;

        let quiz_service = Arc::new(QuizService::new(
            topics.clone(),
            questions.clone(),
            sessions.clone(),
            responses.clone(),
            users,
        ));
        let analytics_service = Arc::new(AnalyticsService::new(
            topics,
            questions,
            sessions,
            responses,
        ));

        Ok(Self::with_services(quiz_service, analytics_service, config))
    }

    /// Wires already-built services, e.g. ones backed by in-memory repositories.
    /// Only the token settings of `config` are kept.
    pub fn with_services(
        quiz_service: Arc<QuizService>,
        analytics_service: Arc<AnalyticsService>,
        config: Config,
    ) -> Self {
        let jwt_service = Arc::new(JwtService::new(
            &config.jwt_secret,
            config.jwt_expiration_hours,
        ));

        Self {
            quiz_service,
            analytics_service,
            jwt_service,
        }
    }
}
