pub mod analytics_handler;
pub mod health_handler;
pub mod quiz_handler;

use actix_web::web;

use crate::{auth::AuthMiddleware, errors::AppError};

/// Registers every route. Everything under `/api` requires a bearer token.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(format!("Invalid request body: {}", err)).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(format!("Invalid query string: {}", err)).into()
    }))
    .service(health_handler::health_check)
    .service(health_handler::health_check_live)
    .service(
        web::scope("/api")
            .wrap(AuthMiddleware)
            .service(quiz_handler::list_topics)
            .service(quiz_handler::start_quiz)
            .service(quiz_handler::submit_answer)
            .service(quiz_handler::complete_quiz)
            .service(analytics_handler::dashboard)
            .service(analytics_handler::question_performance)
            .service(analytics_handler::export_report),
    );
}
