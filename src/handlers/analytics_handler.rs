use actix_web::{get, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::{
        request::{QuestionPerformanceQuery, ReportQuery},
        response::ApiResponse,
    },
};

#[get("/analytics/dashboard")]
async fn dashboard(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let dashboard = state.analytics_service.dashboard(auth.user_id()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(dashboard)))
}

#[get("/analytics/question-performance")]
async fn question_performance(
    state: web::Data<AppState>,
    query: web::Query<QuestionPerformanceQuery>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    query.validate()?;

    let performance = state
        .analytics_service
        .question_performance(auth.user_id(), query.topic_id.as_deref(), query.limit)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(performance)))
}

/// Report data only; rendering a document from it is left to the client.
#[get("/analytics/export")]
async fn export_report(
    state: web::Data<AppState>,
    query: web::Query<ReportQuery>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let report = state
        .analytics_service
        .report(auth.user_id(), query.period)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(report)))
}
