use actix_web::{get, post, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::{AppError, QuizError},
    models::dto::{
        request::{CompleteQuizRequest, StartQuizRequest, SubmitAnswerRequest},
        response::ApiResponse,
    },
};

#[get("/quiz/topics")]
async fn list_topics(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, QuizError> {
    let topics = state.quiz_service.list_topics(auth.user_id()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(topics)))
}

#[post("/quiz/start")]
async fn start_quiz(
    state: web::Data<AppState>,
    request: web::Json<StartQuizRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, QuizError> {
    request.validate().map_err(AppError::from)?;

    let session = state
        .quiz_service
        .start_session(auth.user_id(), &request.topic_id)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(session)))
}

#[post("/quiz/submit-answer")]
async fn submit_answer(
    state: web::Data<AppState>,
    request: web::Json<SubmitAnswerRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, QuizError> {
    request.validate().map_err(AppError::from)?;
    let request = request.into_inner();

    let outcome = state
        .quiz_service
        .submit_answer(
            auth.user_id(),
            &request.session_id,
            &request.question_id,
            request.selected_answer_index,
            request.response_time,
        )
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(outcome)))
}

#[post("/quiz/complete")]
async fn complete_quiz(
    state: web::Data<AppState>,
    request: web::Json<CompleteQuizRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, QuizError> {
    request.validate().map_err(AppError::from)?;

    let result = state
        .quiz_service
        .complete_session(auth.user_id(), &request.session_id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(result)))
}
