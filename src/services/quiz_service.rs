use std::sync::Arc;

use chrono::{Duration, Utc};
use futures::future::try_join_all;

use crate::{
    constants::quiz_rules::{
        MAX_ATTEMPTS, QUESTIONS_PER_SESSION, RETENTION_DAYS, SECONDS_PER_QUESTION,
    },
    errors::{AppError, QuizError, QuizResult},
    models::{
        domain::{QuestionResponse, QuizSession, ResponseTally, ShuffledQuestion},
        dto::quiz_dto::{
            NextQuestionDto, PerformanceDto, ProgressDto, QuestionReviewDto, QuizResultDto,
            ScoreSummaryDto, SessionQuestionDto, StartSessionDto, SubmitAnswerOutcome,
            TopicListDto, TopicSummaryDto,
        },
    },
    repositories::{
        QuestionRepository, QuestionResponseRepository, QuizSessionRepository, TopicRepository,
        UserRepository,
    },
    services::{attempt_policy::AttemptSummary, keyed_lock::KeyedLocks, shuffle::shuffle_question},
};

/// The quiz session engine.
///
/// Sessions move `InProgress -> Completed` and never back; one left open keeps its
/// attempt slot. Answers for one session and starts for one (user, topic) pair are
/// serialized in-process, which keeps completion at-most-once and the attempt cap exact
/// for a single server instance.
pub struct QuizService {
    topics: Arc<dyn TopicRepository>,
    questions: Arc<dyn QuestionRepository>,
    sessions: Arc<dyn QuizSessionRepository>,
    responses: Arc<dyn QuestionResponseRepository>,
    users: Arc<dyn UserRepository>,
    session_locks: KeyedLocks,
    start_locks: KeyedLocks,
}

impl QuizService {
    pub fn new(
        topics: Arc<dyn TopicRepository>,
        questions: Arc<dyn QuestionRepository>,
        sessions: Arc<dyn QuizSessionRepository>,
        responses: Arc<dyn QuestionResponseRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            topics,
            questions,
            sessions,
            responses,
            users,
            session_locks: KeyedLocks::new(),
            start_locks: KeyedLocks::new(),
        }
    }

    /// Active topics with the caller's attempt state on each.
    pub async fn list_topics(&self, user_id: &str) -> QuizResult<TopicListDto> {
        let topics = self.topics.find_active().await?;

        let topics = try_join_all(topics.into_iter().map(|topic| async move {
            let history = self
                .sessions
                .find_completed_by_user_and_topic(user_id, &topic.id)
                .await?;
            let open = self
                .sessions
                .count_open_by_user_and_topic(user_id, &topic.id)
                .await?;
            let summary = AttemptSummary::from_sessions(&history).with_open(open);

            Ok::<_, AppError>(TopicSummaryDto::new(
                topic,
                summary.completed,
                MAX_ATTEMPTS,
                summary.can_retake(),
                summary.best_score,
            ))
        }))
        .await?;

        Ok(TopicListDto { topics })
    }

    pub async fn start_session(
        &self,
        user_id: &str,
        topic_id: &str,
    ) -> QuizResult<StartSessionDto> {
        let _guard = self
            .start_locks
            .lock(&format!("{}:{}", user_id, topic_id))
            .await;

        let topic = self
            .topics
            .find_by_id(topic_id)
            .await?
            .filter(|t| t.is_active)
            .ok_or_else(|| QuizError::TopicNotFound(topic_id.to_string()))?;

        let history = self
            .sessions
            .find_completed_by_user_and_topic(user_id, topic_id)
            .await?;
        let open = self
            .sessions
            .count_open_by_user_and_topic(user_id, topic_id)
            .await?;
        let summary = AttemptSummary::from_sessions(&history).with_open(open);
        summary.ensure_can_start()?;

        if self.questions.count_active_questions(topic_id).await? == 0 {
            return Err(QuizError::InsufficientQuestions(topic_id.to_string()));
        }

        let selected = self
            .questions
            .sample_active_questions(topic_id, QUESTIONS_PER_SESSION)
            .await?;
        if selected.is_empty() {
            return Err(QuizError::InsufficientQuestions(topic_id.to_string()));
        }

        let snapshots: Vec<ShuffledQuestion> = {
            let mut rng = rand::thread_rng();
            selected
                .iter()
                .map(|question| shuffle_question(question, &mut rng))
                .collect()
        };

        let attempt_number = summary.next_attempt_number();
        let session = QuizSession::new(user_id, topic_id, snapshots, attempt_number);
        let session = self.sessions.create(session).await?;

        log::info!(
            "User {} started session {} on topic {} (attempt {}, {} questions)",
            user_id,
            session.id,
            topic_id,
            session.attempt_number,
            session.total_questions
        );

        Ok(StartSessionDto {
            session_id: session.id,
            topic_name: topic.name,
            total_questions: session.total_questions,
            time_per_question: SECONDS_PER_QUESTION,
            attempt_number: session.attempt_number,
            questions: session
                .shuffled_questions
                .into_iter()
                .map(SessionQuestionDto::from)
                .collect(),
        })
    }

    /// Records one answer. Returns the next question, or the final results when this
    /// answer finished the session.
    pub async fn submit_answer(
        &self,
        user_id: &str,
        session_id: &str,
        question_id: &str,
        selected_answer_index: Option<u8>,
        response_time: f64,
    ) -> QuizResult<SubmitAnswerOutcome> {
        let _guard = self.session_locks.lock(session_id).await;

        let session = self
            .sessions
            .find_open_by_id_and_user(session_id, user_id)
            .await?
            .ok_or_else(|| QuizError::SessionNotFound(session_id.to_string()))?;

        let position = session
            .position_of(question_id)
            .ok_or_else(|| QuizError::QuestionNotFound(question_id.to_string()))?;
        let question = self.resolve_snapshot(&session, question_id).await?;

        let answered = self.responses.find_by_session(session_id).await?;
        if answered.iter().any(|r| r.question_id == question_id) {
            return Err(duplicate(session_id, question_id));
        }

        let response = QuestionResponse::record(
            user_id,
            session_id,
            question_id,
            selected_answer_index,
            response_time,
            question.correct_answer_index,
        );
        let is_correct = response.is_correct;

        self.responses
            .create(response)
            .await
            .map_err(|err| match err {
                AppError::AlreadyExists(_) => duplicate(session_id, question_id),
                other => QuizError::Storage(other),
            })?;

        let answered = self.responses.count_by_session(session_id).await?;
        if answered >= u64::from(session.total_questions) || session.is_last_position(position) {
            let result = self.complete_locked(session).await?;
            return Ok(SubmitAnswerOutcome::Completed(result));
        }

        let next_id = &session.questions[position + 1];
        let next_question = self.resolve_snapshot(&session, next_id).await?;

        Ok(SubmitAnswerOutcome::InProgress(NextQuestionDto {
            is_correct,
            next_question: next_question.into(),
            progress: ProgressDto {
                current_question: (position + 2) as u32,
                total_questions: session.total_questions,
            },
        }))
    }

    /// Completes the session if it is still open and returns its results.
    /// Safe to call again on a completed session; nothing is rewritten.
    pub async fn complete_session(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> QuizResult<QuizResultDto> {
        let _guard = self.session_locks.lock(session_id).await;

        let session = self
            .sessions
            .find_by_id_and_user(session_id, user_id)
            .await?
            .ok_or_else(|| QuizError::SessionNotFound(session_id.to_string()))?;

        self.complete_locked(session).await
    }

    // Caller must hold the session lock.
    async fn complete_locked(&self, mut session: QuizSession) -> QuizResult<QuizResultDto> {
        let responses = self.responses.find_by_session(&session.id).await?;
        let tally = ResponseTally::from_responses(&responses);

        if !session.is_completed {
            let now = Utc::now();
            session.complete(&tally, now);
            session = self.sessions.update(session).await?;

            log::info!(
                "Session {} completed: score {}/{} (passed: {})",
                session.id,
                session.score,
                session.total_questions,
                session.passed_threshold
            );

            let expiry = now + Duration::days(RETENTION_DAYS);
            if let Err(err) = self.users.refresh_retention(&session.user_id, expiry).await {
                log::warn!(
                    "Failed to refresh data retention for user {}: {}",
                    session.user_id,
                    err
                );
            }
        }

        Ok(build_result(&session, &responses, &tally))
    }

    /// The session's own snapshot, or the canonical question in its original order when
    /// the snapshot is missing.
    async fn resolve_snapshot(
        &self,
        session: &QuizSession,
        question_id: &str,
    ) -> QuizResult<ShuffledQuestion> {
        if let Some(snapshot) = session.snapshot(question_id) {
            return Ok(snapshot.clone());
        }

        log::warn!(
            "Session {} has no snapshot for question {}; using the question bank",
            session.id,
            question_id
        );
        self.questions
            .find_by_id(question_id)
            .await?
            .map(|question| ShuffledQuestion::unshuffled(&question))
            .ok_or_else(|| QuizError::QuestionNotFound(question_id.to_string()))
    }
}

fn duplicate(session_id: &str, question_id: &str) -> QuizError {
    QuizError::DuplicateAnswer {
        session_id: session_id.to_string(),
        question_id: question_id.to_string(),
    }
}

fn build_result(
    session: &QuizSession,
    responses: &[QuestionResponse],
    tally: &ResponseTally,
) -> QuizResultDto {
    let question_review = session
        .shuffled_questions
        .iter()
        .map(|question| {
            let response = responses.iter().find(|r| r.question_id == question.id);
            QuestionReviewDto {
                question_id: question.id.clone(),
                question_text: question.question_text.clone(),
                options: question.options.clone(),
                correct_answer_index: question.correct_answer_index,
                user_answer_index: response.and_then(|r| r.selected_answer_index),
                is_correct: response.is_some_and(|r| r.is_correct),
                response_time: response.map_or(SECONDS_PER_QUESTION, |r| r.response_time),
            }
        })
        .collect();

    QuizResultDto {
        session_id: session.id.clone(),
        quiz_results: ScoreSummaryDto {
            score: session.score,
            total_questions: session.total_questions,
            percentage: session.percentage(),
            time_spent: session.time_spent,
            passed: session.passed_threshold,
        },
        question_review,
        performance: PerformanceDto {
            average_response_time: session.average_response_time(),
            unattempted_questions: tally.unattempted,
        },
        completed_at: session.completed_at,
    }
}
