#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use quiz_session_server::{
    errors::{AppError, AppResult},
    models::domain::{Question, QuestionResponse, QuizSession, Topic, UserRetention},
    repositories::{
        QuestionRepository, QuestionResponseRepository, QuizSessionRepository, TopicRepository,
        UserRepository,
    },
    services::{shuffle::sample_questions, AnalyticsService, QuizService},
};

pub struct InMemoryTopicRepository {
    topics: Arc<RwLock<HashMap<String, Topic>>>,
}

impl InMemoryTopicRepository {
    pub fn new() -> Self {
        Self {
            topics: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn insert(&self, topic: Topic) {
        self.topics.write().await.insert(topic.id.clone(), topic);
    }

    pub async fn remove(&self, id: &str) {
        self.topics.write().await.remove(id);
    }
}

#[async_trait]
impl TopicRepository for InMemoryTopicRepository {
    async fn find_active(&self) -> AppResult<Vec<Topic>> {
        let topics = self.topics.read().await;
        let mut active: Vec<_> = topics.values().filter(|t| t.is_active).cloned().collect();
        active.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(active)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Topic>> {
        Ok(self.topics.read().await.get(id).cloned())
    }
}

pub struct InMemoryQuestionRepository {
    questions: Arc<RwLock<Vec<Question>>>,
}

impl InMemoryQuestionRepository {
    pub fn new() -> Self {
        Self {
            questions: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn insert(&self, question: Question) {
        self.questions.write().await.push(question);
    }

    pub async fn all(&self) -> Vec<Question> {
        self.questions.read().await.clone()
    }
}

#[async_trait]
impl QuestionRepository for InMemoryQuestionRepository {
    async fn sample_active_questions(
        &self,
        topic_id: &str,
        size: usize,
    ) -> AppResult<Vec<Question>> {
        let active = self.find_active_questions(topic_id).await?;
        let sample = sample_questions(active, size, &mut rand::thread_rng());
        Ok(sample)
    }

    async fn find_active_questions(&self, topic_id: &str) -> AppResult<Vec<Question>> {
        let questions = self.questions.read().await;
        Ok(questions
            .iter()
            .filter(|q| q.topic_id == topic_id && q.is_active)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Question>> {
        let questions = self.questions.read().await;
        Ok(questions.iter().find(|q| q.id == id).cloned())
    }

    async fn count_active_questions(&self, topic_id: &str) -> AppResult<u64> {
        Ok(self.find_active_questions(topic_id).await?.len() as u64)
    }
}

pub struct InMemoryQuizSessionRepository {
    sessions: Arc<RwLock<HashMap<String, QuizSession>>>,
    updates: AtomicUsize,
}

impl InMemoryQuizSessionRepository {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            updates: AtomicUsize::new(0),
        }
    }

    pub async fn get(&self, id: &str) -> Option<QuizSession> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Overwrites a stored session without counting it as an engine update.
    pub async fn put(&self, session: QuizSession) {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session);
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    async fn completed_where(&self, keep: impl Fn(&QuizSession) -> bool) -> Vec<QuizSession> {
        let sessions = self.sessions.read().await;
        let mut items: Vec<_> = sessions
            .values()
            .filter(|s| s.is_completed && keep(s))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        items
    }
}

#[async_trait]
impl QuizSessionRepository for InMemoryQuizSessionRepository {
    async fn create(&self, session: QuizSession) -> AppResult<QuizSession> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            return Err(AppError::AlreadyExists(format!(
                "Quiz session with id '{}' already exists",
                session.id
            )));
        }
        sessions.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn find_by_id_and_user(
        &self,
        id: &str,
        user_id: &str,
    ) -> AppResult<Option<QuizSession>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(id).filter(|s| s.user_id == user_id).cloned())
    }

    async fn find_open_by_id_and_user(
        &self,
        id: &str,
        user_id: &str,
    ) -> AppResult<Option<QuizSession>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(id)
            .filter(|s| s.user_id == user_id && !s.is_completed)
            .cloned())
    }

    async fn find_completed_by_user_and_topic(
        &self,
        user_id: &str,
        topic_id: &str,
    ) -> AppResult<Vec<QuizSession>> {
        Ok(self
            .completed_where(|s| s.user_id == user_id && s.topic_id == topic_id)
            .await)
    }

    async fn count_open_by_user_and_topic(
        &self,
        user_id: &str,
        topic_id: &str,
    ) -> AppResult<u64> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .values()
            .filter(|s| s.user_id == user_id && s.topic_id == topic_id && !s.is_completed)
            .count() as u64)
    }

    async fn find_completed_by_user(&self, user_id: &str) -> AppResult<Vec<QuizSession>> {
        Ok(self.completed_where(|s| s.user_id == user_id).await)
    }

    async fn update(&self, session: QuizSession) -> AppResult<QuizSession> {
        let mut sessions = self.sessions.write().await;
        if !sessions.contains_key(&session.id) {
            return Err(AppError::NotFound(format!(
                "Quiz session with id '{}' not found",
                session.id
            )));
        }
        self.updates.fetch_add(1, Ordering::SeqCst);
        sessions.insert(session.id.clone(), session.clone());
        Ok(session)
    }
}

pub struct InMemoryQuestionResponseRepository {
    responses: Arc<RwLock<Vec<QuestionResponse>>>,
}

impl InMemoryQuestionResponseRepository {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

#[async_trait]
impl QuestionResponseRepository for InMemoryQuestionResponseRepository {
    async fn create(&self, response: QuestionResponse) -> AppResult<QuestionResponse> {
        let mut responses = self.responses.write().await;
        let taken = responses
            .iter()
            .any(|r| r.session_id == response.session_id && r.question_id == response.question_id);
        if taken {
            return Err(AppError::AlreadyExists(format!(
                "Response for question '{}' in session '{}' already exists",
                response.question_id, response.session_id
            )));
        }
        responses.push(response.clone());
        Ok(response)
    }

    async fn find_by_session(&self, session_id: &str) -> AppResult<Vec<QuestionResponse>> {
        let responses = self.responses.read().await;
        Ok(responses
            .iter()
            .filter(|r| r.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn count_by_session(&self, session_id: &str) -> AppResult<u64> {
        Ok(self.find_by_session(session_id).await?.len() as u64)
    }

    async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<QuestionResponse>> {
        let responses = self.responses.read().await;
        Ok(responses
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }
}

pub struct InMemoryUserRepository {
    retention: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            retention: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn refresh_retention(&self, user_id: &str, expiry: DateTime<Utc>) -> AppResult<()> {
        self.retention
            .write()
            .await
            .insert(user_id.to_string(), expiry);
        Ok(())
    }

    async fn find_retention(&self, user_id: &str) -> AppResult<Option<UserRetention>> {
        let retention = self.retention.read().await;
        Ok(retention
            .get(user_id)
            .map(|expiry| UserRetention::new(user_id, *expiry)))
    }
}

/// Services wired to in-memory repositories, with handles kept for inspection.
pub struct TestHarness {
    pub topics: Arc<InMemoryTopicRepository>,
    pub questions: Arc<InMemoryQuestionRepository>,
    pub sessions: Arc<InMemoryQuizSessionRepository>,
    pub responses: Arc<InMemoryQuestionResponseRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub quiz: Arc<QuizService>,
    pub analytics: Arc<AnalyticsService>,
}

impl TestHarness {
    pub fn new() -> Self {
        let topics = Arc::new(InMemoryTopicRepository::new());
        let questions = Arc::new(InMemoryQuestionRepository::new());
        let sessions = Arc::new(InMemoryQuizSessionRepository::new());
        let responses = Arc::new(InMemoryQuestionResponseRepository::new());
        let users = Arc::new(InMemoryUserRepository::new());

        let quiz = Arc::new(QuizService::new(
            topics.clone(),
            questions.clone(),
            sessions.clone(),
            responses.clone(),
            users.clone(),
        ));
        let analytics = Arc::new(AnalyticsService::new(
            topics.clone(),
            questions.clone(),
            sessions.clone(),
            responses.clone(),
        ));

        Self {
            topics,
            questions,
            sessions,
            responses,
            users,
            quiz,
            analytics,
        }
    }

    /// Adds an active topic with `question_count` active questions. Every option text is
    /// unique, so the correct answer can be recognised by text alone.
    pub async fn seed_topic(&self, name: &str, question_count: usize) -> Topic {
        let mut topic = Topic::new(name, &format!("Questions about {}", name));
        topic.question_count = question_count as u32;
        self.topics.insert(topic.clone()).await;

        for n in 0..question_count {
            let options = (0..4).map(|o| format!("{} {} option {}", name, n, o)).collect();
            let question = Question::new(
                &topic.id,
                &format!("{} question {}", name, n),
                options,
                (n % 4) as u8,
            )
            .expect("seed question is valid");
            self.questions.insert(question).await;
        }

        topic
    }

    pub async fn canonical(&self, question_id: &str) -> Question {
        self.questions
            .find_by_id(question_id)
            .await
            .unwrap()
            .expect("question exists")
    }
}

/// An index that is never the correct one.
pub fn wrong_index(correct: u8) -> u8 {
    (correct + 1) % 4
}
