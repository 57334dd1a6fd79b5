use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use chrono::{DateTime, Utc};

use crate::{
    errors::AppResult,
    models::{
        domain::{QuestionResponse, QuizSession, ShuffledQuestion, Topic},
        dto::{
            analytics_dto::{
                DashboardDto, OverallStatsDto, PerformanceSummaryDto, QuestionPerformanceDto,
                QuestionPerformanceReportDto, RecentQuizDto, ReportDto, ReportQuizDto,
                ReportResponseDto, ReportSummaryDto, TopicStatsDto,
            },
            request::ReportPeriod,
        },
    },
    repositories::{
        QuestionRepository, QuestionResponseRepository, QuizSessionRepository, TopicRepository,
    },
    services::attempt_policy::AttemptSummary,
};

pub const DEFAULT_QUESTION_LIMIT: usize = 50;

const UNKNOWN_TOPIC: &str = "Unknown";
const MISSING_QUESTION: &str = "Question not found";
const NOT_ATTEMPTED: &str = "Not attempted";

/// Read-only dashboards and reports over completed sessions and the response ledger.
pub struct AnalyticsService {
    topics: Arc<dyn TopicRepository>,
    questions: Arc<dyn QuestionRepository>,
    sessions: Arc<dyn QuizSessionRepository>,
    responses: Arc<dyn QuestionResponseRepository>,
}

impl AnalyticsService {
    pub fn new(
        topics: Arc<dyn TopicRepository>,
        questions: Arc<dyn QuestionRepository>,
        sessions: Arc<dyn QuizSessionRepository>,
        responses: Arc<dyn QuestionResponseRepository>,
    ) -> Self {
        Self {
            topics,
            questions,
            sessions,
            responses,
        }
    }

    pub async fn dashboard(&self, user_id: &str) -> AppResult<DashboardDto> {
        let completed = self.sessions.find_completed_by_user(user_id).await?;
        let responses = self.responses.find_by_user(user_id).await?;

        let names = self
            .topic_names(completed.iter().map(|s| s.topic_id.as_str()))
            .await?;
        let active_topics = self.topics.find_active().await?;

        Ok(DashboardDto {
            overall_stats: overall_stats(&completed, &responses),
            recent_quizzes: recent_quizzes(&completed, &names),
            topic_stats: topic_stats(&active_topics, &completed, &responses),
        })
    }

    /// Per-question accuracy over the user's ledger, most recently answered first.
    /// With `topic_id`, only answers from completed sessions on that topic count.
    pub async fn question_performance(
        &self,
        user_id: &str,
        topic_id: Option<&str>,
        limit: Option<usize>,
    ) -> AppResult<QuestionPerformanceReportDto> {
        let mut responses = self.responses.find_by_user(user_id).await?;

        if let Some(topic_id) = topic_id {
            let sessions = self
                .sessions
                .find_completed_by_user_and_topic(user_id, topic_id)
                .await?;
            let ids: HashSet<&str> = sessions.iter().map(|s| s.id.as_str()).collect();
            responses.retain(|r| ids.contains(r.session_id.as_str()));
        }

        let mut stats = question_stats(&responses);
        stats.truncate(limit.unwrap_or(DEFAULT_QUESTION_LIMIT));
        let summary = performance_summary(&stats);

        let mut question_performance = Vec::with_capacity(stats.len());
        let mut names: HashMap<String, String> = HashMap::new();
        for stat in stats {
            let (question_text, topic_name) =
                match self.questions.find_by_id(&stat.question_id).await? {
                    Some(question) => {
                        if !names.contains_key(&question.topic_id) {
                            let name = self
                                .topics
                                .find_by_id(&question.topic_id)
                                .await?
                                .map_or_else(|| UNKNOWN_TOPIC.to_string(), |t| t.name);
                            names.insert(question.topic_id.clone(), name);
                        }
                        let topic_name = names
                            .get(&question.topic_id)
                            .cloned()
                            .unwrap_or_else(|| UNKNOWN_TOPIC.to_string());
                        (question.question_text, topic_name)
                    }
                    None => (MISSING_QUESTION.to_string(), UNKNOWN_TOPIC.to_string()),
                };
            question_performance.push(stat.into_dto(question_text, topic_name));
        }

        Ok(QuestionPerformanceReportDto {
            question_performance,
            summary,
        })
    }

    /// Everything an exported report shows for sessions completed within `period`.
    pub async fn report(&self, user_id: &str, period: ReportPeriod) -> AppResult<ReportDto> {
        let generated_at = Utc::now();

        let mut completed = self.sessions.find_completed_by_user(user_id).await?;
        if let Some(since) = period.since(generated_at) {
            completed.retain(|s| s.completed_at.is_some_and(|at| at >= since));
        }

        let responses = self.responses.find_by_user(user_id).await?;
        let names = self
            .topic_names(completed.iter().map(|s| s.topic_id.as_str()))
            .await?;

        let mut detailed_responses = Vec::new();
        for session in &completed {
            for response in responses.iter().filter(|r| r.session_id == session.id) {
                let snapshot = match session.snapshot(&response.question_id) {
                    Some(snapshot) => Some(snapshot.clone()),
                    None => self
                        .questions
                        .find_by_id(&response.question_id)
                        .await?
                        .map(|question| ShuffledQuestion::unshuffled(&question)),
                };
                detailed_responses.push(response_detail(snapshot.as_ref(), response));
            }
        }

        Ok(ReportDto {
            period,
            generated_at,
            user_id: user_id.to_string(),
            summary: report_summary(&completed),
            quizzes: report_quizzes(&completed, &names),
            detailed_responses,
        })
    }

    /// Names of the topics that still exist, keyed by id.
    async fn topic_names<'a>(
        &self,
        topic_ids: impl Iterator<Item = &'a str>,
    ) -> AppResult<HashMap<String, String>> {
        let mut names = HashMap::new();
        let mut seen = HashSet::new();

        for topic_id in topic_ids {
            if !seen.insert(topic_id) {
                continue;
            }
            if let Some(topic) = self.topics.find_by_id(topic_id).await? {
                names.insert(topic_id.to_string(), topic.name);
            }
        }

        Ok(names)
    }
}

fn mean(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

fn overall_stats(completed: &[QuizSession], responses: &[QuestionResponse]) -> OverallStatsDto {
    let score_total: u32 = completed.iter().map(|s| s.score).sum();
    let time_total: f64 = responses.iter().map(|r| r.response_time).sum();

    OverallStatsDto {
        total_quizzes: completed.len() as u32,
        average_score: mean(f64::from(score_total), completed.len()),
        average_response_time: mean(time_total, responses.len()),
        total_correct_answers: responses.iter().filter(|r| r.is_correct).count() as u32,
        total_questions: responses.len() as u32,
        unattempted_questions: responses.iter().filter(|r| !r.was_attempted).count() as u32,
    }
}

/// Newest first. Sessions whose topic has since been removed are left out.
fn recent_quizzes(
    completed: &[QuizSession],
    names: &HashMap<String, String>,
) -> Vec<RecentQuizDto> {
    completed
        .iter()
        .filter_map(|session| {
            let topic_name = names.get(&session.topic_id)?;
            Some(RecentQuizDto {
                session_id: session.id.clone(),
                topic_name: topic_name.clone(),
                score: session.score,
                completed_at: session.completed_at,
                time_spent: session.time_spent,
            })
        })
        .collect()
}

/// One entry per active topic the user has completed at least once, in topic order.
/// `completed` is expected newest first.
fn topic_stats(
    topics: &[Topic],
    completed: &[QuizSession],
    responses: &[QuestionResponse],
) -> Vec<TopicStatsDto> {
    topics
        .iter()
        .filter_map(|topic| {
            let sessions: Vec<QuizSession> = completed
                .iter()
                .filter(|s| s.topic_id == topic.id)
                .cloned()
                .collect();
            let latest = sessions.first()?;

            let times: Vec<f64> = responses
                .iter()
                .filter(|r| sessions.iter().any(|s| s.id == r.session_id))
                .map(|r| r.response_time)
                .collect();
            let score_total: u32 = sessions.iter().map(|s| s.score).sum();
            let summary = AttemptSummary::from_sessions(&sessions);

            Some(TopicStatsDto {
                topic_id: topic.id.clone(),
                topic_name: topic.name.clone(),
                quizzes_taken: sessions.len() as u32,
                average_score: mean(f64::from(score_total), sessions.len()),
                average_response_time: mean(times.iter().sum(), times.len()),
                best_score: summary.best_score,
                last_attempt_date: latest.completed_at,
                current_attempt_count: AttemptSummary::attempts_toward_cap(&sessions),
            })
        })
        .collect()
}

struct QuestionStat {
    question_id: String,
    times_attempted: u32,
    times_correct: u32,
    total_time: f64,
    last_attempted: DateTime<Utc>,
}

impl QuestionStat {
    fn accuracy_rate(&self) -> f64 {
        mean(f64::from(self.times_correct) * 100.0, self.times_attempted as usize)
    }

    fn average_response_time(&self) -> f64 {
        mean(self.total_time, self.times_attempted as usize)
    }

    fn into_dto(self, question_text: String, topic_name: String) -> QuestionPerformanceDto {
        QuestionPerformanceDto {
            accuracy_rate: self.accuracy_rate(),
            average_response_time: self.average_response_time(),
            question_id: self.question_id,
            question_text,
            topic_name,
            times_attempted: self.times_attempted,
            times_correct: self.times_correct,
            last_attempted: self.last_attempted,
        }
    }
}

/// Ledger entries grouped by question, most recently answered first.
fn question_stats(responses: &[QuestionResponse]) -> Vec<QuestionStat> {
    let mut by_question: HashMap<&str, QuestionStat> = HashMap::new();

    for response in responses {
        let stat = by_question
            .entry(response.question_id.as_str())
            .or_insert_with(|| QuestionStat {
                question_id: response.question_id.clone(),
                times_attempted: 0,
                times_correct: 0,
                total_time: 0.0,
                last_attempted: response.created_at,
            });
        stat.times_attempted += 1;
        if response.is_correct {
            stat.times_correct += 1;
        }
        stat.total_time += response.response_time;
        stat.last_attempted = stat.last_attempted.max(response.created_at);
    }

    let mut stats: Vec<QuestionStat> = by_question.into_values().collect();
    stats.sort_by(|a, b| {
        b.last_attempted
            .cmp(&a.last_attempted)
            .then_with(|| a.question_id.cmp(&b.question_id))
    });
    stats
}

fn performance_summary(stats: &[QuestionStat]) -> PerformanceSummaryDto {
    let accuracy: f64 = stats.iter().map(QuestionStat::accuracy_rate).sum();
    let time: f64 = stats.iter().map(QuestionStat::average_response_time).sum();

    PerformanceSummaryDto {
        total_questions_attempted: stats.len() as u32,
        overall_accuracy: mean(accuracy, stats.len()),
        average_response_time: mean(time, stats.len()),
    }
}

fn report_summary(completed: &[QuizSession]) -> ReportSummaryDto {
    let score_total: u32 = completed.iter().map(|s| s.score).sum();

    ReportSummaryDto {
        total_quizzes: completed.len() as u32,
        average_score: mean(f64::from(score_total), completed.len()),
        total_time_spent: completed.iter().map(|s| s.time_spent).sum(),
        passed_quizzes: completed.iter().filter(|s| s.passed_threshold).count() as u32,
    }
}

fn report_quizzes(
    completed: &[QuizSession],
    names: &HashMap<String, String>,
) -> Vec<ReportQuizDto> {
    completed
        .iter()
        .map(|session| ReportQuizDto {
            session_id: session.id.clone(),
            topic: names
                .get(&session.topic_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_TOPIC.to_string()),
            score: session.score,
            percentage: session.percentage(),
            time_spent: session.time_spent,
            completed_at: session.completed_at,
            passed: session.passed_threshold,
        })
        .collect()
}

/// Answer texts come from the snapshot the user saw, so the selected index lines up.
fn response_detail(
    snapshot: Option<&ShuffledQuestion>,
    response: &QuestionResponse,
) -> ReportResponseDto {
    let option = |index: u8| {
        snapshot
            .and_then(|q| q.options.get(usize::from(index)))
            .cloned()
    };

    ReportResponseDto {
        session_id: response.session_id.clone(),
        question_id: response.question_id.clone(),
        question_text: snapshot
            .map_or_else(|| MISSING_QUESTION.to_string(), |q| q.question_text.clone()),
        user_answer: match response.selected_answer_index {
            Some(index) => option(index).unwrap_or_else(|| MISSING_QUESTION.to_string()),
            None => NOT_ATTEMPTED.to_string(),
        },
        correct_answer: snapshot
            .and_then(|q| q.correct_option())
            .map_or_else(|| MISSING_QUESTION.to_string(), str::to_string),
        is_correct: response.is_correct,
        response_time: response.response_time,
        was_attempted: response.was_attempted,
    }
}
