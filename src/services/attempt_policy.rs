use crate::{
    constants::quiz_rules::MAX_ATTEMPTS,
    errors::{QuizError, QuizResult},
    models::domain::QuizSession,
};

/// What a user's history on one topic allows them to do next.
///
/// Sessions still open count against the cap like failed ones: an abandoned session
/// forfeits its attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttemptSummary {
    pub completed: u32,
    pub open: u32,
    pub passed_any: bool,
    pub best_score: u32,
}

impl AttemptSummary {
    pub fn from_sessions(sessions: &[QuizSession]) -> Self {
        sessions
            .iter()
            .fold(Self::default(), |acc, s| {
                if s.is_completed {
                    AttemptSummary {
                        completed: acc.completed + 1,
                        passed_any: acc.passed_any || s.passed_threshold,
                        best_score: acc.best_score.max(s.score),
                        ..acc
                    }
                } else {
                    AttemptSummary {
                        open: acc.open + 1,
                        ..acc
                    }
                }
            })
    }

    /// Adds sessions that were counted rather than loaded.
    pub fn with_open(self, open: u64) -> Self {
        AttemptSummary {
            open: self.open.saturating_add(u32::try_from(open).unwrap_or(u32::MAX)),
            ..self
        }
    }

    pub fn attempts_used(&self) -> u32 {
        self.completed.saturating_add(self.open)
    }

    /// A pass lifts the cap for good.
    pub fn can_retake(&self) -> bool {
        self.attempts_used() < MAX_ATTEMPTS || self.passed_any
    }

    pub fn ensure_can_start(&self) -> QuizResult<()> {
        if self.can_retake() {
            Ok(())
        } else {
            Err(QuizError::MaxAttemptsReached)
        }
    }

    pub fn next_attempt_number(&self) -> u32 {
        self.completed + 1
    }

    /// Failed attempts counted towards the cap, as shown on the dashboard.
    pub fn attempts_toward_cap(sessions: &[QuizSession]) -> u32 {
        let failed = sessions
            .iter()
            .filter(|s| s.is_completed && !s.passed_threshold)
            .count() as u32;
        failed.min(MAX_ATTEMPTS)
    }
}
