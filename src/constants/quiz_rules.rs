//! Fixed rules of a quiz session.

/// Questions drawn for one session when the topic has enough of them.
pub const QUESTIONS_PER_SESSION: usize = 10;

/// Time budget for a single question, in seconds. The client submits an empty
/// answer with this response time once it elapses.
pub const SECONDS_PER_QUESTION: f64 = 20.0;

/// Minimum score for a completed session to count as passed.
pub const PASS_THRESHOLD: u32 = 5;

/// Completed attempts allowed per topic until the user has passed once.
pub const MAX_ATTEMPTS: u32 = 3;

/// Days of inactivity after which a user's quiz data may be purged.
pub const RETENTION_DAYS: i64 = 30;

pub const OPTIONS_PER_QUESTION: usize = 4;
