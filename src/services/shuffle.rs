//! Question sampling and per-session option shuffling.
//!
//! Fairness is the goal, not unpredictability, so any `Rng` will do.

use rand::{seq::SliceRandom, Rng};

use crate::models::domain::{Question, ShuffledQuestion};

/// Uniform sample of up to `size` questions without replacement, in random order.
pub fn sample_questions<R: Rng + ?Sized>(
    mut questions: Vec<Question>,
    size: usize,
    rng: &mut R,
) -> Vec<Question> {
    questions.shuffle(rng);
    questions.truncate(size);
    questions
}

/// Builds a session snapshot with the options permuted. The correct index follows the
/// option that was correct in the canonical question; `question` itself is left alone.
pub fn shuffle_question<R: Rng + ?Sized>(question: &Question, rng: &mut R) -> ShuffledQuestion {
    let mut order: Vec<usize> = (0..question.options.len()).collect();
    order.shuffle(rng);

    let original_correct = usize::from(question.correct_answer_index);
    let options = order.iter().map(|&i| question.options[i].clone()).collect();
    let correct_answer_index = order
        .iter()
        .position(|&i| i == original_correct)
        .map(|p| p as u8)
        .unwrap_or(question.correct_answer_index);

    ShuffledQuestion {
        id: question.id.clone(),
        question_text: question.question_text.clone(),
        options,
        correct_answer_index,
        original_correct_index: question.correct_answer_index,
        media_url: question.media_url.clone(),
        media_type: question.media_type,
    }
}
