//! Question quality scoring.
//!
//! A fixed weighted-rule heuristic. Scores already persisted depend on these
//! exact thresholds, weights, and evaluation order, so none of them may be
//! tuned.

use serde::{Deserialize, Serialize};

use crate::model::{CreateQuestion, Question};

/// Score every question starts from.
pub const BASE_SCORE: f64 = 0.5;
/// Bonus for question text of a reasonable length.
pub const LENGTH_BONUS: f64 = 0.2;
/// Bonus for question text phrased as a question.
pub const QUESTION_MARK_BONUS: f64 = 0.1;
/// Bonus for a correct answer longer than a single character.
pub const ANSWER_BONUS: f64 = 0.1;
/// Bonus for offering at least three options.
pub const OPTIONS_BONUS: f64 = 0.1;
/// Upper bound of any score.
pub const MAX_SCORE: f64 = 1.0;

/// Inclusive character-length window for [`LENGTH_BONUS`].
pub const TEXT_LENGTH_RANGE: std::ops::RangeInclusive<usize> = 20..=200;
/// Minimum characters in the correct answer for [`ANSWER_BONUS`].
pub const MIN_ANSWER_CHARS: usize = 2;
/// Minimum number of options for [`OPTIONS_BONUS`].
pub const MIN_OPTIONS: usize = 3;

/// Anything that carries the fields the heuristic looks at.
pub trait Scorable {
    fn question_text(&self) -> &str;
    fn correct_answer(&self) -> &str;
    fn options(&self) -> Option<&[String]>;
}

/// The minimal question shape accepted by [`score`], for callers holding raw
/// generated output rather than a validated entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringInput {
    #[serde(default)]
    pub question_text: String,
    #[serde(default)]
    pub correct_answer: String,
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

impl Scorable for ScoringInput {
    fn question_text(&self) -> &str {
        &self.question_text
    }
    fn correct_answer(&self) -> &str {
        &self.correct_answer
    }
    fn options(&self) -> Option<&[String]> {
        self.options.as_deref()
    }
}

impl Scorable for Question {
    fn question_text(&self) -> &str {
        &self.question_text
    }
    fn correct_answer(&self) -> &str {
        &self.correct_answer
    }
    fn options(&self) -> Option<&[String]> {
        self.options.as_deref()
    }
}

impl Scorable for CreateQuestion {
    fn question_text(&self) -> &str {
        &self.question_text
    }
    fn correct_answer(&self) -> &str {
        &self.correct_answer
    }
    fn options(&self) -> Option<&[String]> {
        self.options.as_deref()
    }
}

/// Rate a question's well-formedness in `[0, 1]`.
///
/// Rules are applied in order, each adding its bonus independently:
/// text length within 20..=200 characters, trimmed text ending in `?`,
/// correct answer of 2+ characters, and 3+ options. Nothing is ever
/// subtracted; missing fields just forfeit their bonus.
pub fn score<Q: Scorable + ?Sized>(question: &Q) -> f64 {
    let text = question.question_text();
    let mut score = BASE_SCORE;

    if TEXT_LENGTH_RANGE.contains(&text.chars().count()) {
        score += LENGTH_BONUS;
    }

    if text.trim().ends_with('?') {
        score += QUESTION_MARK_BONUS;
    }

    if question.correct_answer().chars().count() >= MIN_ANSWER_CHARS {
        score += ANSWER_BONUS;
    }

    if question.options().is_some_and(|o| o.len() >= MIN_OPTIONS) {
        score += OPTIONS_BONUS;
    }

    score.min(MAX_SCORE)
}
