//! Staged review of raw generated multiple-choice questions.
//!
//! Generated output is run through four stages (schema, length, quality and
//! semantic grounding). Each stage starts at 1.0 and subtracts penalties; the
//! weighted sum decides whether the question is dropped, held for a person,
//! or approved outright. This is separate from [`crate::scoring::score`],
//! whose values are persisted and must not move.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::model::Difficulty;

pub const MIN_QUESTION_LENGTH: usize = 10;
pub const MAX_QUESTION_LENGTH: usize = 500;
pub const MIN_OPTION_LENGTH: usize = 1;
pub const MAX_OPTION_LENGTH: usize = 200;
pub const MIN_EXPLANATION_LENGTH: usize = 20;
/// Population variance of option lengths above which the longest option
/// tends to give the answer away.
pub const MAX_OPTION_LENGTH_VARIANCE: f64 = 2000.0;

/// The four option ids every generated question must use.
pub const OPTION_IDS: [&str; 4] = ["A", "B", "C", "D"];

const REQUIRED_FIELDS: [&str; 4] = ["questionText", "options", "correctAnswer", "explanation"];

static NEGATIVE_PHRASING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:not|except|never|none)\b").expect("static regex"));
static TERM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w{4,}\b").expect("static regex"));

/// One review stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Schema,
    Length,
    Quality,
    Semantic,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Schema, Stage::Length, Stage::Quality, Stage::Semantic];

    /// Share of the overall score. The weights sum to 1.
    pub fn weight(self) -> f64 {
        match self {
            Stage::Schema => 0.20,
            Stage::Length => 0.20,
            Stage::Quality => 0.35,
            Stage::Semantic => 0.25,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Schema => "schema",
            Stage::Length => "length",
            Stage::Quality => "quality",
            Stage::Semantic => "semantic",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_min_quality_score() -> f64 {
    0.4
}

fn default_auto_approve_score() -> f64 {
    0.6
}

/// Score cut-offs applied to the overall review score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReviewThresholds {
    /// Below this a question is rejected.
    #[serde(default = "default_min_quality_score")]
    pub min_quality_score: f64,
    /// At or above this a valid question needs no human review.
    #[serde(default = "default_auto_approve_score")]
    pub auto_approve_score: f64,
}

impl Default for ReviewThresholds {
    fn default() -> Self {
        Self {
            min_quality_score: default_min_quality_score(),
            auto_approve_score: default_auto_approve_score(),
        }
    }
}

/// What happens to a reviewed question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Rejected,
    NeedsReview,
    AutoApproved,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Rejected => "rejected",
            Verdict::NeedsReview => "needs_review",
            Verdict::AutoApproved => "auto_approved",
        };
        f.write_str(s)
    }
}

/// Measurements gathered while reviewing. Stages that did not run leave
/// their fields empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_length: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub option_lengths: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_length_variance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation_length: Option<usize>,
    pub has_negative_phrasing: bool,
    pub has_duplicates: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_terms: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms_found: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_coverage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer_coverage: Option<f64>,
    pub stage_scores: BTreeMap<Stage, f64>,
}

/// Outcome of reviewing one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReport {
    pub is_valid: bool,
    pub verdict: Verdict,
    pub quality_score: f64,
    pub stage_results: BTreeMap<Stage, bool>,
    pub issues: Vec<String>,
    pub metrics: ReviewMetrics,
}

/// One lettered answer option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: String,
    pub text: String,
}

/// A generated question that survived construction, ready to be stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewedQuestion {
    pub question_text: String,
    pub options: Vec<AnswerOption>,
    pub correct_answer: String,
    pub explanation: String,
    pub difficulty: Difficulty,
    pub quality_score: f64,
    pub validation_passed: bool,
}

/// The report plus the question, when one could be built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Review {
    pub report: ReviewReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<ReviewedQuestion>,
}

/// Runs the staged review with a fixed set of thresholds.
#[derive(Debug, Clone, Default)]
pub struct QuestionReviewer {
    thresholds: ReviewThresholds,
}

impl QuestionReviewer {
    pub fn new(thresholds: ReviewThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ReviewThresholds {
        &self.thresholds
    }

    /// Review one raw question.
    ///
    /// `difficulty` overrides whatever the input carries. Without
    /// `source_text` the semantic stage passes untouched.
    pub fn review(&self, raw: &Value, difficulty: Option<Difficulty>, source_text: Option<&str>) -> Review {
        let empty = Map::new();
        let fields = raw.as_object().unwrap_or(&empty);

        let mut metrics = ReviewMetrics::default();
        let mut stage_results = BTreeMap::new();
        let mut issues = Vec::new();

        let schema = schema_stage(fields);
        stage_results.insert(Stage::Schema, schema.passed);
        metrics.stage_scores.insert(Stage::Schema, schema.score);
        issues.extend(schema.issues);

        if !schema.passed {
            debug!(issue_count = issues.len(), "question failed schema stage");
            return Review {
                report: ReviewReport {
                    is_valid: false,
                    verdict: Verdict::Rejected,
                    quality_score: 0.0,
                    stage_results,
                    issues,
                    metrics,
                },
                question: None,
            };
        }

        let length = length_stage(fields, &mut metrics);
        let (length_passed, length_score) = (length.passed, length.score);
        let quality = quality_stage(fields, &mut metrics);
        let semantic = semantic_stage(fields, source_text, &mut metrics);

        let mut overall = Stage::Schema.weight() * schema.score;
        for (stage, outcome) in [
            (Stage::Length, length),
            (Stage::Quality, quality),
            (Stage::Semantic, semantic),
        ] {
            overall += stage.weight() * outcome.score;
            stage_results.insert(stage, outcome.passed);
            metrics.stage_scores.insert(stage, outcome.score);
            issues.extend(outcome.issues);
        }

        let mut is_valid = overall >= self.thresholds.min_quality_score && (length_passed || length_score >= 0.5);

        let question = match ReviewedQuestion::build(fields, difficulty, overall, is_valid) {
            Ok(question) => Some(question),
            Err(reason) => {
                warn!(%reason, "could not build reviewed question");
                is_valid = false;
                issues.push(format!("Model creation failed: {reason}"));
                None
            }
        };

        let verdict = self.verdict(is_valid, overall);
        debug!(
            is_valid,
            %verdict,
            quality_score = overall,
            issue_count = issues.len(),
            "question review completed"
        );

        Review {
            report: ReviewReport {
                is_valid,
                verdict,
                quality_score: overall,
                stage_results,
                issues,
                metrics,
            },
            question,
        }
    }

    /// Review a list of raw questions in order.
    pub fn review_batch(
        &self,
        questions: &[Value],
        difficulty: Option<Difficulty>,
        source_text: Option<&str>,
    ) -> Vec<Review> {
        questions
            .iter()
            .map(|q| self.review(q, difficulty, source_text))
            .collect()
    }

    fn verdict(&self, is_valid: bool, score: f64) -> Verdict {
        if !is_valid {
            Verdict::Rejected
        } else if score >= self.thresholds.auto_approve_score {
            Verdict::AutoApproved
        } else {
            Verdict::NeedsReview
        }
    }
}

impl ReviewedQuestion {
    fn build(
        fields: &Map<String, Value>,
        difficulty: Option<Difficulty>,
        quality_score: f64,
        validation_passed: bool,
    ) -> Result<Self, String> {
        let question_text = require_str(fields, "questionText")?;
        check_chars("questionText", question_text, 10, 1000)?;

        let raw_options = fields
            .get("options")
            .and_then(Value::as_array)
            .ok_or("options must be a list")?;
        if raw_options.len() != OPTION_IDS.len() {
            return Err(format!("expected exactly 4 options, got {}", raw_options.len()));
        }
        let options = raw_options
            .iter()
            .enumerate()
            .map(|(i, opt)| AnswerOption::build(i, opt))
            .collect::<Result<Vec<_>, _>>()?;
        let ids: BTreeSet<&str> = options.iter().map(|o| o.id.as_str()).collect();
        if ids != BTreeSet::from(OPTION_IDS) {
            let got: Vec<&str> = ids.into_iter().collect();
            return Err(format!("option ids must be A, B, C, D, got {}", got.join(", ")));
        }

        let correct_answer = require_str(fields, "correctAnswer")?;
        if !OPTION_IDS.contains(&correct_answer) {
            return Err(format!("correctAnswer must be one of A, B, C, D, got {correct_answer:?}"));
        }

        let explanation = require_str(fields, "explanation")?;
        check_chars("explanation", explanation, 10, 1000)?;

        let difficulty = match difficulty {
            Some(d) => d,
            None => match fields.get("difficulty") {
                None => Difficulty::Medium,
                Some(v) => v.as_str().ok_or("difficulty must be a string")?.parse()?,
            },
        };

        Ok(Self {
            question_text: question_text.to_string(),
            options,
            correct_answer: correct_answer.to_string(),
            explanation: explanation.to_string(),
            difficulty,
            quality_score,
            validation_passed,
        })
    }
}

impl AnswerOption {
    fn build(index: usize, raw: &Value) -> Result<Self, String> {
        let obj = raw
            .as_object()
            .ok_or_else(|| format!("options.{index} must be an object"))?;
        let id = obj
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| format!("options.{index}.id must be a string"))?;
        if !OPTION_IDS.contains(&id) {
            return Err(format!("options.{index}.id must be one of A, B, C, D, got {id:?}"));
        }
        let text = obj
            .get("text")
            .and_then(Value::as_str)
            .ok_or_else(|| format!("options.{index}.text must be a string"))?;
        check_chars(&format!("options.{index}.text"), text, 1, 500)?;
        Ok(Self {
            id: id.to_string(),
            text: text.trim().to_string(),
        })
    }
}

fn require_str<'a>(fields: &'a Map<String, Value>, key: &str) -> Result<&'a str, String> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("{key} must be a string"))
}

fn check_chars(field: &str, value: &str, min: usize, max: usize) -> Result<(), String> {
    let n = value.chars().count();
    if n < min || n > max {
        return Err(format!("{field} must be {min}..={max} characters, got {n}"));
    }
    Ok(())
}

/// Result of one stage. The score is floored at zero on construction.
struct StageOutcome {
    passed: bool,
    score: f64,
    issues: Vec<String>,
}

impl StageOutcome {
    fn new(passed: bool, score: f64, issues: Vec<String>) -> Self {
        Self {
            passed,
            score: score.max(0.0),
            issues,
        }
    }
}

fn str_field<'a>(fields: &'a Map<String, Value>, key: &str) -> &'a str {
    fields.get(key).and_then(Value::as_str).unwrap_or("")
}

fn option_list(fields: &Map<String, Value>) -> &[Value] {
    fields
        .get("options")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Strings as-is, anything else as JSON text.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The text of the option the correct answer points at.
fn correct_option_text<'a>(fields: &'a Map<String, Value>) -> Option<&'a str> {
    let correct = fields.get("correctAnswer")?.as_str()?;
    option_list(fields)
        .iter()
        .filter_map(Value::as_object)
        .find(|opt| opt.get("id").and_then(Value::as_str) == Some(correct))
        .map(|opt| opt.get("text").and_then(Value::as_str).unwrap_or(""))
}

fn schema_stage(fields: &Map<String, Value>) -> StageOutcome {
    let mut issues = Vec::new();
    let mut score = 1.0;
    let mut missing_required = false;

    for field in REQUIRED_FIELDS {
        if !fields.contains_key(field) {
            issues.push(format!("Missing required field: {field}"));
            score -= 0.25;
            missing_required = true;
        }
    }
    if score < 0.5 {
        return StageOutcome::new(false, score, issues);
    }

    let options: &[Value] = match fields.get("options") {
        None => &[],
        Some(Value::Array(items)) => items,
        Some(_) => {
            issues.push("Options must be a list".to_string());
            return StageOutcome::new(false, 0.0, issues);
        }
    };

    if options.len() != OPTION_IDS.len() {
        issues.push(format!("Expected 4 options, got {}", options.len()));
        score -= 0.2;
    }

    let mut ids = BTreeSet::new();
    for (i, opt) in options.iter().enumerate() {
        let Some(obj) = opt.as_object() else {
            issues.push(format!("Option {i} is not an object"));
            score -= 0.1;
            continue;
        };
        match obj.get("id") {
            Some(id) => {
                ids.insert(value_text(id));
            }
            None => {
                issues.push(format!("Option {i} missing 'id'"));
                score -= 0.05;
            }
        }
        if !obj.contains_key("text") {
            issues.push(format!("Option {i} missing 'text'"));
            score -= 0.05;
        }
    }

    let expected: BTreeSet<String> = OPTION_IDS.iter().map(|id| id.to_string()).collect();
    if ids != expected {
        let missing: Vec<&str> = expected.difference(&ids).map(String::as_str).collect();
        let extra: Vec<&str> = ids.difference(&expected).map(String::as_str).collect();
        if !missing.is_empty() {
            issues.push(format!("Missing option IDs: {}", missing.join(", ")));
        }
        if !extra.is_empty() {
            issues.push(format!("Unexpected option IDs: {}", extra.join(", ")));
        }
        score -= 0.1;
    }

    let correct = fields.get("correctAnswer");
    if !correct
        .and_then(Value::as_str)
        .is_some_and(|c| OPTION_IDS.contains(&c))
    {
        let shown = correct.map(value_text).unwrap_or_default();
        issues.push(format!("Invalid correct answer: {shown}"));
        score -= 0.2;
    }

    StageOutcome::new(score >= 0.5 && !missing_required, score, issues)
}

fn length_stage(fields: &Map<String, Value>, metrics: &mut ReviewMetrics) -> StageOutcome {
    let mut issues = Vec::new();
    let mut score = 1.0;

    let question_len = str_field(fields, "questionText").chars().count();
    metrics.question_length = Some(question_len);
    if question_len < MIN_QUESTION_LENGTH {
        issues.push(format!(
            "Question too short ({question_len} chars, min {MIN_QUESTION_LENGTH})"
        ));
        score -= 0.3;
    } else if question_len > MAX_QUESTION_LENGTH {
        issues.push(format!(
            "Question too long ({question_len} chars, max {MAX_QUESTION_LENGTH})"
        ));
        score -= 0.1;
    }

    let mut lengths = Vec::new();
    for opt in option_list(fields).iter().filter_map(Value::as_object) {
        let Some(text) = opt.get("text").and_then(Value::as_str) else {
            continue;
        };
        let len = text.chars().count();
        lengths.push(len);
        let id = opt.get("id").map(value_text).unwrap_or_else(|| "?".to_string());
        if len < MIN_OPTION_LENGTH {
            issues.push(format!("Option {id} too short"));
            score -= 0.1;
        } else if len > MAX_OPTION_LENGTH {
            issues.push(format!("Option {id} too long ({len} chars)"));
            score -= 0.05;
        }
    }

    if !lengths.is_empty() {
        let variance = population_variance(&lengths);
        metrics.option_length_variance = Some(variance);
        if variance > MAX_OPTION_LENGTH_VARIANCE {
            issues.push("Large variance in option lengths (may reveal answer)".to_string());
            score -= 0.1;
        }
    }
    metrics.option_lengths = lengths;

    let explanation_len = str_field(fields, "explanation").chars().count();
    metrics.explanation_length = Some(explanation_len);
    if explanation_len < MIN_EXPLANATION_LENGTH {
        issues.push(format!("Explanation too short ({explanation_len} chars)"));
        score -= 0.2;
    }

    StageOutcome::new(score >= 0.6, score, issues)
}

fn population_variance(values: &[usize]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<usize>() as f64 / n;
    values
        .iter()
        .map(|&v| (v as f64 - mean).powi(2))
        .sum::<f64>()
        / n
}

fn quality_stage(fields: &Map<String, Value>, metrics: &mut ReviewMetrics) -> StageOutcome {
    let mut issues = Vec::new();
    let mut score = 1.0;

    let question = str_field(fields, "questionText");
    if !question.trim().ends_with('?') {
        issues.push("Question should end with '?'".to_string());
        score -= 0.1;
    }

    let option_texts: Vec<String> = option_list(fields)
        .iter()
        .filter_map(Value::as_object)
        .map(|opt| {
            opt.get("text")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_lowercase()
        })
        .collect();

    if option_texts
        .iter()
        .any(|t| t.contains("all of the above") || t.contains("none of the above"))
    {
        issues.push("Avoid 'all/none of the above' options".to_string());
        score -= 0.15;
    }

    if NEGATIVE_PHRASING.is_match(&question.to_lowercase()) {
        issues.push("Consider avoiding negative phrasing in questions".to_string());
        score -= 0.05;
        metrics.has_negative_phrasing = true;
    }

    let distinct: HashSet<&str> = option_texts.iter().map(|t| t.trim()).collect();
    if distinct.len() != option_texts.len() {
        issues.push("Duplicate options detected".to_string());
        score -= 0.3;
        metrics.has_duplicates = true;
    }

    if let Some(correct_text) = correct_option_text(fields) {
        let correct_text = correct_text.to_lowercase();
        let explanation = str_field(fields, "explanation").to_lowercase();
        let explanation_words: HashSet<&str> = explanation.split_whitespace().collect();
        let shares_word = correct_text
            .split_whitespace()
            .any(|w| w.chars().count() > 3 && explanation_words.contains(w));
        if !shares_word {
            issues.push("Explanation may not clearly relate to correct answer".to_string());
            score -= 0.1;
        }
    }

    StageOutcome::new(score >= 0.5, score, issues)
}

fn terms(text: &str) -> HashSet<String> {
    TERM.find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

fn coverage(terms: &HashSet<String>, source: &str) -> (usize, f64) {
    let found = terms.iter().filter(|t| source.contains(t.as_str())).count();
    let ratio = if terms.is_empty() {
        0.0
    } else {
        found as f64 / terms.len() as f64
    };
    (found, ratio)
}

fn semantic_stage(fields: &Map<String, Value>, source_text: Option<&str>, metrics: &mut ReviewMetrics) -> StageOutcome {
    let Some(source) = source_text.filter(|s| !s.is_empty()) else {
        return StageOutcome::new(true, 1.0, Vec::new());
    };
    let source = source.to_lowercase();
    let mut issues = Vec::new();
    let mut score = 1.0;

    let question_terms = terms(str_field(fields, "questionText"));
    let (found, term_coverage) = coverage(&question_terms, &source);
    metrics.question_terms = Some(question_terms.len());
    metrics.terms_found = Some(found);
    metrics.term_coverage = Some(term_coverage);
    if term_coverage < 0.3 {
        issues.push("Question may not be well-grounded in source text".to_string());
        score -= 0.2;
    }

    if let Some(correct_text) = correct_option_text(fields) {
        let (_, answer_coverage) = coverage(&terms(correct_text), &source);
        metrics.correct_answer_coverage = Some(answer_coverage);
        if answer_coverage < 0.2 {
            issues.push("Correct answer may not be supported by source text".to_string());
            score -= 0.15;
        }
    }

    StageOutcome::new(score >= 0.5, score, issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SOURCE: &str = "Mitochondria are membrane-bound organelles found in the cytoplasm of \
        eukaryotic cells. They are often referred to as the powerhouse of the cell because they \
        generate most of the cell's supply of adenosine triphosphate (ATP), used as a source of \
        chemical energy. The process of ATP production in mitochondria is called cellular respiration.";

    fn sample() -> Value {
        json!({
            "questionText": "What is the primary function of mitochondria in a cell?",
            "options": [
                {"id": "A", "text": "Protein synthesis"},
                {"id": "B", "text": "ATP production"},
                {"id": "C", "text": "Cell division"},
                {"id": "D", "text": "DNA replication"}
            ],
            "correctAnswer": "B",
            "explanation": "Mitochondria are known as the powerhouse of the cell because they produce ATP through cellular respiration.",
            "difficulty": "easy"
        })
    }

    fn reviewer() -> QuestionReviewer {
        QuestionReviewer::default()
    }

    fn has_issue(review: &Review, needle: &str) -> bool {
        review
            .report
            .issues
            .iter()
            .any(|i| i.to_lowercase().contains(&needle.to_lowercase()))
    }

    #[test]
    fn weights_sum_to_one() {
        let total: f64 = Stage::ALL.iter().map(|s| s.weight()).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn valid_question_passes_every_stage() {
        let review = reviewer().review(&sample(), None, None);
        assert!(review.report.is_valid, "{:?}", review.report.issues);
        assert!(review.report.quality_score > 0.5);
        assert!(review.report.stage_results.values().all(|passed| *passed));
        assert_eq!(review.report.verdict, Verdict::AutoApproved);

        let question = review.question.unwrap();
        assert_eq!(question.difficulty, Difficulty::Easy);
        assert_eq!(question.correct_answer, "B");
        assert!(question.validation_passed);
    }

    #[test]
    fn caller_difficulty_wins() {
        let review = reviewer().review(&sample(), Some(Difficulty::Hard), None);
        assert_eq!(review.question.unwrap().difficulty, Difficulty::Hard);

        let mut data = sample();
        data.as_object_mut().unwrap().remove("difficulty");
        let review = reviewer().review(&data, None, None);
        assert_eq!(review.question.unwrap().difficulty, Difficulty::Medium);
    }

    #[test]
    fn missing_fields_fail_schema_stage() {
        let review = reviewer().review(&json!({"questionText": "What is this?"}), None, None);
        assert!(!review.report.is_valid);
        assert!(!review.report.stage_results[&Stage::Schema]);
        assert_eq!(review.report.stage_results.len(), 1);
        assert_eq!(review.report.quality_score, 0.0);
        assert_eq!(review.report.verdict, Verdict::Rejected);
        assert!(review.question.is_none());
        assert!(has_issue(&review, "Missing required field: options"));
    }

    #[test]
    fn non_object_input_is_rejected() {
        let review = reviewer().review(&json!(["not", "a", "question"]), None, None);
        assert!(!review.report.is_valid);
        assert_eq!(review.report.issues.len(), 4);
    }

    #[test]
    fn wrong_option_count() {
        let mut data = sample();
        data["options"] = json!([{"id": "A", "text": "Option A"}, {"id": "B", "text": "Option B"}]);
        let review = reviewer().review(&data, None, None);
        assert!(has_issue(&review, "4 options"));
        assert!(has_issue(&review, "Missing option IDs: C, D"));
    }

    #[test]
    fn wrong_option_ids() {
        let mut data = sample();
        data["options"] = json!([
            {"id": "1", "text": "Option 1"},
            {"id": "2", "text": "Option 2"},
            {"id": "3", "text": "Option 3"},
            {"id": "4", "text": "Option 4"}
        ]);
        data["correctAnswer"] = json!("1");
        let review = reviewer().review(&data, None, None);
        assert!(has_issue(&review, "option ids"));
        assert!(has_issue(&review, "Invalid correct answer: 1"));
        assert!(review.question.is_none());
        assert!(!review.report.is_valid);
        assert!(has_issue(&review, "Model creation failed"));
    }

    #[test]
    fn options_must_be_a_list() {
        let mut data = sample();
        data["options"] = json!("A, B, C, D");
        let review = reviewer().review(&data, None, None);
        assert!(!review.report.stage_results[&Stage::Schema]);
        assert_eq!(review.report.metrics.stage_scores[&Stage::Schema], 0.0);
    }

    #[test]
    fn short_question_is_flagged() {
        let mut data = sample();
        data["questionText"] = json!("What?");
        let review = reviewer().review(&data, None, None);
        assert!(has_issue(&review, "too short"));
        assert_eq!(review.report.metrics.question_length, Some(5));
        // Fails model construction too (min 10 chars).
        assert!(review.question.is_none());
    }

    #[test]
    fn short_explanation_is_flagged() {
        let mut data = sample();
        data["explanation"] = json!("Because.");
        let review = reviewer().review(&data, None, None);
        assert!(has_issue(&review, "Explanation too short (8 chars)"));
    }

    #[test]
    fn length_variance_is_flagged() {
        let mut data = sample();
        data["options"][1]["text"] = json!("ATP production ".repeat(13).trim().to_string());
        let review = reviewer().review(&data, None, None);
        assert!(has_issue(&review, "variance"));
        assert!(review.report.metrics.option_length_variance.unwrap() > MAX_OPTION_LENGTH_VARIANCE);
    }

    #[test]
    fn missing_question_mark() {
        let mut data = sample();
        data["questionText"] = json!("The primary function of mitochondria in a cell");
        let review = reviewer().review(&data, None, None);
        assert!(has_issue(&review, "should end with '?'"));
    }

    #[test]
    fn all_of_the_above_is_flagged() {
        let mut data = sample();
        data["options"][3]["text"] = json!("All of the above");
        let review = reviewer().review(&data, None, None);
        assert!(has_issue(&review, "all/none of the above"));
    }

    #[test]
    fn negative_phrasing_is_whole_word() {
        let mut data = sample();
        data["questionText"] = json!("Which of the following is NOT a function of mitochondria?");
        let review = reviewer().review(&data, None, None);
        assert!(has_issue(&review, "negative"));
        assert!(review.report.metrics.has_negative_phrasing);

        data["questionText"] = json!("Which organelle is noted for ATP production?");
        let review = reviewer().review(&data, None, None);
        assert!(!review.report.metrics.has_negative_phrasing);
    }

    #[test]
    fn duplicate_options_are_flagged() {
        let mut data = sample();
        data["options"] = json!([
            {"id": "A", "text": "Same answer"},
            {"id": "B", "text": "same answer "},
            {"id": "C", "text": "Different"},
            {"id": "D", "text": "Another"}
        ]);
        let review = reviewer().review(&data, None, None);
        assert!(has_issue(&review, "Duplicate"));
        assert!(review.report.metrics.has_duplicates);
    }

    #[test]
    fn unrelated_explanation_is_flagged() {
        let mut data = sample();
        data["explanation"] = json!("This is simply how cells are known to work in general.");
        let review = reviewer().review(&data, None, None);
        assert!(has_issue(&review, "may not clearly relate"));
    }

    #[test]
    fn grounded_question_passes_semantic_stage() {
        let review = reviewer().review(&sample(), None, Some(SOURCE));
        assert!(review.report.stage_results[&Stage::Semantic]);
        assert!(review.report.metrics.term_coverage.unwrap() >= 0.3);
        assert!(review.report.metrics.correct_answer_coverage.is_some());
    }

    #[test]
    fn ungrounded_question_is_flagged() {
        let mut data = sample();
        data["questionText"] = json!("What is the capital city of France in Europe?");
        data["options"][1]["text"] = json!("Paris");
        let review = reviewer().review(&data, None, Some(SOURCE));
        assert!(has_issue(&review, "well-grounded"));
        assert!(has_issue(&review, "not be supported"));
    }

    #[test]
    fn no_source_skips_semantic_metrics() {
        let review = reviewer().review(&sample(), None, None);
        assert_eq!(review.report.metrics.stage_scores[&Stage::Semantic], 1.0);
        assert!(review.report.metrics.term_coverage.is_none());
    }

    #[test]
    fn thresholds_drive_the_verdict() {
        let strict = QuestionReviewer::new(ReviewThresholds {
            min_quality_score: 0.4,
            auto_approve_score: 1.1,
        });
        assert_eq!(strict.review(&sample(), None, None).report.verdict, Verdict::NeedsReview);

        let impossible = QuestionReviewer::new(ReviewThresholds {
            min_quality_score: 1.1,
            auto_approve_score: 1.1,
        });
        let review = impossible.review(&sample(), None, None);
        assert_eq!(review.report.verdict, Verdict::Rejected);
        assert!(!review.question.unwrap().validation_passed);
    }

    #[test]
    fn invalid_input_difficulty_fails_construction() {
        let mut data = sample();
        data["difficulty"] = json!("extreme");
        let review = reviewer().review(&data, None, None);
        assert!(!review.report.is_valid);
        assert!(has_issue(&review, "Model creation failed"));
    }

    #[test]
    fn only_option_texts_are_trimmed() {
        let mut data = sample();
        data["questionText"] = json!("  What is the primary function of mitochondria in a cell?  ");
        data["explanation"] = json!("Mitochondria produce ATP through cellular respiration.\n");
        data["options"][0]["text"] = json!("  Protein synthesis ");
        let question = reviewer().review(&data, None, None).question.unwrap();
        assert_eq!(
            question.question_text,
            "  What is the primary function of mitochondria in a cell?  "
        );
        assert!(question.explanation.ends_with('\n'));
        assert_eq!(question.options[0].text, "Protein synthesis");
    }

    #[test]
    fn batch_keeps_order() {
        let good = sample();
        let bad = json!({"questionText": "Incomplete"});
        let reviews = reviewer().review_batch(&[good, bad], None, None);
        assert_eq!(reviews.len(), 2);
        assert!(reviews[0].report.is_valid);
        assert!(!reviews[1].report.is_valid);
    }

    #[test]
    fn report_serializes_stage_names() {
        let review = reviewer().review(&sample(), None, None);
        let value = serde_json::to_value(&review).unwrap();
        assert_eq!(value["report"]["verdict"], "auto_approved");
        assert_eq!(value["report"]["stageResults"]["schema"], true);
        assert!(value["report"]["metrics"]["stageScores"]["quality"].is_number());
        assert_eq!(value["question"]["options"][0]["id"], "A");
    }
}
