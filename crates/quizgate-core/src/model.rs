//! Core domain types for quizgate.
//!
//! These are the typed shapes a validated input turns into. They are only
//! meant to be produced by [`crate::validator`]; constructing one by hand
//! skips every constraint in [`crate::schema`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scoring;

/// How hard a question is meant to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Wire values, in declaration order.
    pub const VALUES: &'static [&'static str] = &["easy", "medium", "hard"];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| format!("unknown difficulty: {s}"))
    }
}

/// The answer format of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
}

impl QuestionType {
    pub const ALL: [QuestionType; 3] = [
        QuestionType::MultipleChoice,
        QuestionType::TrueFalse,
        QuestionType::ShortAnswer,
    ];

    /// Wire values, in declaration order.
    pub const VALUES: &'static [&'static str] = &["multiple_choice", "true_false", "short_answer"];

    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::TrueFalse => "true_false",
            QuestionType::ShortAnswer => "short_answer",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown question type: {s}"))
    }
}

/// A registered account.
///
/// Note: custom Debug impl masks the password hash so it never lands in logs.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &self.password_hash.as_ref().map(|_| "***"))
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// A quiz generated from one uploaded PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// Owning user, by identifier.
    pub user_id: Uuid,
    pub title: String,
    pub pdf_file_name: String,
    pub pdf_file_path: String,
    pub total_questions: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A stored question belonging to a quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// Owning quiz, by identifier.
    pub quiz_id: Uuid,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    pub question_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Heuristic quality in `[0, 1]`, see [`crate::scoring`].
    pub quality_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Question {
    /// Replace `quality_score` with a freshly computed score.
    pub fn annotated(mut self) -> Self {
        self.quality_score = scoring::score(&self);
        self
    }
}

/// Request shape for creating a question; the store assigns `id` and
/// `createdAt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestion {
    pub quiz_id: Uuid,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    pub question_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub quality_score: f64,
}

impl CreateQuestion {
    /// Replace `quality_score` with a freshly computed score.
    pub fn annotated(mut self) -> Self {
        self.quality_score = scoring::score(&self);
        self
    }

    /// Attach the identity the store assigned.
    pub fn into_question(self, id: Uuid, created_at: DateTime<Utc>) -> Question {
        Question {
            id: Some(id),
            quiz_id: self.quiz_id,
            question_type: self.question_type,
            difficulty: self.difficulty,
            question_text: self.question_text,
            options: self.options,
            correct_answer: self.correct_answer,
            explanation: self.explanation,
            quality_score: self.quality_score,
            created_at: Some(created_at),
        }
    }
}

/// The uploaded file part of an [`UploadPdf`] request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfFile {
    pub file_name: String,
    pub mime_type: String,
    /// Size in bytes.
    pub size: u64,
}

/// Request shape for uploading a PDF and generating a quiz from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPdf {
    pub file: PdfFile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default = "default_question_count")]
    pub question_count: u32,
}

/// Questions generated per upload when the request does not say.
pub const DEFAULT_QUESTION_COUNT: u32 = 10;

fn default_question_count() -> u32 {
    DEFAULT_QUESTION_COUNT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_display_and_parse() {
        assert_eq!(Difficulty::Hard.to_string(), "hard");
        assert_eq!("easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert!("Easy".parse::<Difficulty>().is_err());
        assert!("extreme".parse::<Difficulty>().is_err());
        assert_eq!(
            Difficulty::ALL.map(Difficulty::as_str).as_slice(),
            Difficulty::VALUES
        );
    }

    #[test]
    fn question_type_display_and_parse() {
        assert_eq!(QuestionType::TrueFalse.to_string(), "true_false");
        assert_eq!(
            "short_answer".parse::<QuestionType>().unwrap(),
            QuestionType::ShortAnswer
        );
        assert!("multiple-choice".parse::<QuestionType>().is_err());
        assert!("MultipleChoice".parse::<QuestionType>().is_err());
        assert_eq!(
            QuestionType::ALL.map(QuestionType::as_str).as_slice(),
            QuestionType::VALUES
        );
    }

    #[test]
    fn enum_serde_uses_wire_strings() {
        assert_eq!(
            serde_json::to_string(&QuestionType::MultipleChoice).unwrap(),
            "\"multiple_choice\""
        );
        let d: Difficulty = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(d, Difficulty::Medium);
    }

    #[test]
    fn user_debug_masks_password_hash() {
        let user = User {
            id: None,
            email: "ada@example.com".into(),
            password_hash: Some("$argon2id$v=19$secret".into()),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            created_at: None,
            updated_at: None,
        };
        let debug = format!("{user:?}");
        assert!(debug.contains("***"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn question_uses_camel_case_and_type_key() {
        let q = Question {
            id: None,
            quiz_id: Uuid::nil(),
            question_type: QuestionType::ShortAnswer,
            difficulty: Difficulty::Easy,
            question_text: "Name the largest planet.".into(),
            options: None,
            correct_answer: "Jupiter".into(),
            explanation: None,
            quality_score: 0.5,
            created_at: None,
        };
        let value = serde_json::to_value(&q).unwrap();
        assert_eq!(value["type"], "short_answer");
        assert_eq!(value["questionText"], "Name the largest planet.");
        assert!(value.get("options").is_none());
        assert!(value.get("id").is_none());
    }

    #[test]
    fn validated_create_question_is_annotated_with_its_score() {
        let input = serde_json::json!({
            "quizId": "6f1c2b9e-3d4a-4e5f-8a7b-1c2d3e4f5a6b",
            "type": "multiple_choice",
            "difficulty": "easy",
            "questionText": "What is the boiling point of water at sea level?",
            "options": ["90°C", "100°C", "110°C"],
            "correctAnswer": "100°C",
            "qualityScore": 0.0
        });
        let create = crate::validator::validate_as::<CreateQuestion>(&input).unwrap();
        assert_eq!(create.quality_score, 0.0);

        let annotated = create.annotated();
        assert!((annotated.quality_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn annotating_a_question_replaces_a_stale_score() {
        let q = Question {
            id: Some(Uuid::new_v4()),
            quiz_id: Uuid::nil(),
            question_type: QuestionType::ShortAnswer,
            difficulty: Difficulty::Hard,
            question_text: "Water boils.".into(),
            options: None,
            correct_answer: "X".into(),
            explanation: None,
            quality_score: 0.95,
            created_at: None,
        };
        let annotated = q.clone().annotated();
        assert_eq!(annotated.quality_score, scoring::BASE_SCORE);
        assert_eq!(annotated.question_text, q.question_text);
    }

    #[test]
    fn upload_pdf_question_count_defaults() {
        let req: UploadPdf = serde_json::from_value(serde_json::json!({
            "file": {"fileName": "notes.pdf", "mimeType": "application/pdf", "size": 1024}
        }))
        .unwrap();
        assert_eq!(req.question_count, DEFAULT_QUESTION_COUNT);
        assert!(req.title.is_none());
    }

    #[test]
    fn create_question_into_question_keeps_fields() {
        let create = CreateQuestion {
            quiz_id: Uuid::nil(),
            question_type: QuestionType::TrueFalse,
            difficulty: Difficulty::Medium,
            question_text: "Is the Earth round?".into(),
            options: Some(vec!["True".into(), "False".into()]),
            correct_answer: "True".into(),
            explanation: None,
            quality_score: 0.9,
        };
        let id = Uuid::new_v4();
        let now = Utc::now();
        let q = create.clone().into_question(id, now);
        assert_eq!(q.id, Some(id));
        assert_eq!(q.created_at, Some(now));
        assert_eq!(q.question_text, create.question_text);
        assert_eq!(q.options, create.options);
    }
}
