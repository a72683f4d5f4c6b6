//! Entity schemas.
//!
//! Each schema is plain data: an ordered list of fields, each with its
//! presence rule and the constraint it must satisfy. The validator is the
//! only thing that interprets them.

use std::fmt;

use crate::constraint::{Constraint, Format};
use crate::model::{Difficulty, QuestionType, DEFAULT_QUESTION_COUNT};

/// Whether a field must appear in the input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Presence {
    Required,
    /// May be absent (or `null`); checked when present.
    Optional,
    /// Filled with the given integer when absent.
    DefaultInteger(i64),
}

/// What kind of value a field holds.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// A single value checked by one constraint.
    Scalar(Constraint),
    /// An array whose every element is checked by the constraint.
    List(Constraint),
    /// A nested object described by its own schema.
    Object(&'static Schema),
}

/// One declared field of a schema.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Wire name of the field.
    pub name: &'static str,
    pub presence: Presence,
    pub kind: FieldKind,
    /// Sensitive values are never echoed back in violations.
    pub sensitive: bool,
}

impl FieldSpec {
    const fn new(name: &'static str, presence: Presence, kind: FieldKind) -> Self {
        Self {
            name,
            presence,
            kind,
            sensitive: false,
        }
    }

    const fn secret(mut self) -> Self {
        self.sensitive = true;
        self
    }
}

/// A named, ordered list of fields.
#[derive(Debug)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl Schema {
    /// Every schema callers may validate against by name.
    pub fn all() -> &'static [&'static Schema] {
        REGISTRY
    }

    /// Look up an exported schema by its exact name.
    pub fn by_name(name: &str) -> Option<&'static Schema> {
        REGISTRY.iter().copied().find(|s| s.name == name)
    }

    /// Look up a declared field.
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let presence = match self.presence {
            Presence::Required => "required".to_string(),
            Presence::Optional => "optional".to_string(),
            Presence::DefaultInteger(n) => format!("default {n}"),
        };
        match self.kind {
            FieldKind::Scalar(c) => write!(f, "{} ({presence}): {c}", self.name),
            FieldKind::List(c) => write!(f, "{} ({presence}): list of {c}", self.name),
            FieldKind::Object(s) => write!(f, "{} ({presence}): {}", self.name, s.name),
        }
    }
}

const fn required(name: &'static str, c: Constraint) -> FieldSpec {
    FieldSpec::new(name, Presence::Required, FieldKind::Scalar(c))
}

const fn optional(name: &'static str, c: Constraint) -> FieldSpec {
    FieldSpec::new(name, Presence::Optional, FieldKind::Scalar(c))
}

const fn text(min: usize, max: usize) -> Constraint {
    Constraint::Text {
        min: Some(min),
        max: Some(max),
    }
}

const NON_EMPTY: Constraint = Constraint::Text {
    min: Some(1),
    max: None,
};
const ANY_TEXT: Constraint = Constraint::Text {
    min: None,
    max: None,
};
const ID: Constraint = Constraint::Formatted(Format::Uuid);
const TIMESTAMP: Constraint = Constraint::Formatted(Format::Timestamp);
const COUNT: Constraint = Constraint::Integer {
    min: Some(0),
    max: None,
};

/// MIME types accepted for uploads.
pub const PDF_MIME_TYPES: &[&str] = &["application/pdf"];

pub static USER: Schema = Schema {
    name: "User",
    fields: &[
        optional("id", ID),
        required("email", Constraint::Formatted(Format::Email)),
        optional("passwordHash", NON_EMPTY).secret(),
        required("firstName", text(1, 50)),
        required("lastName", text(1, 50)),
        optional("createdAt", TIMESTAMP),
        optional("updatedAt", TIMESTAMP),
    ],
};

pub static QUIZ: Schema = Schema {
    name: "Quiz",
    fields: &[
        optional("id", ID),
        required("userId", ID),
        required("title", text(1, 200)),
        required("pdfFileName", ANY_TEXT),
        required("pdfFilePath", ANY_TEXT),
        required(
            "totalQuestions",
            Constraint::Integer {
                min: Some(1),
                max: None,
            },
        ),
        optional("createdAt", TIMESTAMP),
        optional("updatedAt", TIMESTAMP),
    ],
};

const QUESTION_TYPE: Constraint = Constraint::OneOf(QuestionType::VALUES);
const DIFFICULTY: Constraint = Constraint::OneOf(Difficulty::VALUES);
const QUESTION_TEXT: Constraint = text(10, 500);
const QUALITY_SCORE: Constraint = Constraint::Number { min: 0.0, max: 1.0 };
const OPTIONS: FieldSpec = FieldSpec::new("options", Presence::Optional, FieldKind::List(ANY_TEXT));

pub static QUESTION: Schema = Schema {
    name: "Question",
    fields: &[
        optional("id", ID),
        required("quizId", ID),
        required("type", QUESTION_TYPE),
        required("difficulty", DIFFICULTY),
        required("questionText", QUESTION_TEXT),
        OPTIONS,
        required("correctAnswer", NON_EMPTY),
        optional("explanation", ANY_TEXT),
        required("qualityScore", QUALITY_SCORE),
        optional("createdAt", TIMESTAMP),
    ],
};

pub static CREATE_QUESTION: Schema = Schema {
    name: "CreateQuestion",
    fields: &[
        required("quizId", ID),
        required("type", QUESTION_TYPE),
        required("difficulty", DIFFICULTY),
        required("questionText", QUESTION_TEXT),
        OPTIONS,
        required("correctAnswer", NON_EMPTY),
        optional("explanation", ANY_TEXT),
        required("qualityScore", QUALITY_SCORE),
    ],
};

/// The file part of an upload; only reachable through [`UPLOAD_PDF`].
pub static PDF_FILE: Schema = Schema {
    name: "PdfFile",
    fields: &[
        required("fileName", text(1, 255)),
        required("mimeType", Constraint::OneOf(PDF_MIME_TYPES)),
        required(
            "size",
            Constraint::Integer {
                min: Some(1),
                max: None,
            },
        ),
    ],
};

pub static UPLOAD_PDF: Schema = Schema {
    name: "UploadPdf",
    fields: &[
        FieldSpec::new("file", Presence::Required, FieldKind::Object(&PDF_FILE)),
        optional("title", text(1, 200)),
        optional("difficulty", DIFFICULTY),
        FieldSpec::new(
            "questionCount",
            Presence::DefaultInteger(DEFAULT_QUESTION_COUNT as i64),
            FieldKind::Scalar(Constraint::Integer {
                min: Some(5),
                max: Some(50),
            }),
        ),
    ],
};

pub static API_RESPONSE: Schema = Schema {
    name: "ApiResponse",
    fields: &[
        required("success", Constraint::Boolean),
        optional("data", Constraint::Any),
        optional("error", ANY_TEXT),
        optional("message", ANY_TEXT),
    ],
};

pub static PAGINATED_RESPONSE: Schema = Schema {
    name: "PaginatedResponse",
    fields: &[
        FieldSpec::new("data", Presence::Required, FieldKind::List(Constraint::Any)),
        required("page", COUNT),
        required("limit", COUNT),
        required("total", COUNT),
        required("totalPages", COUNT),
    ],
};

static REGISTRY: &[&Schema] = &[
    &USER,
    &QUIZ,
    &QUESTION,
    &CREATE_QUESTION,
    &UPLOAD_PDF,
    &API_RESPONSE,
    &PAGINATED_RESPONSE,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_lookup_is_exact() {
        assert_eq!(Schema::by_name("Question").unwrap().name, "Question");
        assert!(Schema::by_name("question").is_none());
        assert!(Schema::by_name("PdfFile").is_none());
        assert!(Schema::by_name("Answer").is_none());
        assert_eq!(Schema::all().len(), 7);
    }

    #[test]
    fn create_question_is_question_minus_identity() {
        let question: Vec<_> = QUESTION
            .fields
            .iter()
            .map(|f| f.name)
            .filter(|n| *n != "id" && *n != "createdAt")
            .collect();
        let create: Vec<_> = CREATE_QUESTION.fields.iter().map(|f| f.name).collect();
        assert_eq!(question, create);
    }

    #[test]
    fn only_password_hash_is_sensitive() {
        for schema in Schema::all() {
            for field in schema.fields {
                assert_eq!(
                    field.sensitive,
                    schema.name == "User" && field.name == "passwordHash",
                    "{}.{}",
                    schema.name,
                    field.name
                );
            }
        }
    }

    #[test]
    fn question_count_has_default() {
        let field = UPLOAD_PDF.field("questionCount").unwrap();
        assert_eq!(field.presence, Presence::DefaultInteger(10));
    }

    #[test]
    fn field_display() {
        let field = USER.field("firstName").unwrap();
        assert_eq!(field.to_string(), "firstName (required): string, length 1..=50");
        let file = UPLOAD_PDF.field("file").unwrap();
        assert_eq!(file.to_string(), "file (required): PdfFile");
    }
}
