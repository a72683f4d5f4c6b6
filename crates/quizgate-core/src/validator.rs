//! Schema-driven validation of untyped input.
//!
//! Every declared field is checked independently and every failure is
//! collected, so one call reports all problems with an input. Fields the
//! schema does not declare are ignored.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constraint::{json_type_name, RuleFailure, RuleKind};
use crate::envelope::{ApiResponse, PaginatedResponse};
use crate::error::ValidationError;
use crate::model::{CreateQuestion, Question, Quiz, UploadPdf, User};
use crate::schema::{self, FieldKind, FieldSpec, Presence, Schema};

const REDACTED: &str = "***";

/// One failed constraint, located by its field path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Dot-separated path, e.g. `file.mimeType` or `options.2`. Empty for
    /// the input as a whole.
    pub field: String,
    pub rule: RuleKind,
    pub expected: String,
    pub actual: String,
    /// Renderable without further lookup.
    pub message: String,
}

impl Violation {
    fn new(field: &str, failure: RuleFailure, sensitive: bool) -> Self {
        let actual = if sensitive {
            REDACTED.to_string()
        } else {
            failure.actual
        };
        let subject = if field.is_empty() { "input" } else { field };
        Self {
            message: format!("{subject} must be {}, got {actual}", failure.expected),
            field: field.to_string(),
            rule: failure.rule,
            expected: failure.expected,
            actual,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.rule, self.message)
    }
}

/// The ordered, non-empty list of violations for one input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; present for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Violation] {
        &self.0
    }

    /// Violations at exactly `field`.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Violation> + 'a {
        self.0.iter().filter(move |v| v.field == field)
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {v}")?;
        }
        Ok(())
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A typed entity produced by validating against a named schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entity {
    User(User),
    Quiz(Quiz),
    Question(Question),
    CreateQuestion(CreateQuestion),
    UploadPdf(UploadPdf),
    ApiResponse(ApiResponse<Value>),
    PaginatedResponse(PaginatedResponse<Value>),
}

impl Entity {
    /// Name of the schema this entity was validated against.
    pub fn schema_name(&self) -> &'static str {
        match self {
            Entity::User(_) => schema::USER.name,
            Entity::Quiz(_) => schema::QUIZ.name,
            Entity::Question(_) => schema::QUESTION.name,
            Entity::CreateQuestion(_) => schema::CREATE_QUESTION.name,
            Entity::UploadPdf(_) => schema::UPLOAD_PDF.name,
            Entity::ApiResponse(_) => schema::API_RESPONSE.name,
            Entity::PaginatedResponse(_) => schema::PAGINATED_RESPONSE.name,
        }
    }
}

/// A type that can only be obtained by validating input against its schema.
pub trait Validated: DeserializeOwned {
    fn schema() -> &'static Schema;
}

impl Validated for User {
    fn schema() -> &'static Schema {
        &schema::USER
    }
}

impl Validated for Quiz {
    fn schema() -> &'static Schema {
        &schema::QUIZ
    }
}

impl Validated for Question {
    fn schema() -> &'static Schema {
        &schema::QUESTION
    }
}

impl Validated for CreateQuestion {
    fn schema() -> &'static Schema {
        &schema::CREATE_QUESTION
    }
}

impl Validated for UploadPdf {
    fn schema() -> &'static Schema {
        &schema::UPLOAD_PDF
    }
}

impl<T: DeserializeOwned> Validated for ApiResponse<T> {
    fn schema() -> &'static Schema {
        &schema::API_RESPONSE
    }
}

impl<T: DeserializeOwned> Validated for PaginatedResponse<T> {
    fn schema() -> &'static Schema {
        &schema::PAGINATED_RESPONSE
    }
}

/// Validate `input` against the schema registered as `schema_name`.
pub fn validate(schema_name: &str, input: &Value) -> Result<Entity, ValidationError> {
    let schema = Schema::by_name(schema_name)
        .ok_or_else(|| ValidationError::SchemaNotFound(schema_name.to_string()))?;

    let entity = match schema.name {
        "User" => Entity::User(validate_against(schema, input)?),
        "Quiz" => Entity::Quiz(validate_against(schema, input)?),
        "Question" => Entity::Question(validate_against(schema, input)?),
        "CreateQuestion" => Entity::CreateQuestion(validate_against(schema, input)?),
        "UploadPdf" => Entity::UploadPdf(validate_against(schema, input)?),
        "ApiResponse" => Entity::ApiResponse(validate_against(schema, input)?),
        "PaginatedResponse" => Entity::PaginatedResponse(validate_against(schema, input)?),
        other => return Err(ValidationError::SchemaNotFound(other.to_string())),
    };
    Ok(entity)
}

/// Validate `input` as a `T`.
pub fn validate_as<T: Validated>(input: &Value) -> Result<T, ValidationError> {
    validate_against(T::schema(), input)
}

fn validate_against<T: DeserializeOwned>(
    schema: &'static Schema,
    input: &Value,
) -> Result<T, ValidationError> {
    let normalized = check(schema, input).map_err(ValidationError::Invalid)?;

    serde_json::from_value(Value::Object(normalized)).map_err(|e| {
        let failure = RuleFailure {
            rule: RuleKind::Type,
            expected: format!("a valid {}", schema.name),
            actual: e.to_string(),
        };
        ValidationError::Invalid(Violations(vec![Violation::new("", failure, false)]))
    })
}

/// Check `input` against `schema` without building a typed entity.
///
/// On success returns the input reduced to the declared fields, with values
/// in canonical form and defaults filled in.
pub fn check(schema: &Schema, input: &Value) -> Result<Map<String, Value>, Violations> {
    let mut violations = Vec::new();
    let normalized = check_object(schema, input, "", &mut violations);

    if violations.is_empty() {
        tracing::debug!(schema = schema.name, "input accepted");
        Ok(normalized)
    } else {
        tracing::debug!(
            schema = schema.name,
            violations = violations.len(),
            "input rejected"
        );
        Err(Violations(violations))
    }
}

fn check_object(
    schema: &Schema,
    input: &Value,
    prefix: &str,
    violations: &mut Vec<Violation>,
) -> Map<String, Value> {
    let mut out = Map::new();

    let Some(object) = input.as_object() else {
        let failure = RuleFailure {
            rule: RuleKind::Type,
            expected: "an object".into(),
            actual: json_type_name(input).into(),
        };
        violations.push(Violation::new(prefix, failure, false));
        return out;
    };

    for field in schema.fields {
        let path = join_path(prefix, field.name);
        let raw = object.get(field.name);

        match raw.filter(|v| !v.is_null()) {
            Some(value) => {
                if let Some(accepted) = check_field(field, value, &path, violations) {
                    out.insert(field.name.to_string(), accepted);
                }
            }
            None => match field.presence {
                Presence::Required => {
                    let failure = RuleFailure {
                        rule: RuleKind::Required,
                        expected: "present".into(),
                        actual: (if raw.is_some() { "null" } else { "missing" }).into(),
                    };
                    violations.push(Violation::new(&path, failure, false));
                }
                Presence::Optional => {}
                Presence::DefaultInteger(n) => {
                    out.insert(field.name.to_string(), Value::from(n));
                }
            },
        }
    }

    out
}

fn check_field(
    field: &FieldSpec,
    value: &Value,
    path: &str,
    violations: &mut Vec<Violation>,
) -> Option<Value> {
    match field.kind {
        FieldKind::Scalar(constraint) => match constraint.accept(value) {
            Ok(accepted) => Some(accepted),
            Err(failure) => {
                violations.push(Violation::new(path, failure, field.sensitive));
                None
            }
        },
        FieldKind::List(constraint) => {
            let Some(items) = value.as_array() else {
                let failure = RuleFailure {
                    rule: RuleKind::Type,
                    expected: "an array".into(),
                    actual: json_type_name(value).into(),
                };
                violations.push(Violation::new(path, failure, field.sensitive));
                return None;
            };

            let before = violations.len();
            let accepted: Vec<Value> = items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| match constraint.accept(item) {
                    Ok(v) => Some(v),
                    Err(failure) => {
                        let item_path = join_path(path, &i.to_string());
                        violations.push(Violation::new(&item_path, failure, field.sensitive));
                        None
                    }
                })
                .collect();

            (violations.len() == before).then_some(Value::Array(accepted))
        }
        FieldKind::Object(nested) => {
            let before = violations.len();
            let accepted = check_object(nested, value, path, violations);
            (violations.len() == before).then_some(Value::Object(accepted))
        }
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}
