//! quizgate-core: entity schemas, validation, and question quality scoring.
//!
//! This crate defines the shared domain layer of the quiz platform: the
//! constraint primitives and entity schemas every service validates against,
//! the violation-collecting validator, the persisted quality score, and the
//! staged review applied to freshly generated questions.

pub mod config;
pub mod constraint;
pub mod envelope;
pub mod error;
pub mod model;
pub mod review;
pub mod schema;
pub mod scoring;
pub mod utils;
pub mod validator;

pub use error::ValidationError;
pub use scoring::score;
pub use validator::{validate, validate_as, Entity, Validated, Violation, Violations};
