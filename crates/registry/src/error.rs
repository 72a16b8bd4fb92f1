//! Registry error types

use contracts::RecordId;
use thiserror::Error;

/// Record store and announcement errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("course not found: {id}")]
    CourseNotFound { id: RecordId },

    #[error("student not found: {id}")]
    StudentNotFound { id: RecordId },

    #[error("duplicate course: {name} by {instructor}")]
    DuplicateCourse { name: String, instructor: String },

    #[error("duplicate student: {email} already enrolled in course {course_id}")]
    DuplicateStudent { email: String, course_id: RecordId },

    #[error("invalid score: {score}")]
    InvalidScore { score: i32 },

    #[error("invalid email: {email}")]
    InvalidEmail { email: String },

    /// Student refers to a course that does not exist
    #[error("invalid class id for student: {course_id}")]
    StudentClass { course_id: RecordId },

    /// Field validation error (from contract)
    #[error("validation error: {0}")]
    Validation(#[from] contracts::ContractError),

    /// Dispatch failed as a whole
    #[error("dispatch error: {0}")]
    Dispatch(#[from] dispatcher::DispatchError),

    #[error("roster parse error: {0}")]
    RosterParse(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;
