//! Course and student records
//!
//! Plain data shared between the registry and the notifiers.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Record identifier, assigned by the registry starting from 1
pub type RecordId = u64;

/// Highest score a student can hold
pub const MAX_SCORE: i32 = 20;

/// Rejects CR, LF and other control characters
///
/// Names end up in mail headers, a line break there would start a new header.
pub fn validate_single_line(value: &str) -> Result<(), ValidationError> {
    if value.chars().any(char::is_control) {
        let mut err = ValidationError::new("single_line");
        err.message = Some("control characters are not allowed".into());
        return Err(err);
    }
    Ok(())
}

/// A course offering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Course {
    #[serde(default)]
    pub id: RecordId,

    #[validate(
        length(min = 1, message = "course name is required"),
        custom(function = "validate_single_line")
    )]
    pub name: String,

    #[validate(
        length(min = 1, message = "instructor is required"),
        custom(function = "validate_single_line")
    )]
    pub instructor: String,
}

impl Course {
    pub fn new(name: impl Into<String>, instructor: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            instructor: instructor.into(),
        }
    }
}

impl std::fmt::Display for Course {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} Course by {}", self.name, self.instructor)
    }
}

/// A student enrolled in one course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Student {
    #[serde(default)]
    pub id: RecordId,

    #[validate(
        length(min = 1, message = "first name is required"),
        custom(function = "validate_single_line")
    )]
    pub first_name: String,

    #[validate(
        length(min = 1, message = "last name is required"),
        custom(function = "validate_single_line")
    )]
    pub last_name: String,

    #[validate(email(message = "invalid email"))]
    pub email: String,

    #[validate(range(min = 0, max = 20, message = "score must be within 0..=20"))]
    pub score: i32,

    pub course_id: RecordId,
}

/// Result notice for one student: the recipient type of a results announcement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultNotice {
    pub student: Student,
    pub course: Course,
}

impl ResultNotice {
    pub fn new(student: Student, course: Course) -> Self {
        Self { student, course }
    }

    /// Mail subject line
    pub fn subject(&self) -> String {
        format!("Results from: {}", self.course)
    }
}

impl std::fmt::Display for ResultNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} scored {} in {} course by {}",
            self.student.first_name,
            self.student.last_name,
            self.student.score,
            self.course.name,
            self.course.instructor
        )
    }
}

/// Bulk record file: courses plus their students
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub courses: Vec<Course>,

    #[serde(default)]
    pub students: Vec<Student>,
}
