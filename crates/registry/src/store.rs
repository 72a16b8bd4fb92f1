//! RecordStore - in-memory course and student records

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, instrument};
use validator::{Validate, ValidateEmail};

use contracts::{Course, RecordId, ResultNotice, Roster, Student, MAX_SCORE};

use crate::error::{RegistryError, Result};

#[derive(Debug, Default)]
struct Records {
    courses: BTreeMap<RecordId, Course>,
    students: BTreeMap<RecordId, Student>,
    last_course_id: RecordId,
    last_student_id: RecordId,
}

impl Records {
    fn course(&self, id: RecordId) -> Result<&Course> {
        self.courses
            .get(&id)
            .ok_or(RegistryError::CourseNotFound { id })
    }

    fn student_mut(&mut self, id: RecordId) -> Result<&mut Student> {
        self.students
            .get_mut(&id)
            .ok_or(RegistryError::StudentNotFound { id })
    }
}

/// Thread-safe record store
///
/// Ids are assigned from 1 upward and never reused.
#[derive(Debug, Default)]
pub struct RecordStore {
    inner: RwLock<Records>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a roster
    ///
    /// Roster course ids are only used to link students; the store assigns
    /// fresh ids for both.
    pub fn from_roster(roster: Roster) -> Result<Self> {
        let store = Self::new();
        store.load_roster(roster)?;
        Ok(store)
    }

    /// Read a JSON roster file
    pub fn from_roster_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let roster: Roster = serde_json::from_str(&content)?;
        Self::from_roster(roster)
    }

    #[instrument(
        name = "record_store_load_roster",
        skip(self, roster),
        fields(courses = roster.courses.len(), students = roster.students.len())
    )]
    pub fn load_roster(&self, roster: Roster) -> Result<()> {
        let mut course_ids = HashMap::with_capacity(roster.courses.len());
        for course in roster.courses {
            let roster_id = course.id;
            let id = self.add_course(course)?;
            course_ids.insert(roster_id, id);
        }

        for mut student in roster.students {
            student.course_id = *course_ids
                .get(&student.course_id)
                .ok_or(RegistryError::StudentClass {
                    course_id: student.course_id,
                })?;
            self.add_student(student)?;
        }

        info!("Roster loaded");
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, Records> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Records> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ===== Courses =====

    /// Add a course, returns its id
    ///
    /// Same name and instructor counts as a duplicate.
    pub fn add_course(&self, mut course: Course) -> Result<RecordId> {
        course.validate().map_err(contracts::ContractError::from)?;

        let mut records = self.write();
        let duplicate = records
            .courses
            .values()
            .any(|c| c.name == course.name && c.instructor == course.instructor);
        if duplicate {
            return Err(RegistryError::DuplicateCourse {
                name: course.name,
                instructor: course.instructor,
            });
        }

        records.last_course_id += 1;
        course.id = records.last_course_id;
        debug!(id = course.id, course = %course, "Course added");
        records.courses.insert(course.id, course);
        Ok(records.last_course_id)
    }

    pub fn get_course(&self, id: RecordId) -> Result<Course> {
        self.read().course(id).cloned()
    }

    pub fn courses(&self) -> Vec<Course> {
        self.read().courses.values().cloned().collect()
    }

    /// Delete a course together with its students
    pub fn delete_course(&self, id: RecordId) -> Result<()> {
        let mut records = self.write();
        records
            .courses
            .remove(&id)
            .ok_or(RegistryError::CourseNotFound { id })?;
        records.students.retain(|_, s| s.course_id != id);
        debug!(id, "Course deleted");
        Ok(())
    }

    pub fn update_course_instructor(&self, id: RecordId, instructor: &str) -> Result<()> {
        if instructor.trim().is_empty() {
            return Err(contracts::ContractError::invalid_field(
                "instructor",
                "instructor is required",
            )
            .into());
        }
        if contracts::validate_single_line(instructor).is_err() {
            return Err(contracts::ContractError::invalid_field(
                "instructor",
                "control characters are not allowed",
            )
            .into());
        }

        let mut records = self.write();
        let course = records
            .courses
            .get_mut(&id)
            .ok_or(RegistryError::CourseNotFound { id })?;
        course.instructor = instructor.to_string();
        Ok(())
    }

    /// Students of a course, ordered by id
    pub fn course_students(&self, course_id: RecordId) -> Result<Vec<Student>> {
        let records = self.read();
        records.course(course_id)?;
        Ok(records
            .students
            .values()
            .filter(|s| s.course_id == course_id)
            .cloned()
            .collect())
    }

    // ===== Students =====

    /// Add a student to an existing course, returns its id
    pub fn add_student(&self, mut student: Student) -> Result<RecordId> {
        check_score(student.score)?;
        check_email(&student.email)?;
        student.validate().map_err(contracts::ContractError::from)?;

        let mut records = self.write();
        if !records.courses.contains_key(&student.course_id) {
            return Err(RegistryError::StudentClass {
                course_id: student.course_id,
            });
        }

        let duplicate = records
            .students
            .values()
            .any(|s| s.course_id == student.course_id && s.email == student.email);
        if duplicate {
            return Err(RegistryError::DuplicateStudent {
                email: student.email,
                course_id: student.course_id,
            });
        }

        records.last_student_id += 1;
        student.id = records.last_student_id;
        debug!(id = student.id, course_id = student.course_id, "Student added");
        records.students.insert(student.id, student);
        Ok(records.last_student_id)
    }

    pub fn get_student(&self, id: RecordId) -> Result<Student> {
        self.read()
            .students
            .get(&id)
            .cloned()
            .ok_or(RegistryError::StudentNotFound { id })
    }

    /// Student joined with their course
    pub fn student_notice(&self, id: RecordId) -> Result<ResultNotice> {
        let records = self.read();
        let student = records
            .students
            .get(&id)
            .ok_or(RegistryError::StudentNotFound { id })?;
        let course = records.course(student.course_id)?;
        Ok(ResultNotice::new(student.clone(), course.clone()))
    }

    pub fn update_student_score(&self, id: RecordId, score: i32) -> Result<()> {
        check_score(score)?;
        self.write().student_mut(id)?.score = score;
        Ok(())
    }

    pub fn update_student_email(&self, id: RecordId, email: &str) -> Result<()> {
        check_email(email)?;
        self.write().student_mut(id)?.email = email.to_string();
        Ok(())
    }

    pub fn delete_student(&self, id: RecordId) -> Result<()> {
        self.write()
            .students
            .remove(&id)
            .map(|_| ())
            .ok_or(RegistryError::StudentNotFound { id })
    }
}

fn check_score(score: i32) -> Result<()> {
    if !(0..=MAX_SCORE).contains(&score) {
        return Err(RegistryError::InvalidScore { score });
    }
    Ok(())
}

fn check_email(email: &str) -> Result<()> {
    if !email.validate_email() {
        return Err(RegistryError::InvalidEmail {
            email: email.to_string(),
        });
    }
    Ok(())
}
