//! Student use-case service.
//!
//! # Invariants
//! - Input is validated before any store call.
//! - Successful mutations invalidate `students` and `attendance-stats`;
//!   failed ones leave the cache untouched.

use crate::cache::{QueryCache, QueryFamily, QueryKey};
use crate::model::student::{NewStudent, Student, StudentId};
use crate::model::validation::ValidationError;
use crate::repo::student_repo::StudentRepository;
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

const STUDENT_MUTATION_FAMILIES: &[QueryFamily] =
    &[QueryFamily::Students, QueryFamily::AttendanceStats];

#[derive(Debug)]
pub enum StudentServiceError {
    Validation(ValidationError),
    StudentNotFound(StudentId),
    /// Another student already holds this code.
    DuplicateStudentCode(String),
    /// Attendance rows still reference the student.
    StudentInUse(StudentId),
    Repo(RepoError),
}

impl Display for StudentServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::StudentNotFound(id) => write!(f, "student not found: {id}"),
            Self::DuplicateStudentCode(code) => {
                write!(f, "student code already registered: {code}")
            }
            Self::StudentInUse(id) => {
                write!(f, "student {id} still has attendance records")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StudentServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for StudentServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for StudentServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound { id, .. } => Self::StudentNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub struct StudentService<R: StudentRepository> {
    repo: R,
    cache: Arc<QueryCache>,
}

impl<R: StudentRepository> StudentService<R> {
    pub fn new(repo: R, cache: Arc<QueryCache>) -> Self {
        Self { repo, cache }
    }

    /// All students, newest first. Served from the cache when warm.
    pub fn list_students(&self) -> Result<Vec<Student>, StudentServiceError> {
        self.cache
            .get_or_fetch(QueryKey::Students, || self.repo.list_students())
            .map_err(StudentServiceError::from)
    }

    /// Students whose name or code contains `query`, ignoring case.
    pub fn search_students(&self, query: &str) -> Result<Vec<Student>, StudentServiceError> {
        Ok(self
            .list_students()?
            .into_iter()
            .filter(|student| student.matches_query(query))
            .collect())
    }

    pub fn get_student(&self, id: StudentId) -> Result<Student, StudentServiceError> {
        self.repo
            .get_student(id)?
            .ok_or(StudentServiceError::StudentNotFound(id))
    }

    pub fn count_students(&self) -> Result<u32, StudentServiceError> {
        Ok(self.repo.count_students()?)
    }

    pub fn create_student(&self, input: &NewStudent) -> Result<Student, StudentServiceError> {
        input.validate()?;

        let student = self.repo.create_student(input).map_err(|err| match err {
            RepoError::Constraint(_) => {
                StudentServiceError::DuplicateStudentCode(input.normalized().student_code)
            }
            other => other.into(),
        });
        let student = match student {
            Ok(student) => student,
            Err(err) => {
                warn!("event=student_create module=service status=error error={err}");
                return Err(err);
            }
        };

        self.cache.invalidate_all(STUDENT_MUTATION_FAMILIES);
        info!(
            "event=student_create module=service status=ok student_id={}",
            student.id
        );
        Ok(student)
    }

    pub fn delete_student(&self, id: StudentId) -> Result<(), StudentServiceError> {
        if let Err(err) = self.repo.delete_student(id) {
            warn!("event=student_delete module=service status=error student_id={id} error={err}");
            return Err(match err {
                RepoError::Constraint(_) => StudentServiceError::StudentInUse(id),
                other => other.into(),
            });
        }

        self.cache.invalidate_all(STUDENT_MUTATION_FAMILIES);
        info!("event=student_delete module=service status=ok student_id={id}");
        Ok(())
    }
}
