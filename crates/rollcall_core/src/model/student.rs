//! Student record and enrollment input.
//!
//! # Invariants
//! - `student_code` is unique across the store.
//! - A blank `email` is stored as `None`, never as an empty string.

use crate::model::validation::{check_char_range, normalize_optional, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type StudentId = Uuid;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Enrolled student as kept by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    /// External roll number, e.g. `CS2024001`.
    pub student_code: String,
    pub email: Option<String>,
    pub department: String,
    pub year: String,
    pub avatar_url: Option<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Student {
    /// Case-insensitive substring match on name or student code.
    ///
    /// A blank query matches every student.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&needle)
            || self.student_code.to_lowercase().contains(&needle)
    }

    /// Up to two uppercase initials for avatar placeholders.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// Input for enrolling one student.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub student_code: String,
    pub email: Option<String>,
    pub department: String,
    pub year: String,
    pub avatar_url: Option<String>,
}

impl NewStudent {
    /// Returns a copy with trimmed fields and blank optionals dropped.
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            student_code: self.student_code.trim().to_string(),
            email: normalize_optional(self.email.as_deref()),
            department: self.department.trim().to_string(),
            year: self.year.trim().to_string(),
            avatar_url: normalize_optional(self.avatar_url.as_deref()),
        }
    }

    /// Checks form rules; the first failing field is reported.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let input = self.normalized();
        check_char_range(
            "name",
            &input.name,
            2,
            100,
            "Name must be at least 2 characters",
        )?;
        check_char_range(
            "student_code",
            &input.student_code,
            3,
            20,
            "Student ID is required",
        )?;
        if let Some(email) = input.email.as_deref() {
            if !EMAIL_RE.is_match(email) {
                return Err(ValidationError::new("email", "Invalid email"));
            }
        }
        if input.department.is_empty() {
            return Err(ValidationError::new("department", "Department is required"));
        }
        if input.year.is_empty() {
            return Err(ValidationError::new("year", "Year is required"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{NewStudent, Student};
    use uuid::Uuid;

    fn emma() -> NewStudent {
        NewStudent {
            name: "Emma Wilson".to_string(),
            student_code: "CS2024001".to_string(),
            email: Some("emma.wilson@university.edu".to_string()),
            department: "Computer Science".to_string(),
            year: "2nd Year".to_string(),
            avatar_url: None,
        }
    }

    #[test]
    fn accepts_complete_input() {
        assert!(emma().validate().is_ok());
    }

    #[test]
    fn blank_email_normalizes_to_none_and_passes() {
        let mut input = emma();
        input.email = Some("   ".to_string());
        assert!(input.validate().is_ok());
        assert_eq!(input.normalized().email, None);
    }

    #[test]
    fn reports_offending_field() {
        let mut input = emma();
        input.name = "E".to_string();
        assert_eq!(input.validate().unwrap_err().field, "name");

        let mut input = emma();
        input.student_code = "CS".to_string();
        assert_eq!(input.validate().unwrap_err().field, "student_code");

        let mut input = emma();
        input.email = Some("not-an-email".to_string());
        let err = input.validate().unwrap_err();
        assert_eq!(err.field, "email");
        assert_eq!(err.message, "Invalid email");

        let mut input = emma();
        input.department = " ".to_string();
        assert_eq!(input.validate().unwrap_err().field, "department");

        let mut input = emma();
        input.year = String::new();
        assert_eq!(input.validate().unwrap_err().field, "year");
    }

    #[test]
    fn matches_query_on_name_or_code() {
        let input = emma();
        let student = Student {
            id: Uuid::new_v4(),
            name: input.name,
            student_code: input.student_code,
            email: input.email,
            department: input.department,
            year: input.year,
            avatar_url: None,
            created_at: 0,
        };
        assert!(student.matches_query("emma"));
        assert!(student.matches_query("cs2024"));
        assert!(student.matches_query(""));
        assert!(!student.matches_query("john"));
        assert_eq!(student.initials(), "EW");
    }
}
