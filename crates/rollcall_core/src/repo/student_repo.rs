//! Student repository contract and SQLite implementation.

use crate::model::student::{NewStudent, Student, StudentId};
use crate::repo::{now_epoch_ms, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const STUDENT_SELECT_SQL: &str = "SELECT
    id,
    name,
    student_code,
    email,
    department,
    year,
    avatar_url,
    created_at
FROM students";

/// Data access for the `students` collection.
pub trait StudentRepository {
    /// Inserts a validated student; a duplicate `student_code` is a
    /// `Constraint` error.
    fn create_student(&self, input: &NewStudent) -> RepoResult<Student>;
    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>>;
    /// Newest first; ties ordered by id.
    fn list_students(&self) -> RepoResult<Vec<Student>>;
    fn count_students(&self) -> RepoResult<u32>;
    /// Fails with `Constraint` while attendance rows still reference the
    /// student.
    fn delete_student(&self, id: StudentId) -> RepoResult<()>;
}

pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn create_student(&self, input: &NewStudent) -> RepoResult<Student> {
        input.validate()?;
        let input = input.normalized();

        let student = Student {
            id: Uuid::new_v4(),
            name: input.name,
            student_code: input.student_code,
            email: input.email,
            department: input.department,
            year: input.year,
            avatar_url: input.avatar_url,
            created_at: now_epoch_ms(),
        };

        self.conn.execute(
            "INSERT INTO students (
                id,
                name,
                student_code,
                email,
                department,
                year,
                avatar_url,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                student.id.to_string(),
                student.name,
                student.student_code,
                student.email,
                student.department,
                student.year,
                student.avatar_url,
                student.created_at,
            ],
        )?;

        Ok(student)
    }

    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_student_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_students(&self) -> RepoResult<Vec<Student>> {
        let mut stmt = self.conn.prepare(&format!(
            "{STUDENT_SELECT_SQL} ORDER BY created_at DESC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }
        Ok(students)
    }

    fn count_students(&self) -> RepoResult<u32> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM students;", [], |row| {
                row.get::<_, u32>(0)
            })?;
        Ok(count)
    }

    fn delete_student(&self, id: StudentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM students WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "student",
                id,
            });
        }
        Ok(())
    }
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let id_text: String = row.get("id")?;
    Ok(Student {
        id: parse_uuid("students.id", &id_text)?,
        name: row.get("name")?,
        student_code: row.get("student_code")?,
        email: row.get("email")?,
        department: row.get("department")?,
        year: row.get("year")?,
        avatar_url: row.get("avatar_url")?,
        created_at: row.get("created_at")?,
    })
}
