//! Attendance repository contract and SQLite implementation.
//!
//! # Invariants
//! - Writes go through [`AttendanceRepository::upsert_attendance`], keyed on
//!   `(student_id, date)`; the store holds at most one row per key.
//! - Reads return rows joined with the owning student's name and code.

use crate::model::attendance::{AttendanceEntry, AttendanceRecord, AttendanceStatus};
use crate::model::student::StudentId;
use crate::repo::{
    now_epoch_ms, parse_date, parse_time, parse_uuid, RepoError, RepoResult, DATE_FORMAT,
    TIME_FORMAT,
};
use chrono::{NaiveDate, NaiveTime};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const ENTRY_SELECT_SQL: &str = "SELECT
    a.id,
    a.student_id,
    a.date,
    a.time,
    a.status,
    a.method,
    a.created_at,
    s.name AS student_name,
    s.student_code AS student_code
FROM attendance a
INNER JOIN students s ON s.id = a.student_id";

/// Write model for one daily mark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceUpsert<'a> {
    pub student_id: StudentId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: AttendanceStatus,
    pub method: &'a str,
}

/// Data access for the `attendance` collection.
pub trait AttendanceRepository {
    /// Inserts the `(student_id, date)` row or overwrites its time, status
    /// and method, then returns the joined row.
    fn upsert_attendance(&self, upsert: &AttendanceUpsert<'_>) -> RepoResult<AttendanceEntry>;
    fn get_entry(&self, student_id: StudentId, date: NaiveDate)
        -> RepoResult<Option<AttendanceEntry>>;
    /// Rows for one day ordered by time, then student name.
    fn list_for_date(&self, date: NaiveDate) -> RepoResult<Vec<AttendanceEntry>>;
    fn statuses_for_date(&self, date: NaiveDate) -> RepoResult<Vec<AttendanceStatus>>;
}

pub struct SqliteAttendanceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAttendanceRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AttendanceRepository for SqliteAttendanceRepository<'_> {
    fn upsert_attendance(&self, upsert: &AttendanceUpsert<'_>) -> RepoResult<AttendanceEntry> {
        // Single statement: the store resolves same-key races atomically.
        self.conn.execute(
            "INSERT INTO attendance (
                id,
                student_id,
                date,
                time,
                status,
                method,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT (student_id, date) DO UPDATE SET
                time = excluded.time,
                status = excluded.status,
                method = excluded.method;",
            params![
                Uuid::new_v4().to_string(),
                upsert.student_id.to_string(),
                upsert.date.format(DATE_FORMAT).to_string(),
                upsert.time.format(TIME_FORMAT).to_string(),
                upsert.status.as_str(),
                upsert.method,
                now_epoch_ms(),
            ],
        )?;

        self.get_entry(upsert.student_id, upsert.date)?
            .ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "attendance row for student {} on {} missing after upsert",
                    upsert.student_id, upsert.date
                ))
            })
    }

    fn get_entry(
        &self,
        student_id: StudentId,
        date: NaiveDate,
    ) -> RepoResult<Option<AttendanceEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ENTRY_SELECT_SQL} WHERE a.student_id = ?1 AND a.date = ?2;"
        ))?;
        let mut rows = stmt.query(params![
            student_id.to_string(),
            date.format(DATE_FORMAT).to_string()
        ])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_entry_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_for_date(&self, date: NaiveDate) -> RepoResult<Vec<AttendanceEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ENTRY_SELECT_SQL} WHERE a.date = ?1 ORDER BY a.time ASC, s.name ASC;"
        ))?;
        let mut rows = stmt.query([date.format(DATE_FORMAT).to_string()])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }
        Ok(entries)
    }

    fn statuses_for_date(&self, date: NaiveDate) -> RepoResult<Vec<AttendanceStatus>> {
        let mut stmt = self
            .conn
            .prepare("SELECT status FROM attendance WHERE date = ?1;")?;
        let mut rows = stmt.query([date.format(DATE_FORMAT).to_string()])?;
        let mut statuses = Vec::new();
        while let Some(row) = rows.next()? {
            let text: String = row.get(0)?;
            statuses.push(parse_status(&text)?);
        }
        Ok(statuses)
    }
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<AttendanceEntry> {
    let id_text: String = row.get("id")?;
    let student_text: String = row.get("student_id")?;
    let date_text: String = row.get("date")?;
    let time_text: String = row.get("time")?;
    let status_text: String = row.get("status")?;

    let record = AttendanceRecord {
        id: parse_uuid("attendance.id", &id_text)?,
        student_id: parse_uuid("attendance.student_id", &student_text)?,
        date: parse_date("attendance.date", &date_text)?,
        time: parse_time("attendance.time", &time_text)?,
        status: parse_status(&status_text)?,
        method: row.get("method")?,
        created_at: row.get("created_at")?,
    };

    Ok(AttendanceEntry {
        record,
        student_name: row.get("student_name")?,
        student_code: row.get("student_code")?,
    })
}

fn parse_status(value: &str) -> RepoResult<AttendanceStatus> {
    value.parse().map_err(|_| {
        RepoError::InvalidData(format!("invalid status `{value}` in attendance.status"))
    })
}
