//! Attendance use-case service.
//!
//! # Responsibility
//! - Mark attendance through the `(student, today)` upsert.
//! - Serve daily lists, rosters and statistics through the query cache.
//! - Run recognition scans and hand recognized students to the marking
//!   workflow.
//!
//! # Invariants
//! - Repeated marks for one student on one day leave exactly one record,
//!   carrying the last call's status, method and time.
//! - `attendance` and `attendance-stats` are invalidated only after a
//!   successful mark.
//! - No retry and no optimistic local update on failure.

use crate::cache::{QueryCache, QueryFamily, QueryKey};
use crate::clock::Clock;
use crate::model::attendance::{
    AttendanceEntry, AttendanceStatus, MarkAttendanceRequest, FACE_RECOGNITION_METHOD,
};
use crate::model::student::{Student, StudentId};
use crate::recognition::{NotRecognized, Recognizer, ScanOutcome};
use crate::repo::attendance_repo::{AttendanceRepository, AttendanceUpsert};
use crate::repo::student_repo::StudentRepository;
use crate::repo::RepoError;
use crate::service::stats::{
    compute_attendance_stats, department_breakdown, AttendanceStats, DepartmentAttendance,
};
use chrono::NaiveDate;
use log::{error, info, warn};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

const MARK_FAMILIES: &[QueryFamily] = &[QueryFamily::Attendance, QueryFamily::AttendanceStats];

#[derive(Debug)]
pub enum AttendanceServiceError {
    StudentNotFound(StudentId),
    Repo(RepoError),
}

impl Display for AttendanceServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StudentNotFound(id) => write!(f, "student not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AttendanceServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::StudentNotFound(_) => None,
        }
    }
}

impl From<RepoError> for AttendanceServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// One student on a given day, with their record if they were marked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub student: Student,
    pub entry: Option<AttendanceEntry>,
}

impl RosterEntry {
    /// Unmarked students count as absent.
    pub fn status(&self) -> AttendanceStatus {
        self.entry
            .as_ref()
            .map_or(AttendanceStatus::Absent, |entry| entry.record.status)
    }
}

pub struct AttendanceService<S, A, C>
where
    S: StudentRepository,
    A: AttendanceRepository,
    C: Clock,
{
    students: S,
    attendance: A,
    clock: C,
    cache: Arc<QueryCache>,
}

impl<S, A, C> AttendanceService<S, A, C>
where
    S: StudentRepository,
    A: AttendanceRepository,
    C: Clock,
{
    pub fn new(students: S, attendance: A, clock: C, cache: Arc<QueryCache>) -> Self {
        Self {
            students,
            attendance,
            clock,
            cache,
        }
    }

    /// Local calendar date according to the service clock.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Upserts today's record for the student and returns it joined with
    /// the student's name and code.
    pub fn mark_attendance(
        &self,
        request: &MarkAttendanceRequest,
    ) -> Result<AttendanceEntry, AttendanceServiceError> {
        let started_at = Instant::now();
        let student_id = request.student_id;

        if self.students.get_student(student_id)?.is_none() {
            warn!(
                "event=attendance_mark module=service status=error student_id={student_id} error_code=student_not_found"
            );
            return Err(AttendanceServiceError::StudentNotFound(student_id));
        }

        let upsert = AttendanceUpsert {
            student_id,
            date: self.clock.today(),
            time: self.clock.time_of_day(),
            status: request.status,
            method: request.effective_method(),
        };

        let entry = match self.attendance.upsert_attendance(&upsert) {
            Ok(entry) => entry,
            Err(err) => {
                error!(
                    "event=attendance_mark module=service status=error student_id={} duration_ms={} error={}",
                    student_id,
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
        };

        self.cache.invalidate_all(MARK_FAMILIES);
        info!(
            "event=attendance_mark module=service status=ok student_id={} date={} mark={} duration_ms={}",
            student_id,
            upsert.date,
            upsert.status,
            started_at.elapsed().as_millis()
        );
        Ok(entry)
    }

    /// Joined records for `date`, earliest first.
    pub fn list_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceEntry>, AttendanceServiceError> {
        self.cache
            .get_or_fetch(QueryKey::Attendance(date), || {
                self.attendance.list_for_date(date)
            })
            .map_err(AttendanceServiceError::from)
    }

    pub fn list_today(&self) -> Result<Vec<AttendanceEntry>, AttendanceServiceError> {
        self.list_for_date(self.today())
    }

    pub fn stats_for(&self, date: NaiveDate) -> Result<AttendanceStats, AttendanceServiceError> {
        self.cache
            .get_or_fetch(QueryKey::AttendanceStats(date), || {
                let total = self.students.count_students()?;
                let statuses = self.attendance.statuses_for_date(date)?;
                Ok::<_, RepoError>(compute_attendance_stats(total, &statuses))
            })
            .map_err(AttendanceServiceError::from)
    }

    pub fn stats_today(&self) -> Result<AttendanceStats, AttendanceServiceError> {
        self.stats_for(self.today())
    }

    /// Every enrolled student paired with their record for `date`, in
    /// student list order.
    pub fn roster_for(&self, date: NaiveDate) -> Result<Vec<RosterEntry>, AttendanceServiceError> {
        let students = self.candidates()?;
        let mut by_student: HashMap<StudentId, AttendanceEntry> = self
            .list_for_date(date)?
            .into_iter()
            .map(|entry| (entry.record.student_id, entry))
            .collect();

        Ok(students
            .into_iter()
            .map(|student| {
                let entry = by_student.remove(&student.id);
                RosterEntry { student, entry }
            })
            .collect())
    }

    pub fn department_breakdown_for(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<DepartmentAttendance>, AttendanceServiceError> {
        let students = self.candidates()?;
        let entries = self.list_for_date(date)?;
        Ok(department_breakdown(&students, &entries))
    }

    /// Runs one recognition capture and marks the recognized student
    /// present.
    ///
    /// An empty roster or a failed capture is reported as
    /// [`ScanOutcome::NotRecognized`]; only store failures are errors.
    pub fn scan(
        &self,
        recognizer: &mut dyn Recognizer,
    ) -> Result<ScanOutcome, AttendanceServiceError> {
        let candidates = self.candidates()?;
        if candidates.is_empty() {
            info!(
                "event=scan module=service status=not_recognized recognizer={} reason=no_candidates",
                recognizer.name()
            );
            return Ok(ScanOutcome::NotRecognized(NotRecognized::NoCandidates));
        }

        let student_id = match recognizer.capture(&candidates) {
            Ok(student_id) => student_id,
            Err(reason) => {
                info!(
                    "event=scan module=service status=not_recognized recognizer={} candidates={} reason={}",
                    recognizer.name(),
                    candidates.len(),
                    reason
                );
                return Ok(ScanOutcome::NotRecognized(reason));
            }
        };

        let request = MarkAttendanceRequest::new(student_id, AttendanceStatus::Present)
            .with_method(FACE_RECOGNITION_METHOD);
        let entry = self.mark_attendance(&request)?;
        info!(
            "event=scan module=service status=ok recognizer={} student_id={}",
            recognizer.name(),
            student_id
        );
        Ok(ScanOutcome::Marked(entry))
    }

    /// Student list shared with the student service through the cache.
    fn candidates(&self) -> Result<Vec<Student>, AttendanceServiceError> {
        self.cache
            .get_or_fetch(QueryKey::Students, || self.students.list_students())
            .map_err(AttendanceServiceError::from)
    }
}
