//! Core domain logic for Rollcall, a university attendance tracker.
//! This crate is the single source of truth for business invariants.

pub mod cache;
pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod notice;
pub mod recognition;
pub mod repo;
pub mod service;
pub mod view;

pub use cache::{QueryCache, QueryFamily, QueryKey};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, CoreConfig, ScanSettings};
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError, LoggingStatus};
pub use model::activity::{
    Activity, ActivityId, ActivityPatch, ActivityStatus, ActivityType, NewActivity,
};
pub use model::attendance::{
    AttendanceEntry, AttendanceRecord, AttendanceStatus, MarkAttendanceRequest,
    FACE_RECOGNITION_METHOD, MANUAL_ENTRY_METHOD,
};
pub use model::student::{NewStudent, Student, StudentId};
pub use model::validation::{UnknownVariant, ValidationError};
pub use notice::{Notice, NoticeVariant};
pub use recognition::{NotRecognized, Recognizer, ScanOutcome, SimulatedRecognizer};
pub use repo::activity_repo::{ActivityRepository, SqliteActivityRepository};
pub use repo::attendance_repo::{AttendanceRepository, SqliteAttendanceRepository};
pub use repo::student_repo::{SqliteStudentRepository, StudentRepository};
pub use repo::{RepoError, RepoResult};
pub use service::activity_service::{
    ActivityFilter, ActivityService, ActivityServiceError, ActivitySummary,
};
pub use service::attendance_service::{AttendanceService, AttendanceServiceError, RosterEntry};
pub use service::stats::{AttendanceStats, DepartmentAttendance};
pub use service::student_service::{StudentService, StudentServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
