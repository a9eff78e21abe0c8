//! Daily attendance records.
//!
//! # Invariants
//! - One record per `(student_id, date)`; repeated marks overwrite it.
//! - `time` is stored with second precision.

use crate::model::student::StudentId;
use crate::model::validation::UnknownVariant;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

pub type AttendanceId = Uuid;

/// Method label written by the manual entry dialog.
pub const MANUAL_ENTRY_METHOD: &str = "Manual Entry";
/// Method label written by a recognition scan.
pub const FACE_RECOGNITION_METHOD: &str = "Face Recognition";
/// Method used when a mark request does not name one.
pub const DEFAULT_METHOD: &str = FACE_RECOGNITION_METHOD;

/// Attendance outcome for one student on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    pub const ALL: [Self; 3] = [Self::Present, Self::Absent, Self::Late];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Late => "late",
        }
    }

    /// Capitalized label used by tables and notices.
    pub fn label(self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Absent => "Absent",
            Self::Late => "Late",
        }
    }

    /// Present and late both count as attended.
    pub fn is_attended(self) -> bool {
        matches!(self, Self::Present | Self::Late)
    }
}

impl Display for AttendanceStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            "late" => Ok(Self::Late),
            _ => Err(UnknownVariant {
                kind: "attendance status",
                value: value.to_string(),
                expected: "present|absent|late",
            }),
        }
    }
}

/// Stored attendance row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: AttendanceId,
    pub student_id: StudentId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: AttendanceStatus,
    pub method: String,
    /// Unix epoch milliseconds of the first mark for this day.
    pub created_at: i64,
}

/// Attendance row joined with the student's display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    pub student_name: String,
    pub student_code: String,
}

/// Input for the attendance-marking workflow.
///
/// The day and time of day are taken from the service clock, not the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkAttendanceRequest {
    pub student_id: StudentId,
    pub status: AttendanceStatus,
    pub method: Option<String>,
}

impl MarkAttendanceRequest {
    pub fn new(student_id: StudentId, status: AttendanceStatus) -> Self {
        Self {
            student_id,
            status,
            method: None,
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Trimmed method label, falling back to [`DEFAULT_METHOD`].
    pub fn effective_method(&self) -> &str {
        self.method
            .as_deref()
            .map(str::trim)
            .filter(|method| !method.is_empty())
            .unwrap_or(DEFAULT_METHOD)
    }
}
