//! Attendance statistics.
//!
//! Pure aggregation over a student count and one day's statuses; no store
//! access happens here.

use crate::model::attendance::{AttendanceEntry, AttendanceStatus};
use crate::model::student::{Student, StudentId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Headline numbers for one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceStats {
    pub total_students: u32,
    pub present: u32,
    pub late: u32,
    /// Everyone not present or late, including students never marked.
    pub absent: u32,
    /// `round(100 * (present + late) / total)`, or 0 without students.
    pub percentage: u32,
}

impl AttendanceStats {
    /// Students counted as attended (present or late).
    pub fn attended(&self) -> u32 {
        self.present.saturating_add(self.late)
    }
}

/// Per-department attendance for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentAttendance {
    pub department: String,
    pub total_students: u32,
    pub attended: u32,
    pub percentage: u32,
}

/// Aggregates one day's statuses against the enrolled total.
pub fn compute_attendance_stats(
    total_students: u32,
    statuses: &[AttendanceStatus],
) -> AttendanceStats {
    let mut stats = AttendanceStats {
        total_students,
        present: count_status(statuses, AttendanceStatus::Present),
        late: count_status(statuses, AttendanceStatus::Late),
        ..AttendanceStats::default()
    };
    let attended = stats.attended();
    stats.absent = total_students.saturating_sub(attended);
    stats.percentage = attendance_percentage(attended, total_students);
    stats
}

/// Rounded share of `attended` in `total`, half away from zero.
pub fn attendance_percentage(attended: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * f64::from(attended) / f64::from(total)).round() as u32
}

/// Groups students by department and counts who attended on the entries'
/// day. Departments are returned in name order.
pub fn department_breakdown(
    students: &[Student],
    entries: &[AttendanceEntry],
) -> Vec<DepartmentAttendance> {
    let status_by_student: HashMap<StudentId, AttendanceStatus> = entries
        .iter()
        .map(|entry| (entry.record.student_id, entry.record.status))
        .collect();

    let mut groups: BTreeMap<&str, (u32, u32)> = BTreeMap::new();
    for student in students {
        let slot = groups.entry(student.department.as_str()).or_default();
        slot.0 += 1;
        if status_by_student
            .get(&student.id)
            .is_some_and(|status| status.is_attended())
        {
            slot.1 += 1;
        }
    }

    groups
        .into_iter()
        .map(|(department, (total, attended))| DepartmentAttendance {
            department: department.to_string(),
            total_students: total,
            attended,
            percentage: attendance_percentage(attended, total),
        })
        .collect()
}

fn count_status(statuses: &[AttendanceStatus], wanted: AttendanceStatus) -> u32 {
    let count = statuses.iter().filter(|status| **status == wanted).count();
    u32::try_from(count).unwrap_or(u32::MAX)
}
