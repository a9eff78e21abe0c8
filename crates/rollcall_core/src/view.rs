//! Page-level projections of service data.
//!
//! # Responsibility
//! - Turn models into the labels the operator surfaces print.
//! - Own the empty-state copy for lists.
//!
//! # Invariants
//! - Projections are pure; nothing here touches the store or the cache.
//! - Activity status labels always come from `effective_status`.

use crate::model::activity::Activity;
use crate::model::attendance::{AttendanceEntry, AttendanceStatus};
use crate::model::student::{Student, StudentId};
use crate::service::activity_service::ActivitySummary;
use crate::service::attendance_service::RosterEntry;
use crate::service::stats::{AttendanceStats, DepartmentAttendance};
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use uuid::Uuid;

const TIME_LABEL_FORMAT: &str = "%I:%M %p";
const DUE_LABEL_FORMAT: &str = "%b %-d, %Y";
const UNMARKED_PLACEHOLDER: &str = "-";
const NO_DUE_DATE_LABEL: &str = "No due date";

/// Title and hint shown in place of an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyState {
    pub title: &'static str,
    pub hint: &'static str,
}

/// One line of the attendance table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceRow {
    pub student_id: StudentId,
    pub student_name: String,
    pub student_code: String,
    pub status: AttendanceStatus,
    pub status_label: &'static str,
    pub time_label: String,
    pub method: String,
}

impl AttendanceRow {
    pub fn from_entry(entry: &AttendanceEntry) -> Self {
        Self {
            student_id: entry.record.student_id,
            student_name: entry.student_name.clone(),
            student_code: entry.student_code.clone(),
            status: entry.record.status,
            status_label: entry.record.status.label(),
            time_label: time_label(entry.record.time),
            method: entry.record.method.clone(),
        }
    }

    /// Placeholder row for a student with no record that day.
    pub fn unmarked(student: &Student) -> Self {
        Self {
            student_id: student.id,
            student_name: student.name.clone(),
            student_code: student.student_code.clone(),
            status: AttendanceStatus::Absent,
            status_label: AttendanceStatus::Absent.label(),
            time_label: UNMARKED_PLACEHOLDER.to_string(),
            method: UNMARKED_PLACEHOLDER.to_string(),
        }
    }

    pub fn from_roster(roster: &RosterEntry) -> Self {
        match &roster.entry {
            Some(entry) => Self::from_entry(entry),
            None => Self::unmarked(&roster.student),
        }
    }
}

/// 12-hour clock label, e.g. `09:05 AM`.
pub fn time_label(time: NaiveTime) -> String {
    time.format(TIME_LABEL_FORMAT).to_string()
}

/// Due-date label, e.g. `Dec 28, 2024`.
pub fn due_label(due_date: Option<NaiveDate>) -> String {
    due_date.map_or_else(
        || NO_DUE_DATE_LABEL.to_string(),
        |date| date.format(DUE_LABEL_FORMAT).to_string(),
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentListView {
    pub students: Vec<Student>,
    pub query: Option<String>,
    pub empty_state: Option<EmptyState>,
}

impl StudentListView {
    /// `students` is expected to be already filtered by `query`.
    pub fn build(students: Vec<Student>, query: Option<&str>) -> Self {
        let query = query
            .map(str::trim)
            .filter(|query| !query.is_empty())
            .map(str::to_string);
        let empty_state = students.is_empty().then(|| EmptyState {
            title: "No students found",
            hint: if query.is_some() {
                "Try adjusting your search query"
            } else {
                "Add your first student to get started"
            },
        });
        Self {
            students,
            query,
            empty_state,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityCardView {
    pub id: Uuid,
    pub title: String,
    pub type_label: &'static str,
    pub description: Option<String>,
    pub due_label: String,
    pub max_score: u32,
    pub status_label: &'static str,
    pub overdue: bool,
}

impl ActivityCardView {
    pub fn new(activity: &Activity, today: NaiveDate) -> Self {
        Self {
            id: activity.id,
            title: activity.title.clone(),
            type_label: activity.kind.label(),
            description: activity.description.clone(),
            due_label: due_label(activity.due_date),
            max_score: activity.max_score,
            status_label: activity.effective_status(today).label(),
            overdue: activity.is_past_due(today),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityListView {
    pub cards: Vec<ActivityCardView>,
    pub empty_state: Option<EmptyState>,
}

impl ActivityListView {
    pub fn build(activities: &[Activity], today: NaiveDate) -> Self {
        let cards: Vec<ActivityCardView> = activities
            .iter()
            .map(|activity| ActivityCardView::new(activity, today))
            .collect();
        let empty_state = cards.is_empty().then_some(EmptyState {
            title: "No activities found",
            hint: "Try adjusting your filters or search query",
        });
        Self { cards, empty_state }
    }
}

/// Landing page: today's numbers and the latest marks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub date: NaiveDate,
    pub stats: AttendanceStats,
    pub activities: ActivitySummary,
    pub recent: Vec<AttendanceRow>,
}

impl DashboardView {
    pub fn build(
        date: NaiveDate,
        stats: AttendanceStats,
        activities: ActivitySummary,
        entries: &[AttendanceEntry],
    ) -> Self {
        Self {
            date,
            stats,
            activities,
            recent: entries.iter().map(AttendanceRow::from_entry).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsView {
    pub date: NaiveDate,
    pub stats: AttendanceStats,
    pub departments: Vec<DepartmentAttendance>,
}

#[cfg(test)]
mod tests {
    use super::{due_label, ActivityListView, AttendanceRow, StudentListView};
    use crate::model::activity::{Activity, ActivityStatus, ActivityType};
    use crate::model::attendance::{AttendanceEntry, AttendanceRecord, AttendanceStatus};
    use crate::model::student::Student;
    use chrono::{NaiveDate, NaiveTime};
    use uuid::Uuid;

    fn emma() -> Student {
        Student {
            id: Uuid::new_v4(),
            name: "Emma Wilson".to_string(),
            student_code: "CS2024001".to_string(),
            email: None,
            department: "Computer Science".to_string(),
            year: "2nd Year".to_string(),
            avatar_url: None,
            created_at: 0,
        }
    }

    #[test]
    fn manual_mark_renders_present_row() {
        let student = emma();
        let entry = AttendanceEntry {
            record: AttendanceRecord {
                id: Uuid::new_v4(),
                student_id: student.id,
                date: NaiveDate::from_ymd_opt(2024, 12, 27).unwrap(),
                time: NaiveTime::from_hms_opt(9, 5, 0).unwrap(),
                status: AttendanceStatus::Present,
                method: "Manual Entry".to_string(),
                created_at: 0,
            },
            student_name: student.name.clone(),
            student_code: student.student_code.clone(),
        };

        let row = AttendanceRow::from_entry(&entry);
        assert_eq!(row.student_name, "Emma Wilson");
        assert_eq!(row.student_code, "CS2024001");
        assert_eq!(row.status_label, "Present");
        assert_eq!(row.time_label, "09:05 AM");
        assert_eq!(row.method, "Manual Entry");
    }

    #[test]
    fn unmarked_student_renders_absent_placeholder() {
        let row = AttendanceRow::unmarked(&emma());
        assert_eq!(row.status, AttendanceStatus::Absent);
        assert_eq!(row.time_label, "-");
        assert_eq!(row.method, "-");
    }

    #[test]
    fn afternoon_times_use_pm() {
        assert_eq!(
            super::time_label(NaiveTime::from_hms_opt(14, 30, 59).unwrap()),
            "02:30 PM"
        );
    }

    #[test]
    fn empty_student_list_hint_depends_on_search() {
        let view = StudentListView::build(Vec::new(), None);
        let empty = view.empty_state.unwrap();
        assert_eq!(empty.title, "No students found");
        assert_eq!(empty.hint, "Add your first student to get started");

        let view = StudentListView::build(Vec::new(), Some("zzz"));
        assert_eq!(
            view.empty_state.unwrap().hint,
            "Try adjusting your search query"
        );

        let view = StudentListView::build(vec![emma()], Some("  "));
        assert_eq!(view.empty_state, None);
        assert_eq!(view.query, None);
    }

    #[test]
    fn activity_cards_report_effective_status() {
        let today = NaiveDate::from_ymd_opt(2024, 12, 27).unwrap();
        let quiz = Activity {
            id: Uuid::new_v4(),
            title: "Mid-term Quiz".to_string(),
            kind: ActivityType::Quiz,
            description: None,
            due_date: NaiveDate::from_ymd_opt(2024, 12, 24),
            max_score: 100,
            status: ActivityStatus::Active,
            created_at: 0,
        };

        let view = ActivityListView::build(&[quiz], today);
        assert_eq!(view.empty_state, None);
        let card = &view.cards[0];
        assert_eq!(card.status_label, "Completed");
        assert_eq!(card.type_label, "Quiz");
        assert_eq!(card.due_label, "Dec 24, 2024");
        assert!(card.overdue);

        let empty = ActivityListView::build(&[], today);
        assert_eq!(empty.empty_state.unwrap().title, "No activities found");
    }

    #[test]
    fn missing_due_date_has_label() {
        assert_eq!(due_label(None), "No due date");
        assert_eq!(
            due_label(NaiveDate::from_ymd_opt(2025, 1, 5)),
            "Jan 5, 2025"
        );
    }
}
