//! User-facing outcome messages for mutations and scans.

use crate::model::activity::Activity;
use crate::model::attendance::AttendanceEntry;
use crate::recognition::ScanOutcome;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;

const SUCCESS_TITLE: &str = "Success";
const ERROR_TITLE: &str = "Error";
const ATTENDANCE_MARKED_TITLE: &str = "Attendance Marked";
const RECOGNITION_FAILED_TITLE: &str = "Recognition Failed";
const RECOGNITION_FAILED_HINT: &str = "Please try again or contact the administrator.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeVariant {
    Info,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub variant: NoticeVariant,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NoticeVariant::Info,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NoticeVariant::Destructive,
        }
    }

    pub fn is_destructive(&self) -> bool {
        self.variant == NoticeVariant::Destructive
    }

    /// Failure notice carrying the error's own message.
    pub fn from_error(err: &dyn Error) -> Self {
        Self::destructive(ERROR_TITLE, err.to_string())
    }

    pub fn student_added() -> Self {
        Self::info(SUCCESS_TITLE, "Student added successfully")
    }

    pub fn student_deleted() -> Self {
        Self::info(SUCCESS_TITLE, "Student deleted successfully")
    }

    pub fn activity_created() -> Self {
        Self::info(SUCCESS_TITLE, "Activity created successfully")
    }

    /// Labels the status the activity lists will show on `today`.
    pub fn activity_updated(activity: &Activity, today: NaiveDate) -> Self {
        Self::info(
            SUCCESS_TITLE,
            format!(
                "Activity updated successfully ({})",
                activity.effective_status(today).label()
            ),
        )
    }

    pub fn activity_deleted() -> Self {
        Self::info(SUCCESS_TITLE, "Activity deleted successfully")
    }

    /// Manual mark confirmation, e.g. `Emma Wilson marked as late`.
    pub fn attendance_marked(entry: &AttendanceEntry) -> Self {
        Self::info(
            ATTENDANCE_MARKED_TITLE,
            format!("{} marked as {}", entry.student_name, entry.record.status),
        )
    }

    pub fn scan_result(outcome: &ScanOutcome) -> Self {
        match outcome {
            ScanOutcome::Marked(entry) => Self::info(
                ATTENDANCE_MARKED_TITLE,
                format!("{} has been marked present.", entry.student_name),
            ),
            ScanOutcome::NotRecognized(_) => {
                Self::destructive(RECOGNITION_FAILED_TITLE, RECOGNITION_FAILED_HINT)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Notice, NoticeVariant};
    use crate::model::activity::{Activity, ActivityStatus, ActivityType};
    use crate::recognition::{NotRecognized, ScanOutcome};
    use chrono::NaiveDate;
    use std::fmt;
    use uuid::Uuid;

    #[derive(Debug)]
    struct StoreDown;

    impl fmt::Display for StoreDown {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("database is locked")
        }
    }

    impl std::error::Error for StoreDown {}

    #[test]
    fn errors_become_destructive_notices_with_message() {
        let notice = Notice::from_error(&StoreDown);
        assert_eq!(notice.title, "Error");
        assert_eq!(notice.description, "database is locked");
        assert!(notice.is_destructive());
    }

    #[test]
    fn failed_scan_uses_recognition_failed_copy() {
        let notice = Notice::scan_result(&ScanOutcome::NotRecognized(NotRecognized::NoCandidates));
        assert_eq!(notice.title, "Recognition Failed");
        assert_eq!(
            notice.description,
            "Please try again or contact the administrator."
        );
        assert_eq!(notice.variant, NoticeVariant::Destructive);
    }

    #[test]
    fn success_notices_are_informational() {
        let notice = Notice::student_added();
        assert_eq!(notice.description, "Student added successfully");
        assert!(!notice.is_destructive());
    }

    #[test]
    fn activity_update_labels_the_effective_status() {
        let activity = Activity {
            id: Uuid::new_v4(),
            title: "Mid-term Quiz".to_string(),
            kind: ActivityType::Quiz,
            description: None,
            due_date: NaiveDate::from_ymd_opt(2024, 12, 24),
            max_score: 100,
            status: ActivityStatus::Active,
            created_at: 0,
        };
        let after_due = NaiveDate::from_ymd_opt(2024, 12, 27).unwrap();
        let before_due = NaiveDate::from_ymd_opt(2024, 12, 20).unwrap();

        assert_eq!(
            Notice::activity_updated(&activity, after_due).description,
            "Activity updated successfully (Completed)"
        );
        assert_eq!(
            Notice::activity_updated(&activity, before_due).description,
            "Activity updated successfully (Active)"
        );
    }
}
