//! Curriculum activity model.
//!
//! # Invariants
//! - `max_score` stays within `1..=1000`.
//! - Display, filtering and counting all go through
//!   [`Activity::effective_status`]; no caller derives status on its own.

use crate::model::validation::{
    check_char_range, normalize_optional, UnknownVariant, ValidationError,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

pub type ActivityId = Uuid;

pub const DEFAULT_MAX_SCORE: u32 = 100;
pub const MAX_SCORE_LIMIT: u32 = 1000;
const DESCRIPTION_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Assignment,
    Quiz,
    Lab,
    Seminar,
    Project,
}

impl ActivityType {
    pub const ALL: [Self; 5] = [
        Self::Assignment,
        Self::Quiz,
        Self::Lab,
        Self::Seminar,
        Self::Project,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Assignment => "assignment",
            Self::Quiz => "quiz",
            Self::Lab => "lab",
            Self::Seminar => "seminar",
            Self::Project => "project",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Assignment => "Assignment",
            Self::Quiz => "Quiz",
            Self::Lab => "Lab",
            Self::Seminar => "Seminar",
            Self::Project => "Project",
        }
    }
}

impl Display for ActivityType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "assignment" => Ok(Self::Assignment),
            "quiz" => Ok(Self::Quiz),
            "lab" => Ok(Self::Lab),
            "seminar" => Ok(Self::Seminar),
            "project" => Ok(Self::Project),
            _ => Err(UnknownVariant {
                kind: "activity type",
                value: value.to_string(),
                expected: "assignment|quiz|lab|seminar|project",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Active,
    Completed,
    Cancelled,
}

impl ActivityStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl Display for ActivityStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityStatus {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(UnknownVariant {
                kind: "activity status",
                value: value.to_string(),
                expected: "active|completed|cancelled",
            }),
        }
    }
}

/// Stored curriculum activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ActivityType,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub max_score: u32,
    /// Status as last written; see [`Activity::effective_status`].
    pub status: ActivityStatus,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Activity {
    /// Whether the due date lies strictly before `today`.
    pub fn is_past_due(&self, today: NaiveDate) -> bool {
        self.due_date.is_some_and(|due| due < today)
    }

    /// The single status every view and filter reports.
    ///
    /// An `active` activity whose due date has passed is reported as
    /// `completed`. Explicit `completed` and `cancelled` are kept as stored.
    pub fn effective_status(&self, today: NaiveDate) -> ActivityStatus {
        match self.status {
            ActivityStatus::Active if self.is_past_due(today) => ActivityStatus::Completed,
            other => other,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.title, self.description.as_deref(), self.max_score)
    }
}

/// Input for creating one activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewActivity {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ActivityType,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub max_score: u32,
    /// Defaults to `active` when omitted.
    pub status: Option<ActivityStatus>,
}

impl NewActivity {
    pub fn new(title: impl Into<String>, kind: ActivityType) -> Self {
        Self {
            title: title.into(),
            kind,
            description: None,
            due_date: None,
            max_score: DEFAULT_MAX_SCORE,
            status: None,
        }
    }

    pub fn normalized(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: normalize_optional(self.description.as_deref()),
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let input = self.normalized();
        validate_fields(&input.title, input.description.as_deref(), input.max_score)
    }

    pub fn initial_status(&self) -> ActivityStatus {
        self.status.unwrap_or(ActivityStatus::Active)
    }
}

/// Partial update; `None` leaves a field untouched.
///
/// Nullable fields use a nested option so they can be cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityPatch {
    pub title: Option<String>,
    pub kind: Option<ActivityType>,
    pub description: Option<Option<String>>,
    pub due_date: Option<Option<NaiveDate>>,
    pub max_score: Option<u32>,
    pub status: Option<ActivityStatus>,
}

impl ActivityPatch {
    pub fn status(status: ActivityStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns `current` with this patch applied and text fields normalized.
    pub fn apply_to(&self, current: &Activity) -> Activity {
        let mut next = current.clone();
        if let Some(title) = &self.title {
            next.title = title.trim().to_string();
        }
        if let Some(kind) = self.kind {
            next.kind = kind;
        }
        if let Some(description) = &self.description {
            next.description = normalize_optional(description.as_deref());
        }
        if let Some(due_date) = self.due_date {
            next.due_date = due_date;
        }
        if let Some(max_score) = self.max_score {
            next.max_score = max_score;
        }
        if let Some(status) = self.status {
            next.status = status;
        }
        next
    }
}

fn validate_fields(
    title: &str,
    description: Option<&str>,
    max_score: u32,
) -> Result<(), ValidationError> {
    check_char_range("title", title, 2, 100, "Title is required")?;
    if let Some(description) = description {
        if description.chars().count() > DESCRIPTION_MAX_CHARS {
            return Err(ValidationError::new(
                "description",
                format!("must be at most {DESCRIPTION_MAX_CHARS} characters"),
            ));
        }
    }
    if !(1..=MAX_SCORE_LIMIT).contains(&max_score) {
        return Err(ValidationError::new(
            "max_score",
            format!("must be between 1 and {MAX_SCORE_LIMIT}"),
        ));
    }
    Ok(())
}
