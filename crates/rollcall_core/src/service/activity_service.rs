//! Activity use-case service.
//!
//! # Invariants
//! - Filtering and summaries use `Activity::effective_status` with the
//!   service clock's date.
//! - Successful mutations invalidate the `activities` family.

use crate::cache::{QueryCache, QueryFamily, QueryKey};
use crate::clock::Clock;
use crate::model::activity::{
    Activity, ActivityId, ActivityPatch, ActivityStatus, ActivityType, NewActivity,
};
use crate::model::validation::ValidationError;
use crate::repo::activity_repo::ActivityRepository;
use crate::repo::RepoError;
use chrono::NaiveDate;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

#[derive(Debug)]
pub enum ActivityServiceError {
    Validation(ValidationError),
    ActivityNotFound(ActivityId),
    Repo(RepoError),
}

impl Display for ActivityServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ActivityNotFound(id) => write!(f, "activity not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ActivityServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::ActivityNotFound(_) => None,
        }
    }
}

impl From<ValidationError> for ActivityServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ActivityServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound { id, .. } => Self::ActivityNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// List filter; empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityFilter {
    pub kind: Option<ActivityType>,
    /// Case-insensitive substring of the title.
    pub search: Option<String>,
    /// Compared against the effective status.
    pub status: Option<ActivityStatus>,
}

impl ActivityFilter {
    pub fn matches(&self, activity: &Activity, today: NaiveDate) -> bool {
        if self.kind.is_some_and(|kind| kind != activity.kind) {
            return false;
        }
        if self
            .status
            .is_some_and(|status| status != activity.effective_status(today))
        {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => activity
                .title
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => true,
        }
    }

    pub fn is_active(&self) -> bool {
        self.kind.is_some()
            || self.status.is_some()
            || self
                .search
                .as_deref()
                .is_some_and(|search| !search.trim().is_empty())
    }
}

/// Activity counts by effective status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub total: u32,
    pub active: u32,
    pub completed: u32,
    pub cancelled: u32,
}

pub struct ActivityService<R: ActivityRepository, C: Clock> {
    repo: R,
    clock: C,
    cache: Arc<QueryCache>,
}

impl<R: ActivityRepository, C: Clock> ActivityService<R, C> {
    pub fn new(repo: R, clock: C, cache: Arc<QueryCache>) -> Self {
        Self { repo, clock, cache }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// All activities, newest first.
    pub fn list_activities(&self) -> Result<Vec<Activity>, ActivityServiceError> {
        self.cache
            .get_or_fetch(QueryKey::Activities, || self.repo.list_activities())
            .map_err(ActivityServiceError::from)
    }

    pub fn filter_activities(
        &self,
        filter: &ActivityFilter,
    ) -> Result<Vec<Activity>, ActivityServiceError> {
        let today = self.today();
        Ok(self
            .list_activities()?
            .into_iter()
            .filter(|activity| filter.matches(activity, today))
            .collect())
    }

    pub fn summary(&self) -> Result<ActivitySummary, ActivityServiceError> {
        let today = self.today();
        let mut summary = ActivitySummary::default();
        for activity in self.list_activities()? {
            summary.total += 1;
            match activity.effective_status(today) {
                ActivityStatus::Active => summary.active += 1,
                ActivityStatus::Completed => summary.completed += 1,
                ActivityStatus::Cancelled => summary.cancelled += 1,
            }
        }
        Ok(summary)
    }

    pub fn get_activity(&self, id: ActivityId) -> Result<Activity, ActivityServiceError> {
        self.repo
            .get_activity(id)?
            .ok_or(ActivityServiceError::ActivityNotFound(id))
    }

    pub fn create_activity(&self, input: &NewActivity) -> Result<Activity, ActivityServiceError> {
        input.validate()?;
        let activity = self.repo.create_activity(input).map_err(|err| {
            warn!("event=activity_create module=service status=error error={err}");
            ActivityServiceError::from(err)
        })?;

        self.cache.invalidate(QueryFamily::Activities);
        info!(
            "event=activity_create module=service status=ok activity_id={} type={}",
            activity.id, activity.kind
        );
        Ok(activity)
    }

    /// Applies `patch` to the stored activity and returns the result.
    ///
    /// An empty patch returns the current activity without writing.
    pub fn update_activity(
        &self,
        id: ActivityId,
        patch: &ActivityPatch,
    ) -> Result<Activity, ActivityServiceError> {
        let current = self.get_activity(id)?;
        if patch.is_empty() {
            return Ok(current);
        }

        let next = patch.apply_to(&current);
        next.validate()?;
        if patch.status == Some(ActivityStatus::Active) && next.is_past_due(self.today()) {
            warn!("event=activity_update module=service status=rejected activity_id={id} reason=past_due");
            return Err(ValidationError::new(
                "status",
                "activity is past due; move the due date before reactivating it",
            )
            .into());
        }
        self.repo.update_activity(&next).map_err(|err| {
            warn!("event=activity_update module=service status=error activity_id={id} error={err}");
            ActivityServiceError::from(err)
        })?;

        self.cache.invalidate(QueryFamily::Activities);
        info!(
            "event=activity_update module=service status=ok activity_id={} stored_status={}",
            id, next.status
        );
        Ok(next)
    }

    /// Sets the stored status; `Active` is rejected once the due date has
    /// passed because it would still read as completed.
    pub fn set_status(
        &self,
        id: ActivityId,
        status: ActivityStatus,
    ) -> Result<Activity, ActivityServiceError> {
        self.update_activity(id, &ActivityPatch::status(status))
    }

    pub fn delete_activity(&self, id: ActivityId) -> Result<(), ActivityServiceError> {
        self.repo.delete_activity(id).map_err(|err| {
            warn!("event=activity_delete module=service status=error activity_id={id} error={err}");
            ActivityServiceError::from(err)
        })?;

        self.cache.invalidate(QueryFamily::Activities);
        info!("event=activity_delete module=service status=ok activity_id={id}");
        Ok(())
    }
}
