//! Drives login, upload and rename over a list of activities.

use crate::activity::Activity;
use crate::api::{ActivityId, GarminApi};
use crate::common::Credentials;
use crate::session::Session;
use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq)]
pub enum ActivityStatus {
    Uploaded(ActivityId),
    /// Already on Garmin Connect, left untouched
    Duplicate(ActivityId),
    Failed(String),
}

/// What happened to one activity
#[derive(Clone, Debug, PartialEq)]
pub struct ActivityReport {
    pub path: PathBuf,
    pub status: ActivityStatus,
    /// Set when the upload worked but renaming/retyping did not
    pub metadata_error: Option<String>,
}

impl ActivityReport {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, ActivityStatus::Failed(_)) || self.metadata_error.is_some()
    }
}

/// Progress notifications emitted by [`Workflow::run`]
#[derive(Debug)]
pub enum WorkflowEvent<'a> {
    SigningIn,
    SignedIn,
    Started(&'a Activity),
    Finished(&'a Activity, &'a ActivityReport),
}

pub struct Workflow {
    api: GarminApi,
    credentials: Credentials,
}

impl Workflow {
    pub fn new(api: GarminApi, credentials: Credentials) -> Self {
        Self { api, credentials }
    }

    pub fn api(&self) -> &GarminApi {
        &self.api
    }

    pub async fn login(&self) -> Result<Session> {
        self.api
            .authenticate(&self.credentials)
            .await
            .context("Could not log in to Garmin Connect")
    }

    /// Authenticate once, then upload every activity in order
    ///
    /// Only a login failure aborts the run; per-activity failures are
    /// reported and the next activity proceeds. `observe` sees each step as
    /// it happens.
    pub async fn run<F>(
        &self,
        activities: &mut [Activity],
        mut observe: F,
    ) -> Result<Vec<ActivityReport>>
    where
        F: FnMut(WorkflowEvent<'_>),
    {
        observe(WorkflowEvent::SigningIn);
        let session = self.login().await?;
        observe(WorkflowEvent::SignedIn);

        let mut reports = Vec::with_capacity(activities.len());
        for activity in activities.iter_mut() {
            observe(WorkflowEvent::Started(activity));
            let report = self.process(&session, activity).await;
            observe(WorkflowEvent::Finished(activity, &report));
            reports.push(report);
        }
        Ok(reports)
    }

    /// Upload one activity and apply its name/type if it is new
    pub async fn process(&self, session: &Session, activity: &mut Activity) -> ActivityReport {
        self.check_activity_type(session, activity).await;

        let outcome = match self.api.upload_activity(session, activity).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(path = %activity.path.display(), error = %e, "upload failed");
                return ActivityReport {
                    path: activity.path.clone(),
                    status: ActivityStatus::Failed(e.to_string()),
                    metadata_error: None,
                };
            }
        };

        let (id, is_new) = outcome.into_parts();
        activity.id = Some(id.clone());

        if !is_new {
            tracing::info!(path = %activity.path.display(), id = %id, "activity already exists");
            return ActivityReport {
                path: activity.path.clone(),
                status: ActivityStatus::Duplicate(id),
                metadata_error: None,
            };
        }

        tracing::info!(path = %activity.path.display(), id = %id, "uploaded activity");

        let mut metadata_error = None;
        if activity.name.is_some() || activity.activity_type.is_some() {
            if let Err(e) = self.api.set_activity_metadata(session, activity).await {
                tracing::error!(id = %id, error = %e, "could not set activity name/type");
                metadata_error = Some(e.to_string());
            }
        }

        ActivityReport {
            path: activity.path.clone(),
            status: ActivityStatus::Uploaded(id),
            metadata_error,
        }
    }

    // unknown type keys are dropped so the rename still goes through
    async fn check_activity_type(&self, session: &Session, activity: &mut Activity) {
        let Some(key) = activity.activity_type.clone() else {
            return;
        };

        match self.api.resolve_activity_type(session, &key).await {
            Ok(Some(found)) => activity.activity_type = Some(found.type_key),
            Ok(None) => {
                tracing::warn!(activity_type = %key, "unknown activity type, ignoring it");
                activity.activity_type = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot verify activity type, sending it as given");
            }
        }
    }
}

/// Count of (uploaded, duplicate, failed)
pub fn summarize(reports: &[ActivityReport]) -> (usize, usize, usize) {
    reports.iter().fold((0, 0, 0), |(up, dup, failed), r| {
        match (&r.status, r.metadata_error.is_some()) {
            (ActivityStatus::Failed(_), _) | (_, true) => (up, dup, failed + 1),
            (ActivityStatus::Uploaded(_), false) => (up + 1, dup, failed),
            (ActivityStatus::Duplicate(_), false) => (up, dup + 1, failed),
        }
    })
}
