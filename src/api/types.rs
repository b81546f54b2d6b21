//! Wire types for the upload, activity and activity-type endpoints.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier Garmin Connect assigns to an uploaded activity
///
/// The service sends it as a JSON number; older responses and fixtures use
/// strings. Whichever form arrived is the form written back.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActivityId {
    Number(i64),
    Text(String),
}

impl ActivityId {
    pub fn new(id: impl Into<String>) -> Self {
        ActivityId::Text(id.into())
    }
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityId::Number(n) => write!(f, "{n}"),
            ActivityId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ActivityId {
    fn from(id: i64) -> Self {
        ActivityId::Number(id)
    }
}

impl From<&str> for ActivityId {
    fn from(id: &str) -> Self {
        ActivityId::Text(id.to_string())
    }
}

/// Result of a successful upload request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UploadOutcome {
    /// New activity created
    Uploaded(ActivityId),
    /// Garmin already has this activity (message code 202)
    AlreadyExists(ActivityId),
}

impl UploadOutcome {
    pub fn id(&self) -> &ActivityId {
        match self {
            UploadOutcome::Uploaded(id) | UploadOutcome::AlreadyExists(id) => id,
        }
    }

    pub fn is_new_upload(&self) -> bool {
        matches!(self, UploadOutcome::Uploaded(_))
    }

    /// `(id, is_new_upload)` pair
    pub fn into_parts(self) -> (ActivityId, bool) {
        let is_new = self.is_new_upload();
        match self {
            UploadOutcome::Uploaded(id) | UploadOutcome::AlreadyExists(id) => (id, is_new),
        }
    }
}

/// Import message code meaning "duplicate activity"
pub const DUPLICATE_ACTIVITY_CODE: i64 = 202;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImportMessage {
    pub code: i64,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadResponse {
    pub detailed_import_result: DetailedImportResult,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DetailedImportResult {
    #[serde(default)]
    pub successes: Vec<ImportEntry>,
    #[serde(default)]
    pub failures: Vec<ImportEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ImportEntry {
    #[serde(default)]
    pub internal_id: Option<ActivityId>,
    #[serde(default)]
    pub messages: Vec<ImportMessage>,
}

/// PUT body for renaming/retyping an activity
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ActivityUpdate<'a> {
    pub activity_id: &'a ActivityId,
    pub activity_name: Option<&'a str>,
    #[serde(rename = "activityTypeDTO", skip_serializing_if = "Option::is_none")]
    pub activity_type_dto: Option<ActivityTypeKey<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ActivityTypeKey<'a> {
    pub type_key: &'a str,
}

/// One entry of the activity type catalogue
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityType {
    pub type_id: u64,
    pub type_key: String,
    #[serde(default)]
    pub parent_type_id: Option<u64>,
}
