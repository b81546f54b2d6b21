use crate::api::types::ImportMessage;
use thiserror::Error;

/// Structured error types for every Garmin Connect call
#[derive(Error, Debug)]
pub enum ApiError {
    /// Bad credentials, unexpected login page, or ticket claim failure
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    /// HTTP 412: the account has not consented to uploads from third-party tools
    #[error("Upload refused, explicit upload consent may be missing on the account: {0}")]
    UploadConsentRequired(String),

    /// Service-side import failure other than "already exists"
    #[error("Upload rejected by Garmin Connect: {}", format_messages(.0))]
    UploadRejected(Vec<ImportMessage>),

    #[error("Activity name or type not set: {0}")]
    Update(String),

    #[error("Could not load activity types: {0}")]
    ActivityTypes(String),

    /// Caller passed an activity in the wrong state or of an unsupported format
    #[error("Invalid activity: {0}")]
    InvalidActivity(String),
}

impl ApiError {
    /// True for every failure raised while uploading a file
    pub fn is_upload_error(&self) -> bool {
        matches!(
            self,
            ApiError::Upload(_) | ApiError::UploadConsentRequired(_) | ApiError::UploadRejected(_)
        )
    }
}

fn format_messages(messages: &[ImportMessage]) -> String {
    if messages.is_empty() {
        return "no details given".to_string();
    }
    messages
        .iter()
        .map(|m| format!("[{}] {}", m.code, m.content.as_deref().unwrap_or("")))
        .collect::<Vec<_>>()
        .join("; ")
}
