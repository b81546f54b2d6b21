use super::types::{UploadOutcome, UploadResponse, DUPLICATE_ACTIVITY_CODE};
use super::{GarminApi, NK_HEADER};
use crate::activity::Activity;
use crate::common::ApiError;
use crate::session::Session;
use reqwest::multipart::{Form, Part};
use std::path::Path;
use tempfile::TempPath;

/// Copy of an activity file staged for upload
///
/// Removed on drop so every exit path (errors, early returns, cancelled
/// futures) cleans up. Removal problems are logged and never surface to the
/// caller.
pub(crate) struct StagedFile {
    temp: Option<TempPath>,
}

impl StagedFile {
    /// Create a uniquely named empty file in `dir`; the handle is closed right away
    pub(crate) fn claim(dir: &Path, extension: &str) -> Result<Self, ApiError> {
        let temp = tempfile::Builder::new()
            .prefix("gcupload-")
            .suffix(&format!(".{extension}"))
            .tempfile_in(dir)
            .map_err(|e| {
                ApiError::Upload(format!("could not create temp file in {}: {e}", dir.display()))
            })?
            .into_temp_path();
        Ok(Self { temp: Some(temp) })
    }

    pub(crate) fn path(&self) -> &Path {
        self.temp.as_deref().unwrap_or_else(|| Path::new(""))
    }

    fn file_name(&self) -> String {
        self.path()
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "activity".to_string())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        let Some(temp) = self.temp.take() else {
            return;
        };
        match temp.try_exists() {
            Ok(true) => {
                let path = temp.to_path_buf();
                if let Err(e) = temp.close() {
                    tracing::error!(path = %path.display(), error = %e, "Failed removing temp file");
                }
            }
            Ok(false) => {
                tracing::warn!(path = %temp.display(), "Temp file does not exist");
            }
            Err(e) => {
                tracing::error!(path = %temp.display(), error = %e, "Failed removing temp file");
            }
        }
    }
}

impl GarminApi {
    /// Upload an activity file, fit/gpx/tcx
    ///
    /// Duplicates are a normal outcome (`UploadOutcome::AlreadyExists`),
    /// not an error.
    pub async fn upload_activity(
        &self,
        session: &Session,
        activity: &Activity,
    ) -> Result<UploadOutcome, ApiError> {
        if let Some(id) = &activity.id {
            return Err(ApiError::InvalidActivity(format!(
                "{} is already uploaded as {}",
                activity.path.display(),
                id
            )));
        }

        let staged = StagedFile::claim(&self.temp_dir, &activity.extension)?;

        tokio::fs::copy(&activity.path, staged.path())
            .await
            .map_err(|e| {
                ApiError::Upload(format!(
                    "Could not copy {} to {}: {e}",
                    activity.path.display(),
                    staged.path().display()
                ))
            })?;
        if !tokio::fs::try_exists(staged.path()).await.unwrap_or(false) {
            return Err(ApiError::Upload(format!(
                "Could not copy {} to {}",
                activity.path.display(),
                staged.path().display()
            )));
        }

        let file = tokio::fs::File::open(staged.path()).await.map_err(|e| {
            ApiError::Upload(format!("could not open {}: {e}", staged.path().display()))
        })?;
        let len = file
            .metadata()
            .await
            .map_err(|e| ApiError::Upload(format!("could not stat staged file: {e}")))?
            .len();

        // file handle moves into the body and closes once the request finishes
        let part = Part::stream_with_length(reqwest::Body::from(file), len)
            .file_name(staged.file_name());
        let form = Form::new().part("data", part);

        let url = self.endpoints().upload_url(&activity.extension);
        tracing::debug!(url = %url, path = %activity.path.display(), "uploading activity");

        let res = session
            .client()
            .post(&url)
            .header(NK_HEADER.0, NK_HEADER.1)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::Upload(format!("upload request failed: {e}")))?;

        let status = res.status().as_u16();
        let body = res
            .text()
            .await
            .map_err(|e| ApiError::Upload(format!("could not read upload response: {e}")))?;

        // 409 means "look at the body", usually a duplicate
        match status {
            200 | 201 | 409 => {}
            412 => {
                tracing::error!(
                    "You may have to give explicit consent for uploading files to Garmin"
                );
                return Err(ApiError::UploadConsentRequired(format!("412 {body}")));
            }
            other => {
                return Err(ApiError::Upload(format!(
                    "Failed to upload {} {}",
                    other, body
                )))
            }
        }

        let outcome = parse_import_result(&body)?;
        tracing::debug!(status, outcome = ?outcome, "upload finished");
        Ok(outcome)
    }
}

/// Interpret the `detailedImportResult` of an upload response
pub(crate) fn parse_import_result(body: &str) -> Result<UploadOutcome, ApiError> {
    let response: UploadResponse = serde_json::from_str(body)
        .map_err(|e| ApiError::Upload(format!("unexpected upload response ({e}): {body}")))?;
    let result = response.detailed_import_result;

    if let Some(success) = result.successes.into_iter().next() {
        let id = success.internal_id.ok_or_else(|| {
            ApiError::Upload(format!("upload succeeded without an activity id: {body}"))
        })?;
        return Ok(UploadOutcome::Uploaded(id));
    }

    let Some(failure) = result.failures.into_iter().next() else {
        return Err(ApiError::Upload(format!("Unknown error: {body}")));
    };

    let duplicate = failure
        .messages
        .first()
        .is_some_and(|m| m.code == DUPLICATE_ACTIVITY_CODE);
    if !duplicate {
        return Err(ApiError::UploadRejected(failure.messages));
    }

    failure
        .internal_id
        .map(UploadOutcome::AlreadyExists)
        .ok_or_else(|| ApiError::Upload(format!("duplicate reported without an activity id: {body}")))
}
