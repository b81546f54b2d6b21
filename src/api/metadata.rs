use super::types::{ActivityTypeKey, ActivityUpdate};
use super::GarminApi;
use crate::activity::Activity;
use crate::common::ApiError;
use crate::session::Session;
use reqwest::header::CONTENT_TYPE;

impl GarminApi {
    /// Rename and/or retype an uploaded activity
    ///
    /// Falls back to the type key as display name when no name is set.
    pub async fn set_activity_metadata(
        &self,
        session: &Session,
        activity: &Activity,
    ) -> Result<(), ApiError> {
        let Some(id) = &activity.id else {
            return Err(ApiError::InvalidActivity(format!(
                "{} has not been uploaded yet",
                activity.path.display()
            )));
        };

        tracing::info!(
            id = %id,
            name = ?activity.name,
            activity_type = ?activity.activity_type,
            "setting activity name and type"
        );

        let body = ActivityUpdate {
            activity_id: id,
            activity_name: activity
                .name
                .as_deref()
                .or(activity.activity_type.as_deref()),
            activity_type_dto: activity
                .activity_type
                .as_deref()
                .map(|type_key| ActivityTypeKey { type_key }),
        };
        let payload = serde_json::to_vec(&body)
            .map_err(|e| ApiError::Update(format!("could not encode request: {e}")))?;

        let url = self.endpoints().activity_url(&id.to_string());
        let res = session
            .client()
            .put(&url)
            .header(CONTENT_TYPE, "application/json; charset=UTF-8")
            .body(payload)
            .send()
            .await
            .map_err(|e| ApiError::Update(format!("request to {url} failed: {e}")))?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(ApiError::Update(format!("{status} {body}")));
        }

        Ok(())
    }
}
