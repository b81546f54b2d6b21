use super::types::ActivityType;
use super::{GarminApi, NK_HEADER};
use crate::common::ApiError;
use crate::session::Session;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory copy of Garmin's activity type catalogue
///
/// Owned by a `GarminApi` instance. Filled on first use, kept until
/// `invalidate` or `GarminApi::refresh_activity_types`.
#[derive(Default)]
pub struct ActivityTypeCache {
    types: RwLock<Option<Arc<Vec<ActivityType>>>>,
}

impl ActivityTypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn cached(&self) -> Option<Arc<Vec<ActivityType>>> {
        self.types.read().await.clone()
    }

    pub async fn is_loaded(&self) -> bool {
        self.types.read().await.is_some()
    }

    /// Drop the cached catalogue, next lookup refetches
    pub async fn invalidate(&self) {
        *self.types.write().await = None;
    }

    async fn store(&self, types: Vec<ActivityType>) -> Arc<Vec<ActivityType>> {
        let types = Arc::new(types);
        *self.types.write().await = Some(types.clone());
        types
    }
}

impl GarminApi {
    /// Activity types, from cache when loaded
    pub async fn activity_types(
        &self,
        session: &Session,
    ) -> Result<Arc<Vec<ActivityType>>, ApiError> {
        if let Some(types) = self.activity_types.cached().await {
            return Ok(types);
        }
        self.refresh_activity_types(session).await
    }

    /// Refetch the catalogue and replace the cached copy
    pub async fn refresh_activity_types(
        &self,
        session: &Session,
    ) -> Result<Arc<Vec<ActivityType>>, ApiError> {
        let url = &self.endpoints().activity_types;
        tracing::debug!(url = %url, "fetching activity types");

        let res = session
            .client()
            .get(url)
            .header(NK_HEADER.0, NK_HEADER.1)
            .send()
            .await
            .map_err(|e| ApiError::ActivityTypes(format!("request failed: {e}")))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ApiError::ActivityTypes(format!("{} {}", status.as_u16(), body)));
        }

        let types: Vec<ActivityType> = res
            .json()
            .await
            .map_err(|e| ApiError::ActivityTypes(format!("unexpected response: {e}")))?;
        tracing::debug!(count = types.len(), "loaded activity types");

        Ok(self.activity_types.store(types).await)
    }

    /// Look up a type key, case-insensitive
    pub async fn resolve_activity_type(
        &self,
        session: &Session,
        key: &str,
    ) -> Result<Option<ActivityType>, ApiError> {
        let types = self.activity_types(session).await?;
        Ok(find_type(&types, key).cloned())
    }
}

fn find_type<'a>(types: &'a [ActivityType], key: &str) -> Option<&'a ActivityType> {
    let key = key.trim();
    types.iter().find(|t| t.type_key.eq_ignore_ascii_case(key))
}
