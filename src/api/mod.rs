//! Garmin Connect client: SSO login, upload, activity metadata.

pub mod activity_types;
pub mod auth;
pub mod metadata;
pub mod types;
pub mod upload;

pub use activity_types::ActivityTypeCache;
pub use auth::extract_ticket_url;
pub use types::{ActivityId, ActivityType, ImportMessage, UploadOutcome};

use crate::common::{Config, Endpoints};
use std::path::PathBuf;
use std::time::Duration;

/// Header Garmin needs to accept requests from non-browser clients
pub(crate) const NK_HEADER: (&str, &str) = ("nk", "NT");

/// Low level Garmin Connect connector
///
/// Holds endpoint configuration and the activity type cache. Sessions are
/// created by `authenticate` and passed back into every other call.
pub struct GarminApi {
    endpoints: Endpoints,
    temp_dir: PathBuf,
    timeout: Option<Duration>,
    activity_types: ActivityTypeCache,
}

impl GarminApi {
    pub fn new(endpoints: Endpoints) -> Self {
        Self {
            endpoints,
            temp_dir: std::env::temp_dir(),
            timeout: None,
            activity_types: ActivityTypeCache::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut api = Self::new(config.endpoints.clone());
        if let Some(dir) = &config.temp_dir {
            api.temp_dir = dir.clone();
        }
        api.timeout = config.timeout();
        api
    }

    /// Stage upload copies in `dir` instead of the system temp dir
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn activity_type_cache(&self) -> &ActivityTypeCache {
        &self.activity_types
    }
}

impl Default for GarminApi {
    fn default() -> Self {
        Self::new(Endpoints::default())
    }
}
