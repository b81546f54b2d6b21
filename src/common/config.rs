use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const GARMIN_SSO_ROOT: &str = "https://sso.garmin.com";
pub const GARMIN_CONNECT_ROOT: &str = "https://connect.garmin.com";

/// Env var prefix, e.g. GCUPLOAD_USERNAME
pub const ENV_PREFIX: &str = "GCUPLOAD_";

/// Every URL the client talks to
/// Derived from the SSO and Connect roots so tests can point at a local server
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Endpoints {
    pub sso_signin: String,
    pub sso_origin: String,
    /// Landing page after login, sent as the `service` query parameter
    pub service: String,
    pub upload: String,
    pub activity: String,
    pub activity_types: String,
}

impl Endpoints {
    pub fn from_roots(sso_root: &str, connect_root: &str) -> Self {
        let sso = sso_root.trim_end_matches('/');
        let connect = connect_root.trim_end_matches('/');
        Self {
            sso_signin: format!("{sso}/sso/signin"),
            sso_origin: sso.to_string(),
            service: format!("{connect}/modern"),
            upload: format!("{connect}/modern/proxy/upload-service/upload"),
            activity: format!("{connect}/modern/proxy/activity-service/activity"),
            activity_types: format!(
                "{connect}/modern/proxy/activity-service/activity/activityTypes"
            ),
        }
    }

    pub fn upload_url(&self, extension: &str) -> String {
        format!("{}/{}", self.upload, extension)
    }

    pub fn activity_url(&self, id: &str) -> String {
        format!("{}/{}", self.activity, id)
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::from_roots(GARMIN_SSO_ROOT, GARMIN_CONNECT_ROOT)
    }
}

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// never print the password
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Layered settings: defaults, config file, GCUPLOAD_* env vars
/// CLI flags are applied on top by the binary
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub endpoints: Endpoints,
    /// Where upload copies are staged, system temp dir when unset
    pub temp_dir: Option<PathBuf>,
    /// No timeout when unset
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load config from `path`, or from the platform config dir when None
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path(),
        };

        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            tracing::debug!(path = %file.display(), "reading config file");
            figment = figment.merge(Toml::file(file));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment.extract().context("Failed to load configuration")
    }

    /// Both username and password must be set by some layer
    pub fn credentials(&self) -> Result<Credentials> {
        let username = self
            .username
            .clone()
            .filter(|u| !u.is_empty())
            .context("No username given (use --username, config file or GCUPLOAD_USERNAME)")?;
        let password = self
            .password
            .clone()
            .filter(|p| !p.is_empty())
            .context("No password given (use --password, config file or GCUPLOAD_PASSWORD)")?;
        Ok(Credentials::new(username, password))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "gcupload").map(|dirs| dirs.config_dir().join("config.toml"))
}
