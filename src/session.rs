use crate::common::ApiError;
use reqwest::Client;
use std::time::Duration;

/// Authenticated Garmin Connect session
///
/// Wraps an HTTP client whose cookie jar holds the SSO session cookies.
/// Only `GarminApi::authenticate` hands out sessions; pass it back into
/// the upload and activity calls.
#[derive(Clone, Debug)]
pub struct Session {
    client: Client,
}

impl Session {
    // fresh client with an empty cookie jar
    pub(crate) fn new_client(timeout: Option<Duration>) -> Result<Client, ApiError> {
        let mut builder = Client::builder().cookie_store(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        builder
            .build()
            .map_err(|e| ApiError::Authentication(format!("could not create HTTP client: {e}")))
    }

    pub(crate) fn from_client(client: Client) -> Self {
        Self { client }
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }
}
