use super::GarminApi;
use crate::common::{ApiError, Credentials};
use crate::session::Session;
use regex::Regex;
use reqwest::StatusCode;
use std::sync::OnceLock;

fn ticket_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"response_url\s*=\s*"(https?:(?:\\.|[^"\\])+)""#)
            .expect("ticket pattern is valid")
    })
}

/// Pull the auth ticket URL out of the sign-in response page
///
/// The page embeds it as a JS string, `response_url = "https:\/\/...?ticket=ST-...-cas"`.
/// Escaped quotes are dropped (they can't be part of a URL), then every other
/// backslash. Returns None when the page has no ticket, which almost always
/// means the credentials were rejected.
pub fn extract_ticket_url(page: &str) -> Option<String> {
    ticket_pattern()
        .captures(page)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().replace("\\\"", "").replace('\\', ""))
}

impl GarminApi {
    /// Log in through the SSO form and claim the auth ticket
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        tracing::info!(username = %credentials.username, "authenticating user");

        let client = Session::new_client(self.timeout)?;
        let endpoints = self.endpoints();

        let form = [
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
            ("embed", "false"),
        ];

        let auth_response = client
            .post(&endpoints.sso_signin)
            .query(&[("service", endpoints.service.as_str())])
            .header("origin", &endpoints.sso_origin)
            .form(&form)
            .send()
            .await
            .map_err(|e| ApiError::Authentication(format!("sign-in request failed: {e}")))?;

        let status = auth_response.status();
        let body = auth_response
            .text()
            .await
            .map_err(|e| ApiError::Authentication(format!("could not read sign-in page: {e}")))?;
        tracing::debug!(status = status.as_u16(), body = %body, "got auth response");

        if status != StatusCode::OK {
            return Err(ApiError::Authentication(format!(
                "sign-in returned {}: did you enter valid credentials?",
                status.as_u16()
            )));
        }

        let ticket_url = extract_ticket_url(&body).ok_or_else(|| {
            ApiError::Authentication(
                "unable to extract auth ticket URL. did you provide a correct username/password?"
                    .to_string(),
            )
        })?;
        tracing::debug!(url = %ticket_url, "auth ticket url");

        tracing::info!("claiming auth ticket");
        let response = client.get(&ticket_url).send().await.map_err(|e| {
            ApiError::Authentication(format!("failed to claim auth ticket {ticket_url}: {e}"))
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Authentication(format!(
                "failed to claim auth ticket: {}: {}\n{}",
                ticket_url,
                status.as_u16(),
                body
            )));
        }

        Ok(Session::from_client(client))
    }
}
