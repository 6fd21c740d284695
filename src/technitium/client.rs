use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use tracing::{debug, info};

use crate::technitium::error::ClientError;
use crate::technitium::params::Params;
use crate::technitium::types::{Envelope, STATUS_INVALID_TOKEN, STATUS_OK};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

lazy_static::lazy_static! {
    /// Credentials that must never reach the logs.
    static ref SECRET_PARAM_RE: regex::Regex =
        regex::Regex::new(r"(?i)([?&](?:token|pass|password|proxyPassword))=[^&]+").unwrap();
}

/// Authenticated handle on a Technitium DNS Server.
///
/// The fields are written once at construction and never mutated afterwards,
/// so a clone can be handed to every adapter and used concurrently.
#[derive(Clone)]
pub struct TechnitiumClient {
    http: Client,
    base_url: String, // e.g. "http://127.0.0.1:5380"
    token: String,
}

impl std::fmt::Debug for TechnitiumClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TechnitiumClient")
            .field("base_url", &self.base_url)
            .field("token", &"<hidden>")
            .finish()
    }
}

impl TechnitiumClient {
    /// Build a client without contacting the server.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, ClientError> {
        Ok(Self {
            http: http_client()?,
            base_url: normalize_base_url(base_url.into()),
            token: token.into(),
        })
    }

    /// Build a client and check the token against `/api/user/session/get`.
    pub async fn connect(
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let client = Self::new(base_url, token)?;
        client.get_session_info().await?;
        Ok(client)
    }

    /// Exchange credentials for a session token.
    pub async fn login(
        base_url: impl Into<String>,
        username: &str,
        password: &str,
    ) -> Result<String, ClientError> {
        if username.is_empty() || password.is_empty() {
            return Err(ClientError::authentication(
                "username and password must be provided",
            ));
        }

        #[derive(Deserialize)]
        struct LoginResponse {
            status: String,
            #[serde(rename = "errorMessage", default)]
            error_message: Option<String>,
            #[serde(default)]
            token: Option<String>,
        }

        let base_url = normalize_base_url(base_url.into());
        let path = "/api/user/login";
        let http = http_client()?;
        let request = http
            .get(format!("{base_url}{path}"))
            .query(&[("user", username), ("pass", password), ("includeInfo", "false")])
            .build()?;
        info!("{}", redact(request.url().as_str()));

        let body = read_ok_body(http.execute(request).await?).await?;
        let login: LoginResponse = serde_json::from_str(&body).map_err(|source| {
            ClientError::Decode {
                path: path.to_string(),
                source,
            }
        })?;

        if login.status != STATUS_OK {
            return Err(ClientError::authentication(
                login
                    .error_message
                    .unwrap_or_else(|| format!("login returned status {}", login.status)),
            ));
        }
        login
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ClientError::authentication("token not found in response"))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Verify that the configured token is accepted.
    pub async fn get_session_info(&self) -> Result<(), ClientError> {
        self.call::<IgnoredAny>("/api/user/session/get", &Params::new())
            .await?;
        Ok(())
    }

    /// Perform a GET against `path` with `params` plus the session token and
    /// return the raw body of a `200 OK` response.
    pub async fn execute(&self, path: &str, params: &Params) -> Result<String, ClientError> {
        if self.token.is_empty() {
            return Err(ClientError::authentication("missing API token"));
        }
        let request = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(params.as_slice())
            .query(&[("token", self.token.as_str())])
            .build()?;
        info!("{}", redact(request.url().as_str()));

        let response = self.http.execute(request).await?;
        read_ok_body(response).await
    }

    /// `execute` and unwrap the envelope; `Ok(None)` when the call succeeded
    /// without a payload.
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &Params,
    ) -> Result<Option<T>, ClientError> {
        let body = self.execute(path, params).await?;
        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|source| ClientError::Decode {
                path: path.to_string(),
                source,
            })?;
        open_envelope(envelope)
    }

    /// Like `call`, but a missing payload is an error.
    pub(crate) async fn call_for<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &Params,
    ) -> Result<T, ClientError> {
        self.call(path, params)
            .await?
            .ok_or_else(|| ClientError::MissingResponse {
                path: path.to_string(),
            })
    }
}

fn http_client() -> Result<Client, ClientError> {
    Ok(Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}

fn normalize_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

async fn read_ok_body(response: reqwest::Response) -> Result<String, ClientError> {
    let status = response.status();
    let body = response.text().await?;
    if status != StatusCode::OK {
        debug!("non-200 response: {status}");
        return Err(ClientError::HttpStatus {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

fn open_envelope<T>(envelope: Envelope<T>) -> Result<Option<T>, ClientError> {
    match envelope.status.as_str() {
        STATUS_OK => Ok(envelope.response),
        STATUS_INVALID_TOKEN => Err(ClientError::authentication(
            envelope
                .error_message
                .unwrap_or_else(|| "invalid token or session expired".into()),
        )),
        _ => Err(ClientError::Api {
            message: envelope
                .error_message
                .unwrap_or_else(|| format!("request failed with status {}", envelope.status)),
            status: envelope.status,
        }),
    }
}

/// Hide the session token and password in a request URL.
pub fn redact(url: &str) -> String {
    SECRET_PARAM_RE.replace_all(url, "$1=hidden").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_hides_token_and_password() {
        let url = "http://dns:5380/api/user/login?user=admin&pass=s3cret&token=abc123&x=1";
        assert_eq!(
            redact(url),
            "http://dns:5380/api/user/login?user=admin&pass=hidden&token=hidden&x=1"
        );

        let url = "http://dns:5380/api/zones/records/add?type=FWD&proxyPassword=s3cret&token=abc";
        assert_eq!(
            redact(url),
            "http://dns:5380/api/zones/records/add?type=FWD&proxyPassword=hidden&token=hidden"
        );
        assert_eq!(redact("http://dns/api?Token=abc"), "http://dns/api?Token=hidden");
        assert_eq!(redact("http://dns/api?passive=true"), "http://dns/api?passive=true");
    }

    #[test]
    fn redact_leaves_urls_without_secrets_alone() {
        let url = "http://dns:5380/api/zones/list";
        assert_eq!(redact(url), url);
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        assert_eq!(
            normalize_base_url("http://dns:5380/".to_string()),
            "http://dns:5380"
        );
    }

    #[test]
    fn envelope_error_status_becomes_api_error() {
        let envelope: Envelope<IgnoredAny> =
            serde_json::from_str(r#"{"status":"error","errorMessage":"Scope not found"}"#).unwrap();
        let err = open_envelope(envelope).unwrap_err();
        assert_eq!(err.api_message(), Some("Scope not found"));
    }

    #[test]
    fn envelope_invalid_token_becomes_authentication_error() {
        let envelope: Envelope<IgnoredAny> = serde_json::from_str(
            r#"{"status":"invalid-token","errorMessage":"Invalid token or session expired."}"#,
        )
        .unwrap();
        assert!(matches!(
            open_envelope(envelope),
            Err(ClientError::Authentication(_))
        ));
    }

    #[test]
    fn debug_output_never_shows_token() {
        let client = TechnitiumClient::new("http://dns:5380", "very-secret").unwrap();
        assert!(!format!("{client:?}").contains("very-secret"));
    }
}
