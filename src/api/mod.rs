//! Request pipeline for the console API. Every outbound call goes through
//! [`Client::execute`]: the bearer credential is attached when present, and a
//! 401 triggers at most one automatic refresh-and-retry per original request.
//! Authorization failure is surfaced as a value ([`ApiError::SessionExpired`]);
//! the pipeline never navigates anywhere itself.

pub mod error;
pub mod types;

use crate::session::Session;
use anyhow::{anyhow, Result};
use error::ApiError;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info_span, Instrument};
use types::{Envelope, ForwardingRule, ListPage, Node, Order, Profile, TrafficPackage};
use url::Url;

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum number of error body characters surfaced to the caller.
const MAX_ERROR_CHARS: usize = 200;

/// HTTP client bound to the console API base URL and a shared session.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    session: Arc<Session>,
}

/// # Errors
/// Returns an error if `base_url` cannot be parsed, has no host, or uses an
/// unsupported scheme.
pub fn normalize_base_url(base_url: &str) -> Result<String> {
    let url = Url::parse(base_url)?;

    let scheme = url.scheme();

    let host = url
        .host()
        .ok_or_else(|| anyhow!("Error parsing URL: no host specified"))?
        .to_owned();

    let port = match url.port() {
        Some(p) => p,
        None => match scheme {
            "http" => 80,
            "https" => 443,
            _ => return Err(anyhow!("Error parsing URL: unsupported scheme {scheme}")),
        },
    };

    let path = url.path().trim_end_matches('/');

    Ok(format!("{scheme}://{host}:{port}{path}"))
}

impl Client {
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be built.
    pub fn new(base_url: &str, session: Arc<Session>) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let http = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Sends one request through the pipeline.
    ///
    /// A 401 on a request that carried a token consumes the single retry
    /// attempt: the refresh must fully resolve before the retry is
    /// dispatched, and a second 401 is surfaced rather than retried. A 401
    /// on a bare request (no token attached, e.g. a rejected login) is a
    /// plain domain failure.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Envelope, ApiError> {
        let url = self.endpoint(path);
        let mut attempts_remaining: u8 = 1;

        loop {
            let token = self.session.token();
            let had_token = token.is_some();

            let mut request = self.http.request(method.clone(), &url);
            if let Some(token) = &token {
                request = request.bearer_auth(token.expose_secret());
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            let span = info_span!(
                "api.request",
                http.method = %method,
                url = %url
            );
            let response = request
                .send()
                .instrument(span)
                .await
                .map_err(|err| ApiError::transport(&err))?;

            let status = response.status();

            if status == StatusCode::UNAUTHORIZED && had_token && attempts_remaining > 0 {
                attempts_remaining -= 1;
                if self.refresh_session_token().await {
                    debug!("Retrying {method} {path} with refreshed token");
                    continue;
                }
                return Err(ApiError::SessionExpired);
            }

            if !status.is_success() {
                let body_text = response.text().await.unwrap_or_default();
                let (code, message) = match serde_json::from_str::<Envelope>(&body_text) {
                    Ok(envelope) => (
                        envelope.code,
                        envelope
                            .message
                            .unwrap_or_else(|| sanitize_body(&body_text)),
                    ),
                    Err(_) => (i64::from(status.as_u16()), sanitize_body(&body_text)),
                };
                return Err(ApiError::Api {
                    status: status.as_u16(),
                    code,
                    message,
                });
            }

            let envelope: Envelope = response
                .json()
                .await
                .map_err(|err| ApiError::transport(&err))?;

            if envelope.code != 0 {
                return Err(ApiError::Api {
                    status: status.as_u16(),
                    code: envelope.code,
                    message: envelope
                        .message
                        .unwrap_or_else(|| "request failed".to_string()),
                });
            }

            return Ok(envelope);
        }
    }

    /// Single bare refresh attempt, shared by the pipeline and the
    /// `refresh_token` operation. Bypasses the retry machinery so a failing
    /// refresh can never recurse, and clears the session on any failure,
    /// transport errors included.
    pub(crate) async fn refresh_session_token(&self) -> bool {
        let Some(token) = self.session.token() else {
            return false;
        };

        let url = self.endpoint("/auth/refresh");
        let payload = json!({ "token": token.expose_secret() });

        let span = info_span!("api.refresh", url = %url);
        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .instrument(span)
            .await;

        let refreshed = match response {
            Ok(response) if response.status().is_success() => {
                match response.json::<Envelope>().await {
                    Ok(envelope) if envelope.code == 0 => envelope.token,
                    Ok(_) | Err(_) => None,
                }
            }
            Ok(_) | Err(_) => None,
        };

        match refreshed {
            Some(token) => self.session.replace_token(SecretString::from(token)),
            None => {
                debug!("Token refresh failed, clearing session");
                self.session.logout();
                false
            }
        }
    }

    /// Exchanges credentials for an access token.
    ///
    /// # Errors
    /// Returns `ApiError::Api` when the server rejects the credentials or the
    /// response carries no token.
    pub async fn auth_login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<SecretString, ApiError> {
        let payload = json!({
            "username": username,
            "password": password.expose_secret()
        });
        let envelope = self
            .execute(Method::POST, "/auth/login", Some(&payload))
            .await?;

        match envelope.token {
            Some(token) => Ok(SecretString::from(token)),
            None => Err(ApiError::Api {
                status: 200,
                code: envelope.code,
                message: "login response carried no token".to_string(),
            }),
        }
    }

    /// # Errors
    /// Returns `ApiError::Api` when the server refuses the registration.
    pub async fn auth_register(
        &self,
        username: &str,
        password: &SecretString,
        invite_code: &str,
    ) -> Result<(), ApiError> {
        let payload = json!({
            "username": username,
            "password": password.expose_secret(),
            "invite_code": invite_code
        });
        self.execute(Method::POST, "/auth/register", Some(&payload))
            .await?;
        Ok(())
    }

    /// # Errors
    /// Returns `ApiError` when the request fails or the payload cannot be
    /// decoded.
    pub async fn user_profile(&self) -> Result<Profile, ApiError> {
        let envelope = self.execute(Method::GET, "/user/profile", None).await?;
        serde_json::from_value(envelope.data)
            .map_err(|err| ApiError::Transport(format!("failed to decode profile: {err}")))
    }

    async fn list<T: DeserializeOwned>(&self, path: &str) -> Result<ListPage<T>, ApiError> {
        let envelope = self.execute(Method::GET, path, None).await?;
        ListPage::from_value(envelope.data)
            .map_err(|err| ApiError::Transport(format!("failed to decode list: {err}")))
    }

    /// # Errors
    /// Returns `ApiError` when the request fails.
    pub async fn nodes(&self) -> Result<ListPage<Node>, ApiError> {
        self.list("/nodes").await
    }

    /// # Errors
    /// Returns `ApiError` when the request fails.
    pub async fn rules(&self) -> Result<ListPage<ForwardingRule>, ApiError> {
        self.list("/rules").await
    }

    /// # Errors
    /// Returns `ApiError` when the request fails.
    pub async fn packages(&self) -> Result<ListPage<TrafficPackage>, ApiError> {
        self.list("/packages").await
    }

    /// # Errors
    /// Returns `ApiError` when the request fails.
    pub async fn orders(&self) -> Result<ListPage<Order>, ApiError> {
        self.list("/orders").await
    }

    /// # Errors
    /// Returns `ApiError` when the request fails.
    pub async fn admin_users(&self) -> Result<ListPage<Profile>, ApiError> {
        self.list("/admin/users").await
    }

    /// # Errors
    /// Returns `ApiError` when the request fails.
    pub async fn admin_orders(&self) -> Result<ListPage<Order>, ApiError> {
        self.list("/admin/orders").await
    }
}

/// Trims and truncates HTTP error bodies before surfacing them.
fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "request failed".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
