//! HTTP API client with session handling

use std::fmt;

use serde_json::{json, Value};
use tracing::debug;

use mgrts_common::error::{Error, Result};

/// Opaque session credential returned by `auth.login`.
///
/// Lives from login to logout, is attached to every call in between and is
/// never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Client for the server's HTTP API.
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    token: Option<SessionToken>,
}

impl ApiClient {
    /// The lab server uses a self-signed certificate, so verification is off.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            http,
            token: None,
        })
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    /// Authenticate and keep the returned session token for later calls.
    pub async fn login(&mut self, user: &str, password: &str) -> Result<()> {
        let result = self
            .dispatch(
                "auth.login",
                json!({ "login": user, "password": password }),
                None,
            )
            .await?;
        let token = result
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| Error::ApiCallFailed {
                call: "auth.login".to_string(),
                fault_code: -1,
                fault_message: "login returned no session token".to_string(),
            })?;
        self.token = Some(SessionToken(token));
        Ok(())
    }

    /// Invalidate the session token. Further calls require a new login.
    pub async fn logout(&mut self) -> Result<()> {
        if let Some(token) = self.token.take() {
            self.dispatch("auth.logout", json!({}), Some(&token)).await?;
        }
        Ok(())
    }

    /// Perform a namespaced call (`"users.listUsers"`) with a parameter bag,
    /// returning the decoded result.
    pub async fn call(&self, name: &str, params: Value) -> Result<Value> {
        self.dispatch(name, params, self.token.as_ref()).await
    }

    async fn dispatch(&self, name: &str, params: Value, token: Option<&SessionToken>) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, name.replace('.', "/"));
        debug!(call = %name, "API call");

        let mut request = self.http.post(&url).json(&params);
        if let Some(token) = token {
            request = request.header(
                reqwest::header::COOKIE,
                format!("pxt-session-cookie={}", token.as_str()),
            );
        }

        let response = request.send().await?;
        let status = response.status();
        let body: Value = if status.is_success() {
            response.json().await?
        } else {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::ApiCallFailed {
                call: name.to_string(),
                fault_code: status.as_u16() as i64,
                fault_message: text,
            });
        };

        decode_envelope(name, body)
    }
}

/// Unwrap the `{success, result | message}` envelope the API wraps every
/// response in, turning remote faults into [`Error::ApiCallFailed`].
pub(crate) fn decode_envelope(call: &str, body: Value) -> Result<Value> {
    match body.get("success").and_then(Value::as_bool) {
        Some(true) => Ok(body.get("result").cloned().unwrap_or(Value::Null)),
        Some(false) => Err(Error::ApiCallFailed {
            call: call.to_string(),
            fault_code: body.get("code").and_then(Value::as_i64).unwrap_or(-1),
            fault_message: body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown fault")
                .to_string(),
        }),
        // Some endpoints answer with the bare result.
        None => Ok(body),
    }
}
