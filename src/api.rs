//! HTTPS management API access for conductors and controllers.
//!
//! Both tiers speak the same API: a login endpoint that mints a session
//! token pair, a logout endpoint that revokes it, and a generic show-command
//! endpoint that returns JSON documents. The [`DeviceQuery`] trait is the
//! seam between the pipeline and the transport; tests script it with canned
//! documents.

use futures::future::BoxFuture;
use serde_json::Value;

/// Management API port used by conductors and controllers alike.
const MGMT_PORT: u16 = 4343;

/// Token pair minted by a login call. `uid` doubles as the `SESSION` cookie
/// and the `UIDARUBA` query parameter on every later call; `csrf` is the
/// anti-forgery token the API returns alongside it.
#[derive(Debug, Clone)]
pub struct SessionCredential {
    pub host: String,
    pub uid: String,
    pub csrf: String,
}

impl SessionCredential {
    fn cookie(&self) -> String {
        format!("SESSION={}", self.uid)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("transport failure talking to {host}: {source}")]
    Transport {
        host: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("login response from {host} is missing the session token fields")]
    MissingToken { host: String },
    #[error("unexpected response shape from {host} for `{command}`: {source}")]
    UnexpectedShape {
        host: String,
        command: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    fn transport(host: &str, source: reqwest::Error) -> Self {
        Self::Transport {
            host: host.to_string(),
            source,
        }
    }

    pub(crate) fn unexpected_shape(host: &str, command: &str, source: serde_json::Error) -> Self {
        Self::UnexpectedShape {
            host: host.to_string(),
            command: command.to_string(),
            source,
        }
    }
}

/// One request against a conductor or controller.
pub trait DeviceQuery: Send + Sync {
    /// Mint a session credential for `host`.
    fn login<'a>(
        &'a self,
        host: &'a str,
        username: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<SessionCredential, ApiError>>;

    /// Revoke a previously minted credential.
    fn logout<'a>(&'a self, credential: &'a SessionCredential) -> BoxFuture<'a, Result<(), ApiError>>;

    /// Run a show command and return the decoded JSON document.
    fn show_command<'a>(
        &'a self,
        credential: &'a SessionCredential,
        command: &'a str,
    ) -> BoxFuture<'a, Result<Value, ApiError>>;
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

/// Reqwest-backed [`DeviceQuery`] implementation.
#[derive(Debug, Clone)]
pub struct MgmtApiClient {
    http: reqwest::Client,
}

impl MgmtApiClient {
    /// Certificate validation is disabled: devices on the management network
    /// present self-signed certificates.
    pub fn new() -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().danger_accept_invalid_certs(true).build()?;
        Ok(Self { http })
    }

    fn base_url(host: &str) -> String {
        format!("https://{host}:{MGMT_PORT}/v1")
    }

    async fn login_request(&self, host: &str, username: &str, password: &str) -> Result<SessionCredential, ApiError> {
        let document: Value = self
            .http
            .get(format!("{}/api/login", Self::base_url(host)))
            .query(&[("username", username), ("password", password)])
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|source| ApiError::transport(host, source))?
            .json()
            .await
            .map_err(|source| ApiError::transport(host, source))?;

        credential_from_login(host, &document)
    }

    async fn logout_request(&self, credential: &SessionCredential) -> Result<(), ApiError> {
        self.http
            .get(format!("{}/api/logout", Self::base_url(&credential.host)))
            .query(&[("UIDARUBA", credential.uid.as_str())])
            .header(reqwest::header::COOKIE, credential.cookie())
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|source| ApiError::transport(&credential.host, source))?;
        Ok(())
    }

    async fn show_command_request(&self, credential: &SessionCredential, command: &str) -> Result<Value, ApiError> {
        self.http
            .get(format!("{}/configuration/showcommand", Self::base_url(&credential.host)))
            .query(&[("command", command), ("UIDARUBA", credential.uid.as_str())])
            .header(reqwest::header::COOKIE, credential.cookie())
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|source| ApiError::transport(&credential.host, source))?
            .json()
            .await
            .map_err(|source| ApiError::transport(&credential.host, source))
    }
}

impl DeviceQuery for MgmtApiClient {
    fn login<'a>(
        &'a self,
        host: &'a str,
        username: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<SessionCredential, ApiError>> {
        Box::pin(self.login_request(host, username, password))
    }

    fn logout<'a>(&'a self, credential: &'a SessionCredential) -> BoxFuture<'a, Result<(), ApiError>> {
        Box::pin(self.logout_request(credential))
    }

    fn show_command<'a>(
        &'a self,
        credential: &'a SessionCredential,
        command: &'a str,
    ) -> BoxFuture<'a, Result<Value, ApiError>> {
        Box::pin(self.show_command_request(credential, command))
    }
}

fn credential_from_login(host: &str, document: &Value) -> Result<SessionCredential, ApiError> {
    let tokens = document.get("_global_result");
    let uid = tokens.and_then(|tokens| tokens.get("UIDARUBA")).and_then(Value::as_str);
    let csrf = tokens.and_then(|tokens| tokens.get("X-CSRF-Token")).and_then(Value::as_str);

    match (uid, csrf) {
        (Some(uid), Some(csrf)) => Ok(SessionCredential {
            host: host.to_string(),
            uid: uid.to_string(),
            csrf: csrf.to_string(),
        }),
        _ => Err(ApiError::MissingToken { host: host.to_string() }),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn login_response_with_both_tokens_yields_a_credential() {
        let document = json!({
            "_global_result": {
                "UIDARUBA": "f00d",
                "X-CSRF-Token": "abc123",
            }
        });

        let credential = credential_from_login("10.0.0.1", &document).unwrap();
        assert_eq!(credential.host, "10.0.0.1");
        assert_eq!(credential.uid, "f00d");
        assert_eq!(credential.csrf, "abc123");
        assert_eq!(credential.cookie(), "SESSION=f00d");
    }

    #[test]
    fn login_response_missing_a_token_is_an_error() {
        let missing_csrf = json!({ "_global_result": { "UIDARUBA": "f00d" } });
        let error = credential_from_login("10.0.0.1", &missing_csrf).unwrap_err();
        assert!(matches!(error, ApiError::MissingToken { host } if host == "10.0.0.1"));

        let empty = json!({});
        assert!(credential_from_login("10.0.0.1", &empty).is_err());
    }
}
