//! Per-host session credentials and the login/logout plumbing around them.

use crate::api::{
    ApiError,
    DeviceQuery,
    SessionCredential,
};
use std::{
    collections::HashMap,
    sync::{
        Arc,
        Mutex,
    },
};
use tracing::{
    debug,
    warn,
};

/// Active credentials keyed by host. Login tasks within a stage insert
/// concurrently; every later show command reads its host's entry; logout
/// drains it. A host that is absent here failed to authenticate and is
/// skipped by every dependent stage.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<String, SessionCredential>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, credential: SessionCredential) {
        self.inner.lock().unwrap().insert(credential.host.clone(), credential);
    }

    pub fn get(&self, host: &str) -> Option<SessionCredential> {
        self.inner.lock().unwrap().get(host).cloned()
    }

    pub fn remove(&self, host: &str) -> Option<SessionCredential> {
        self.inner.lock().unwrap().remove(host)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }
}

/// Mint and store a credential for `host`. Failures surface to the caller:
/// every later stage depends on the credential being present, so a swallowed
/// login error would only resurface as an opaque downstream failure.
pub async fn authenticate(
    client: &dyn DeviceQuery,
    sessions: &SessionStore,
    host: &str,
    username: &str,
    password: &str,
) -> Result<(), ApiError> {
    let credential = client.login(host, username, password).await?;
    debug!(host, "session: stored credential");
    sessions.insert(credential);
    Ok(())
}

/// Best-effort logout. End-of-run cleanup never aborts the program; a failed
/// revocation is logged and the credential dropped regardless.
pub async fn revoke(client: &dyn DeviceQuery, sessions: &SessionStore, host: &str) {
    let Some(credential) = sessions.remove(host) else {
        return;
    };
    if let Err(error) = client.logout(&credential).await {
        warn!(host, %error, "session: logout failed");
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn credential(host: &str) -> SessionCredential {
        SessionCredential {
            host: host.to_string(),
            uid: format!("uid-{host}"),
            csrf: "csrf".to_string(),
        }
    }

    #[test]
    fn store_keys_credentials_by_host() {
        let sessions = SessionStore::new();
        sessions.insert(credential("10.0.0.1"));
        sessions.insert(credential("10.0.0.2"));

        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions.get("10.0.0.1").unwrap().uid, "uid-10.0.0.1");
        assert!(sessions.get("10.0.0.3").is_none());

        assert!(sessions.remove("10.0.0.1").is_some());
        assert!(sessions.get("10.0.0.1").is_none());
        assert!(sessions.remove("10.0.0.1").is_none());
    }

    #[test]
    fn a_second_login_replaces_the_live_credential() {
        let sessions = SessionStore::new();
        sessions.insert(credential("10.0.0.1"));
        sessions.insert(SessionCredential {
            host: "10.0.0.1".to_string(),
            uid: "fresh".to_string(),
            csrf: "csrf".to_string(),
        });

        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions.get("10.0.0.1").unwrap().uid, "fresh");
    }
}
