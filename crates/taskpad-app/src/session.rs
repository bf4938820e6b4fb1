//! Session gate and the identity-provider seam.
//!
//! Session issuance is delegated to an external OAuth provider; this crate
//! only ever *reads* sessions, keyed by the opaque token carried on the
//! request. The gate turns "no session" into a redirect outcome — an
//! ordinary control-flow result, never an error. Provider failures do
//! propagate as request failures, with no retry.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use taskpad_shared::{Session, UserSnapshot};

use crate::error::AppError;

/// Read-side of the external identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Look up the active session for an opaque request token.
    /// `Ok(None)` means "not signed in"; `Err` means the provider itself
    /// failed and the request should fail with it.
    async fn session(&self, token: &str) -> Result<Option<Session>, AppError>;
}

/// Outcome of gating a protected page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// Active session found; the identity snapshot is passed into the page
    /// as an explicit parameter.
    Allowed(Session),
    /// No active session: redirect (non-permanent) and render nothing.
    Redirect(&'static str),
}

/// Gate a protected page request on an active session.
pub async fn protect(
    provider: &dyn IdentityProvider,
    token: Option<&str>,
) -> Result<Gate, AppError> {
    let Some(token) = token else {
        return Ok(Gate::Redirect("/"));
    };
    match provider.session(token).await? {
        Some(session) => Ok(Gate::Allowed(session)),
        None => Ok(Gate::Redirect("/")),
    }
}

/// In-process session registry.
///
/// Stands in for the hosted provider behind [`IdentityProvider`]: sign-in
/// mints an opaque token for an identity snapshot, sign-out revokes it.
/// The OAuth callback of a real deployment would land here.
#[derive(Default)]
pub struct MemorySessions {
    sessions: Mutex<HashMap<String, Session>>,
}

impl MemorySessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Establish a session for `user` and return its token.
    pub async fn sign_in(&self, user: UserSnapshot) -> String {
        let token = Uuid::new_v4().to_string();
        let mut sessions = self.sessions.lock().await;
        sessions.insert(token.clone(), Session { user });
        token
    }

    /// Revoke a session. Unknown tokens are ignored.
    pub async fn sign_out(&self, token: &str) {
        let mut sessions = self.sessions.lock().await;
        sessions.remove(token);
    }
}

#[async_trait]
impl IdentityProvider for MemorySessions {
    async fn session(&self, token: &str) -> Result<Option<Session>, AppError> {
        let sessions = self.sessions.lock().await;
        Ok(sessions.get(token).cloned())
    }
}
