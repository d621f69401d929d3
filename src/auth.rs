//! Auth capability client.
//!
//! Authentication is entirely delegated to the backend: no token
//! handling, validation, or retry here. The client exposes the current
//! user, a login call, and an observable auth-state stream that the
//! session gate consumes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Latest observed authentication state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum AuthState {
    Loading,
    SignedOut,
    SignedIn { user: User },
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Auth backend unreachable: {0}")]
    Transport(String),
}

#[async_trait]
pub trait AuthClient: Send + Sync {
    /// The authenticated user, or `NotAuthenticated`.
    async fn current_user(&self) -> Result<User, AuthError>;

    /// Delegated sign-in. On success the auth-state stream flips to
    /// `SignedIn`.
    async fn login(&self) -> Result<User, AuthError>;

    /// Subscribe to auth-state changes. The receiver always holds the
    /// latest observed state.
    fn subscribe(&self) -> watch::Receiver<AuthState>;
}

/// HTTP implementation against the auth backend.
pub struct HttpAuthClient {
    base_url: String,
    client: reqwest::Client,
    state_tx: watch::Sender<AuthState>,
}

impl HttpAuthClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");
        let (state_tx, _) = watch::channel(AuthState::Loading);

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            state_tx,
        }
    }

    fn publish(&self, state: AuthState) {
        // Receivers may all be gone; that's fine.
        let _ = self.state_tx.send(state);
    }
}

#[async_trait]
impl AuthClient for HttpAuthClient {
    async fn current_user(&self) -> Result<User, AuthError> {
        let url = format!("{}/auth/me", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            self.publish(AuthState::SignedOut);
            return Err(AuthError::NotAuthenticated);
        }
        let user: User = response
            .json()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        self.publish(AuthState::SignedIn { user: user.clone() });
        Ok(user)
    }

    async fn login(&self) -> Result<User, AuthError> {
        let url = format!("{}/auth/login", self.base_url);
        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            self.publish(AuthState::SignedOut);
            return Err(AuthError::NotAuthenticated);
        }
        let user: User = response
            .json()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        self.publish(AuthState::SignedIn { user: user.clone() });
        Ok(user)
    }

    fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }
}

/// Test auth client with a settable signed-in user.
pub struct MockAuth {
    user: std::sync::Mutex<Option<User>>,
    state_tx: watch::Sender<AuthState>,
}

impl MockAuth {
    pub fn signed_in(id: &str) -> Self {
        let user = User {
            id: id.to_string(),
            email: None,
        };
        let (state_tx, _) = watch::channel(AuthState::SignedIn { user: user.clone() });
        Self {
            user: std::sync::Mutex::new(Some(user)),
            state_tx,
        }
    }

    pub fn signed_out() -> Self {
        let (state_tx, _) = watch::channel(AuthState::SignedOut);
        Self {
            user: std::sync::Mutex::new(None),
            state_tx,
        }
    }
}

#[async_trait]
impl AuthClient for MockAuth {
    async fn current_user(&self) -> Result<User, AuthError> {
        self.user
            .lock()
            .expect("mock auth lock poisoned")
            .clone()
            .ok_or(AuthError::NotAuthenticated)
    }

    async fn login(&self) -> Result<User, AuthError> {
        let user = User {
            id: "mock_user".into(),
            email: None,
        };
        *self.user.lock().expect("mock auth lock poisoned") = Some(user.clone());
        let _ = self.state_tx.send(AuthState::SignedIn { user: user.clone() });
        Ok(user)
    }

    fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }
}
