//! Application root state: the session gate and the view selector.
//!
//! Instead of ad-hoc mutable setters, the root state is one explicit
//! value with transitions expressed as a pure reducer over an
//! enumerated action set. The session gate renders exactly one of
//! {loading, signed-out, signed-in} from the latest observed auth
//! state; the view selector is in-memory only (no URL routing, no
//! history stack).

use serde::{Deserialize, Serialize};

use crate::auth::{AuthState, User};

/// The four application views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Dashboard,
    Generator,
    Patients,
    Library,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SessionState {
    Loading,
    SignedOut,
    SignedIn { user: User },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    pub session: SessionState,
    pub view: View,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            session: SessionState::Loading,
            view: View::Dashboard,
        }
    }
}

impl AppState {
    pub fn signed_in_user(&self) -> Option<&User> {
        match &self.session {
            SessionState::SignedIn { user } => Some(user),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AuthChanged(AuthState),
    SelectView(View),
    SignOut,
}

/// Pure state transition. View selection is ignored unless signed in;
/// leaving the signed-in state resets the view to the dashboard.
pub fn reduce(state: &AppState, action: Action) -> AppState {
    match action {
        Action::AuthChanged(auth) => {
            let session = match auth {
                AuthState::Loading => SessionState::Loading,
                AuthState::SignedOut => SessionState::SignedOut,
                AuthState::SignedIn { user } => SessionState::SignedIn { user },
            };
            let view = match session {
                SessionState::SignedIn { .. } => state.view,
                _ => View::Dashboard,
            };
            AppState { session, view }
        }
        Action::SelectView(view) => match state.session {
            SessionState::SignedIn { .. } => AppState {
                session: state.session.clone(),
                view,
            },
            _ => state.clone(),
        },
        Action::SignOut => AppState {
            session: SessionState::SignedOut,
            view: View::Dashboard,
        },
    }
}
