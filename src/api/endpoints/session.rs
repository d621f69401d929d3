//! Session and view endpoints.
//!
//! - `GET /api/session` — current application state
//! - `POST /api/session/login` — delegated sign-in
//! - `POST /api/session/logout` — sign out and reset the view
//! - `POST /api/view` — select the active view (signed-in only)

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::app::{Action, AppState, SessionState, View};
use crate::auth::AuthState;

pub async fn current(State(ctx): State<ApiContext>) -> Json<AppState> {
    // Fold the latest auth observation into the session gate before
    // reporting, so a freshly started server does not stay "loading".
    let auth = match ctx.auth.current_user().await {
        Ok(user) => AuthState::SignedIn { user },
        Err(_) => AuthState::SignedOut,
    };
    Json(ctx.dispatch(Action::AuthChanged(auth)).await)
}

pub async fn login(State(ctx): State<ApiContext>) -> Result<Json<AppState>, ApiError> {
    let user = ctx.auth.login().await?;
    Ok(Json(
        ctx.dispatch(Action::AuthChanged(AuthState::SignedIn { user }))
            .await,
    ))
}

pub async fn logout(State(ctx): State<ApiContext>) -> Json<AppState> {
    Json(ctx.dispatch(Action::SignOut).await)
}

#[derive(Deserialize)]
pub struct SelectViewRequest {
    pub view: View,
}

pub async fn select_view(
    State(ctx): State<ApiContext>,
    Json(body): Json<SelectViewRequest>,
) -> Result<Json<AppState>, ApiError> {
    let state = ctx.app_state().await;
    if !matches!(state.session, SessionState::SignedIn { .. }) {
        return Err(ApiError::Unauthorized);
    }
    Ok(Json(ctx.dispatch(Action::SelectView(body.view)).await))
}
