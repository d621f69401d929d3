//! Shared context for API routes.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::api::error::ApiError;
use crate::app::{reduce, Action, AppState};
use crate::auth::{AuthClient, User};
use crate::generator::GenerationClient;
use crate::models::{Patient, TherapyPlan};
use crate::store::Collection;

/// Shared state handed to every endpoint handler.
#[derive(Clone)]
pub struct ApiContext {
    pub patients: Collection<Patient>,
    pub plans: Collection<TherapyPlan>,
    pub auth: Arc<dyn AuthClient>,
    pub generation: Arc<dyn GenerationClient>,
    app: Arc<RwLock<AppState>>,
}

impl ApiContext {
    pub fn new(
        patients: Collection<Patient>,
        plans: Collection<TherapyPlan>,
        auth: Arc<dyn AuthClient>,
        generation: Arc<dyn GenerationClient>,
    ) -> Self {
        Self {
            patients,
            plans,
            auth,
            generation,
            app: Arc::new(RwLock::new(AppState::default())),
        }
    }

    /// The authenticated user, or 401.
    pub async fn require_user(&self) -> Result<User, ApiError> {
        Ok(self.auth.current_user().await?)
    }

    pub async fn app_state(&self) -> AppState {
        self.app.read().await.clone()
    }

    /// Run one action through the reducer and return the new state.
    pub async fn dispatch(&self, action: Action) -> AppState {
        let mut guard = self.app.write().await;
        *guard = reduce(&guard, action);
        guard.clone()
    }
}
