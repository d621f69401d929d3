//! `POST /api/generate` — validate the intake form and run one
//! structured generation call. Saving the result is a separate request
//! (`POST /api/plans`), so a failed generation loses nothing.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::generator::{GeneratorSession, IntakeForm, PlanRequest};
use crate::models::GeneratedPlan;

#[derive(Serialize)]
pub struct GenerateResponse {
    pub request: PlanRequest,
    pub plan: GeneratedPlan,
}

pub async fn generate(
    State(ctx): State<ApiContext>,
    Json(form): Json<IntakeForm>,
) -> Result<Json<GenerateResponse>, ApiError> {
    ctx.require_user().await?;

    let mut session = GeneratorSession::CollectingInput(form);
    session.advance()?;
    session.generate(ctx.generation.as_ref()).await?;

    let (request, plan) = session
        .result()
        .ok_or_else(|| ApiError::Internal("generation finished without a result".into()))?;
    Ok(Json(GenerateResponse {
        request: request.clone(),
        plan: plan.clone(),
    }))
}
