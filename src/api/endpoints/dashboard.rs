//! `GET /api/dashboard` — headline counts plus recent plans.

use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::dashboard::{load_dashboard, Dashboard};

pub async fn overview(State(ctx): State<ApiContext>) -> Result<Json<Dashboard>, ApiError> {
    let user = ctx.require_user().await?;
    let dashboard = load_dashboard(&ctx.patients, &ctx.plans, &user.id).await?;
    Ok(Json(dashboard))
}
