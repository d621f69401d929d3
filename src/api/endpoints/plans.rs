//! Plan library endpoints.
//!
//! - `GET /api/plans` — list, filtered by `tab` and `q`
//! - `POST /api/plans` — save a reviewed plan
//! - `GET /api/plans/:id` — detail with the parsed blob
//! - `POST /api/plans/:id/duplicate` — copy as a fresh draft
//! - `POST /api/plans/:id/status` — set plan status
//! - `DELETE /api/plans/:id` — irreversible delete
//! - `GET /api/plans/:id/export` — PDF download

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::export::render_plan_pdf;
use crate::generator::{save_reviewed_plan, PlanRequest, SavedPlan};
use crate::library::{self, PlanListing, StatusTab};
use crate::models::{GeneratedPlan, PlanStatus, TherapyPlan};
use crate::store::Provenance;

#[derive(Deserialize)]
pub struct ListQuery {
    pub tab: Option<String>,
    pub q: Option<String>,
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<PlanListing>>, ApiError> {
    let user = ctx.require_user().await?;
    let tab = match query.tab.as_deref() {
        Some(raw) => raw.parse::<StatusTab>().map_err(ApiError::BadRequest)?,
        None => StatusTab::All,
    };
    let listings = library::list_plans(&ctx.plans, &user.id).await?;
    Ok(Json(library::filter_plans(
        &listings,
        tab,
        query.q.as_deref().unwrap_or(""),
    )))
}

/// A reviewed generation result ready to persist.
#[derive(Deserialize)]
pub struct SavePlanRequest {
    pub request: PlanRequest,
    pub plan: GeneratedPlan,
}

pub async fn save(
    State(ctx): State<ApiContext>,
    Json(body): Json<SavePlanRequest>,
) -> Result<Json<SavedPlan>, ApiError> {
    let user = ctx.require_user().await?;
    let saved = save_reviewed_plan(
        &ctx.patients,
        &ctx.plans,
        &user.id,
        &body.request,
        &body.plan,
    )
    .await?;
    Ok(Json(saved))
}

#[derive(Serialize)]
pub struct PlanDetailResponse {
    #[serde(flatten)]
    pub plan: TherapyPlan,
    pub data: GeneratedPlan,
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<PlanDetailResponse>, ApiError> {
    let user = ctx.require_user().await?;
    let (plan, data) = library::plan_detail(&ctx.plans, &user.id, id).await?;
    Ok(Json(PlanDetailResponse { plan, data }))
}

#[derive(Serialize)]
pub struct PlanResponse {
    #[serde(flatten)]
    pub plan: TherapyPlan,
    pub provenance: Provenance,
}

pub async fn duplicate(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<PlanResponse>, ApiError> {
    let user = ctx.require_user().await?;
    let (plan, provenance) = library::duplicate_plan(&ctx.plans, &user.id, id).await?;
    Ok(Json(PlanResponse { plan, provenance }))
}

#[derive(Deserialize)]
pub struct SetStatusRequest {
    pub status: PlanStatus,
}

pub async fn set_status(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<SetStatusRequest>,
) -> Result<Json<PlanResponse>, ApiError> {
    let user = ctx.require_user().await?;
    let (plan, provenance) =
        library::set_plan_status(&ctx.plans, &user.id, id, body.status).await?;
    Ok(Json(PlanResponse { plan, provenance }))
}

pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = ctx.require_user().await?;
    library::delete_plan(&ctx.plans, &user.id, id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}

pub async fn export(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let user = ctx.require_user().await?;
    let (plan, data) = library::plan_detail(&ctx.plans, &user.id, id).await?;
    let bytes = render_plan_pdf(&plan, &data)?;
    let filename = format!(
        "attachment; filename=\"therapy-plan-{}.pdf\"",
        plan.created_at.format("%Y-%m-%d")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        bytes,
    )
        .into_response())
}
