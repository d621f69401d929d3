//! Patient registry endpoints.
//!
//! - `GET /api/patients` — list with derived plan stats, optional `q` filter
//! - `POST /api/patients` — create
//! - `PUT /api/patients/:id` — full-record replace
//! - `DELETE /api/patients/:id` — irreversible delete

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{Patient, PatientInput, PatientSummary};
use crate::registry;
use crate::store::Provenance;

#[derive(Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
}

#[derive(Serialize)]
pub struct PatientResponse {
    #[serde(flatten)]
    pub patient: Patient,
    pub provenance: Provenance,
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<PatientSummary>>, ApiError> {
    let user = ctx.require_user().await?;
    let mut summaries = registry::list_patients(&ctx.patients, &ctx.plans, &user.id).await?;
    if let Some(q) = query.q.as_deref() {
        summaries = registry::search_patients(&summaries, q);
    }
    Ok(Json(summaries))
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Json(input): Json<PatientInput>,
) -> Result<Json<PatientResponse>, ApiError> {
    let user = ctx.require_user().await?;
    input.validate()?;
    let (patient, provenance) = registry::create_patient(&ctx.patients, &user.id, input).await?;
    Ok(Json(PatientResponse {
        patient,
        provenance,
    }))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(input): Json<PatientInput>,
) -> Result<Json<PatientResponse>, ApiError> {
    let user = ctx.require_user().await?;
    input.validate()?;
    let (patient, provenance) =
        registry::update_patient(&ctx.patients, &user.id, id, input).await?;
    Ok(Json(PatientResponse {
        patient,
        provenance,
    }))
}

pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = ctx.require_user().await?;
    registry::delete_patient(&ctx.patients, &user.id, id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
