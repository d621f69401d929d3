//! Saved-plan library: status tabs, search, duplication, deletion, and
//! detail parsing of the stored plan blob.

use thiserror::Error;
use uuid::Uuid;

use crate::generator::schema::{parse_plan, PlanDataError};
use crate::models::{GeneratedPlan, PlanStatus, TherapyPlan};
use crate::store::{Collection, Provenance, StoreError};

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("No plan with id {0}")]
    NotFound(Uuid),

    #[error(transparent)]
    PlanData(#[from] PlanDataError),
}

/// Library filter tab. `All` shows every plan regardless of status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusTab {
    #[default]
    All,
    Active,
    Completed,
    Draft,
}

impl StatusTab {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusTab::All => "all",
            StatusTab::Active => "active",
            StatusTab::Completed => "completed",
            StatusTab::Draft => "draft",
        }
    }

    fn matches(&self, status: PlanStatus) -> bool {
        match self {
            StatusTab::All => true,
            StatusTab::Active => status == PlanStatus::Active,
            StatusTab::Completed => status == PlanStatus::Completed,
            StatusTab::Draft => status == PlanStatus::Draft,
        }
    }
}

impl std::str::FromStr for StatusTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(StatusTab::All),
            "active" => Ok(StatusTab::Active),
            "completed" => Ok(StatusTab::Completed),
            "draft" => Ok(StatusTab::Draft),
            other => Err(format!("Unknown status tab: {other}")),
        }
    }
}

/// A plan with its parsed title, for list views.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanListing {
    #[serde(flatten)]
    pub plan: TherapyPlan,
    pub plan_title: String,
}

/// List the owner's plans newest first, each with the title pulled out
/// of its blob. A malformed blob does not drop the row; its title falls
/// back to empty.
pub async fn list_plans(
    plans: &Collection<TherapyPlan>,
    owner_id: &str,
) -> Result<Vec<PlanListing>, LibraryError> {
    Ok(plans
        .list(owner_id)
        .await?
        .into_iter()
        .map(|plan| {
            let plan_title = parse_plan(&plan.plan_data)
                .map(|p| p.plan_title)
                .unwrap_or_default();
            PlanListing { plan, plan_title }
        })
        .collect())
}

/// Apply the status tab and the free-text search, preserving order. The
/// search is case-insensitive over patient name, diagnosis, primary
/// goal, and plan title; the two filters are independent, so their
/// application order does not matter.
pub fn filter_plans(listings: &[PlanListing], tab: StatusTab, query: &str) -> Vec<PlanListing> {
    let needle = query.trim().to_lowercase();
    listings
        .iter()
        .filter(|l| tab.matches(l.plan.status))
        .filter(|l| {
            needle.is_empty()
                || l.plan.patient_name.to_lowercase().contains(&needle)
                || l.plan.diagnosis.to_lowercase().contains(&needle)
                || l.plan.primary_goal.to_lowercase().contains(&needle)
                || l.plan_title.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Parse a plan's stored blob for the detail view.
pub async fn plan_detail(
    plans: &Collection<TherapyPlan>,
    owner_id: &str,
    id: Uuid,
) -> Result<(TherapyPlan, GeneratedPlan), LibraryError> {
    let plan = plans
        .get(owner_id, id)
        .await?
        .ok_or(LibraryError::NotFound(id))?;
    let generated = parse_plan(&plan.plan_data)?;
    Ok((plan, generated))
}

/// Duplicate a plan as a fresh draft.
pub async fn duplicate_plan(
    plans: &Collection<TherapyPlan>,
    owner_id: &str,
    id: Uuid,
) -> Result<(TherapyPlan, Provenance), LibraryError> {
    let original = plans
        .get(owner_id, id)
        .await?
        .ok_or(LibraryError::NotFound(id))?;
    let copy = original.duplicate();
    let provenance = plans.create(&copy).await?;
    Ok((copy, provenance))
}

/// Delete a plan. Unknown ids are a no-op.
pub async fn delete_plan(
    plans: &Collection<TherapyPlan>,
    owner_id: &str,
    id: Uuid,
) -> Result<(), LibraryError> {
    plans.delete(owner_id, id).await?;
    Ok(())
}

/// Set a plan's status, returning the updated record.
pub async fn set_plan_status(
    plans: &Collection<TherapyPlan>,
    owner_id: &str,
    id: Uuid,
    status: PlanStatus,
) -> Result<(TherapyPlan, Provenance), LibraryError> {
    let mut plan = plans
        .get(owner_id, id)
        .await?
        .ok_or(LibraryError::NotFound(id))?;
    plan.status = status;
    let provenance = plans.update(&plan).await?;
    Ok((plan, provenance))
}
