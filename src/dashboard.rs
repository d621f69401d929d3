//! Dashboard aggregates: headline counts plus the most recent plans.

use chrono::{Duration, Utc};
use serde::Serialize;

use crate::library::{list_plans, LibraryError, PlanListing};
use crate::models::{Patient, PlanStatus, TherapyPlan};
use crate::store::Collection;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_patients: usize,
    pub active_plans: usize,
    pub this_week_plans: usize,
    /// Session tracking is not implemented yet, so this is always zero.
    pub completed_sessions: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub recent_plans: Vec<PlanListing>,
}

const RECENT_PLAN_COUNT: usize = 5;

/// Build the owner's dashboard from the reconciled collections.
pub async fn load_dashboard(
    patients: &Collection<Patient>,
    plans: &Collection<TherapyPlan>,
    owner_id: &str,
) -> Result<Dashboard, LibraryError> {
    let patient_count = patients.list(owner_id).await?.len();
    let listings = list_plans(plans, owner_id).await?;

    let week_ago = Utc::now() - Duration::days(7);
    let stats = DashboardStats {
        total_patients: patient_count,
        active_plans: listings
            .iter()
            .filter(|l| l.plan.status == PlanStatus::Active)
            .count(),
        this_week_plans: listings
            .iter()
            .filter(|l| l.plan.created_at > week_ago)
            .count(),
        completed_sessions: 0,
    };

    // Listings are already newest first.
    let recent_plans = listings.into_iter().take(RECENT_PLAN_COUNT).collect();

    Ok(Dashboard {
        stats,
        recent_plans,
    })
}
