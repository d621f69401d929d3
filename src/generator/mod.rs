//! AI plan generation: intake form → structured generation → review →
//! save.

pub mod client;
pub mod prompt;
pub mod schema;
pub mod session;

pub use client::{GenerationClient, GenerationError, HttpGenerationClient, MockGeneration};
pub use schema::{parse_plan, plan_from_value, PlanDataError};
pub use session::{GeneratorSession, IntakeError, IntakeForm, PlanRequest};

use serde::Serialize;
use thiserror::Error;

use crate::models::{GeneratedPlan, ModelError, Patient, PlanStatus, TherapyPlan};
use crate::store::{Collection, Provenance, StoreError};

#[derive(Error, Debug)]
pub enum SaveError {
    #[error(transparent)]
    Invalid(#[from] ModelError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of saving a reviewed plan.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPlan {
    pub plan: TherapyPlan,
    pub provenance: Provenance,
    /// Set when the save also created a patient profile.
    pub created_patient: Option<Patient>,
}

/// Persist a reviewed plan as `active`, and create the patient profile
/// if no patient with that name exists yet (matched by name, like the
/// registry join). The patient fields are validated up front, so a
/// request that bypassed the intake form cannot persist anything.
pub async fn save_reviewed_plan(
    patients: &Collection<Patient>,
    plans: &Collection<TherapyPlan>,
    owner_id: &str,
    request: &PlanRequest,
    plan: &GeneratedPlan,
) -> Result<SavedPlan, SaveError> {
    let input = request.to_patient_input();
    input.validate()?;

    let record = TherapyPlan {
        id: uuid::Uuid::new_v4(),
        owner_id: owner_id.to_string(),
        patient_name: request.patient_name.clone(),
        patient_age: request.age,
        diagnosis: request.diagnosis.clone(),
        primary_goal: request.primary_goal.clone(),
        plan_data: serde_json::to_string(plan).map_err(StoreError::from)?,
        status: PlanStatus::Active,
        created_at: chrono::Utc::now(),
    };
    let provenance = plans.create(&record).await?;

    let existing = patients.list(owner_id).await?;
    let created_patient = if existing.iter().any(|p| p.name == request.patient_name) {
        None
    } else {
        let patient = input.into_patient(owner_id);
        patients.create(&patient).await?;
        Some(patient)
    };

    Ok(SavedPlan {
        plan: record,
        provenance,
        created_patient,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FunctionalLevel, SessionFrequency};
    use crate::store::{LocalStore, MockRemote, RemoteStore};
    use std::sync::Arc;

    fn request() -> PlanRequest {
        PlanRequest {
            patient_name: "Jane Doe".into(),
            age: 72,
            diagnosis: "Stroke".into(),
            functional_level: FunctionalLevel::ModerateAssistance,
            primary_goal: "Improve fine motor skills".into(),
            secondary_goals: String::new(),
            interests: "Gardening".into(),
            limitations: String::new(),
            session_minutes: 60,
            frequency: SessionFrequency::Weekly,
            program_weeks: 8,
        }
    }

    fn stores() -> (Collection<Patient>, Collection<TherapyPlan>) {
        let remote: Arc<dyn RemoteStore> = Arc::new(MockRemote::new());
        let local = Arc::new(LocalStore::open_in_memory().unwrap());
        (
            Collection::new(remote.clone(), local.clone()),
            Collection::new(remote, local),
        )
    }

    #[tokio::test]
    async fn save_persists_active_plan_and_creates_patient() {
        let (patients, plans) = stores();
        let generated = GeneratedPlan {
            plan_title: "Motor Recovery Program".into(),
            ..Default::default()
        };

        let saved = save_reviewed_plan(&patients, &plans, "u1", &request(), &generated)
            .await
            .unwrap();
        assert_eq!(saved.plan.status, PlanStatus::Active);
        assert_eq!(saved.plan.primary_goal, "Improve fine motor skills");
        assert!(saved.created_patient.is_some());

        let listed = plans.list("u1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].primary_goal, "Improve fine motor skills");
        assert_eq!(listed[0].status, PlanStatus::Active);

        let parsed = parse_plan(&listed[0].plan_data).unwrap();
        assert_eq!(parsed.plan_title, "Motor Recovery Program");
    }

    #[tokio::test]
    async fn save_rejects_blank_patient_fields_without_persisting() {
        let (patients, plans) = stores();
        let mut bad = request();
        bad.patient_name = String::new();
        bad.age = 0;

        let err = save_reviewed_plan(&patients, &plans, "u1", &bad, &GeneratedPlan::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SaveError::Invalid(_)));
        assert!(plans.list("u1").await.unwrap().is_empty());
        assert!(patients.list("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_skips_patient_upsert_when_name_exists() {
        let (patients, plans) = stores();
        let existing = request().to_patient_input().into_patient("u1");
        patients.create(&existing).await.unwrap();

        let saved = save_reviewed_plan(
            &patients,
            &plans,
            "u1",
            &request(),
            &GeneratedPlan::default(),
        )
        .await
        .unwrap();
        assert!(saved.created_patient.is_none());
        assert_eq!(patients.list("u1").await.unwrap().len(), 1);
    }
}
