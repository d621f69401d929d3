//! Patient registry — list/create/update/delete plus the derived plan
//! stats and the local search filter.
//!
//! Plan counts are computed by scanning the owner's plan collection and
//! matching on patient-name equality (not a foreign key), exactly as
//! the records are stored: renaming a patient silently orphans its
//! history, and duplicate names merge in the join.

use thiserror::Error;
use uuid::Uuid;

use crate::models::{Patient, PatientInput, PatientSummary, PlanStatus, TherapyPlan};
use crate::store::{Collection, Provenance, StoreError};

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Patient not found: {0}")]
    NotFound(Uuid),
}

/// List the owner's patients newest first, each joined with its derived
/// plan stats.
pub async fn list_patients(
    patients: &Collection<Patient>,
    plans: &Collection<TherapyPlan>,
    owner_id: &str,
) -> Result<Vec<PatientSummary>, RegistryError> {
    let patient_records = patients.list(owner_id).await?;
    let plan_records = plans.list(owner_id).await?;

    Ok(patient_records
        .into_iter()
        .map(|patient| summarize(patient, &plan_records))
        .collect())
}

/// Join one patient against the plan list. Plans arrive newest first,
/// so the first name match carries the most recent plan date.
fn summarize(patient: Patient, plans: &[TherapyPlan]) -> PatientSummary {
    let matching: Vec<&TherapyPlan> = plans
        .iter()
        .filter(|plan| plan.patient_name == patient.name)
        .collect();
    let active_plans = matching
        .iter()
        .filter(|plan| plan.status == PlanStatus::Active)
        .count() as u32;
    let last_plan_date = matching.first().map(|plan| plan.created_at);

    PatientSummary {
        patient,
        active_plans,
        last_plan_date,
    }
}

/// Case-insensitive substring filter over name and diagnosis.
pub fn search_patients(list: &[PatientSummary], query: &str) -> Vec<PatientSummary> {
    let query = query.to_lowercase();
    list.iter()
        .filter(|summary| {
            summary.patient.name.to_lowercase().contains(&query)
                || summary.patient.diagnosis.to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}

pub async fn create_patient(
    patients: &Collection<Patient>,
    owner_id: &str,
    input: PatientInput,
) -> Result<(Patient, Provenance), RegistryError> {
    let patient = input.into_patient(owner_id);
    let provenance = patients.create(&patient).await?;
    Ok((patient, provenance))
}

/// Full-record replace of an existing patient.
pub async fn update_patient(
    patients: &Collection<Patient>,
    owner_id: &str,
    id: Uuid,
    input: PatientInput,
) -> Result<(Patient, Provenance), RegistryError> {
    let existing = patients
        .get(owner_id, id)
        .await?
        .ok_or(RegistryError::NotFound(id))?;
    let updated = input.apply_to(&existing);
    let provenance = patients.update(&updated).await?;
    Ok((updated, provenance))
}

/// Irreversible delete; unknown ids are a no-op.
pub async fn delete_patient(
    patients: &Collection<Patient>,
    owner_id: &str,
    id: Uuid,
) -> Result<(), RegistryError> {
    patients.delete(owner_id, id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FunctionalLevel;
    use crate::store::{LocalStore, MockRemote};
    use chrono::Utc;
    use std::sync::Arc;

    fn stores() -> (Arc<MockRemote>, Collection<Patient>, Collection<TherapyPlan>) {
        let remote: Arc<MockRemote> = Arc::new(MockRemote::new());
        let local = Arc::new(LocalStore::open_in_memory().unwrap());
        let patients = Collection::new(remote.clone() as Arc<dyn crate::store::RemoteStore>, local.clone());
        let plans = Collection::new(remote.clone() as Arc<dyn crate::store::RemoteStore>, local);
        (remote, patients, plans)
    }

    fn input(name: &str) -> PatientInput {
        PatientInput {
            name: name.into(),
            age: 72,
            diagnosis: "Stroke".into(),
            functional_level: FunctionalLevel::ModerateAssistance,
            interests: String::new(),
            limitations: String::new(),
        }
    }

    fn plan_for(owner: &str, patient_name: &str, status: PlanStatus) -> TherapyPlan {
        TherapyPlan {
            id: Uuid::new_v4(),
            owner_id: owner.into(),
            patient_name: patient_name.into(),
            patient_age: 72,
            diagnosis: "Stroke".into(),
            primary_goal: "Improve fine motor skills".into(),
            plan_data: "{}".into(),
            status,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_then_list_round_trips_input_fields() {
        let (_, patients, plans) = stores();
        create_patient(&patients, "u1", input("Jane Doe")).await.unwrap();

        let listed = list_patients(&patients, &plans, "u1").await.unwrap();
        assert_eq!(listed.len(), 1);
        let p = &listed[0].patient;
        assert_eq!(p.name, "Jane Doe");
        assert_eq!(p.age, 72);
        assert_eq!(p.diagnosis, "Stroke");
        assert_eq!(p.functional_level, FunctionalLevel::ModerateAssistance);
        assert_eq!(listed[0].active_plans, 0);
        assert!(listed[0].last_plan_date.is_none());
    }

    #[tokio::test]
    async fn plan_counts_join_on_name() {
        let (_, patients, plans) = stores();
        create_patient(&patients, "u1", input("Jane Doe")).await.unwrap();
        plans.create(&plan_for("u1", "Jane Doe", PlanStatus::Active)).await.unwrap();
        plans.create(&plan_for("u1", "Jane Doe", PlanStatus::Draft)).await.unwrap();
        plans.create(&plan_for("u1", "Someone Else", PlanStatus::Active)).await.unwrap();

        let listed = list_patients(&patients, &plans, "u1").await.unwrap();
        assert_eq!(listed[0].active_plans, 1);
        assert!(listed[0].last_plan_date.is_some());
    }

    #[tokio::test]
    async fn update_is_full_record_replace() {
        let (_, patients, _plans) = stores();
        let (created, _) = create_patient(&patients, "u1", input("Jane Doe")).await.unwrap();

        let mut replacement = input("Jane Doe");
        replacement.diagnosis = "TBI".into();
        replacement.interests = "Music".into();
        let (updated, _) = update_patient(&patients, "u1", created.id, replacement)
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.diagnosis, "TBI");
        assert_eq!(updated.interests, "Music");

        let fetched = patients.get("u1", created.id).await.unwrap().unwrap();
        assert_eq!(fetched.diagnosis, "TBI");
    }

    #[tokio::test]
    async fn update_unknown_patient_is_not_found() {
        let (_, patients, _) = stores();
        let err = update_patient(&patients, "u1", Uuid::new_v4(), input("X"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_unknown_patient_is_noop() {
        let (_, patients, _) = stores();
        delete_patient(&patients, "u1", Uuid::new_v4()).await.unwrap();
    }

    #[tokio::test]
    async fn crud_survives_remote_outage() {
        let (remote, patients, plans) = stores();
        remote.set_offline(true);

        let (created, provenance) =
            create_patient(&patients, "u1", input("Jane Doe")).await.unwrap();
        assert_eq!(provenance, Provenance::Local);

        let listed = list_patients(&patients, &plans, "u1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].patient.id, created.id);

        let mut replacement = input("Jane Doe");
        replacement.age = 73;
        update_patient(&patients, "u1", created.id, replacement).await.unwrap();
        let fetched = patients.get("u1", created.id).await.unwrap().unwrap();
        assert_eq!(fetched.age, 73);

        delete_patient(&patients, "u1", created.id).await.unwrap();
        assert!(list_patients(&patients, &plans, "u1").await.unwrap().is_empty());
    }

    #[test]
    fn search_matches_name_and_diagnosis_case_insensitive() {
        let jane = PatientSummary {
            patient: input("Jane Doe").into_patient("u1"),
            active_plans: 0,
            last_plan_date: None,
        };
        let mut bob_input = input("Bob Miller");
        bob_input.diagnosis = "Depression".into();
        let bob = PatientSummary {
            patient: bob_input.into_patient("u1"),
            active_plans: 0,
            last_plan_date: None,
        };
        let list = vec![jane, bob];

        assert_eq!(search_patients(&list, "jane").len(), 1);
        assert_eq!(search_patients(&list, "DEPRESS").len(), 1);
        assert_eq!(search_patients(&list, "").len(), 2);
        assert!(search_patients(&list, "nothing").is_empty());
    }
}
