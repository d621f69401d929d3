use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::FunctionalLevel;
use super::ModelError;
use crate::store::Record;

/// A patient profile, scoped to the therapist (owner) that created it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Uuid,
    #[serde(rename = "userId")]
    pub owner_id: String,
    pub name: String,
    pub age: u32,
    pub diagnosis: String,
    pub functional_level: FunctionalLevel,
    #[serde(default)]
    pub interests: String,
    #[serde(default)]
    pub limitations: String,
    pub created_at: DateTime<Utc>,
}

impl Record for Patient {
    const COLLECTION: &'static str = "patients";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> &str {
        &self.owner_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Form input for creating or fully replacing a patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientInput {
    pub name: String,
    pub age: u32,
    pub diagnosis: String,
    pub functional_level: FunctionalLevel,
    #[serde(default)]
    pub interests: String,
    #[serde(default)]
    pub limitations: String,
}

impl PatientInput {
    /// Name, age and diagnosis are required; functional level is enforced
    /// by the type. Interests and limitations stay free text.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.name.trim().is_empty() {
            return Err(ModelError::InvalidField {
                field: "name",
                reason: "must not be empty".into(),
            });
        }
        if self.age == 0 {
            return Err(ModelError::InvalidField {
                field: "age",
                reason: "must be a positive integer".into(),
            });
        }
        if self.diagnosis.trim().is_empty() {
            return Err(ModelError::InvalidField {
                field: "diagnosis",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Materialize a new patient record for the given owner.
    pub fn into_patient(self, owner_id: &str) -> Patient {
        Patient {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_string(),
            name: self.name,
            age: self.age,
            diagnosis: self.diagnosis,
            functional_level: self.functional_level,
            interests: self.interests,
            limitations: self.limitations,
            created_at: Utc::now(),
        }
    }

    /// Full-record replace: every field overwritten, identity and
    /// creation timestamp kept.
    pub fn apply_to(self, existing: &Patient) -> Patient {
        Patient {
            id: existing.id,
            owner_id: existing.owner_id.clone(),
            name: self.name,
            age: self.age,
            diagnosis: self.diagnosis,
            functional_level: self.functional_level,
            interests: self.interests,
            limitations: self.limitations,
            created_at: existing.created_at,
        }
    }
}

/// Patient plus derived plan stats, joined by patient-name equality at
/// read time. Renaming a patient orphans its plan history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    #[serde(flatten)]
    pub patient: Patient,
    pub active_plans: u32,
    pub last_plan_date: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> PatientInput {
        PatientInput {
            name: "Jane Doe".into(),
            age: 72,
            diagnosis: "Stroke".into(),
            functional_level: FunctionalLevel::ModerateAssistance,
            interests: "Gardening".into(),
            limitations: "Left-side weakness".into(),
        }
    }

    #[test]
    fn valid_input_passes() {
        assert!(valid_input().validate().is_ok());
    }

    #[test]
    fn blank_name_rejected() {
        let mut input = valid_input();
        input.name = "   ".into();
        assert!(input.validate().is_err());
    }

    #[test]
    fn zero_age_rejected() {
        let mut input = valid_input();
        input.age = 0;
        assert!(input.validate().is_err());
    }

    #[test]
    fn blank_diagnosis_rejected() {
        let mut input = valid_input();
        input.diagnosis = "".into();
        assert!(input.validate().is_err());
    }

    #[test]
    fn into_patient_assigns_identity_and_timestamp() {
        let patient = valid_input().into_patient("user_1");
        assert_eq!(patient.owner_id, "user_1");
        assert_eq!(patient.name, "Jane Doe");
        assert_eq!(patient.age, 72);
        assert!(!patient.id.is_nil());
    }

    #[test]
    fn apply_to_keeps_id_and_created_at() {
        let original = valid_input().into_patient("user_1");
        let mut updated_input = valid_input();
        updated_input.diagnosis = "TBI".into();
        let updated = updated_input.apply_to(&original);
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.diagnosis, "TBI");
    }

    #[test]
    fn wire_format_uses_camel_case_and_user_id() {
        let patient = valid_input().into_patient("user_1");
        let json = serde_json::to_value(&patient).unwrap();
        assert_eq!(json["userId"], "user_1");
        assert_eq!(json["functionalLevel"], "moderate-assistance");
        assert!(json["createdAt"].is_string());
    }
}
