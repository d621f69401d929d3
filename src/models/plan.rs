use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::PlanStatus;
use crate::store::Record;

/// A saved therapy plan. `patient_name` is a denormalized copy of the
/// patient's name at save time, not a reference. The generated plan
/// structure lives in `plan_data` as a serialized blob; parse it with
/// [`crate::generator::schema::parse_plan`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TherapyPlan {
    pub id: Uuid,
    #[serde(rename = "userId")]
    pub owner_id: String,
    pub patient_name: String,
    pub patient_age: u32,
    pub diagnosis: String,
    pub primary_goal: String,
    pub plan_data: String,
    pub status: PlanStatus,
    pub created_at: DateTime<Utc>,
}

impl Record for TherapyPlan {
    const COLLECTION: &'static str = "therapy_plans";

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

impl TherapyPlan {
    /// Clone this plan under a new identity: " (Copy)" name suffix,
    /// status forced back to draft, creation timestamp now. Everything
    /// else is carried over unchanged, including the opaque blob.
    pub fn duplicate(&self) -> TherapyPlan {
        TherapyPlan {
            id: Uuid::new_v4(),
            owner_id: self.owner_id.clone(),
            patient_name: format!("{} (Copy)", self.patient_name),
            patient_age: self.patient_age,
            diagnosis: self.diagnosis.clone(),
            primary_goal: self.primary_goal.clone(),
            plan_data: self.plan_data.clone(),
            status: PlanStatus::Draft,
            created_at: Utc::now(),
        }
    }
}

/// The structured output the generation capability is constrained to
/// produce. Stored serialized in `TherapyPlan::plan_data`; list fields
/// default to empty so a plan missing a section still parses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPlan {
    #[serde(default)]
    pub plan_title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub objectives: Vec<Objective>,
    #[serde(default)]
    pub activities: Vec<PlanActivity>,
    #[serde(default)]
    pub weekly_schedule: Vec<WeekEntry>,
    #[serde(default)]
    pub assessment_methods: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Objective {
    pub goal: String,
    #[serde(default)]
    pub measurable_outcome: String,
    #[serde(default)]
    pub timeframe: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanActivity {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub adaptations: String,
    #[serde(default)]
    pub progress_measures: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekEntry {
    pub week: u32,
    #[serde(default)]
    pub focus: String,
    #[serde(default)]
    pub activities: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_plan(owner: &str) -> TherapyPlan {
        TherapyPlan {
            id: Uuid::new_v4(),
            owner_id: owner.into(),
            patient_name: "Jane Doe".into(),
            patient_age: 72,
            diagnosis: "Stroke".into(),
            primary_goal: "Improve fine motor skills".into(),
            plan_data: "{}".into(),
            status: PlanStatus::Active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn duplicate_gets_new_identity_and_draft_status() {
        let plan = sample_plan("user_1");
        let copy = plan.duplicate();
        assert_ne!(copy.id, plan.id);
        assert_eq!(copy.patient_name, "Jane Doe (Copy)");
        assert_eq!(copy.status, PlanStatus::Draft);
        assert_eq!(copy.patient_age, plan.patient_age);
        assert_eq!(copy.diagnosis, plan.diagnosis);
        assert_eq!(copy.primary_goal, plan.primary_goal);
        assert_eq!(copy.plan_data, plan.plan_data);
        assert_eq!(copy.owner_id, plan.owner_id);
    }

    #[test]
    fn generated_plan_parses_with_missing_sections() {
        let parsed: GeneratedPlan =
            serde_json::from_str(r#"{"planTitle":"Motor Recovery Program"}"#).unwrap();
        assert_eq!(parsed.plan_title, "Motor Recovery Program");
        assert!(parsed.objectives.is_empty());
        assert!(parsed.activities.is_empty());
    }

    #[test]
    fn generated_plan_wire_names_are_camel_case() {
        let plan = GeneratedPlan {
            plan_title: "T".into(),
            weekly_schedule: vec![WeekEntry {
                week: 1,
                focus: "Baseline".into(),
                activities: vec!["Warm-up".into()],
            }],
            ..Default::default()
        };
        let json = serde_json::to_value(&plan).unwrap();
        assert!(json.get("planTitle").is_some());
        assert!(json.get("weeklySchedule").is_some());
        assert!(json.get("assessmentMethods").is_some());
    }

    #[test]
    fn therapy_plan_wire_format() {
        let plan = sample_plan("user_9");
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["userId"], "user_9");
        assert_eq!(json["patientName"], "Jane Doe");
        assert_eq!(json["status"], "active");
        assert!(json["planData"].is_string());
    }
}
