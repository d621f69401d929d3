//! Generator session state machine.
//!
//! Three states, each carrying only the data valid in that state:
//! `CollectingInput` holds the raw intake form, `Summarizing` holds the
//! validated request, `ReviewingResult` holds the request plus the
//! generated plan. A plan cannot be read before it exists, and a
//! generation cannot be re-submitted while a result is already being
//! reviewed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{FunctionalLevel, GeneratedPlan, PatientInput, SessionFrequency};

use super::client::{GenerationClient, GenerationError};
use super::prompt::build_prompt;
use super::schema::{output_schema, plan_from_value};

const DEFAULT_SESSION_MINUTES: u32 = 60;
const DEFAULT_PROGRAM_WEEKS: u32 = 8;
const ALLOWED_SESSION_MINUTES: &[u32] = &[30, 45, 60, 90];

/// Raw intake form. Required fields stay optional/empty until the
/// therapist fills them; [`IntakeForm::validate`] gates the advance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntakeForm {
    pub patient_name: String,
    pub age: Option<u32>,
    pub diagnosis: String,
    pub functional_level: Option<FunctionalLevel>,
    pub primary_goal: String,
    pub secondary_goals: String,
    pub interests: String,
    pub limitations: String,
    pub session_minutes: Option<u32>,
    pub frequency: Option<SessionFrequency>,
    pub program_weeks: Option<u32>,
}

/// Validated, fully-typed generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub patient_name: String,
    pub age: u32,
    pub diagnosis: String,
    pub functional_level: FunctionalLevel,
    pub primary_goal: String,
    pub secondary_goals: String,
    pub interests: String,
    pub limitations: String,
    pub session_minutes: u32,
    pub frequency: SessionFrequency,
    pub program_weeks: u32,
}

impl PlanRequest {
    /// Patient input for the save-time upsert.
    pub fn to_patient_input(&self) -> PatientInput {
        PatientInput {
            name: self.patient_name.clone(),
            age: self.age,
            diagnosis: self.diagnosis.clone(),
            functional_level: self.functional_level,
            interests: self.interests.clone(),
            limitations: self.limitations.clone(),
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum IntakeError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Age must be a positive integer")]
    InvalidAge,

    #[error("Session duration must be one of 30, 45, 60 or 90 minutes")]
    InvalidSessionMinutes,

    #[error("Program duration must be at least one week")]
    InvalidProgramWeeks,
}

impl IntakeForm {
    /// Check required fields and produce the typed request. Session
    /// parameters default like the original form (60 min, weekly,
    /// 8 weeks).
    pub fn validate(&self) -> Result<PlanRequest, IntakeError> {
        if self.patient_name.trim().is_empty() {
            return Err(IntakeError::MissingField("patientName"));
        }
        let age = self.age.ok_or(IntakeError::MissingField("age"))?;
        if age == 0 {
            return Err(IntakeError::InvalidAge);
        }
        if self.diagnosis.trim().is_empty() {
            return Err(IntakeError::MissingField("diagnosis"));
        }
        let functional_level = self
            .functional_level
            .ok_or(IntakeError::MissingField("functionalLevel"))?;
        if self.primary_goal.trim().is_empty() {
            return Err(IntakeError::MissingField("primaryGoal"));
        }

        let session_minutes = self.session_minutes.unwrap_or(DEFAULT_SESSION_MINUTES);
        if !ALLOWED_SESSION_MINUTES.contains(&session_minutes) {
            return Err(IntakeError::InvalidSessionMinutes);
        }
        let program_weeks = self.program_weeks.unwrap_or(DEFAULT_PROGRAM_WEEKS);
        if program_weeks == 0 {
            return Err(IntakeError::InvalidProgramWeeks);
        }

        Ok(PlanRequest {
            patient_name: self.patient_name.trim().to_string(),
            age,
            diagnosis: self.diagnosis.trim().to_string(),
            functional_level,
            primary_goal: self.primary_goal.trim().to_string(),
            secondary_goals: self.secondary_goals.trim().to_string(),
            interests: self.interests.trim().to_string(),
            limitations: self.limitations.trim().to_string(),
            session_minutes,
            frequency: self.frequency.unwrap_or(SessionFrequency::Weekly),
            program_weeks,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorSession {
    CollectingInput(IntakeForm),
    Summarizing(PlanRequest),
    ReviewingResult {
        request: PlanRequest,
        plan: GeneratedPlan,
    },
}

impl Default for GeneratorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratorSession {
    pub fn new() -> Self {
        GeneratorSession::CollectingInput(IntakeForm::default())
    }

    /// Step 1 → 2: validate the form. Invalid input leaves the session
    /// collecting.
    pub fn advance(&mut self) -> Result<(), IntakeError> {
        if let GeneratorSession::CollectingInput(form) = self {
            let request = form.validate()?;
            *self = GeneratorSession::Summarizing(request);
        }
        Ok(())
    }

    /// Step 2 → 1, keeping the entered values editable.
    pub fn back(&mut self) {
        if let GeneratorSession::Summarizing(request) = self {
            let form = IntakeForm {
                patient_name: request.patient_name.clone(),
                age: Some(request.age),
                diagnosis: request.diagnosis.clone(),
                functional_level: Some(request.functional_level),
                primary_goal: request.primary_goal.clone(),
                secondary_goals: request.secondary_goals.clone(),
                interests: request.interests.clone(),
                limitations: request.limitations.clone(),
                session_minutes: Some(request.session_minutes),
                frequency: Some(request.frequency),
                program_weeks: Some(request.program_weeks),
            };
            *self = GeneratorSession::CollectingInput(form);
        }
    }

    /// Step 2 → 3: one structured generation call. Failure keeps the
    /// session in `Summarizing` so the request can be retried; a
    /// session already reviewing a result refuses to generate again.
    pub async fn generate(
        &mut self,
        client: &dyn GenerationClient,
    ) -> Result<(), GenerationError> {
        let request = match self {
            GeneratorSession::CollectingInput(_) => return Err(GenerationError::NotReady),
            GeneratorSession::ReviewingResult { .. } => {
                return Err(GenerationError::AlreadyGenerated)
            }
            GeneratorSession::Summarizing(request) => request.clone(),
        };

        let prompt = build_prompt(&request);
        let value = client.generate_structured(&prompt, &output_schema()).await?;
        let plan =
            plan_from_value(value).map_err(|e| GenerationError::ResponseParsing(e.to_string()))?;

        *self = GeneratorSession::ReviewingResult { request, plan };
        Ok(())
    }

    /// The reviewed result, only once it exists.
    pub fn result(&self) -> Option<(&PlanRequest, &GeneratedPlan)> {
        match self {
            GeneratorSession::ReviewingResult { request, plan } => Some((request, plan)),
            _ => None,
        }
    }

    /// Clear all state and return to step 1.
    pub fn reset(&mut self) {
        *self = GeneratorSession::new();
    }
}
