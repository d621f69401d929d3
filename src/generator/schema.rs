//! Output schema for the generation call, and schema-validated parsing
//! of stored plan blobs.
//!
//! Parsing always yields either a typed `GeneratedPlan` or a typed
//! `PlanDataError::Malformed`, never a silent null.

use serde_json::{json, Value};
use thiserror::Error;

use crate::models::GeneratedPlan;

#[derive(Error, Debug)]
pub enum PlanDataError {
    #[error("Malformed plan data: {0}")]
    Malformed(String),
}

/// JSON schema the generation capability is constrained to.
pub fn output_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "planTitle": { "type": "string" },
            "overview": { "type": "string" },
            "objectives": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "goal": { "type": "string" },
                        "measurableOutcome": { "type": "string" },
                        "timeframe": { "type": "string" }
                    }
                }
            },
            "activities": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "description": { "type": "string" },
                        "duration": { "type": "string" },
                        "materials": { "type": "array", "items": { "type": "string" } },
                        "adaptations": { "type": "string" },
                        "progressMeasures": { "type": "string" }
                    }
                }
            },
            "weeklySchedule": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "week": { "type": "number" },
                        "focus": { "type": "string" },
                        "activities": { "type": "array", "items": { "type": "string" } }
                    }
                }
            },
            "assessmentMethods": { "type": "array", "items": { "type": "string" } },
            "recommendations": { "type": "array", "items": { "type": "string" } }
        }
    })
}

/// Parse a stored plan blob into its typed structure.
pub fn parse_plan(raw: &str) -> Result<GeneratedPlan, PlanDataError> {
    serde_json::from_str(raw).map_err(|e| PlanDataError::Malformed(e.to_string()))
}

/// Validate a generation response value against the plan structure.
pub fn plan_from_value(value: Value) -> Result<GeneratedPlan, PlanDataError> {
    serde_json::from_value(value).map_err(|e| PlanDataError::Malformed(e.to_string()))
}
