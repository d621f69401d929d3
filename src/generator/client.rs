//! Generation capability client.
//!
//! One call per generation cycle: prompt plus output schema in, a JSON
//! value constrained to that schema out. No streaming, no partial
//! results.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::{GeneratedPlan, Objective, PlanActivity, WeekEntry};

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Generation backend unreachable: {0}")]
    Connection(String),

    #[error("Generation request timed out after {0}s")]
    Timeout(u64),

    #[error("Generation backend error {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("Generation response could not be parsed: {0}")]
    ResponseParsing(String),

    #[error("Intake has not been completed")]
    NotReady,

    #[error("A generated plan is already under review")]
    AlreadyGenerated,
}

#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// One structured generation call; the returned value conforms to
    /// `schema`.
    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &Value,
    ) -> Result<Value, GenerationError>;
}

/// Request body for the backend's structured-generation endpoint.
#[derive(Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    schema: &'a Value,
}

/// Response body: the generated object.
#[derive(Deserialize)]
struct GenerateResponse {
    object: Value,
}

/// HTTP implementation against the generation backend.
pub struct HttpGenerationClient {
    base_url: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpGenerationClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &Value,
    ) -> Result<Value, GenerationError> {
        let url = format!("{}/ai/generate-object", self.base_url);
        let body = GenerateRequest { prompt, schema };

        let response = self.client.post(&url).json(&body).send().await.map_err(|e| {
            if e.is_connect() {
                GenerationError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                GenerationError::Timeout(self.timeout_secs)
            } else {
                GenerationError::Connection(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::ResponseParsing(e.to_string()))?;
        Ok(parsed.object)
    }
}

/// Mock generation client returning a configurable plan.
pub struct MockGeneration {
    plan: GeneratedPlan,
}

impl MockGeneration {
    pub fn new(plan: GeneratedPlan) -> Self {
        Self { plan }
    }

    /// A small but fully-populated fixed plan.
    pub fn fixed() -> Self {
        Self::new(GeneratedPlan {
            plan_title: "Fine Motor Recovery Program".into(),
            overview: "Graded fine-motor and coordination work across eight weeks.".into(),
            objectives: vec![Objective {
                goal: "Improve grip strength".into(),
                measurable_outcome: "Hold a 1kg weight for 10 seconds".into(),
                timeframe: "4 weeks".into(),
            }],
            activities: vec![PlanActivity {
                name: "Clay modeling".into(),
                description: "Therapeutic sculpting with graded resistance clay.".into(),
                duration: "20 minutes".into(),
                materials: vec!["Modeling clay".into(), "Sculpting tools".into()],
                adaptations: "Softer clay for low-strength sessions.".into(),
                progress_measures: "Pieces completed per session".into(),
            }],
            weekly_schedule: vec![WeekEntry {
                week: 1,
                focus: "Baseline and warm-up".into(),
                activities: vec!["Clay modeling".into()],
            }],
            assessment_methods: vec!["Grip dynamometer reading".into()],
            recommendations: vec!["Encourage daily home practice".into()],
        })
    }
}

#[async_trait]
impl GenerationClient for MockGeneration {
    async fn generate_structured(
        &self,
        _prompt: &str,
        _schema: &Value,
    ) -> Result<Value, GenerationError> {
        serde_json::to_value(&self.plan).map_err(|e| GenerationError::ResponseParsing(e.to_string()))
    }
}

/// Mock client whose calls always fail, for exercising retry paths.
pub struct FailingGeneration;

#[async_trait]
impl GenerationClient for FailingGeneration {
    async fn generate_structured(
        &self,
        _prompt: &str,
        _schema: &Value,
    ) -> Result<Value, GenerationError> {
        Err(GenerationError::Connection("mock generation offline".into()))
    }
}
