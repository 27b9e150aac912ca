//! Itinerary generation collaborator.
//!
//! Plan generation happens in an upstream service; this crate only carries
//! the criteria over and stores whatever comes back, wrapped into the opaque
//! plan document. Nothing here participates in authorization.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::error::{AppError, Result};

/// Search criteria a caller submits to have a plan generated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanCriteria {
    /// Free-text query, also embedded in the stored document for search
    pub query: String,
    /// Structured options passed through to the generator untouched
    #[serde(default)]
    pub options: Value,
}

/// Plan generation seam
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    /// Produce a plan payload for the given criteria.
    async fn generate(&self, criteria: &PlanCriteria) -> Result<Value>;
}

/// HTTP adapter for the plan generation service
pub struct HttpPlanGenerator {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPlanGenerator {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PlanGenerator for HttpPlanGenerator {
    async fn generate(&self, criteria: &PlanCriteria) -> Result<Value> {
        let url = format!("{}/v1/plans", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(criteria)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Plan service unreachable: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Plan service returned status {}",
                resp.status()
            )));
        }

        resp.json::<Value>()
            .await
            .map_err(|e| AppError::Upstream(format!("Plan service returned invalid JSON: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plan_criteria_options_default_to_null() {
        let criteria: PlanCriteria =
            serde_json::from_value(json!({"query": "weekend in Kyoto"})).unwrap();
        assert_eq!(criteria.query, "weekend in Kyoto");
        assert!(criteria.options.is_null());
    }

    #[test]
    fn test_plan_criteria_passes_options_through() {
        let criteria: PlanCriteria = serde_json::from_value(json!({
            "query": "weekend in Kyoto",
            "options": {"days": 2, "budget": "mid"}
        }))
        .unwrap();
        assert_eq!(criteria.options["days"], 2);
    }

    #[test]
    fn test_http_generator_trims_trailing_slash() {
        let generator = HttpPlanGenerator::new("http://planner:9000/");
        assert_eq!(generator.base_url, "http://planner:9000");
    }
}
