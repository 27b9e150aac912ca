//! Photo enrichment collaborator.
//!
//! Consulted only when shaping responses for display; never part of
//! authorization, and a lookup failure degrades to "no image" rather than
//! failing the request.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::error::{AppError, Result};

/// Photo lookup seam
#[async_trait]
pub trait ImageEnricher: Send + Sync {
    /// A representative photo URL for a location, when one exists.
    async fn cover_image(&self, location: &str) -> Result<Option<String>>;
}

/// HTTP adapter for the photo lookup service
pub struct HttpImageEnricher {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpImageEnricher {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

fn first_photo_url(body: &Value) -> Option<String> {
    body.pointer("/results/0/url")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl ImageEnricher for HttpImageEnricher {
    async fn cover_image(&self, location: &str) -> Result<Option<String>> {
        let url = format!("{}/v1/photos", self.base_url);
        let mut request = self.client.get(&url).query(&[("query", location)]);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", key);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Image service unreachable: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Image service returned status {}",
                resp.status()
            )));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Image service returned invalid JSON: {e}")))?;

        Ok(first_photo_url(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_photo_url_picks_first_result() {
        let body = json!({"results": [
            {"url": "https://photos.example/paris-1.jpg"},
            {"url": "https://photos.example/paris-2.jpg"}
        ]});
        assert_eq!(
            first_photo_url(&body),
            Some("https://photos.example/paris-1.jpg".to_string())
        );
    }

    #[test]
    fn test_first_photo_url_empty_results() {
        assert_eq!(first_photo_url(&json!({"results": []})), None);
    }

    #[test]
    fn test_first_photo_url_malformed_body() {
        assert_eq!(first_photo_url(&json!({"photos": "nope"})), None);
        assert_eq!(first_photo_url(&json!({"results": [{"link": "x"}]})), None);
    }
}
