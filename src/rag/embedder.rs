use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::PipelineError;

/// Maps text to fixed-dimension vectors via an external service.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// One vector per input, in input order.
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, PipelineError>;
}

/// Embedding client for an OpenAI-compatible `/v1/embeddings` endpoint.
#[derive(Clone)]
pub struct HttpEmbedder {
    base_url: String,
    api_key: String,
    model: String,
    client: Client,
}

impl HttpEmbedder {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, PipelineError> {
        let url = format!("{}/v1/embeddings", self.base_url);

        let body = json!({
            "model": self.model,
            "input": inputs,
        });

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(PipelineError::external)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(PipelineError::ExternalService(format!(
                "embeddings request failed ({}): {}",
                status, text
            )));
        }

        let payload: Value = res.json().await.map_err(PipelineError::external)?;

        let mut embeddings = Vec::new();
        if let Some(data) = payload["data"].as_array() {
            for item in data {
                if let Some(vals) = item["embedding"].as_array() {
                    let vec: Vec<f32> = vals
                        .iter()
                        .filter_map(|v| v.as_f64().map(|f| f as f32))
                        .collect();
                    embeddings.push(vec);
                }
            }
        }

        if embeddings.len() != inputs.len() {
            return Err(PipelineError::ExternalService(format!(
                "provider returned {} embeddings for {} inputs",
                embeddings.len(),
                inputs.len()
            )));
        }

        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn parses_embeddings_response() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/embeddings")
                    .header("authorization", "Bearer test-key");
                then.status(200).json_body(json!({
                    "data": [
                        {"embedding": [0.1, 0.2]},
                        {"embedding": [0.3, 0.4]}
                    ]
                }));
            })
            .await;

        let embedder = HttpEmbedder::new(&server.base_url(), "test-key", "embed-model");
        let vectors = embedder
            .embed(&["one".to_string(), "two".to_string()])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0], vec![0.1, 0.2]);
        assert_eq!(vectors[1], vec![0.3, 0.4]);
    }

    #[tokio::test]
    async fn non_success_status_is_external_service_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/embeddings");
                then.status(429).body("rate limited");
            })
            .await;

        let embedder = HttpEmbedder::new(&server.base_url(), "test-key", "embed-model");
        let result = embedder.embed(&["one".to_string()]).await;

        assert!(matches!(result, Err(PipelineError::ExternalService(_))));
    }

    #[tokio::test]
    async fn count_mismatch_is_external_service_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/embeddings");
                then.status(200).json_body(json!({"data": []}));
            })
            .await;

        let embedder = HttpEmbedder::new(&server.base_url(), "test-key", "embed-model");
        let result = embedder.embed(&["one".to_string()]).await;

        assert!(matches!(result, Err(PipelineError::ExternalService(_))));
    }
}
