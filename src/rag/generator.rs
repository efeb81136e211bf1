use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::splitter::Chunk;
use super::PipelineError;

/// Produces a natural-language answer from a query and retrieved context.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, query: &str, context: &[Chunk]) -> Result<String, PipelineError>;
}

/// Generation client for an OpenAI-compatible `/v1/chat/completions` endpoint.
///
/// All retrieved context goes into a single prompt, in retrieved order,
/// followed by the question.
#[derive(Clone)]
pub struct HttpGenerator {
    base_url: String,
    api_key: String,
    model: String,
    client: Client,
}

impl HttpGenerator {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: Client::new(),
        }
    }
}

/// Stuffed prompt: context chunks in retrieved order, then the question.
pub fn stuff_prompt(query: &str, context: &[Chunk]) -> String {
    let mut prompt = String::from("Use the following context to answer the question.\n\n");
    for chunk in context {
        prompt.push_str(&chunk.text);
        prompt.push_str("\n\n");
    }
    prompt.push_str("Question: ");
    prompt.push_str(query);
    prompt
}

#[async_trait]
impl AnswerGenerator for HttpGenerator {
    async fn generate(&self, query: &str, context: &[Chunk]) -> Result<String, PipelineError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "user", "content": stuff_prompt(query, context)}
            ],
            "stream": false,
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
                "chat completion failed ({}): {}",
                status, text
            )));
        }

        let payload: Value = res.json().await.map_err(PipelineError::external)?;

        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string();

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn chunk(index: usize, text: &str) -> Chunk {
        Chunk {
            text: text.to_string(),
            index,
            start_offset: 0,
        }
    }

    #[test]
    fn prompt_keeps_context_in_retrieved_order() {
        let context = vec![chunk(3, "second fact"), chunk(1, "first fact")];

        let prompt = stuff_prompt("what?", &context);

        let second = prompt.find("second fact").unwrap();
        let first = prompt.find("first fact").unwrap();
        assert!(second < first);
        assert!(prompt.ends_with("Question: what?"));
    }

    #[tokio::test]
    async fn parses_chat_completion_response() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/chat/completions")
                    .header("authorization", "Bearer test-key");
                then.status(200).json_body(json!({
                    "choices": [
                        {"message": {"role": "assistant", "content": "30 days."}}
                    ]
                }));
            })
            .await;

        let generator = HttpGenerator::new(&server.base_url(), "test-key", "chat-model");
        let answer = generator
            .generate("How long is the refund window?", &[chunk(0, "Refunds: 30 days.")])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(answer, "30 days.");
    }

    #[tokio::test]
    async fn non_success_status_is_external_service_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(500).body("boom");
            })
            .await;

        let generator = HttpGenerator::new(&server.base_url(), "test-key", "chat-model");
        let result = generator.generate("q", &[]).await;

        assert!(matches!(result, Err(PipelineError::ExternalService(_))));
    }
}
