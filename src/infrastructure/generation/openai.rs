//! OpenAI chat-completions generation provider

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::generation::GenerationProvider;
use crate::domain::DomainError;
use crate::infrastructure::http::HttpClientTrait;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_GENERATION_MODEL: &str = "gpt-4o-mini";

/// OpenAI chat-completions provider producing one answer per prompt.
/// Temperature is pinned at zero; policy answers must be reproducible.
#[derive(Debug)]
pub struct OpenAiGenerationProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
    model: String,
}

impl<C: HttpClientTrait> OpenAiGenerationProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, model, DEFAULT_OPENAI_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            auth_header: format!("Bearer {}", api_key.into()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }
}

#[async_trait]
impl<C: HttpClientTrait> GenerationProvider for OpenAiGenerationProvider<C> {
    async fn generate(&self, prompt: &str) -> Result<String, DomainError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": 0.0,
        });

        let json = self
            .client
            .post_json(&self.completions_url(), self.headers(), &body)
            .await?;

        let response: OpenAiChatResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("openai", format!("Failed to parse chat response: {}", e))
        })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::provider("openai", "No choices in response"))?;

        Ok(choice.message.content.unwrap_or_default().trim().to_string())
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::mock::MockHttpClient;

    const TEST_URL: &str = "https://api.openai.com/v1/chat/completions";

    #[tokio::test]
    async fn test_generate_returns_first_choice() {
        let response = serde_json::json!({
            "id": "chatcmpl-1",
            "model": DEFAULT_GENERATION_MODEL,
            "choices": [{
                "message": { "role": "assistant", "content": "  Thirty days.  " }
            }]
        });
        let client = MockHttpClient::new().with_response(TEST_URL, response);
        let provider = OpenAiGenerationProvider::new(client, "test-key", DEFAULT_GENERATION_MODEL);

        let answer = provider.generate("What is the grace period?").await.unwrap();
        assert_eq!(answer, "Thirty days.");
    }

    #[tokio::test]
    async fn test_generate_without_choices_is_error() {
        let response = serde_json::json!({ "id": "chatcmpl-2", "choices": [] });
        let client = MockHttpClient::new().with_response(TEST_URL, response);
        let provider = OpenAiGenerationProvider::new(client, "test-key", DEFAULT_GENERATION_MODEL);

        assert!(provider.generate("q").await.is_err());
    }

    #[tokio::test]
    async fn test_generate_surfaces_http_error() {
        let client = MockHttpClient::new().with_error(TEST_URL, "Rate limit exceeded");
        let provider = OpenAiGenerationProvider::new(client, "test-key", DEFAULT_GENERATION_MODEL);

        assert!(provider.generate("q").await.is_err());
    }
}
