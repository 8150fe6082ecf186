use async_trait::async_trait;
use reqwest::Client;

use crate::provider::{LLMError, LLMProvider, Result};
use crate::types::LLMReply;
use agent_core::{tools::ToolSchema, Message};

use super::common::openai_compat::{build_openai_compat_body, parse_openai_compat_response};

/// Gemini's OpenAI-compatible endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-001";

pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAIProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn send(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        system_instruction: Option<&str>,
    ) -> Result<LLMReply> {
        let body = build_openai_compat_body(&self.model, messages, tools, system_instruction);

        log::debug!(
            "sending {} messages and {} tools to {} ({})",
            messages.len(),
            tools.len(),
            self.base_url,
            self.model
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(LLMError::Api(format!("HTTP {}: {}", status, text)));
        }

        parse_openai_compat_response(&text)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::tools::{FunctionSchema, ToolSchema};
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn list_tool() -> ToolSchema {
        ToolSchema {
            schema_type: "function".to_string(),
            function: FunctionSchema {
                name: "list_directory".to_string(),
                description: "List files".to_string(),
                parameters: json!({"type": "object", "properties": {}}),
            },
        }
    }

    #[test]
    fn test_new_provider() {
        let provider = OpenAIProvider::new("test_key");
        assert_eq!(provider.api_key, "test_key");
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
        assert_eq!(provider.model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_with_base_url_and_model() {
        let provider = OpenAIProvider::new("test_key")
            .with_base_url("https://api.openai.com/v1/")
            .with_model("gpt-4o-mini");
        assert_eq!(provider.base_url, "https://api.openai.com/v1");
        assert_eq!(provider.model(), "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_send_parses_tool_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_9",
                            "type": "function",
                            "function": {"name": "list_directory", "arguments": "{}"}
                        }]
                    }
                }],
                "usage": {"prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenAIProvider::new("secret")
            .with_base_url(server.uri())
            .with_model("test-model");
        let reply = provider
            .send(&[Message::user("what is here?")], &[list_tool()], Some("system"))
            .await
            .unwrap();

        assert_eq!(reply.tool_calls.len(), 1);
        assert_eq!(reply.tool_calls[0].id, "call_9");
        assert_eq!(reply.usage.unwrap().prompt_tokens, 3);
    }

    #[tokio::test]
    async fn test_send_reports_http_failures_as_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let provider = OpenAIProvider::new("wrong").with_base_url(server.uri());
        let error = provider
            .send(&[Message::user("hi")], &[], None)
            .await
            .unwrap_err();

        match error {
            LLMError::Api(message) => {
                assert!(message.contains("401"));
                assert!(message.contains("bad key"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
