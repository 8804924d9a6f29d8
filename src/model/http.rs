use super::{ModelClient, ModelRequest};
use crate::config::ModelConfig;
use crate::error::{NavarahError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    schema: &'a Value,
    strict: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat completions client.
///
/// Holds one pooled `reqwest::Client`; clone the `Arc` around it rather than
/// building a client per call.
pub struct HttpModelClient {
    client: Client,
    endpoint: Url,
    model: String,
    api_key: Option<String>,
    temperature: Option<f32>,
    json_mode: bool,
    timeout_seconds: u64,
}

impl HttpModelClient {
    pub fn new(config: &ModelConfig, api_key: Option<String>) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| NavarahError::InvalidUrl(format!("{}: {}", config.endpoint, e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| NavarahError::ModelInvocation(format!("Failed to create HTTP client: {}", e)))?;

        Ok(HttpModelClient {
            client,
            endpoint,
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
            json_mode: config.json_mode,
            timeout_seconds: config.timeout_seconds,
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> NavarahError {
        if e.is_timeout() {
            NavarahError::ModelTimeout(self.timeout_seconds)
        } else {
            NavarahError::ModelInvocation(format!("Request failed: {}", e))
        }
    }
}

#[async_trait]
impl ModelClient for HttpModelClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &ModelRequest) -> Result<String> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: &request.prompt,
            }],
            temperature: self.temperature,
            response_format: self.json_mode.then(|| ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: request.flow,
                    schema: &request.output_schema,
                    strict: false,
                },
            }),
        };

        debug!(
            endpoint = %self.endpoint,
            model = %self.model,
            flow = request.flow,
            prompt_chars = request.prompt.len(),
            "Calling chat completions endpoint"
        );

        let mut builder = self.client.post(self.endpoint.clone()).json(&body);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NavarahError::ModelInvocation(format!(
                "API returned status {}: {}",
                status,
                body.trim()
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                NavarahError::ModelTimeout(self.timeout_seconds)
            } else {
                NavarahError::ModelInvocation(format!("Failed to decode response: {}", e))
            }
        })?;

        // No choices or null content both mean the model said nothing
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        debug!(flow = request.flow, response_chars = content.len(), "Model responded");
        Ok(content)
    }
}
