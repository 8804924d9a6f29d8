//! Structured prompt flows: typed request in, validated typed response out.

mod knowledge;
mod suggestion;

pub use knowledge::*;
pub use suggestion::*;

use crate::error::{NavarahError, Result};
use crate::model::{ModelClient, ModelRequest};
use crate::schema::{self, Shape};
use crate::template::Template;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The shared render, invoke, validate pipeline behind every flow
pub struct PromptFlow {
    name: &'static str,
    template: Template,
    output: Shape,
    output_schema: Value,
    model: Arc<dyn ModelClient>,
}

impl PromptFlow {
    pub fn new(
        name: &'static str,
        template_source: &str,
        output: Shape,
        model: Arc<dyn ModelClient>,
    ) -> Result<Self> {
        let template = Template::parse(template_source).map_err(|e| match e {
            NavarahError::Template(msg) => NavarahError::Template(format!("{} template: {}", name, msg)),
            other => other,
        })?;
        let output_schema = output.to_json_schema();
        Ok(PromptFlow {
            name,
            template,
            output,
            output_schema,
            model,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Full prompt text: rendered template plus the output-format instruction
    pub fn render(&self, context: &Value) -> String {
        let mut prompt = self.template.render(context);
        let schema = serde_json::to_string_pretty(&self.output_schema)
            .unwrap_or_else(|_| self.output_schema.to_string());
        prompt.push_str("\nRespond with ONLY a JSON object matching this JSON Schema, no other text:\n");
        prompt.push_str(&schema);
        prompt.push('\n');
        prompt
    }

    /// Render, call the model once, and validate its answer
    pub async fn run<T: DeserializeOwned>(&self, context: &Value) -> Result<T> {
        let prompt = self.render(context);
        debug!(flow = self.name, model = self.model.name(), prompt_chars = prompt.len(), "Invoking model");

        let request = ModelRequest {
            flow: self.name,
            prompt,
            output_schema: self.output_schema.clone(),
        };
        let raw = self.model.generate(&request).await?;

        let output = schema::parse_model_output(&raw, &self.output).map_err(|errors| {
            warn!(flow = self.name, errors = %errors, "Model output failed validation");
            NavarahError::OutputValidation(errors)
        })?;
        info!(flow = self.name, "Flow completed");
        Ok(output)
    }
}

/// Check an untyped request against its shape, then deserialize it
pub fn parse_request<T: DeserializeOwned>(shape: &Shape, value: Value) -> Result<T> {
    shape.parse(value).map_err(NavarahError::InputValidation)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted responses and records every prompt it receives
    pub(crate) struct ScriptedModel {
        responses: Mutex<VecDeque<std::result::Result<String, String>>>,
        prompts: Mutex<Vec<ModelRequest>>,
    }

    impl ScriptedModel {
        pub(crate) fn new(responses: Vec<std::result::Result<&str, &str>>) -> Arc<Self> {
            Arc::new(ScriptedModel {
                responses: Mutex::new(
                    responses
                        .into_iter()
                        .map(|r| r.map(str::to_string).map_err(str::to_string))
                        .collect(),
                ),
                prompts: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn replying(body: &str) -> Arc<Self> {
            Self::new(vec![Ok(body)])
        }

        pub(crate) fn requests(&self) -> Vec<ModelRequest> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedModel {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, request: &ModelRequest) -> Result<String> {
            self.prompts.lock().unwrap().push(request.clone());
            match self.responses.lock().unwrap().pop_front() {
                Some(Ok(body)) => Ok(body),
                Some(Err(reason)) => Err(NavarahError::ModelInvocation(reason)),
                None => Err(NavarahError::ModelInvocation("no scripted response left".to_string())),
            }
        }
    }

    #[derive(Debug, Deserialize)]
    struct Echo {
        words: Vec<String>,
    }

    fn echo_flow(model: Arc<ScriptedModel>) -> PromptFlow {
        let shape = Shape::object([crate::schema::Field::required("words", Shape::array(Shape::String))]);
        PromptFlow::new("echo", "Say {{word}}.", shape, model).unwrap()
    }

    #[tokio::test]
    async fn test_run_renders_prompt_with_schema_instruction() {
        let model = ScriptedModel::replying(r#"{"words": ["hi"]}"#);
        let flow = echo_flow(model.clone());

        let out: Echo = flow.run(&json!({"word": "hi"})).await.unwrap();
        assert_eq!(out.words, vec!["hi"]);

        let requests = model.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].prompt.starts_with("Say hi.\n"));
        assert!(requests[0].prompt.contains("\"words\""));
        assert_eq!(requests[0].flow, "echo");
        assert_eq!(requests[0].output_schema["type"], "object");
    }

    #[tokio::test]
    async fn test_invocation_error_is_distinct_from_validation_error() {
        let model = ScriptedModel::new(vec![Err("quota exceeded"), Ok(r#"{"words": "hi"}"#), Ok("")]);
        let flow = echo_flow(model);

        let first = flow.run::<Echo>(&json!({})).await.unwrap_err();
        assert!(matches!(first, NavarahError::ModelInvocation(_)));

        let second = flow.run::<Echo>(&json!({})).await.unwrap_err();
        assert!(matches!(second, NavarahError::OutputValidation(_)));

        // empty output is rejected rather than returned as nothing
        let third = flow.run::<Echo>(&json!({})).await.unwrap_err();
        assert!(matches!(third, NavarahError::OutputValidation(_)));
    }

    #[test]
    fn test_bad_template_fails_construction() {
        let result = PromptFlow::new(
            "broken",
            "{{#if x}}never closed",
            Shape::String,
            ScriptedModel::replying("{}"),
        );
        assert!(matches!(result, Err(NavarahError::Template(_))));
    }
}
