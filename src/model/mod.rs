//! Generative-model backends.

mod command;
mod http;

pub use command::CommandModelClient;
pub use http::HttpModelClient;

use crate::config::{self, Backend, ModelConfig};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// One model call: the rendered prompt and the JSON Schema the answer must follow
#[derive(Debug, Clone)]
pub struct ModelRequest {
    /// Flow name, used as the schema name and in logs
    pub flow: &'static str,
    pub prompt: String,
    pub output_schema: Value,
}

/// A generative model reachable from this process.
///
/// Implementations are shared across concurrent flow invocations. They
/// return the raw response text; an empty string means the model produced
/// no content. Errors are model invocation failures only.
#[async_trait]
pub trait ModelClient: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, request: &ModelRequest) -> Result<String>;
}

/// Build the configured backend once for the whole process
pub fn build_model_client(config: &ModelConfig) -> Result<Arc<dyn ModelClient>> {
    match config.backend {
        Backend::Http => {
            let api_key = config::resolve_api_key(config)?;
            Ok(Arc::new(HttpModelClient::new(config, api_key)?))
        }
        Backend::Command => Ok(Arc::new(CommandModelClient::new(config))),
    }
}
