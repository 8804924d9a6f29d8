use super::{ModelClient, ModelRequest};
use crate::config::ModelConfig;
use crate::error::{NavarahError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Runs an external program that reads the prompt on stdin and answers on stdout
pub struct CommandModelClient {
    program: String,
    args: Vec<String>,
    timeout_seconds: u64,
}

impl CommandModelClient {
    pub fn new(config: &ModelConfig) -> Self {
        let (program, args) = parse_command(&config.command);
        CommandModelClient {
            program,
            args,
            timeout_seconds: config.timeout_seconds,
        }
    }

    async fn execute(&self, prompt: &str) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the future on timeout must not leave the child running
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                NavarahError::ModelInvocation(format!("Failed to spawn '{}': {}", self.program, e))
            })?;

        // Feed stdin while stdout is drained, so a chatty child cannot fill the pipe and stall us
        let writer = child.stdin.take().map(|mut stdin| {
            let prompt = prompt.as_bytes().to_vec();
            // stdin drops when the task ends, so the program sees EOF
            tokio::spawn(async move { stdin.write_all(&prompt).await })
        });

        let output = child.wait_with_output().await.map_err(|e| {
            NavarahError::ModelInvocation(format!("Failed to wait for '{}': {}", self.program, e))
        })?;

        if let Some(writer) = writer {
            match writer.await {
                Ok(Ok(())) => {}
                // The program may exit without reading all of its input
                Ok(Err(e)) => warn!(program = %self.program, error = %e, "Prompt not fully written"),
                Err(e) => warn!(program = %self.program, error = %e, "Prompt writer task failed"),
            }
        }

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(NavarahError::ModelInvocation(format!(
                "'{}' exited with status {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )))
        }
    }
}

#[async_trait]
impl ModelClient for CommandModelClient {
    fn name(&self) -> &str {
        &self.program
    }

    async fn generate(&self, request: &ModelRequest) -> Result<String> {
        let timeout_duration = Duration::from_secs(self.timeout_seconds);
        debug!(program = %self.program, flow = request.flow, "Running model command");

        match timeout(timeout_duration, self.execute(&request.prompt)).await {
            Ok(result) => result,
            Err(_) => Err(NavarahError::ModelTimeout(self.timeout_seconds)),
        }
    }
}

/// Parse a command string into program and arguments
/// Handles cases like:
/// - "claude"
/// - "/usr/local/bin/claude"
/// - "claude --print --model sonnet"
fn parse_command(command: &str) -> (String, Vec<String>) {
    let parts: Vec<&str> = command.split_whitespace().collect();
    if parts.is_empty() {
        ("claude".to_string(), vec!["--print".to_string()])
    } else {
        (parts[0].to_string(), parts[1..].iter().map(|s| s.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(prompt: &str) -> ModelRequest {
        ModelRequest {
            flow: "knowledge_search",
            prompt: prompt.to_string(),
            output_schema: json!({}),
        }
    }

    fn client(command: &str, timeout_seconds: u64) -> CommandModelClient {
        CommandModelClient::new(&ModelConfig {
            command: command.to_string(),
            timeout_seconds,
            ..ModelConfig::default()
        })
    }

    #[test]
    fn test_parse_command_simple() {
        let (program, args) = parse_command("claude");
        assert_eq!(program, "claude");
        assert!(args.is_empty());
    }

    #[test]
    fn test_parse_command_with_args() {
        let (program, args) = parse_command("claude --print --model sonnet");
        assert_eq!(program, "claude");
        assert_eq!(args, vec!["--print", "--model", "sonnet"]);
    }

    #[test]
    fn test_parse_command_empty_uses_default() {
        let (program, args) = parse_command("   ");
        assert_eq!(program, "claude");
        assert_eq!(args, vec!["--print"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_prompt_is_piped_through_stdin() {
        let output = client("cat", 5).generate(&request("{\"results\": []}")).await.unwrap();
        assert_eq!(output, "{\"results\": []}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_invocation_error() {
        let err = client("false", 5).generate(&request("x")).await.unwrap_err();
        assert!(matches!(err, NavarahError::ModelInvocation(_)));
    }

    #[tokio::test]
    async fn test_missing_program_is_invocation_error() {
        let err = client("navarah-no-such-program-xyz", 5)
            .generate(&request("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, NavarahError::ModelInvocation(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_large_prompt_is_echoed_without_stalling() {
        // Well beyond a pipe buffer in both directions
        let prompt = "x".repeat(200_000);
        let output = client("cat", 10).generate(&request(&prompt)).await.unwrap();
        assert_eq!(output.len(), prompt.len());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timed_out_child_is_killed() {
        let started = std::time::Instant::now();
        let err = client("sleep 30", 1).generate(&request("")).await.unwrap_err();
        assert!(matches!(err, NavarahError::ModelTimeout(1)));
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
