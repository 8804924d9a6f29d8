use crate::schema::ValidationErrors;
use std::process::ExitCode;
use thiserror::Error;

/// Process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    Success = 0,
    GeneralError = 1,
    InvalidInput = 2,
    ModelUnavailable = 3,
    InvalidModelOutput = 4,
    Timeout = 5,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status as u8)
    }
}

#[derive(Error, Debug)]
pub enum NavarahError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration file not found at {0}")]
    ConfigNotFound(String),

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    InputValidation(ValidationErrors),

    #[error("Data provider '{provider}' unavailable: {reason}")]
    ProviderUnavailable { provider: &'static str, reason: String },

    #[error("Model invocation failed: {0}")]
    ModelInvocation(String),

    #[error("Model call timed out after {0} seconds")]
    ModelTimeout(u64),

    #[error("Model returned invalid output: {0}")]
    OutputValidation(ValidationErrors),

    #[error("Template error: {0}")]
    Template(String),

    #[error("API key command failed: {0}")]
    ApiKeyCommand(String),

    #[error("URL validation failed: {0}")]
    InvalidUrl(String),

    #[error("User cancelled operation")]
    UserCancelled,
}

impl NavarahError {
    /// Convert error to appropriate exit status
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            NavarahError::Config(_)
            | NavarahError::ConfigNotFound(_)
            | NavarahError::ConfigInvalid(_)
            | NavarahError::Io(_)
            | NavarahError::TomlParse(_)
            | NavarahError::TomlSerialize(_)
            | NavarahError::Json(_)
            | NavarahError::Template(_)
            | NavarahError::ApiKeyCommand(_)
            | NavarahError::InvalidUrl(_)
            | NavarahError::ProviderUnavailable { .. }
            | NavarahError::UserCancelled => ExitStatus::GeneralError,

            NavarahError::InputValidation(_) => ExitStatus::InvalidInput,

            NavarahError::ModelInvocation(_) => ExitStatus::ModelUnavailable,

            NavarahError::ModelTimeout(_) => ExitStatus::Timeout,

            NavarahError::OutputValidation(_) => ExitStatus::InvalidModelOutput,
        }
    }

    /// Whether the caller may retry the same request unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            NavarahError::ModelInvocation(_) | NavarahError::ModelTimeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, NavarahError>;
