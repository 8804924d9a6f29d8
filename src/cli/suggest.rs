use crate::cli::SuggestArgs;
use crate::config::Config;
use crate::error::{ExitStatus, NavarahError, Result};
use crate::flow::{HealthSuggestionInput, HealthSuggestionOutput, SuggestionFlow};
use crate::health::{HealthDataProvider, JsonFileHealthData, SampleHealthData};
use crate::model::build_model_client;
use crate::schema::{FieldError, ValidationErrors};
use crate::ui;
use std::fs;
use std::sync::Arc;
use tracing::info;

/// Run the suggest command
pub async fn run_suggest(args: SuggestArgs, config: &Config) -> Result<ExitStatus> {
    let input = request_from_args(&args)?;

    let provider: Arc<dyn HealthDataProvider> =
        match args.health_data.as_ref().or(config.data.health_data.as_ref()) {
            Some(path) => {
                info!(path = %path.display(), "Using health records file");
                Arc::new(JsonFileHealthData::new(path.clone()))
            }
            None => Arc::new(SampleHealthData),
        };

    let model = build_model_client(&config.model)?;
    let flow = SuggestionFlow::new(model, provider)?;

    if args.dry_run {
        println!("{}", flow.render_prompt(input).await?);
        return Ok(ExitStatus::Success);
    }

    let spinner = ui::Spinner::new("Preparing your health suggestions...");
    let output = match flow.invoke(input).await {
        Ok(output) => {
            spinner.finish_and_clear();
            output
        }
        Err(e) => {
            spinner.finish_with_error("Could not get suggestions");
            return Err(e);
        }
    };

    if args.json {
        ui::print_json(&output)?;
    } else {
        print_suggestions(&output);
    }
    Ok(ExitStatus::Success)
}

fn request_from_args(args: &SuggestArgs) -> Result<HealthSuggestionInput> {
    if let Some(ref path) = args.input {
        let content = fs::read_to_string(path)?;
        let value = serde_json::from_str(&content).map_err(|e| {
            NavarahError::InputValidation(ValidationErrors::single(FieldError::custom(
                "$",
                format!("request file is not valid JSON: {}", e),
            )))
        })?;
        return HealthSuggestionInput::from_json(value);
    }

    let age = args.age.ok_or_else(|| {
        NavarahError::InputValidation(ValidationErrors::single(FieldError::custom(
            "$.age",
            "expected number, found missing",
        )))
    })?;

    Ok(HealthSuggestionInput {
        age,
        is_mother: args.mother,
        is_child: args.child,
        concerns: args.concerns.clone(),
        activity_level: args.activity_level.clone(),
    })
}

fn print_suggestions(output: &HealthSuggestionOutput) {
    if output.suggestions.is_empty() {
        ui::print_info("No suggestions right now.");
        return;
    }
    ui::print_heading("Health suggestions");
    for suggestion in &output.suggestions {
        ui::print_bullet(suggestion);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args() -> SuggestArgs {
        SuggestArgs {
            age: Some(31.0),
            mother: true,
            child: false,
            concerns: Some("Fatigue".to_string()),
            activity_level: None,
            input: None,
            health_data: None,
            dry_run: false,
            json: false,
        }
    }

    #[test]
    fn test_request_from_flags() {
        let input = request_from_args(&args()).unwrap();
        assert_eq!(input.age, 31.0);
        assert!(input.is_mother);
        assert_eq!(input.concerns.as_deref(), Some("Fatigue"));
    }

    #[test]
    fn test_request_from_file_is_shape_checked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.json");
        fs::write(&path, r#"{"age": 2, "is_mother": false, "is_child": "yes"}"#).unwrap();

        let err = request_from_args(&SuggestArgs {
            input: Some(path),
            age: None,
            ..args()
        })
        .unwrap_err();
        assert!(matches!(err, NavarahError::InputValidation(_)));
        assert_eq!(err.exit_status(), ExitStatus::InvalidInput);
    }

    #[test]
    fn test_malformed_request_file_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.json");
        fs::write(&path, r#"{"age": 2, "is_mother": "#).unwrap();

        let err = request_from_args(&SuggestArgs {
            input: Some(path),
            age: None,
            ..args()
        })
        .unwrap_err();
        match err {
            NavarahError::InputValidation(ref errors) => assert_eq!(errors.paths(), vec!["$"]),
            ref other => panic!("expected input validation error, got {:?}", other),
        }
        assert_eq!(err.exit_status(), ExitStatus::InvalidInput);
    }

    #[test]
    fn test_missing_request_file_is_io_error() {
        let err = request_from_args(&SuggestArgs {
            input: Some(PathBuf::from("/nonexistent/navarah/request.json")),
            ..args()
        })
        .unwrap_err();
        assert!(matches!(err, NavarahError::Io(_)));
    }
}
