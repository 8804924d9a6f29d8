//! Declarative shape checking for untyped JSON.
//!
//! A [`Shape`] describes the structure a request or a model response must
//! have. Validation walks the whole value and reports every failing field
//! path, so a caller sees all problems at once instead of the first one.

mod extract;

pub use extract::extract_json;

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    String,
    Number,
    Boolean,
    Object(Vec<Field>),
    Array(Box<Shape>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub shape: Shape,
    pub required: bool,
    pub description: Option<String>,
}

impl Field {
    pub fn required(name: &str, shape: Shape) -> Self {
        Field {
            name: name.to_string(),
            shape,
            required: true,
            description: None,
        }
    }

    pub fn optional(name: &str, shape: Shape) -> Self {
        Field {
            required: false,
            ..Field::required(name, shape)
        }
    }

    /// Attach a description, exported into the JSON Schema sent to the model
    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// A single failing location in a validated value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, expected: &str, found: &str) -> Self {
        FieldError {
            path: path.into(),
            message: format!("expected {}, found {}", expected, found),
        }
    }

    pub fn custom(path: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Every failing field of one validation pass, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn single(error: FieldError) -> Self {
        ValidationErrors(vec![error])
    }

    pub fn from_errors(errors: Vec<FieldError>) -> Self {
        ValidationErrors(errors)
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn paths(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.path.as_str()).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{}", joined)
    }
}

impl Shape {
    pub fn array(item: Shape) -> Self {
        Shape::Array(Box::new(item))
    }

    pub fn object(fields: impl IntoIterator<Item = Field>) -> Self {
        Shape::Object(fields.into_iter().collect())
    }

    fn kind(&self) -> &'static str {
        match self {
            Shape::String => "string",
            Shape::Number => "number",
            Shape::Boolean => "boolean",
            Shape::Object(_) => "object",
            Shape::Array(_) => "array",
        }
    }

    /// Check `value` against this shape, collecting every mismatch
    pub fn validate(&self, value: &Value) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        self.walk("$", value, &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }

    fn walk(&self, path: &str, value: &Value, errors: &mut Vec<FieldError>) {
        match (self, value) {
            (Shape::String, Value::String(_))
            | (Shape::Number, Value::Number(_))
            | (Shape::Boolean, Value::Bool(_)) => {}
            (Shape::Object(fields), Value::Object(map)) => {
                for field in fields {
                    let field_path = format!("{}.{}", path, field.name);
                    match map.get(&field.name) {
                        None if field.required => {
                            errors.push(FieldError::new(field_path, field.shape.kind(), "missing"));
                        }
                        Some(Value::Null) if field.required => {
                            errors.push(FieldError::new(field_path, field.shape.kind(), "null"));
                        }
                        None | Some(Value::Null) => {}
                        Some(inner) => field.shape.walk(&field_path, inner, errors),
                    }
                }
            }
            (Shape::Array(item), Value::Array(items)) => {
                for (i, inner) in items.iter().enumerate() {
                    item.walk(&format!("{}[{}]", path, i), inner, errors);
                }
            }
            _ => errors.push(FieldError::new(path, self.kind(), value_kind(value))),
        }
    }

    /// Validate, then deserialize into the typed value
    pub fn parse<T: DeserializeOwned>(&self, value: Value) -> Result<T, ValidationErrors> {
        self.validate(&value)?;
        serde_json::from_value(value)
            .map_err(|e| ValidationErrors::single(FieldError::custom("$", e.to_string())))
    }

    /// Export as a JSON Schema document for structured-output backends
    pub fn to_json_schema(&self) -> Value {
        match self {
            Shape::String | Shape::Number | Shape::Boolean => json!({ "type": self.kind() }),
            Shape::Array(item) => json!({
                "type": "array",
                "items": item.to_json_schema(),
            }),
            Shape::Object(fields) => {
                let mut properties = Map::new();
                let mut required = Vec::new();
                for field in fields {
                    let mut schema = field.shape.to_json_schema();
                    if let (Some(desc), Value::Object(obj)) = (&field.description, &mut schema) {
                        obj.insert("description".to_string(), Value::String(desc.clone()));
                    }
                    properties.insert(field.name.clone(), schema);
                    if field.required {
                        required.push(Value::String(field.name.clone()));
                    }
                }
                json!({
                    "type": "object",
                    "properties": properties,
                    "required": required,
                })
            }
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Turn raw model text into a validated typed value.
///
/// Empty output, text without parseable JSON, and JSON that does not match
/// `shape` all fail; nothing partially valid is returned.
pub fn parse_model_output<T: DeserializeOwned>(raw: &str, shape: &Shape) -> Result<T, ValidationErrors> {
    if raw.trim().is_empty() {
        return Err(ValidationErrors::single(FieldError::custom(
            "$",
            "model returned an empty response",
        )));
    }

    let json_str = extract_json(raw);
    let value: Value = serde_json::from_str(json_str).map_err(|e| {
        ValidationErrors::single(FieldError::custom("$", format!("response is not valid JSON: {}", e)))
    })?;
    shape.parse(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Suggestions {
        suggestions: Vec<String>,
    }

    fn suggestions_shape() -> Shape {
        Shape::object([Field::required("suggestions", Shape::array(Shape::String))])
    }

    fn results_shape() -> Shape {
        Shape::object([Field::required(
            "results",
            Shape::array(Shape::object([
                Field::required("category", Shape::String),
                Field::required("title", Shape::String),
                Field::required("summary", Shape::String),
            ])),
        )])
    }

    #[test]
    fn test_conforming_value_parses_to_same_structure() {
        let raw = r#"{"suggestions": ["Drink water", "Take folic acid"]}"#;
        let parsed: Suggestions = parse_model_output(raw, &suggestions_shape()).unwrap();
        assert_eq!(
            parsed.suggestions,
            vec!["Drink water".to_string(), "Take folic acid".to_string()]
        );
    }

    #[derive(Debug, Deserialize)]
    struct Article {
        category: String,
        title: String,
        summary: String,
    }

    #[derive(Debug, Deserialize)]
    struct SearchResults {
        results: Vec<Article>,
    }

    #[test]
    fn test_nested_results_parse_field_by_field() {
        let value = json!({
            "results": [
                {"category": "Postpartum Care", "title": "Recovering After Birth", "summary": "Rest and hydrate."},
                {"category": "Infant Care", "title": "Safe Sleep", "summary": "Back to sleep, firm mattress."},
                {"category": "Nutrition", "title": "Iron During Pregnancy", "summary": "Leafy greens and lentils."},
            ]
        });
        let parsed: SearchResults = results_shape().parse(value.clone()).unwrap();

        let source = value["results"].as_array().unwrap();
        assert_eq!(parsed.results.len(), source.len());
        for (article, expected) in parsed.results.iter().zip(source) {
            assert_eq!(article.category, expected["category"].as_str().unwrap());
            assert_eq!(article.title, expected["title"].as_str().unwrap());
            assert_eq!(article.summary, expected["summary"].as_str().unwrap());
        }
    }

    #[test]
    fn test_string_instead_of_array_is_rejected() {
        let raw = r#"{"suggestions": "not-an-array"}"#;
        let err = parse_model_output::<Suggestions>(raw, &suggestions_shape()).unwrap_err();
        assert_eq!(err.paths(), vec!["$.suggestions"]);
        assert!(err.to_string().contains("expected array, found string"));
    }

    #[test]
    fn test_all_failing_paths_are_reported() {
        let value = json!({
            "results": [
                {"category": "Postpartum Care", "title": 3, "summary": "ok"},
                {"category": null, "title": "Safe Sleep"},
            ]
        });
        let err = results_shape().validate(&value).unwrap_err();
        assert_eq!(
            err.paths(),
            vec![
                "$.results[0].title",
                "$.results[1].category",
                "$.results[1].summary",
            ]
        );
    }

    #[test]
    fn test_optional_fields_may_be_absent_or_null() {
        let shape = Shape::object([
            Field::required("age", Shape::Number),
            Field::optional("concerns", Shape::String),
        ]);
        assert!(shape.validate(&json!({"age": 30})).is_ok());
        assert!(shape.validate(&json!({"age": 30, "concerns": null})).is_ok());
        assert!(shape.validate(&json!({"age": 30, "concerns": 4})).is_err());
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let raw = r#"{"suggestions": [], "confidence": "high"}"#;
        let parsed: Suggestions = parse_model_output(raw, &suggestions_shape()).unwrap();
        assert!(parsed.suggestions.is_empty());
    }

    #[test]
    fn test_empty_response_is_a_validation_error() {
        let err = parse_model_output::<Suggestions>("   \n", &suggestions_shape()).unwrap_err();
        assert!(err.to_string().contains("empty response"));
    }

    #[test]
    fn test_non_json_response_is_a_validation_error() {
        let err = parse_model_output::<Suggestions>("I cannot help with that.", &suggestions_shape())
            .unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn test_json_schema_export() {
        let shape = Shape::object([
            Field::required("suggestions", Shape::array(Shape::String)).describe("Health tips"),
            Field::optional("note", Shape::String),
        ]);
        let schema = shape.to_json_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["suggestions"]["items"]["type"], "string");
        assert_eq!(schema["properties"]["suggestions"]["description"], "Health tips");
        assert_eq!(schema["required"], json!(["suggestions"]));
    }
}
