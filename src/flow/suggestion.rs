use super::{parse_request, PromptFlow};
use crate::error::{NavarahError, Result};
use crate::health::{gather_context, HealthDataProvider};
use crate::model::ModelClient;
use crate::schema::{Field, FieldError, Shape, ValidationErrors};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

const MAX_AGE: f64 = 120.0;

const SUGGESTION_TEMPLATE: &str = r#"You are a health assistant that provides personalized health suggestions and reminders based on the user's data.

User Profile:
- Age: {{age}} years old
- Role: {{role}}
- Activity Level: {{#if activity_level}}{{activity_level}}{{else}}Not specified{{/if}}
- Current Concerns/Symptoms: {{#if concerns}}{{concerns}}{{else}}None reported{{/if}}

Health Data:
{{#if health_report}}
Health Report:
- Blood pressure: {{health_report.blood_pressure}}
- Hemoglobin: {{health_report.hemoglobin}} g/dL
- BMI: {{health_report.bmi}}
- Weight: {{health_report.weight}} kg
- Glucose: {{health_report.glucose}} mg/dL
- Heart Rate: {{#if health_report.heart_rate}}{{health_report.heart_rate}} BPM{{else}}not recorded{{/if}}
{{else}}
No health report data available.
{{/if}}

{{#if appointments}}
Upcoming Appointments:
{{#each appointments}}
- {{date}} {{time}}: {{doctor_name}} ({{doctor_speciality}})
{{/each}}
{{else}}
No upcoming appointments.
{{/if}}

{{#if vaccination_schedule}}
Vaccination Schedule:
{{#each vaccination_schedule}}
- {{vaccine}} (Due: {{due_date}}, Status: {{status}})
{{/each}}
{{else}}
No vaccination schedule available.
{{/if}}

{{#if medicines}}
Current Medications:
{{#each medicines}}
- {{name}} ({{dosage}}, {{frequency}})
{{/each}}
{{else}}
No current medications listed.
{{/if}}

Based on all of the information above (profile, concerns, activity level, health data, appointments, vaccinations and medications), provide a list of specific, actionable health suggestions and reminders tailored to this user.
"#;

/// Who the suggestions are for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSuggestionInput {
    /// Years
    pub age: f64,
    pub is_mother: bool,
    pub is_child: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concerns: Option<String>,
    /// e.g. Sedentary, Lightly Active, Moderately Active, Very Active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<String>,
}

impl HealthSuggestionInput {
    pub fn shape() -> Shape {
        Shape::object([
            Field::required("age", Shape::Number).describe("The age of the user in years."),
            Field::required("is_mother", Shape::Boolean).describe("Whether the user is a mother."),
            Field::required("is_child", Shape::Boolean).describe("Whether the user is a child."),
            Field::optional("concerns", Shape::String)
                .describe("Specific health concerns or symptoms the user is experiencing."),
            Field::optional("activity_level", Shape::String)
                .describe("The user's general activity level."),
        ])
    }

    /// Shape-check an untyped request
    pub fn from_json(value: Value) -> Result<Self> {
        parse_request(&Self::shape(), value)
    }

    /// Range checks the shape cannot express
    pub fn validate(&self) -> Result<()> {
        if !self.age.is_finite() || !(0.0..=MAX_AGE).contains(&self.age) {
            return Err(NavarahError::InputValidation(ValidationErrors::single(
                FieldError::custom("$.age", format!("expected a number between 0 and {}", MAX_AGE)),
            )));
        }
        Ok(())
    }

    /// Blank optional strings count as not given
    pub fn normalized(mut self) -> Self {
        self.concerns = non_blank(self.concerns);
        self.activity_level = non_blank(self.activity_level);
        self
    }

    fn role(&self) -> &'static str {
        match (self.is_mother, self.is_child) {
            (true, true) => "Mother and Child",
            (true, false) => "Mother",
            (false, true) => "Child",
            (false, false) => "Not specified",
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSuggestionOutput {
    pub suggestions: Vec<String>,
}

impl HealthSuggestionOutput {
    pub fn shape() -> Shape {
        Shape::object([Field::required("suggestions", Shape::array(Shape::String))
            .describe("A list of personalized health suggestions and reminders.")])
    }
}

/// Personalized suggestions from the user profile plus whatever health
/// records the provider can supply right now
pub struct SuggestionFlow {
    flow: PromptFlow,
    provider: Arc<dyn HealthDataProvider>,
}

impl SuggestionFlow {
    pub fn new(model: Arc<dyn ModelClient>, provider: Arc<dyn HealthDataProvider>) -> Result<Self> {
        let flow = PromptFlow::new(
            "health_suggestion",
            SUGGESTION_TEMPLATE,
            HealthSuggestionOutput::shape(),
            model,
        )?;
        Ok(SuggestionFlow { flow, provider })
    }

    /// Validate the input and merge it with the gathered health records
    async fn prepare(&self, input: HealthSuggestionInput) -> Result<Value> {
        input.validate()?;
        let input = input.normalized();
        let health = gather_context(self.provider.as_ref()).await;

        Ok(json!({
            "age": input.age,
            "role": input.role(),
            "concerns": input.concerns,
            "activity_level": input.activity_level,
            "health_report": health.health_report,
            "appointments": health.appointments,
            "vaccination_schedule": health.vaccination_schedule,
            "medicines": health.medicines,
        }))
    }

    /// The exact prompt `invoke` would send, without calling the model
    pub async fn render_prompt(&self, input: HealthSuggestionInput) -> Result<String> {
        let context = self.prepare(input).await?;
        Ok(self.flow.render(&context))
    }

    pub async fn invoke(&self, input: HealthSuggestionInput) -> Result<HealthSuggestionOutput> {
        let context = self.prepare(input).await?;
        self.flow.run(&context).await
    }
}
