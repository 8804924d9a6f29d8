use super::{parse_request, PromptFlow};
use crate::error::{NavarahError, Result};
use crate::knowledge::KnowledgeCategory;
use crate::model::ModelClient;
use crate::schema::{Field, FieldError, Shape, ValidationErrors};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

const SEARCH_TEMPLATE: &str = r#"You are a helpful assistant that searches a knowledge base about maternal and child health.
The user is searching for information related to: "{{search_term}}"

Search through the following knowledge base content:
```json
{{knowledge_base_json}}
```

Identify the articles most relevant to the search term "{{search_term}}".
For each relevant article, provide:
1. Its original category.
2. Its original title.
3. A brief summary (1-2 sentences) covering only the information relevant to the search term.

If no relevant articles are found, return an empty list of results.
"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchKnowledgeInput {
    pub search_term: String,
    pub knowledge_base: Vec<KnowledgeCategory>,
}

impl SearchKnowledgeInput {
    pub fn shape() -> Shape {
        let article = Shape::object([
            Field::required("category", Shape::String),
            Field::required("title", Shape::String),
            Field::required("content", Shape::String),
        ]);
        let category = Shape::object([
            Field::required("category", Shape::String),
            Field::required("articles", Shape::array(article)),
        ]);
        Shape::object([
            Field::required("search_term", Shape::String)
                .describe("The user query or keywords to search for."),
            Field::required("knowledge_base", Shape::array(category))
                .describe("The knowledge base articles to search within."),
        ])
    }

    pub fn from_json(value: Value) -> Result<Self> {
        parse_request(&Self::shape(), value)
    }

    pub fn validate(&self) -> Result<()> {
        if self.search_term.trim().is_empty() {
            return Err(NavarahError::InputValidation(ValidationErrors::single(
                FieldError::custom("$.search_term", "search term must not be blank"),
            )));
        }
        Ok(())
    }
}

/// One relevant article with a summary focused on the search term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub category: String,
    pub title: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeSearchOutput {
    pub results: Vec<ArticleSummary>,
}

impl KnowledgeSearchOutput {
    pub fn shape() -> Shape {
        let result = Shape::object([
            Field::required("category", Shape::String).describe("The category of the found article."),
            Field::required("title", Shape::String).describe("The title of the found article."),
            Field::required("summary", Shape::String)
                .describe("A concise summary of the information relevant to the search term."),
        ]);
        Shape::object([Field::required("results", Shape::array(result))
            .describe("Relevant articles, most relevant first. May be empty.")])
    }
}

pub struct KnowledgeSearchFlow {
    flow: PromptFlow,
}

impl KnowledgeSearchFlow {
    pub fn new(model: Arc<dyn ModelClient>) -> Result<Self> {
        let flow = PromptFlow::new(
            "knowledge_search",
            SEARCH_TEMPLATE,
            KnowledgeSearchOutput::shape(),
            model,
        )?;
        Ok(KnowledgeSearchFlow { flow })
    }

    fn prepare(&self, input: &SearchKnowledgeInput) -> Result<Value> {
        input.validate()?;
        let knowledge_base_json = serde_json::to_string_pretty(&input.knowledge_base)?;
        Ok(json!({
            "search_term": input.search_term.trim(),
            "knowledge_base_json": knowledge_base_json,
        }))
    }

    pub fn render_prompt(&self, input: &SearchKnowledgeInput) -> Result<String> {
        let context = self.prepare(input)?;
        Ok(self.flow.render(&context))
    }

    pub async fn invoke(&self, input: &SearchKnowledgeInput) -> Result<KnowledgeSearchOutput> {
        let context = self.prepare(input)?;
        self.flow.run(&context).await
    }
}
