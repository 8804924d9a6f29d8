use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const BUNDLED_KNOWLEDGE_BASE: &str = include_str!("../../data/knowledge_base.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub category: String,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeCategory {
    pub category: String,
    pub articles: Vec<Article>,
}

/// The articles shipped with the binary
pub fn bundled_knowledge_base() -> Result<Vec<KnowledgeCategory>> {
    Ok(serde_json::from_str(BUNDLED_KNOWLEDGE_BASE)?)
}

/// Load categories from a JSON file in the same layout as the bundled one
pub fn load_knowledge_base(path: &Path) -> Result<Vec<KnowledgeCategory>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Find an article by exact title across all categories
pub fn find_article<'a>(knowledge_base: &'a [KnowledgeCategory], title: &str) -> Option<&'a Article> {
    knowledge_base
        .iter()
        .flat_map(|c| c.articles.iter())
        .find(|a| a.title == title)
}
