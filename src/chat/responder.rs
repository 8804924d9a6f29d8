use crate::error::{NavarahError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Topic categories, in matching priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Pregnancy,
    InfantCare,
    Hospitals,
    GeneralHealth,
    Unknown,
}

/// A keyword-triggered canned response inside a category
struct Intent {
    triggers: &'static [&'static str],
    response: &'static str,
}

const GREETING_PREFIXES: &[&str] = &["hi", "hello", "hey", "greetings"];

impl Category {
    /// Categories scanned for keywords; the first match wins
    pub const MATCH_ORDER: [Category; 4] = [
        Category::Pregnancy,
        Category::InfantCare,
        Category::Hospitals,
        Category::GeneralHealth,
    ];

    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Category::Pregnancy => &["pregnancy", "pregnant", "trimester", "birth", "labor"],
            Category::InfantCare => &["baby", "infant", "newborn", "feeding", "vaccination"],
            Category::Hospitals => &["hospital", "doctor", "emergency", "clinic", "medical"],
            Category::GeneralHealth => &["health", "wellness", "nutrition", "exercise"],
            Category::Unknown => &[],
        }
    }

    fn intents(self) -> &'static [Intent] {
        match self {
            Category::Pregnancy => &[
                Intent {
                    triggers: &["stage", "trimester"],
                    response: responses::PREGNANCY_STAGES,
                },
                Intent {
                    triggers: &["care", "health"],
                    response: responses::PREGNANCY_CARE,
                },
            ],
            Category::InfantCare => &[
                Intent {
                    triggers: &["feed"],
                    response: responses::INFANT_FEEDING,
                },
                Intent {
                    triggers: &["sleep"],
                    response: responses::INFANT_SLEEP,
                },
            ],
            Category::Hospitals => &[Intent {
                triggers: &["emergency"],
                response: responses::HOSPITALS_EMERGENCY,
            }],
            Category::GeneralHealth | Category::Unknown => &[],
        }
    }

    /// Fallback response when no sub-intent matches; `None` for [`Category::Unknown`]
    pub fn default_response(self) -> Option<&'static str> {
        match self {
            Category::Pregnancy => Some(responses::PREGNANCY_DEFAULT),
            Category::InfantCare => Some(responses::INFANT_DEFAULT),
            Category::Hospitals => Some(responses::HOSPITALS_DEFAULT),
            Category::GeneralHealth => Some(responses::GENERAL_HEALTH_DEFAULT),
            Category::Unknown => None,
        }
    }

    /// Pick the fixed response for an already-lowercased input
    fn respond(self, lowercase_input: &str) -> Option<&'static str> {
        self.intents()
            .iter()
            .find(|intent| contains_any(lowercase_input, intent.triggers))
            .map(|intent| intent.response)
            .or_else(|| self.default_response())
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Pregnancy => write!(f, "Pregnancy"),
            Category::InfantCare => write!(f, "Infant Care"),
            Category::Hospitals => write!(f, "Hospitals"),
            Category::GeneralHealth => write!(f, "General Health"),
            Category::Unknown => write!(f, "Unknown"),
        }
    }
}

pub mod responses {
    pub const GREETINGS: [&str; 3] = [
        "Hello! I'm your Navarah health assistant. How can I help you today?",
        "Welcome to Navarah! I'm here to assist you with health-related questions.",
        "Hi there! I'm your AI health companion. Feel free to ask me anything about maternal and child health.",
    ];

    pub const UNKNOWN: [&str; 3] = [
        "I'm not quite sure about that. Could you rephrase your question?",
        "I want to help you better. Could you provide more details about your question?",
        "I'm still learning. Could you ask that in a different way?",
    ];

    pub const PREGNANCY_DEFAULT: &str = "I can provide information about pregnancy stages, prenatal care, and common concerns. What would you like to know?";
    pub const PREGNANCY_STAGES: &str = "Pregnancy is divided into three trimesters, each lasting about 13 weeks. Would you like specific information about any trimester?";
    pub const PREGNANCY_CARE: &str = "Regular prenatal care, proper nutrition, and moderate exercise are essential during pregnancy. Would you like more detailed guidance?";

    pub const INFANT_DEFAULT: &str = "I can help you with newborn care, feeding schedules, and developmental milestones. What specific information do you need?";
    pub const INFANT_FEEDING: &str = "Newborns typically feed every 2-3 hours. Would you like information about breastfeeding or formula feeding?";
    pub const INFANT_SLEEP: &str = "Newborns sleep 14-17 hours a day in short periods. Would you like tips for establishing healthy sleep patterns?";

    pub const HOSPITALS_DEFAULT: &str = "I can help you find nearby hospitals and medical facilities. Would you like directions or contact information?";
    pub const HOSPITALS_EMERGENCY: &str = "If you're experiencing a medical emergency, please call emergency services immediately. Would you like the contact information for the nearest hospital?";

    pub const GENERAL_HEALTH_DEFAULT: &str = "Balanced nutrition, regular activity, and routine checkups support good health for mother and child. Would you like tips on diet, exercise, or wellness?";
}

/// Greeting and fallback pools the responder picks from at random
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsePools {
    greetings: Vec<String>,
    unknown: Vec<String>,
}

impl ResponsePools {
    /// Build pools, dropping blank entries; both must keep at least one
    pub fn new(greetings: Vec<String>, unknown: Vec<String>) -> Result<Self> {
        let greetings = non_blank(greetings);
        let unknown = non_blank(unknown);
        if greetings.is_empty() || unknown.is_empty() {
            return Err(NavarahError::ConfigInvalid(
                "Greeting and unknown response pools must not be empty".to_string(),
            ));
        }
        Ok(ResponsePools { greetings, unknown })
    }

    pub fn greetings(&self) -> &[String] {
        &self.greetings
    }

    pub fn unknown(&self) -> &[String] {
        &self.unknown
    }
}

fn non_blank(entries: Vec<String>) -> Vec<String> {
    entries.into_iter().filter(|e| !e.trim().is_empty()).collect()
}

impl Default for ResponsePools {
    fn default() -> Self {
        ResponsePools {
            greetings: responses::GREETINGS.iter().map(|s| s.to_string()).collect(),
            unknown: responses::UNKNOWN.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Strategy for picking one entry out of a non-empty pool
pub trait Chooser: Send + Sync {
    /// Return an index in `0..len`; `len` is never zero
    fn choose(&self, len: usize) -> usize;
}

/// Uniform choice backed by the thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomChooser;

impl Chooser for RandomChooser {
    fn choose(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Keyword-driven responder. Stateless per call.
pub struct Responder<C: Chooser = RandomChooser> {
    pools: ResponsePools,
    chooser: C,
}

impl Responder<RandomChooser> {
    pub fn new(pools: ResponsePools) -> Self {
        Responder::with_chooser(pools, RandomChooser)
    }
}

impl<C: Chooser> Responder<C> {
    pub fn with_chooser(pools: ResponsePools, chooser: C) -> Self {
        Responder { pools, chooser }
    }

    /// Map free text to a reply
    pub fn generate_response(&self, input: &str) -> String {
        if is_greeting(input) {
            return self.pick(&self.pools.greetings);
        }

        let lowercase = input.to_lowercase();
        let category = classify_lowercase(&lowercase);
        match category.respond(&lowercase) {
            Some(response) => response.to_string(),
            None => self.pick(&self.pools.unknown),
        }
    }

    fn pick(&self, pool: &[String]) -> String {
        let index = self.chooser.choose(pool.len()).min(pool.len() - 1);
        pool[index].clone()
    }
}

/// Empty input or a greeting prefix
pub fn is_greeting(input: &str) -> bool {
    if input.trim().is_empty() {
        return true;
    }
    let lowercase = input.to_lowercase();
    GREETING_PREFIXES.iter().any(|prefix| lowercase.starts_with(prefix))
}

/// First category in [`Category::MATCH_ORDER`] with a keyword in `input`
pub fn classify(input: &str) -> Category {
    classify_lowercase(&input.to_lowercase())
}

fn classify_lowercase(lowercase: &str) -> Category {
    Category::MATCH_ORDER
        .into_iter()
        .find(|category| contains_any(lowercase, category.keywords()))
        .unwrap_or(Category::Unknown)
}

pub(crate) fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| text.contains(kw))
}
