use super::responder::contains_any;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Urgent,
    Concerned,
    Neutral,
    Positive,
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sentiment::Urgent => write!(f, "urgent"),
            Sentiment::Concerned => write!(f, "concerned"),
            Sentiment::Neutral => write!(f, "neutral"),
            Sentiment::Positive => write!(f, "positive"),
        }
    }
}

const URGENT: &[&str] = &["emergency", "urgent", "help me", "need help", "asap"];
const CONCERNED: &[&str] = &["worried", "scared", "anxious", "afraid", "nervous"];
const POSITIVE: &[&str] = &["thank", "great", "good"];

/// Tag input with the first matching sentiment, checked urgent, concerned, positive
pub fn analyze_sentiment(input: &str) -> Sentiment {
    let lowercase = input.to_lowercase();

    [
        (URGENT, Sentiment::Urgent),
        (CONCERNED, Sentiment::Concerned),
        (POSITIVE, Sentiment::Positive),
    ]
    .into_iter()
    .find(|(keywords, _)| contains_any(&lowercase, keywords))
    .map(|(_, sentiment)| sentiment)
    .unwrap_or(Sentiment::Neutral)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_examples() {
        assert_eq!(
            analyze_sentiment("I'm really worried about my baby's fever"),
            Sentiment::Concerned
        );
        assert_eq!(
            analyze_sentiment("Thank you, this was great help"),
            Sentiment::Positive
        );
        assert_eq!(analyze_sentiment("just checking in"), Sentiment::Neutral);
    }

    #[test]
    fn test_priority_order() {
        // urgent beats concerned beats positive
        assert_eq!(
            analyze_sentiment("Emergency! I'm scared, thanks"),
            Sentiment::Urgent
        );
        assert_eq!(
            analyze_sentiment("Good doctor but I'm anxious"),
            Sentiment::Concerned
        );
        assert_eq!(analyze_sentiment("Please HELP ME now"), Sentiment::Urgent);
    }
}
