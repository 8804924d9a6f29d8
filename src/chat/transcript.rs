use super::responder::{Chooser, RandomChooser, Responder};
use super::sentiment::{analyze_sentiment, Sentiment};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

/// One turn of a conversation; immutable once recorded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
}

impl ChatMessage {
    fn new(role: Role, text: &str, sentiment: Option<Sentiment>) -> Self {
        ChatMessage {
            id: Uuid::new_v4(),
            role,
            text: text.to_string(),
            timestamp: Utc::now(),
            sentiment,
        }
    }
}

/// Append-only session log
#[derive(Debug, Clone, Default, Serialize)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    fn append(&mut self, message: ChatMessage) -> &ChatMessage {
        self.messages.push(message);
        // Just pushed
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}

/// A responder plus the transcript of one chat session
pub struct ChatSession<C: Chooser = RandomChooser> {
    responder: Responder<C>,
    transcript: Transcript,
}

impl<C: Chooser> ChatSession<C> {
    pub fn new(responder: Responder<C>) -> Self {
        ChatSession {
            responder,
            transcript: Transcript::new(),
        }
    }

    /// Record the user's message, then the reply, and return the reply
    pub fn exchange(&mut self, input: &str) -> &ChatMessage {
        let sentiment = analyze_sentiment(input);
        self.transcript
            .append(ChatMessage::new(Role::User, input, Some(sentiment)));

        let reply = self.responder.generate_response(input);
        self.transcript.append(ChatMessage::new(Role::Bot, &reply, None))
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }
}
