use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Locales the reading pipeline can render prompts and voices for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Pl,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Pl => "pl",
        }
    }
}

/// Voice gender preference for narration. The synthesis service expects
/// the SCREAMING_SNAKE_CASE spelling on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoiceGender {
    #[default]
    Female,
    Male,
}

impl VoiceGender {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceGender::Female => "FEMALE",
            VoiceGender::Male => "MALE",
        }
    }
}

/// One card in a drawn spread. Immutable once drawn; `position` is a
/// locale-specific ordinal label ("first"/"second"/"third").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TarotCard {
    pub name: String,
    pub position: String,
}

impl TarotCard {
    pub fn new(name: impl Into<String>, position: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: position.into(),
        }
    }
}

/// Closed two-value role tag for conversation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePart {
    pub text: String,
}

/// A single conversation turn. `token_count` is an approximate
/// whitespace-token estimate recorded for cost tracking, not correctness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: Role,
    pub parts: Vec<MessagePart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Message {
    pub fn user(text: impl Into<String>, token_count: Option<u32>) -> Self {
        Self {
            role: Role::User,
            parts: vec![MessagePart { text: text.into() }],
            token_count,
            timestamp: None,
        }
    }

    pub fn model(text: impl Into<String>, token_count: Option<u32>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![MessagePart { text: text.into() }],
            token_count,
            timestamp: None,
        }
    }

    pub fn text(&self) -> String {
        self.parts
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// The unit of persistence for one reading session. `history[0]` is always
/// the model's initial reading; `history` is append-only after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub user_id: String,
    pub initial_cards: Vec<TarotCard>,
    pub initial_question: String,
    pub history: Vec<Message>,
    /// Bumped on every append; used for conditional writes.
    pub revision: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-card interpretation inside a structured reading. Serialized with
/// camelCase keys to match the model's constrained output schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardInterpretation {
    pub card_name: String,
    pub position: String,
    pub interpretation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionableSummary {
    pub intro: String,
    pub points: Vec<String>,
}

/// The structured output contract for a generated reading. All fields are
/// required; `cards_interpretation` length equals the spread length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TarotReadingResponse {
    pub introduction: String,
    pub cards_interpretation: Vec<CardInterpretation>,
    pub overall_synthesis: String,
    pub actionable_summary: ActionableSummary,
    pub conclusion: String,
}
