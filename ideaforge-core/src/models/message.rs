use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            "system" => Some(Self::System),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IdeaMessage {
    pub id: Uuid,
    pub idea_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionPlanMessage {
    pub id: Uuid,
    pub action_plan_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArchitectureMessage {
    pub id: Uuid,
    pub architecture_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// One entry of the cross-stage conversation for an idea.
///
/// `affected_modules` names the aggregates an assistant turn changed; it is
/// empty for user messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlobalChatMessage {
    pub id: Uuid,
    pub idea_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub affected_modules: Vec<String>,
    pub created_at: DateTime<Utc>,
}
