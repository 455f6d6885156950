pub mod action_plan;
pub mod architecture;
pub mod dev_modules;
pub mod global_chat;
pub mod ideation;

use serde::Deserialize;

use ideaforge_core::models::MessageRole;

/// Default page size for stage message logs.
pub const DEFAULT_MESSAGE_LIMIT: usize = 50;

pub async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

impl ListQuery {
    pub fn limit_or(&self, default: usize) -> usize {
        self.limit.unwrap_or(default)
    }
}

#[derive(Debug, Deserialize)]
pub struct AddMessageRequest {
    pub role: MessageRole,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct EditSectionBody {
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub message: String,
}
