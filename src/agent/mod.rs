//! Agent gateway: the one place that talks to the external AI agent.

mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use client::HttpAgentGateway;
pub use types::*;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Agent request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Agent did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Agent returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed agent response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl AgentError {
    /// The agent is rate limited or temporarily down; the caller may retry later.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Status { status: 429 | 503, .. })
    }
}

/// Outbound calls to the agent. Every call is a single request bounded by
/// its own timeout; failures are returned, never mapped to "no changes".
#[async_trait]
pub trait AgentGateway: Send + Sync {
    /// Polishes a draft idea before it is stored.
    async fn improve_idea(&self, draft: &IdeaDraft) -> Result<IdeaDraft, AgentError>;

    /// One turn of a stage conversation.
    async fn chat(&self, request: &StageChatRequest) -> Result<StageChatReply, AgentError>;

    /// Rewrites a single named section of a stage.
    async fn edit_section(
        &self,
        request: &EditSectionRequest,
    ) -> Result<EditSectionReply, AgentError>;

    /// Cross-stage turn over the idea and everything derived from it.
    async fn global_chat(&self, request: &GlobalChatRequest)
        -> Result<GlobalChatReply, AgentError>;
}
