use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::types::{
    EditSectionReply, EditSectionRequest, GlobalChatReply, GlobalChatRequest, IdeaDraft,
    RawStageChatReply, StageChatReply, StageChatRequest, GLOBAL_CHAT_PATH, IMPROVE_IDEA_PATH,
};
use super::{AgentError, AgentGateway};
use crate::config::AgentConfig;

/// [`AgentGateway`] over HTTP JSON.
///
/// One pooled client is shared by all requests; the timeout is applied per
/// request so the global chat can be given a longer budget than stage calls.
#[derive(Debug, Clone)]
pub struct HttpAgentGateway {
    client: Client,
    config: AgentConfig,
}

impl HttpAgentGateway {
    pub fn new(config: AgentConfig) -> Result<Self, AgentError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()
            .map_err(AgentError::Transport)?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post<Req, Resp>(
        &self,
        path: &str,
        body: &Req,
        timeout: Duration,
    ) -> Result<Resp, AgentError>
    where
        Req: Serialize + ?Sized + Sync,
        Resp: DeserializeOwned,
    {
        let url = self.url(path);
        let mut request = self.client.post(&url).timeout(timeout).json(body);
        if let Some(token) = &self.config.auth_token {
            request = request.bearer_auth(token);
        }

        tracing::debug!(%url, "Calling agent");
        let response = request
            .send()
            .await
            .map_err(|e| classify(e, timeout))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%url, status = status.as_u16(), "Agent returned an error status");
            return Err(AgentError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| classify(e, timeout))?;
        serde_json::from_slice(&bytes).map_err(AgentError::Decode)
    }
}

fn classify(err: reqwest::Error, timeout: Duration) -> AgentError {
    if err.is_timeout() {
        AgentError::Timeout(timeout)
    } else {
        AgentError::Transport(err)
    }
}

#[async_trait]
impl AgentGateway for HttpAgentGateway {
    async fn improve_idea(&self, draft: &IdeaDraft) -> Result<IdeaDraft, AgentError> {
        self.post(IMPROVE_IDEA_PATH, draft, self.config.timeout).await
    }

    async fn chat(&self, request: &StageChatRequest) -> Result<StageChatReply, AgentError> {
        let stage = request.stage();
        let raw: RawStageChatReply = self
            .post(stage.chat_path(), request, self.config.timeout)
            .await?;
        raw.into_typed(stage).map_err(AgentError::Decode)
    }

    async fn edit_section(
        &self,
        request: &EditSectionRequest,
    ) -> Result<EditSectionReply, AgentError> {
        self.post(
            request.subject.stage().edit_section_path(),
            request,
            self.config.timeout,
        )
        .await
    }

    async fn global_chat(
        &self,
        request: &GlobalChatRequest,
    ) -> Result<GlobalChatReply, AgentError> {
        self.post(GLOBAL_CHAT_PATH, request, self.config.global_chat_timeout)
            .await
    }
}
