//! Per-stage conversations with the agent.
//!
//! Ideation, action plan and architecture all follow the same turn: record
//! the user's message, send the stage context and recent history to the
//! agent, apply whatever field updates it suggests, and record its reply.
//! [`ChatStage`] supplies the stage-specific pieces.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use ideaforge_core::models::{
    ActionPlan, Architecture, CreateIdeaInput, FieldPatch, Idea, MessageRole, PatchField,
    StageStatus,
};
use ideaforge_core::services::StageServices;
use ideaforge_core::{CoreError, CoreResult};

use crate::agent::{
    AgentGateway, EditSectionReply, EditSectionRequest, HistoryEntry, IdeaDraft, Stage,
    StageChatReply, StageChatRequest, StageContext, StageUpdates,
};
use crate::propagation::TurnError;

pub const MAX_MESSAGE_CHARS: usize = 10_000;

/// Number of earlier messages sent to the agent with each turn.
pub const HISTORY_LIMIT: usize = 20;

const ACTION_PLAN_OPENING: &str = "I have finished refining my idea and want a detailed \
     action plan. Help me lay out the functional requirements, the non-functional \
     requirements and the business logic flow.";

const ARCHITECTURE_OPENING: &str = "My action plan is ready. Help me design the \
     architecture: user stories, database design and technical design.";

/// Trims a user message and enforces the length limits.
pub fn validate_message(raw: &str) -> CoreResult<&str> {
    let message = raw.trim();
    if message.is_empty() {
        return Err(CoreError::validation("Message cannot be empty"));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(CoreError::validation(format!(
            "Message too long (max {} characters)",
            MAX_MESSAGE_CHARS
        )));
    }
    Ok(message)
}

/// A stage aggregate that has its own agent conversation.
pub trait ChatStage: Sized + Send + 'static {
    type Field: PatchField<Target = Self>;

    const STAGE: Stage;

    fn id(&self) -> Uuid;

    fn load(services: &StageServices, id: Uuid) -> CoreResult<Self>;

    fn context(&self, services: &StageServices) -> CoreResult<StageContext>;

    fn save(&mut self, services: &StageServices) -> CoreResult<()>;

    fn append(
        services: &StageServices,
        id: Uuid,
        role: MessageRole,
        content: &str,
    ) -> CoreResult<()>;

    fn history(services: &StageServices, id: Uuid) -> CoreResult<Vec<HistoryEntry>>;

    fn mark_complete(&mut self);

    /// This stage's patch out of a reply; updates typed for another stage are dropped.
    fn patch(updates: &StageUpdates) -> Option<&FieldPatch<Self::Field>>;
}

impl ChatStage for Idea {
    type Field = ideaforge_core::models::IdeaField;

    const STAGE: Stage = Stage::Ideation;

    fn id(&self) -> Uuid {
        self.id
    }

    fn load(services: &StageServices, id: Uuid) -> CoreResult<Self> {
        services.ideation.get(id)
    }

    fn context(&self, _services: &StageServices) -> CoreResult<StageContext> {
        Ok(StageContext::ideation(self))
    }

    fn save(&mut self, services: &StageServices) -> CoreResult<()> {
        services.ideation.update(self)
    }

    fn append(
        services: &StageServices,
        id: Uuid,
        role: MessageRole,
        content: &str,
    ) -> CoreResult<()> {
        services.ideation.add_message(id, role, content).map(|_| ())
    }

    fn history(services: &StageServices, id: Uuid) -> CoreResult<Vec<HistoryEntry>> {
        Ok(services
            .ideation
            .list_messages(id, HISTORY_LIMIT)?
            .into_iter()
            .map(|m| HistoryEntry::new(m.role, m.content))
            .collect())
    }

    fn mark_complete(&mut self) {
        self.completed = true;
    }

    fn patch(updates: &StageUpdates) -> Option<&FieldPatch<Self::Field>> {
        match updates {
            StageUpdates::Ideation(patch) => Some(patch),
            _ => None,
        }
    }
}

impl ChatStage for ActionPlan {
    type Field = ideaforge_core::models::ActionPlanField;

    const STAGE: Stage = Stage::ActionPlan;

    fn id(&self) -> Uuid {
        self.id
    }

    fn load(services: &StageServices, id: Uuid) -> CoreResult<Self> {
        services.action_plans.get(id)
    }

    fn context(&self, services: &StageServices) -> CoreResult<StageContext> {
        let idea = services.ideation.get(self.idea_id)?;
        Ok(StageContext::action_plan(self, &idea))
    }

    fn save(&mut self, services: &StageServices) -> CoreResult<()> {
        services.action_plans.update(self)
    }

    fn append(
        services: &StageServices,
        id: Uuid,
        role: MessageRole,
        content: &str,
    ) -> CoreResult<()> {
        services.action_plans.add_message(id, role, content).map(|_| ())
    }

    fn history(services: &StageServices, id: Uuid) -> CoreResult<Vec<HistoryEntry>> {
        Ok(services
            .action_plans
            .list_messages(id, HISTORY_LIMIT)?
            .into_iter()
            .map(|m| HistoryEntry::new(m.role, m.content))
            .collect())
    }

    fn mark_complete(&mut self) {
        self.completed = true;
        self.status = StageStatus::Completed;
    }

    fn patch(updates: &StageUpdates) -> Option<&FieldPatch<Self::Field>> {
        match updates {
            StageUpdates::ActionPlan(patch) => Some(patch),
            _ => None,
        }
    }
}

impl ChatStage for Architecture {
    type Field = ideaforge_core::models::ArchitectureField;

    const STAGE: Stage = Stage::Architecture;

    fn id(&self) -> Uuid {
        self.id
    }

    fn load(services: &StageServices, id: Uuid) -> CoreResult<Self> {
        services.architectures.get(id)
    }

    fn context(&self, services: &StageServices) -> CoreResult<StageContext> {
        let plan = services.action_plans.get(self.action_plan_id)?;
        Ok(StageContext::architecture(self, &plan))
    }

    fn save(&mut self, services: &StageServices) -> CoreResult<()> {
        services.architectures.update(self)
    }

    fn append(
        services: &StageServices,
        id: Uuid,
        role: MessageRole,
        content: &str,
    ) -> CoreResult<()> {
        services.architectures.add_message(id, role, content).map(|_| ())
    }

    fn history(services: &StageServices, id: Uuid) -> CoreResult<Vec<HistoryEntry>> {
        Ok(services
            .architectures
            .list_messages(id, HISTORY_LIMIT)?
            .into_iter()
            .map(|m| HistoryEntry::new(m.role, m.content))
            .collect())
    }

    fn mark_complete(&mut self) {
        self.completed = true;
        self.status = StageStatus::Completed;
    }

    fn patch(updates: &StageUpdates) -> Option<&FieldPatch<Self::Field>> {
        match updates {
            StageUpdates::Architecture(patch) => Some(patch),
            _ => None,
        }
    }
}

/// Agent-backed workflows over the stage services.
#[derive(Clone)]
pub struct StageChat {
    services: StageServices,
    agent: Arc<dyn AgentGateway>,
    initial_content_timeout: Duration,
}

impl StageChat {
    pub fn new(
        services: StageServices,
        agent: Arc<dyn AgentGateway>,
        initial_content_timeout: Duration,
    ) -> Self {
        Self {
            services,
            agent,
            initial_content_timeout,
        }
    }

    /// Creates an idea after letting the agent polish the draft. The agent is
    /// optional here: on failure, or for any field it leaves blank, the
    /// caller's text is used.
    pub async fn create_idea(&self, input: CreateIdeaInput) -> CoreResult<Idea> {
        let draft = IdeaDraft {
            title: input.title.clone(),
            objective: input.objective.clone(),
            problem: input.problem.clone(),
            scope: input.scope.clone(),
        };

        let improved = match self.agent.improve_idea(&draft).await {
            Ok(improved) => improved.or_fallback(draft),
            Err(e) => {
                tracing::warn!(error = %e, "Idea improvement failed; using the original text");
                draft
            }
        };

        self.services.ideation.create(CreateIdeaInput {
            title: improved.title,
            objective: improved.objective,
            problem: improved.problem,
            scope: improved.scope,
            ..input
        })
    }

    /// Returns the idea's action plan, creating it if needed. A fresh plan
    /// gets an opening message from the agent in the background.
    pub fn create_action_plan(&self, idea_id: Uuid) -> CoreResult<ActionPlan> {
        let provisioned = self.services.action_plans.provision(idea_id)?;
        if provisioned.created {
            self.spawn_initial_content::<ActionPlan>(provisioned.record.id, ACTION_PLAN_OPENING);
        }
        Ok(provisioned.record)
    }

    pub fn create_architecture(&self, action_plan_id: Uuid) -> CoreResult<Architecture> {
        let provisioned = self.services.architectures.provision(action_plan_id)?;
        if provisioned.created {
            self.spawn_initial_content::<Architecture>(provisioned.record.id, ARCHITECTURE_OPENING);
        }
        Ok(provisioned.record)
    }

    /// One user turn of a stage conversation.
    pub async fn turn<S: ChatStage>(
        &self,
        id: Uuid,
        message: &str,
    ) -> Result<StageChatReply, TurnError> {
        let message = validate_message(message)?;
        let mut aggregate = S::load(&self.services, id)?;
        let subject = aggregate.context(&self.services)?;

        S::append(&self.services, id, MessageRole::User, message)?;
        let history = S::history(&self.services, id)?;

        let request = StageChatRequest {
            subject,
            history,
            message: message.to_string(),
        };
        let reply = self.agent.chat(&request).await?;

        self.apply_reply(&mut aggregate, &reply)?;
        self.record_reply::<S>(id, &reply.reply);
        Ok(reply)
    }

    /// Asks the agent to rewrite one section and stores the result in that
    /// field only. Any propagation hint in the reply is passed back untouched.
    pub async fn edit_section<S: ChatStage>(
        &self,
        id: Uuid,
        section: &str,
        message: &str,
    ) -> Result<EditSectionReply, TurnError> {
        let field = S::Field::from_str(section).ok_or_else(|| {
            CoreError::validation(format!(
                "Invalid section '{}' (expected one of: {})",
                section,
                S::STAGE.sections().join(", ")
            ))
        })?;
        let message = validate_message(message)?;

        let mut aggregate = S::load(&self.services, id)?;
        let request = EditSectionRequest {
            subject: aggregate.context(&self.services)?,
            section: field.as_str().to_string(),
            message: message.to_string(),
        };
        let reply = self.agent.edit_section(&request).await?;

        if !reply.updated_section.is_empty() {
            field.set(&mut aggregate, reply.updated_section.clone());
            aggregate.save(&self.services)?;
            tracing::info!(
                id = %id,
                stage = S::STAGE.as_str(),
                section = field.as_str(),
                "Section rewritten"
            );
        }

        Ok(reply)
    }

    fn apply_reply<S: ChatStage>(
        &self,
        aggregate: &mut S,
        reply: &StageChatReply,
    ) -> CoreResult<()> {
        if !reply.wants_update() {
            return Ok(());
        }

        if let Some(patch) = S::patch(&reply.updates) {
            patch.apply(aggregate);
        }
        if reply.is_complete {
            aggregate.mark_complete();
        }
        aggregate.save(&self.services)?;
        tracing::debug!(
            id = %aggregate.id(),
            stage = S::STAGE.as_str(),
            complete = reply.is_complete,
            "Applied agent updates"
        );
        Ok(())
    }

    fn record_reply<S: ChatStage>(&self, id: Uuid, reply: &str) {
        if reply.trim().is_empty() {
            tracing::warn!(id = %id, stage = S::STAGE.as_str(), "Agent sent an empty reply");
        }
        if let Err(e) = S::append(&self.services, id, MessageRole::Assistant, reply) {
            tracing::warn!(id = %id, error = %e, "Failed to record agent reply");
        }
    }

    /// Detached, time-boxed opening turn. Failures are only logged.
    fn spawn_initial_content<S: ChatStage>(&self, id: Uuid, prompt: &'static str) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(id = %id, "No async runtime; skipping initial content");
            return;
        };

        let chat = self.clone();
        let budget = self.initial_content_timeout;
        runtime.spawn(async move {
            match tokio::time::timeout(budget, chat.opening_turn::<S>(id, prompt)).await {
                Ok(Ok(())) => {
                    tracing::debug!(id = %id, stage = S::STAGE.as_str(), "Initial content ready");
                }
                Ok(Err(e)) => {
                    tracing::warn!(
                        id = %id,
                        stage = S::STAGE.as_str(),
                        error = %e,
                        "Initial content failed"
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        id = %id,
                        stage = S::STAGE.as_str(),
                        timeout = ?budget,
                        "Initial content timed out"
                    );
                }
            }
        });
    }

    async fn opening_turn<S: ChatStage>(&self, id: Uuid, prompt: &str) -> Result<(), TurnError> {
        let mut aggregate = S::load(&self.services, id)?;
        let request = StageChatRequest {
            subject: aggregate.context(&self.services)?,
            history: Vec::new(),
            message: prompt.to_string(),
        };
        let reply = self.agent.chat(&request).await?;

        self.record_reply::<S>(id, &reply.reply);
        self.apply_reply(&mut aggregate, &reply)?;
        Ok(())
    }
}
