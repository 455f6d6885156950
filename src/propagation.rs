//! Propagation engine: one global chat turn across every stage of an idea.
//!
//! A turn loads the idea and whatever has been derived from it, records the
//! user's message, asks the agent, and then applies the agent's suggestions
//! to each stage.
//!
//! The writes are **best-effort and independently committed**. The idea, the
//! action plan, the architecture and each new module are saved separately;
//! a failure on one is logged and left out of the affected list while the
//! others still go through. Nothing is rolled back. Only a failed agent call
//! aborts the turn, and in that case the user's message stays in the log
//! without a reply.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use ideaforge_core::models::{
    ActionPlan, Architecture, DevelopmentModule, FieldPatch, Idea, MessageRole, PatchField,
};
use ideaforge_core::services::StageServices;
use ideaforge_core::{CoreError, CoreResult};

use crate::agent::{AgentError, AgentGateway, GlobalChatRequest, NewModuleSpec, Propagation};
use crate::chat::validate_message;

#[derive(Debug, Error)]
pub enum TurnError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Agent(#[from] AgentError),
}

/// A part of the pipeline that a turn changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Affected {
    Ideation,
    ActionPlan,
    Architecture,
    DevModules,
}

impl Affected {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ideation => "ideation",
            Self::ActionPlan => "action_plan",
            Self::Architecture => "architecture",
            Self::DevModules => "dev_modules",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GlobalChatOutcome {
    pub reply: String,
    /// In application order; `dev_modules` repeats once per module created.
    #[serde(rename = "affected_modules")]
    pub affected: Vec<Affected>,
    pub propagation: Propagation,
    pub new_modules: Vec<NewModuleSpec>,
}

/// Snapshot of an idea and everything downstream of it.
struct TurnContext {
    idea: Idea,
    action_plan: Option<ActionPlan>,
    architecture: Option<Architecture>,
    modules: Vec<DevelopmentModule>,
}

#[derive(Clone)]
pub struct PropagationEngine {
    services: StageServices,
    agent: Arc<dyn AgentGateway>,
}

impl PropagationEngine {
    pub fn new(services: StageServices, agent: Arc<dyn AgentGateway>) -> Self {
        Self { services, agent }
    }

    pub async fn run_turn(
        &self,
        idea_id: Uuid,
        message: &str,
    ) -> Result<GlobalChatOutcome, TurnError> {
        let message = validate_message(message)?;
        let TurnContext {
            mut idea,
            action_plan,
            architecture,
            modules,
        } = self.load_context(idea_id)?;

        if let Err(e) =
            self.services
                .modules
                .add_global_message(idea_id, MessageRole::User, message, Vec::new())
        {
            tracing::warn!(idea_id = %idea_id, error = %e, "Failed to record global chat message");
        }

        let request = GlobalChatRequest {
            message: message.to_string(),
            idea: idea.clone(),
            action_plan: action_plan.clone(),
            architecture: architecture.clone(),
            modules,
        };
        let reply = match self.agent.global_chat(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(idea_id = %idea_id, error = %e, "Global chat agent call failed");
                return Err(e.into());
            }
        };

        let mut affected = Vec::new();

        if apply(&mut idea, reply.propagation.ideation.as_ref()) {
            record(
                self.services.ideation.update(&mut idea),
                Affected::Ideation,
                idea.id,
                &mut affected,
            );
        }

        if let Some(mut plan) = action_plan {
            if apply(&mut plan, reply.propagation.action_plan.as_ref()) {
                record(
                    self.services.action_plans.update(&mut plan),
                    Affected::ActionPlan,
                    plan.id,
                    &mut affected,
                );
            }
        }

        if let Some(mut arch) = architecture.clone() {
            if apply(&mut arch, reply.propagation.architecture.as_ref()) {
                record(
                    self.services.architectures.update(&mut arch),
                    Affected::Architecture,
                    arch.id,
                    &mut affected,
                );
            }
        }

        match &architecture {
            Some(arch) => {
                for spec in &reply.new_modules {
                    let created = self
                        .services
                        .modules
                        .create_module(arch.id, spec.clone().into())
                        .map(|_| ());
                    record(created, Affected::DevModules, arch.id, &mut affected);
                }
            }
            None if !reply.new_modules.is_empty() => {
                tracing::debug!(
                    idea_id = %idea_id,
                    count = reply.new_modules.len(),
                    "No architecture yet; skipping suggested modules"
                );
            }
            None => {}
        }

        let names = affected.iter().map(|a| a.as_str().to_string()).collect();
        if let Err(e) = self.services.modules.add_global_message(
            idea_id,
            MessageRole::Assistant,
            reply.reply.clone(),
            names,
        ) {
            tracing::warn!(idea_id = %idea_id, error = %e, "Failed to record global chat reply");
        }

        tracing::info!(idea_id = %idea_id, affected = ?affected, "Global chat turn complete");
        Ok(GlobalChatOutcome {
            reply: reply.reply,
            affected,
            propagation: reply.propagation,
            new_modules: reply.new_modules,
        })
    }

    /// The idea is required; downstream stages are optional. Storage failures
    /// abort the turn.
    fn load_context(&self, idea_id: Uuid) -> CoreResult<TurnContext> {
        let idea = self.services.ideation.get(idea_id)?;
        let action_plan = self.services.action_plans.find_by_idea(idea_id)?;
        let architecture = match &action_plan {
            Some(plan) => self.services.architectures.find_by_action_plan(plan.id)?,
            None => None,
        };
        let modules = match &architecture {
            Some(arch) => self.services.modules.list_by_architecture(arch.id)?,
            None => Vec::new(),
        };

        Ok(TurnContext {
            idea,
            action_plan,
            architecture,
            modules,
        })
    }
}

/// Applies a stage's patch, if any. Returns whether any field was written.
fn apply<F: PatchField>(target: &mut F::Target, patch: Option<&FieldPatch<F>>) -> bool {
    patch.is_some_and(|p| !p.apply(target).is_empty())
}

fn record(result: CoreResult<()>, what: Affected, id: Uuid, affected: &mut Vec<Affected>) {
    match result {
        Ok(()) => affected.push(what),
        Err(e) => {
            tracing::error!(id = %id, stage = what.as_str(), error = %e, "Propagation write failed");
        }
    }
}
