use std::sync::Arc;

use uuid::Uuid;

use super::{require_content, Provisioned};
use crate::db::DbError;
use crate::error::{CoreError, CoreResult};
use crate::models::{now, ActionPlan, ActionPlanMessage, MessageRole, UpdateActionPlanInput};
use crate::ports::ActionPlanRepository;

#[derive(Clone)]
pub struct ActionPlanService {
    repo: Arc<dyn ActionPlanRepository>,
}

impl ActionPlanService {
    pub fn new(repo: Arc<dyn ActionPlanRepository>) -> Self {
        Self { repo }
    }

    /// Returns the idea's action plan, creating a blank draft if it has none.
    pub fn create(&self, idea_id: Uuid) -> CoreResult<ActionPlan> {
        Ok(self.provision(idea_id)?.record)
    }

    /// Like [`Self::create`], also reporting whether a new plan was written.
    pub fn provision(&self, idea_id: Uuid) -> CoreResult<Provisioned<ActionPlan>> {
        if let Some(existing) = self.repo.find_action_plan_by_idea(idea_id)? {
            return Ok(Provisioned {
                record: existing,
                created: false,
            });
        }

        let plan = ActionPlan::draft(idea_id);
        match self.repo.save_action_plan(&plan) {
            Ok(()) => {}
            // Lost a race with a concurrent create; hand back the winner.
            Err(DbError::Conflict(_)) => {
                let existing = self
                    .repo
                    .find_action_plan_by_idea(idea_id)?
                    .ok_or_else(|| CoreError::not_found("Action plan"))?;
                return Ok(Provisioned {
                    record: existing,
                    created: false,
                });
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(action_plan_id = %plan.id, idea_id = %idea_id, "Action plan created");
        Ok(Provisioned {
            record: plan,
            created: true,
        })
    }

    pub fn get(&self, id: Uuid) -> CoreResult<ActionPlan> {
        self.repo
            .find_action_plan(id)?
            .ok_or_else(|| CoreError::not_found("Action plan"))
    }

    pub fn get_by_idea(&self, idea_id: Uuid) -> CoreResult<ActionPlan> {
        self.find_by_idea(idea_id)?
            .ok_or_else(|| CoreError::not_found("Action plan"))
    }

    pub fn find_by_idea(&self, idea_id: Uuid) -> CoreResult<Option<ActionPlan>> {
        Ok(self.repo.find_action_plan_by_idea(idea_id)?)
    }

    pub fn update(&self, plan: &mut ActionPlan) -> CoreResult<()> {
        plan.updated_at = now();
        if !self.repo.update_action_plan(plan)? {
            return Err(CoreError::not_found("Action plan"));
        }
        Ok(())
    }

    pub fn patch(&self, id: Uuid, input: UpdateActionPlanInput) -> CoreResult<ActionPlan> {
        let mut plan = self.get(id)?;
        input.apply_to(&mut plan);
        self.update(&mut plan)?;
        Ok(plan)
    }

    pub fn delete(&self, id: Uuid) -> CoreResult<()> {
        if !self.repo.delete_action_plan(id)? {
            return Err(CoreError::not_found("Action plan"));
        }
        Ok(())
    }

    pub fn add_message(
        &self,
        action_plan_id: Uuid,
        role: MessageRole,
        content: impl Into<String>,
    ) -> CoreResult<ActionPlanMessage> {
        let content = content.into();
        require_content(role, &content)?;

        let msg = ActionPlanMessage {
            id: Uuid::new_v4(),
            action_plan_id,
            role,
            content,
            created_at: now(),
        };
        self.repo.append_action_plan_message(&msg)?;
        Ok(msg)
    }

    pub fn list_messages(
        &self,
        action_plan_id: Uuid,
        limit: usize,
    ) -> CoreResult<Vec<ActionPlanMessage>> {
        Ok(self.repo.list_action_plan_messages(action_plan_id, limit)?)
    }
}
