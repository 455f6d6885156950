use std::sync::Arc;

use uuid::Uuid;

use super::require_content;
use crate::error::{CoreError, CoreResult};
use crate::models::{now, CreateIdeaInput, Idea, IdeaMessage, MessageRole, UpdateIdeaInput};
use crate::ports::IdeaRepository;

#[derive(Clone)]
pub struct IdeationService {
    repo: Arc<dyn IdeaRepository>,
}

impl IdeationService {
    pub fn new(repo: Arc<dyn IdeaRepository>) -> Self {
        Self { repo }
    }

    /// Creates an idea. Title, objective, problem and scope are all required.
    pub fn create(&self, input: CreateIdeaInput) -> CoreResult<Idea> {
        let missing = input.missing_fields();
        if !missing.is_empty() {
            return Err(CoreError::BusinessRule(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let idea = Idea::new(
            input.title,
            input.objective,
            input.problem,
            input.scope,
            input.validate_competition,
            input.validate_monetization,
        );
        self.repo.save_idea(&idea)?;
        tracing::info!(idea_id = %idea.id, "Idea created");
        Ok(idea)
    }

    pub fn get(&self, id: Uuid) -> CoreResult<Idea> {
        self.repo
            .find_idea(id)?
            .ok_or_else(|| CoreError::not_found("Idea"))
    }

    pub fn list(&self, limit: usize) -> CoreResult<Vec<Idea>> {
        Ok(self.repo.list_ideas(limit)?)
    }

    /// Replaces every mutable field of the stored idea and refreshes `updated_at`.
    pub fn update(&self, idea: &mut Idea) -> CoreResult<()> {
        idea.updated_at = now();
        if !self.repo.update_idea(idea)? {
            return Err(CoreError::not_found("Idea"));
        }
        Ok(())
    }

    /// Loads, applies the caller's non-empty fields, and saves.
    pub fn patch(&self, id: Uuid, input: UpdateIdeaInput) -> CoreResult<Idea> {
        let mut idea = self.get(id)?;
        input.apply_to(&mut idea);
        self.update(&mut idea)?;
        Ok(idea)
    }

    /// Deletes the idea together with everything downstream of it.
    pub fn delete(&self, id: Uuid) -> CoreResult<()> {
        if !self.repo.delete_idea(id)? {
            return Err(CoreError::not_found("Idea"));
        }
        tracing::info!(idea_id = %id, "Idea deleted");
        Ok(())
    }

    pub fn add_message(
        &self,
        idea_id: Uuid,
        role: MessageRole,
        content: impl Into<String>,
    ) -> CoreResult<IdeaMessage> {
        let content = content.into();
        require_content(role, &content)?;

        let msg = IdeaMessage {
            id: Uuid::new_v4(),
            idea_id,
            role,
            content,
            created_at: now(),
        };
        self.repo.append_idea_message(&msg)?;
        Ok(msg)
    }

    pub fn list_messages(&self, idea_id: Uuid, limit: usize) -> CoreResult<Vec<IdeaMessage>> {
        Ok(self.repo.list_idea_messages(idea_id, limit)?)
    }
}
