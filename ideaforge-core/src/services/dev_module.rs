use std::sync::Arc;

use uuid::Uuid;

use super::require_content;
use crate::error::{CoreError, CoreResult};
use crate::models::{
    now, CreateModuleInput, DevelopmentModule, GlobalChatMessage, MessageRole, UpdateModuleInput,
};
use crate::ports::DevModuleRepository;

/// Development modules of an architecture, plus the per-idea global chat log.
#[derive(Clone)]
pub struct DevModuleService {
    repo: Arc<dyn DevModuleRepository>,
}

impl DevModuleService {
    pub fn new(repo: Arc<dyn DevModuleRepository>) -> Self {
        Self { repo }
    }

    pub fn create_module(
        &self,
        architecture_id: Uuid,
        input: CreateModuleInput,
    ) -> CoreResult<DevelopmentModule> {
        validate_module(&input)?;
        let module = input.into_module(architecture_id, now());
        self.repo.save_module(&module)?;
        tracing::debug!(module_id = %module.id, name = %module.name, "Module created");
        Ok(module)
    }

    /// Inserts every module or none of them.
    pub fn create_batch(
        &self,
        architecture_id: Uuid,
        inputs: Vec<CreateModuleInput>,
    ) -> CoreResult<Vec<DevelopmentModule>> {
        for input in &inputs {
            validate_module(input)?;
        }

        let created_at = now();
        let modules: Vec<DevelopmentModule> = inputs
            .into_iter()
            .map(|input| input.into_module(architecture_id, created_at))
            .collect();
        self.repo.save_modules(&modules)?;
        tracing::info!(
            architecture_id = %architecture_id,
            count = modules.len(),
            "Module batch created"
        );
        Ok(modules)
    }

    pub fn get(&self, id: Uuid) -> CoreResult<DevelopmentModule> {
        self.repo
            .find_module(id)?
            .ok_or_else(|| CoreError::not_found("Module"))
    }

    pub fn list_by_architecture(&self, architecture_id: Uuid) -> CoreResult<Vec<DevelopmentModule>> {
        Ok(self.repo.list_modules(architecture_id)?)
    }

    pub fn update(&self, module: &mut DevelopmentModule) -> CoreResult<()> {
        module.updated_at = now();
        if !self.repo.update_module(module)? {
            return Err(CoreError::not_found("Module"));
        }
        Ok(())
    }

    pub fn patch(&self, id: Uuid, input: UpdateModuleInput) -> CoreResult<DevelopmentModule> {
        let mut module = self.get(id)?;
        input.apply_to(&mut module);
        self.update(&mut module)?;
        Ok(module)
    }

    pub fn delete(&self, id: Uuid) -> CoreResult<()> {
        if !self.repo.delete_module(id)? {
            return Err(CoreError::not_found("Module"));
        }
        Ok(())
    }

    /// Deletes every module of the architecture, then inserts the new set.
    ///
    /// The two steps commit separately. If the insert fails the architecture
    /// is left with no modules.
    pub fn replace_all(
        &self,
        architecture_id: Uuid,
        inputs: Vec<CreateModuleInput>,
    ) -> CoreResult<Vec<DevelopmentModule>> {
        for input in &inputs {
            validate_module(input)?;
        }

        let removed = self.repo.delete_modules_for_architecture(architecture_id)?;
        tracing::debug!(architecture_id = %architecture_id, removed, "Cleared modules");
        self.create_batch(architecture_id, inputs)
    }

    pub fn add_global_message(
        &self,
        idea_id: Uuid,
        role: MessageRole,
        content: impl Into<String>,
        affected_modules: Vec<String>,
    ) -> CoreResult<GlobalChatMessage> {
        let content = content.into();
        require_content(role, &content)?;

        let msg = GlobalChatMessage {
            id: Uuid::new_v4(),
            idea_id,
            role,
            content,
            affected_modules,
            created_at: now(),
        };
        self.repo.append_global_message(&msg)?;
        Ok(msg)
    }

    pub fn list_global_messages(
        &self,
        idea_id: Uuid,
        limit: usize,
    ) -> CoreResult<Vec<GlobalChatMessage>> {
        Ok(self.repo.list_global_messages(idea_id, limit)?)
    }
}

fn validate_module(input: &CreateModuleInput) -> CoreResult<()> {
    if input.name.trim().is_empty() {
        return Err(CoreError::validation("Module name cannot be empty"));
    }
    Ok(())
}
