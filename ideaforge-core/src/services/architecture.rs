use std::sync::Arc;

use uuid::Uuid;

use super::{require_content, Provisioned};
use crate::db::DbError;
use crate::error::{CoreError, CoreResult};
use crate::models::{now, Architecture, ArchitectureMessage, MessageRole, UpdateArchitectureInput};
use crate::ports::ArchitectureRepository;

#[derive(Clone)]
pub struct ArchitectureService {
    repo: Arc<dyn ArchitectureRepository>,
}

impl ArchitectureService {
    pub fn new(repo: Arc<dyn ArchitectureRepository>) -> Self {
        Self { repo }
    }

    /// Returns the plan's architecture, creating a blank draft if it has none.
    pub fn create(&self, action_plan_id: Uuid) -> CoreResult<Architecture> {
        Ok(self.provision(action_plan_id)?.record)
    }

    pub fn provision(&self, action_plan_id: Uuid) -> CoreResult<Provisioned<Architecture>> {
        if let Some(existing) = self.repo.find_architecture_by_action_plan(action_plan_id)? {
            return Ok(Provisioned {
                record: existing,
                created: false,
            });
        }

        let arch = Architecture::draft(action_plan_id);
        match self.repo.save_architecture(&arch) {
            Ok(()) => {}
            Err(DbError::Conflict(_)) => {
                let existing = self
                    .repo
                    .find_architecture_by_action_plan(action_plan_id)?
                    .ok_or_else(|| CoreError::not_found("Architecture"))?;
                return Ok(Provisioned {
                    record: existing,
                    created: false,
                });
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            architecture_id = %arch.id,
            action_plan_id = %action_plan_id,
            "Architecture created"
        );
        Ok(Provisioned {
            record: arch,
            created: true,
        })
    }

    pub fn get(&self, id: Uuid) -> CoreResult<Architecture> {
        self.repo
            .find_architecture(id)?
            .ok_or_else(|| CoreError::not_found("Architecture"))
    }

    pub fn get_by_action_plan(&self, action_plan_id: Uuid) -> CoreResult<Architecture> {
        self.find_by_action_plan(action_plan_id)?
            .ok_or_else(|| CoreError::not_found("Architecture"))
    }

    pub fn find_by_action_plan(&self, action_plan_id: Uuid) -> CoreResult<Option<Architecture>> {
        Ok(self.repo.find_architecture_by_action_plan(action_plan_id)?)
    }

    pub fn update(&self, arch: &mut Architecture) -> CoreResult<()> {
        arch.updated_at = now();
        if !self.repo.update_architecture(arch)? {
            return Err(CoreError::not_found("Architecture"));
        }
        Ok(())
    }

    pub fn patch(&self, id: Uuid, input: UpdateArchitectureInput) -> CoreResult<Architecture> {
        let mut arch = self.get(id)?;
        input.apply_to(&mut arch);
        self.update(&mut arch)?;
        Ok(arch)
    }

    pub fn delete(&self, id: Uuid) -> CoreResult<()> {
        if !self.repo.delete_architecture(id)? {
            return Err(CoreError::not_found("Architecture"));
        }
        Ok(())
    }

    pub fn add_message(
        &self,
        architecture_id: Uuid,
        role: MessageRole,
        content: impl Into<String>,
    ) -> CoreResult<ArchitectureMessage> {
        let content = content.into();
        require_content(role, &content)?;

        let msg = ArchitectureMessage {
            id: Uuid::new_v4(),
            architecture_id,
            role,
            content,
            created_at: now(),
        };
        self.repo.append_architecture_message(&msg)?;
        Ok(msg)
    }

    pub fn list_messages(
        &self,
        architecture_id: Uuid,
        limit: usize,
    ) -> CoreResult<Vec<ArchitectureMessage>> {
        Ok(self.repo.list_architecture_messages(architecture_id, limit)?)
    }
}
