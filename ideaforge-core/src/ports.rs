//! Persistence ports.
//!
//! Each stage service depends only on its port; [`crate::Database`]
//! implements all of them. Lookups return `Ok(None)` for absent records,
//! updates and deletes return whether a row was touched.

use uuid::Uuid;

use crate::db::DbError;
use crate::models::*;

pub trait IdeaRepository: Send + Sync {
    fn save_idea(&self, idea: &Idea) -> Result<(), DbError>;
    fn find_idea(&self, id: Uuid) -> Result<Option<Idea>, DbError>;
    /// Newest first.
    fn list_ideas(&self, limit: usize) -> Result<Vec<Idea>, DbError>;
    fn update_idea(&self, idea: &Idea) -> Result<bool, DbError>;
    fn delete_idea(&self, id: Uuid) -> Result<bool, DbError>;

    fn append_idea_message(&self, msg: &IdeaMessage) -> Result<(), DbError>;
    fn list_idea_messages(&self, idea_id: Uuid, limit: usize) -> Result<Vec<IdeaMessage>, DbError>;
}

pub trait ActionPlanRepository: Send + Sync {
    fn save_action_plan(&self, plan: &ActionPlan) -> Result<(), DbError>;
    fn find_action_plan(&self, id: Uuid) -> Result<Option<ActionPlan>, DbError>;
    fn find_action_plan_by_idea(&self, idea_id: Uuid) -> Result<Option<ActionPlan>, DbError>;
    fn update_action_plan(&self, plan: &ActionPlan) -> Result<bool, DbError>;
    fn delete_action_plan(&self, id: Uuid) -> Result<bool, DbError>;

    fn append_action_plan_message(&self, msg: &ActionPlanMessage) -> Result<(), DbError>;
    fn list_action_plan_messages(
        &self,
        action_plan_id: Uuid,
        limit: usize,
    ) -> Result<Vec<ActionPlanMessage>, DbError>;
}

pub trait ArchitectureRepository: Send + Sync {
    fn save_architecture(&self, arch: &Architecture) -> Result<(), DbError>;
    fn find_architecture(&self, id: Uuid) -> Result<Option<Architecture>, DbError>;
    fn find_architecture_by_action_plan(
        &self,
        action_plan_id: Uuid,
    ) -> Result<Option<Architecture>, DbError>;
    fn update_architecture(&self, arch: &Architecture) -> Result<bool, DbError>;
    fn delete_architecture(&self, id: Uuid) -> Result<bool, DbError>;

    fn append_architecture_message(&self, msg: &ArchitectureMessage) -> Result<(), DbError>;
    fn list_architecture_messages(
        &self,
        architecture_id: Uuid,
        limit: usize,
    ) -> Result<Vec<ArchitectureMessage>, DbError>;
}

/// Development modules plus the global chat log.
pub trait DevModuleRepository: Send + Sync {
    fn save_module(&self, module: &DevelopmentModule) -> Result<(), DbError>;
    /// All-or-nothing insert.
    fn save_modules(&self, modules: &[DevelopmentModule]) -> Result<(), DbError>;
    fn find_module(&self, id: Uuid) -> Result<Option<DevelopmentModule>, DbError>;
    /// Ordered by priority ascending, then creation time.
    fn list_modules(&self, architecture_id: Uuid) -> Result<Vec<DevelopmentModule>, DbError>;
    fn update_module(&self, module: &DevelopmentModule) -> Result<bool, DbError>;
    fn delete_module(&self, id: Uuid) -> Result<bool, DbError>;
    fn delete_modules_for_architecture(&self, architecture_id: Uuid) -> Result<usize, DbError>;

    fn append_global_message(&self, msg: &GlobalChatMessage) -> Result<(), DbError>;
    fn list_global_messages(
        &self,
        idea_id: Uuid,
        limit: usize,
    ) -> Result<Vec<GlobalChatMessage>, DbError>;
}
