//! Stage services: CRUD and message-log access for one aggregate kind each,
//! independent of transport.

mod action_plan;
mod architecture;
mod dev_module;
mod ideation;

use std::sync::Arc;

pub use action_plan::ActionPlanService;
pub use architecture::ArchitectureService;
pub use dev_module::DevModuleService;
pub use ideation::IdeationService;

use crate::db::Database;
use crate::error::{CoreError, CoreResult};
use crate::models::MessageRole;

/// Result of an idempotent create: the record, and whether this call made it.
#[derive(Debug, Clone)]
pub struct Provisioned<T> {
    pub record: T,
    pub created: bool,
}

/// All four stage services over one shared store.
#[derive(Clone)]
pub struct StageServices {
    pub ideation: IdeationService,
    pub action_plans: ActionPlanService,
    pub architectures: ArchitectureService,
    pub modules: DevModuleService,
}

impl StageServices {
    pub fn from_database(db: Database) -> Self {
        let db = Arc::new(db);
        Self {
            ideation: IdeationService::new(db.clone()),
            action_plans: ActionPlanService::new(db.clone()),
            architectures: ArchitectureService::new(db.clone()),
            modules: DevModuleService::new(db),
        }
    }
}

/// Every message log applies the same rule: a user message may not be blank.
/// Agent-authored entries are stored as they come so a turn is always logged.
pub(crate) fn require_content(role: MessageRole, content: &str) -> CoreResult<()> {
    if role == MessageRole::User && content.trim().is_empty() {
        return Err(CoreError::validation("Message content cannot be empty"));
    }
    Ok(())
}
