use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::patch::overwrite_text;
use super::status::ModuleStatus;

/// A unit of development work planned for an architecture.
///
/// Listings are ordered by `priority` ascending, then creation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DevelopmentModule {
    pub id: Uuid,
    pub architecture_id: Uuid,
    pub name: String,
    pub description: String,
    pub functionality: String,
    pub dependencies: Vec<String>,
    pub technical_details: String,
    pub priority: i32,
    pub status: ModuleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CreateModuleInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub functionality: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub technical_details: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub status: Option<ModuleStatus>,
}

impl CreateModuleInput {
    pub fn into_module(self, architecture_id: Uuid, now: DateTime<Utc>) -> DevelopmentModule {
        DevelopmentModule {
            id: Uuid::new_v4(),
            architecture_id,
            name: self.name,
            description: self.description,
            functionality: self.functionality,
            dependencies: self.dependencies,
            technical_details: self.technical_details,
            priority: self.priority,
            status: self.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateModuleInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub functionality: Option<String>,
    pub dependencies: Option<Vec<String>>,
    pub technical_details: Option<String>,
    pub priority: Option<i32>,
    pub status: Option<ModuleStatus>,
}

impl UpdateModuleInput {
    pub fn apply_to(self, module: &mut DevelopmentModule) {
        overwrite_text(&mut module.name, self.name);
        overwrite_text(&mut module.description, self.description);
        overwrite_text(&mut module.functionality, self.functionality);
        overwrite_text(&mut module.technical_details, self.technical_details);
        if let Some(dependencies) = self.dependencies {
            module.dependencies = dependencies;
        }
        if let Some(priority) = self.priority {
            module.priority = priority;
        }
        if let Some(status) = self.status {
            module.status = status;
        }
    }
}
