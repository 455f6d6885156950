use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::patch::{overwrite_text, PatchField};
use super::status::StageStatus;

/// Technical design for an action plan. One per action plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Architecture {
    pub id: Uuid,
    pub action_plan_id: Uuid,
    pub status: StageStatus,

    pub user_stories: String,

    pub database_type: String,
    pub database_schema: String,
    pub entities_relationships: String,

    pub tech_stack: String,
    pub architecture_pattern: String,
    pub system_architecture: String,

    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Architecture {
    pub fn draft(action_plan_id: Uuid) -> Self {
        let now = crate::models::now();
        Self {
            id: Uuid::new_v4(),
            action_plan_id,
            status: StageStatus::Draft,
            user_stories: String::new(),
            database_type: String::new(),
            database_schema: String::new(),
            entities_relationships: String::new(),
            tech_stack: String::new(),
            architecture_pattern: String::new(),
            system_architecture: String::new(),
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ArchitectureField {
    UserStories,
    DatabaseType,
    DatabaseSchema,
    EntitiesRelationships,
    TechStack,
    ArchitecturePattern,
    SystemArchitecture,
}

impl PatchField for ArchitectureField {
    type Target = Architecture;

    const ALL: &'static [Self] = &[
        Self::UserStories,
        Self::DatabaseType,
        Self::DatabaseSchema,
        Self::EntitiesRelationships,
        Self::TechStack,
        Self::ArchitecturePattern,
        Self::SystemArchitecture,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::UserStories => "user_stories",
            Self::DatabaseType => "database_type",
            Self::DatabaseSchema => "database_schema",
            Self::EntitiesRelationships => "entities_relationships",
            Self::TechStack => "tech_stack",
            Self::ArchitecturePattern => "architecture_pattern",
            Self::SystemArchitecture => "system_architecture",
        }
    }

    fn set(&self, arch: &mut Architecture, value: String) {
        match self {
            Self::UserStories => arch.user_stories = value,
            Self::DatabaseType => arch.database_type = value,
            Self::DatabaseSchema => arch.database_schema = value,
            Self::EntitiesRelationships => arch.entities_relationships = value,
            Self::TechStack => arch.tech_stack = value,
            Self::ArchitecturePattern => arch.architecture_pattern = value,
            Self::SystemArchitecture => arch.system_architecture = value,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateArchitectureInput {
    pub status: Option<StageStatus>,
    pub user_stories: Option<String>,
    pub database_type: Option<String>,
    pub database_schema: Option<String>,
    pub entities_relationships: Option<String>,
    pub tech_stack: Option<String>,
    pub architecture_pattern: Option<String>,
    pub system_architecture: Option<String>,
    pub completed: Option<bool>,
}

impl UpdateArchitectureInput {
    pub fn apply_to(self, arch: &mut Architecture) {
        if let Some(status) = self.status {
            arch.status = status;
        }
        overwrite_text(&mut arch.user_stories, self.user_stories);
        overwrite_text(&mut arch.database_type, self.database_type);
        overwrite_text(&mut arch.database_schema, self.database_schema);
        overwrite_text(&mut arch.entities_relationships, self.entities_relationships);
        overwrite_text(&mut arch.tech_stack, self.tech_stack);
        overwrite_text(&mut arch.architecture_pattern, self.architecture_pattern);
        overwrite_text(&mut arch.system_architecture, self.system_architecture);
        if let Some(completed) = self.completed {
            arch.completed = completed;
        }
    }
}
