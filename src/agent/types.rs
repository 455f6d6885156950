//! Wire types exchanged with the external agent.
//!
//! Requests are built from typed per-stage context structs. Replies are
//! decoded straight into typed field patches, so unknown field names and
//! non-string values are discarded here and never reach the stage logic.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use ideaforge_core::models::{
    ActionPlan, ActionPlanField, Architecture, ArchitectureField, CreateModuleInput,
    DevelopmentModule, FieldPatch, Idea, IdeaField, MessageRole, ModuleStatus, PatchField,
};

/// A pipeline stage that has its own agent conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Ideation,
    ActionPlan,
    Architecture,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ideation => "ideation",
            Self::ActionPlan => "action_plan",
            Self::Architecture => "architecture",
        }
    }

    pub fn chat_path(&self) -> &'static str {
        match self {
            Self::Ideation => "/flows/ideationAgent",
            Self::ActionPlan => "/action-plan/chat",
            Self::Architecture => "/architecture/chat",
        }
    }

    pub fn edit_section_path(&self) -> &'static str {
        match self {
            Self::Ideation => "/ideation/edit-section",
            Self::ActionPlan => "/action-plan/edit-section",
            Self::Architecture => "/architecture/edit-section",
        }
    }

    /// Names of the fields a section edit may target.
    pub fn sections(&self) -> Vec<&'static str> {
        match self {
            Self::Ideation => field_names::<IdeaField>(),
            Self::ActionPlan => field_names::<ActionPlanField>(),
            Self::Architecture => field_names::<ArchitectureField>(),
        }
    }
}

fn field_names<F: PatchField>() -> Vec<&'static str> {
    F::ALL.iter().map(|f| f.as_str()).collect()
}

pub const IMPROVE_IDEA_PATH: &str = "/ideation/improve-initial";
pub const GLOBAL_CHAT_PATH: &str = "/global-chat";

// ---------------------------------------------------------------------------
// Stage context
// ---------------------------------------------------------------------------

/// The four free-text fields of an idea, as sent to and returned by the agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub objective: String,
    #[serde(default)]
    pub problem: String,
    #[serde(default)]
    pub scope: String,
}

impl IdeaDraft {
    /// Takes each field from `self` unless it is blank, in which case the
    /// field from `fallback` is kept.
    pub fn or_fallback(self, fallback: IdeaDraft) -> IdeaDraft {
        fn pick(improved: String, original: String) -> String {
            if improved.trim().is_empty() {
                original
            } else {
                improved
            }
        }

        IdeaDraft {
            title: pick(self.title, fallback.title),
            objective: pick(self.objective, fallback.objective),
            problem: pick(self.problem, fallback.problem),
            scope: pick(self.scope, fallback.scope),
        }
    }
}

impl From<&Idea> for IdeaDraft {
    fn from(idea: &Idea) -> Self {
        Self {
            title: idea.title.clone(),
            objective: idea.objective.clone(),
            problem: idea.problem.clone(),
            scope: idea.scope.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionPlanContext {
    pub functional_requirements: String,
    pub non_functional_requirements: String,
    pub business_logic_flow: String,
}

impl From<&ActionPlan> for ActionPlanContext {
    fn from(plan: &ActionPlan) -> Self {
        Self {
            functional_requirements: plan.functional_requirements.clone(),
            non_functional_requirements: plan.non_functional_requirements.clone(),
            business_logic_flow: plan.business_logic_flow.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchitectureContext {
    pub user_stories: String,
    pub database_type: String,
    pub database_schema: String,
    pub entities_relationships: String,
    pub tech_stack: String,
    pub architecture_pattern: String,
    pub system_architecture: String,
}

impl From<&Architecture> for ArchitectureContext {
    fn from(arch: &Architecture) -> Self {
        Self {
            user_stories: arch.user_stories.clone(),
            database_type: arch.database_type.clone(),
            database_schema: arch.database_schema.clone(),
            entities_relationships: arch.entities_relationships.clone(),
            tech_stack: arch.tech_stack.clone(),
            architecture_pattern: arch.architecture_pattern.clone(),
            system_architecture: arch.system_architecture.clone(),
        }
    }
}

/// What a stage conversation is about: the aggregate's fields plus the
/// upstream stage it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StageContext {
    Ideation {
        idea_id: Uuid,
        idea: IdeaDraft,
    },
    ActionPlan {
        action_plan_id: Uuid,
        idea_id: Uuid,
        idea: IdeaDraft,
        context: ActionPlanContext,
    },
    Architecture {
        architecture_id: Uuid,
        action_plan_id: Uuid,
        action_plan: ActionPlanContext,
        context: ArchitectureContext,
    },
}

impl StageContext {
    pub fn ideation(idea: &Idea) -> Self {
        Self::Ideation {
            idea_id: idea.id,
            idea: idea.into(),
        }
    }

    pub fn action_plan(plan: &ActionPlan, idea: &Idea) -> Self {
        Self::ActionPlan {
            action_plan_id: plan.id,
            idea_id: plan.idea_id,
            idea: idea.into(),
            context: plan.into(),
        }
    }

    pub fn architecture(arch: &Architecture, plan: &ActionPlan) -> Self {
        Self::Architecture {
            architecture_id: arch.id,
            action_plan_id: arch.action_plan_id,
            action_plan: plan.into(),
            context: arch.into(),
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Self::Ideation { .. } => Stage::Ideation,
            Self::ActionPlan { .. } => Stage::ActionPlan,
            Self::Architecture { .. } => Stage::Architecture,
        }
    }
}

// ---------------------------------------------------------------------------
// Stage chat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: MessageRole,
    pub content: String,
}

impl HistoryEntry {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageChatRequest {
    #[serde(flatten)]
    pub subject: StageContext,
    pub history: Vec<HistoryEntry>,
    pub message: String,
}

impl StageChatRequest {
    pub fn stage(&self) -> Stage {
        self.subject.stage()
    }
}

/// Field updates suggested by a stage chat, typed by the stage asked.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StageUpdates {
    Ideation(FieldPatch<IdeaField>),
    ActionPlan(FieldPatch<ActionPlanField>),
    Architecture(FieldPatch<ArchitectureField>),
}

impl StageUpdates {
    pub fn empty(stage: Stage) -> Self {
        match stage {
            Stage::Ideation => Self::Ideation(FieldPatch::new()),
            Stage::ActionPlan => Self::ActionPlan(FieldPatch::new()),
            Stage::Architecture => Self::Architecture(FieldPatch::new()),
        }
    }

    /// Decodes a raw `updates` object against the field set of `stage`.
    pub fn decode(stage: Stage, raw: serde_json::Value) -> Result<Self, serde_json::Error> {
        Ok(match stage {
            Stage::Ideation => Self::Ideation(serde_json::from_value(raw)?),
            Stage::ActionPlan => Self::ActionPlan(serde_json::from_value(raw)?),
            Stage::Architecture => Self::Architecture(serde_json::from_value(raw)?),
        })
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Ideation(p) => p.is_empty(),
            Self::ActionPlan(p) => p.is_empty(),
            Self::Architecture(p) => p.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageChatReply {
    pub reply: String,
    pub should_update: bool,
    pub updates: StageUpdates,
    pub is_complete: bool,
}

impl StageChatReply {
    /// True when the reply's updates should be written to the aggregate.
    pub fn wants_update(&self) -> bool {
        (self.should_update && !self.updates.is_empty()) || self.is_complete
    }
}

/// Untyped stage chat reply as it arrives on the wire.
#[derive(Debug, Deserialize)]
pub(crate) struct RawStageChatReply {
    #[serde(default, alias = "response")]
    pub reply: String,
    #[serde(default, rename = "shouldUpdate")]
    pub should_update: bool,
    #[serde(default)]
    pub updates: serde_json::Value,
    #[serde(default, rename = "isComplete")]
    pub is_complete: bool,
}

impl RawStageChatReply {
    pub fn into_typed(self, stage: Stage) -> Result<StageChatReply, serde_json::Error> {
        Ok(StageChatReply {
            reply: self.reply,
            should_update: self.should_update,
            updates: StageUpdates::decode(stage, self.updates)?,
            is_complete: self.is_complete,
        })
    }
}

// ---------------------------------------------------------------------------
// Section edit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditSectionRequest {
    #[serde(flatten)]
    pub subject: StageContext,
    pub section: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSectionReply {
    #[serde(default)]
    pub reply: String,
    #[serde(default)]
    pub updated_section: String,
    #[serde(default)]
    pub added_text: String,
    /// Opaque hint about downstream sections; returned to the caller as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub propagation: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Global chat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalChatRequest {
    pub message: String,
    pub idea: Idea,
    pub action_plan: Option<ActionPlan>,
    pub architecture: Option<Architecture>,
    pub modules: Vec<DevelopmentModule>,
}

/// Per-aggregate field patches suggested by one global chat turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Propagation {
    #[serde(
        default,
        deserialize_with = "lenient_patch",
        skip_serializing_if = "Option::is_none"
    )]
    pub ideation: Option<FieldPatch<IdeaField>>,
    #[serde(
        default,
        deserialize_with = "lenient_patch",
        skip_serializing_if = "Option::is_none"
    )]
    pub action_plan: Option<FieldPatch<ActionPlanField>>,
    #[serde(
        default,
        deserialize_with = "lenient_patch",
        skip_serializing_if = "Option::is_none"
    )]
    pub architecture: Option<FieldPatch<ArchitectureField>>,
}

/// A module the agent wants added to the architecture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewModuleSpec {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub functionality: String,
    #[serde(default)]
    pub technical_details: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub priority: i32,
}

impl From<NewModuleSpec> for CreateModuleInput {
    fn from(spec: NewModuleSpec) -> Self {
        CreateModuleInput {
            name: spec.name,
            description: spec.description,
            functionality: spec.functionality,
            dependencies: spec.dependencies,
            technical_details: spec.technical_details,
            priority: spec.priority,
            status: Some(ModuleStatus::Pending),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalChatReply {
    #[serde(default)]
    pub reply: String,
    #[serde(default)]
    pub is_global: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub propagation: Propagation,
    #[serde(default, deserialize_with = "null_as_default")]
    pub new_modules: Vec<NewModuleSpec>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Anything other than an object for a stage key is ignored, not an error.
fn lenient_patch<'de, D, F>(deserializer: D) -> Result<Option<FieldPatch<F>>, D::Error>
where
    D: Deserializer<'de>,
    F: PatchField,
    FieldPatch<F>: DeserializeOwned,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(raw @ serde_json::Value::Object(_)) => Ok(serde_json::from_value(raw).ok()),
        Some(other) => {
            tracing::debug!(value = %other, "ignoring non-object propagation entry");
            Ok(None)
        }
        None => Ok(None),
    }
}
