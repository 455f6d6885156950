use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::patch::{overwrite_text, PatchField};
use super::status::StageStatus;

/// Requirements and business flow derived from a completed idea. One per idea.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionPlan {
    pub id: Uuid,
    pub idea_id: Uuid,
    pub status: StageStatus,
    pub functional_requirements: String,
    pub non_functional_requirements: String,
    pub business_logic_flow: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ActionPlan {
    /// A blank draft for `idea_id`.
    pub fn draft(idea_id: Uuid) -> Self {
        let now = crate::models::now();
        Self {
            id: Uuid::new_v4(),
            idea_id,
            status: StageStatus::Draft,
            functional_requirements: String::new(),
            non_functional_requirements: String::new(),
            business_logic_flow: String::new(),
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActionPlanField {
    FunctionalRequirements,
    NonFunctionalRequirements,
    BusinessLogicFlow,
}

impl PatchField for ActionPlanField {
    type Target = ActionPlan;

    const ALL: &'static [Self] = &[
        Self::FunctionalRequirements,
        Self::NonFunctionalRequirements,
        Self::BusinessLogicFlow,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::FunctionalRequirements => "functional_requirements",
            Self::NonFunctionalRequirements => "non_functional_requirements",
            Self::BusinessLogicFlow => "business_logic_flow",
        }
    }

    fn set(&self, plan: &mut ActionPlan, value: String) {
        match self {
            Self::FunctionalRequirements => plan.functional_requirements = value,
            Self::NonFunctionalRequirements => plan.non_functional_requirements = value,
            Self::BusinessLogicFlow => plan.business_logic_flow = value,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateActionPlanInput {
    pub status: Option<StageStatus>,
    pub functional_requirements: Option<String>,
    pub non_functional_requirements: Option<String>,
    pub business_logic_flow: Option<String>,
    pub completed: Option<bool>,
}

impl UpdateActionPlanInput {
    pub fn apply_to(self, plan: &mut ActionPlan) {
        if let Some(status) = self.status {
            plan.status = status;
        }
        overwrite_text(&mut plan.functional_requirements, self.functional_requirements);
        overwrite_text(
            &mut plan.non_functional_requirements,
            self.non_functional_requirements,
        );
        overwrite_text(&mut plan.business_logic_flow, self.business_logic_flow);
        if let Some(completed) = self.completed {
            plan.completed = completed;
        }
    }
}
