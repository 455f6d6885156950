use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::patch::{overwrite_text, PatchField};

/// Root of the pipeline: the user's raw idea.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Idea {
    pub id: Uuid,
    pub title: String,
    pub objective: String,
    pub problem: String,
    pub scope: String,
    pub validate_competition: bool,
    pub validate_monetization: bool,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Idea {
    pub fn new(
        title: impl Into<String>,
        objective: impl Into<String>,
        problem: impl Into<String>,
        scope: impl Into<String>,
        validate_competition: bool,
        validate_monetization: bool,
    ) -> Self {
        let now = crate::models::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            objective: objective.into(),
            problem: problem.into(),
            scope: scope.into(),
            validate_competition,
            validate_monetization,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IdeaField {
    Title,
    Objective,
    Problem,
    Scope,
}

impl PatchField for IdeaField {
    type Target = Idea;

    const ALL: &'static [Self] = &[Self::Title, Self::Objective, Self::Problem, Self::Scope];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Objective => "objective",
            Self::Problem => "problem",
            Self::Scope => "scope",
        }
    }

    fn set(&self, idea: &mut Idea, value: String) {
        match self {
            Self::Title => idea.title = value,
            Self::Objective => idea.objective = value,
            Self::Problem => idea.problem = value,
            Self::Scope => idea.scope = value,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CreateIdeaInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub objective: String,
    #[serde(default)]
    pub problem: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub validate_competition: bool,
    #[serde(default)]
    pub validate_monetization: bool,
}

impl CreateIdeaInput {
    /// Names of the required text fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("title", &self.title),
            ("objective", &self.objective),
            ("problem", &self.problem),
            ("scope", &self.scope),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateIdeaInput {
    pub title: Option<String>,
    pub objective: Option<String>,
    pub problem: Option<String>,
    pub scope: Option<String>,
    pub validate_competition: Option<bool>,
    pub validate_monetization: Option<bool>,
    pub completed: Option<bool>,
}

impl UpdateIdeaInput {
    pub fn apply_to(self, idea: &mut Idea) {
        overwrite_text(&mut idea.title, self.title);
        overwrite_text(&mut idea.objective, self.objective);
        overwrite_text(&mut idea.problem, self.problem);
        overwrite_text(&mut idea.scope, self.scope);
        if let Some(v) = self.validate_competition {
            idea.validate_competition = v;
        }
        if let Some(v) = self.validate_monetization {
            idea.validate_monetization = v;
        }
        if let Some(v) = self.completed {
            idea.completed = v;
        }
    }
}
