//! Shared fixtures for the server-level specs.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use ideaforge::agent::{
    AgentError, AgentGateway, EditSectionReply, EditSectionRequest, GlobalChatReply,
    GlobalChatRequest, IdeaDraft, Stage, StageChatReply, StageChatRequest, StageUpdates,
};
use ideaforge_core::db::DbError;
use ideaforge_core::models::*;
use ideaforge_core::ports::ActionPlanRepository;
use ideaforge_core::services::{
    ActionPlanService, ArchitectureService, DevModuleService, IdeationService, StageServices,
};
use ideaforge_core::Database;

type Script<T> = Mutex<VecDeque<Result<T, AgentError>>>;

/// Agent double that replays queued replies in order and records requests.
/// An exhausted queue answers with a 503.
#[derive(Default)]
pub struct ScriptedAgent {
    improve: Script<IdeaDraft>,
    chat: Script<StageChatReply>,
    edit: Script<EditSectionReply>,
    global: Script<GlobalChatReply>,
    pub chat_requests: Mutex<Vec<StageChatRequest>>,
    pub edit_requests: Mutex<Vec<EditSectionRequest>>,
    pub global_requests: Mutex<Vec<GlobalChatRequest>>,
}

impl ScriptedAgent {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_improve(&self, reply: Result<IdeaDraft, AgentError>) {
        self.improve.lock().unwrap().push_back(reply);
    }

    pub fn push_chat(&self, reply: Result<StageChatReply, AgentError>) {
        self.chat.lock().unwrap().push_back(reply);
    }

    pub fn push_edit(&self, reply: Result<EditSectionReply, AgentError>) {
        self.edit.lock().unwrap().push_back(reply);
    }

    pub fn push_global(&self, reply: Result<GlobalChatReply, AgentError>) {
        self.global.lock().unwrap().push_back(reply);
    }

    pub fn chat_calls(&self) -> usize {
        self.chat_requests.lock().unwrap().len()
    }
}

fn next<T>(script: &Script<T>) -> Result<T, AgentError> {
    script
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(unavailable()))
}

#[async_trait]
impl AgentGateway for ScriptedAgent {
    async fn improve_idea(&self, _draft: &IdeaDraft) -> Result<IdeaDraft, AgentError> {
        next(&self.improve)
    }

    async fn chat(&self, request: &StageChatRequest) -> Result<StageChatReply, AgentError> {
        self.chat_requests.lock().unwrap().push(request.clone());
        next(&self.chat)
    }

    async fn edit_section(
        &self,
        request: &EditSectionRequest,
    ) -> Result<EditSectionReply, AgentError> {
        self.edit_requests.lock().unwrap().push(request.clone());
        next(&self.edit)
    }

    async fn global_chat(
        &self,
        request: &GlobalChatRequest,
    ) -> Result<GlobalChatReply, AgentError> {
        self.global_requests.lock().unwrap().push(request.clone());
        next(&self.global)
    }
}

pub fn unavailable() -> AgentError {
    AgentError::Status {
        status: 503,
        body: "no scripted reply".into(),
    }
}

pub fn server_error() -> AgentError {
    AgentError::Status {
        status: 500,
        body: "boom".into(),
    }
}

pub fn reply(text: &str, updates: StageUpdates, is_complete: bool) -> StageChatReply {
    StageChatReply {
        reply: text.to_string(),
        should_update: !updates.is_empty(),
        updates,
        is_complete,
    }
}

pub fn plain_reply(stage: Stage, text: &str) -> StageChatReply {
    reply(text, StageUpdates::empty(stage), false)
}

pub fn memory_db() -> Database {
    let db = Database::open_in_memory().expect("Failed to create test database");
    db.migrate().expect("Failed to migrate test database");
    db
}

pub fn idea_input(title: &str) -> CreateIdeaInput {
    CreateIdeaInput {
        title: title.to_string(),
        objective: "Help teams ship".to_string(),
        problem: "Planning is scattered".to_string(),
        scope: "Web app".to_string(),
        ..Default::default()
    }
}

/// Idea -> action plan -> architecture, created directly through the services.
pub fn seed_pipeline(services: &StageServices) -> (Idea, ActionPlan, Architecture) {
    let idea = services.ideation.create(idea_input("Planner")).unwrap();
    let plan = services.action_plans.create(idea.id).unwrap();
    let arch = services.architectures.create(plan.id).unwrap();
    (idea, plan, arch)
}

/// Action plan store whose updates always fail.
pub struct BrokenPlanUpdates(pub Arc<Database>);

impl ActionPlanRepository for BrokenPlanUpdates {
    fn save_action_plan(&self, plan: &ActionPlan) -> Result<(), DbError> {
        self.0.save_action_plan(plan)
    }

    fn find_action_plan(&self, id: Uuid) -> Result<Option<ActionPlan>, DbError> {
        self.0.find_action_plan(id)
    }

    fn find_action_plan_by_idea(&self, idea_id: Uuid) -> Result<Option<ActionPlan>, DbError> {
        self.0.find_action_plan_by_idea(idea_id)
    }

    fn update_action_plan(&self, _plan: &ActionPlan) -> Result<bool, DbError> {
        Err(DbError::Lock("injected failure".into()))
    }

    fn delete_action_plan(&self, id: Uuid) -> Result<bool, DbError> {
        self.0.delete_action_plan(id)
    }

    fn append_action_plan_message(&self, msg: &ActionPlanMessage) -> Result<(), DbError> {
        self.0.append_action_plan_message(msg)
    }

    fn list_action_plan_messages(
        &self,
        action_plan_id: Uuid,
        limit: usize,
    ) -> Result<Vec<ActionPlanMessage>, DbError> {
        self.0.list_action_plan_messages(action_plan_id, limit)
    }
}

/// Stage services over `db`, with action plan updates failing.
pub fn services_with_broken_plans(db: Database) -> StageServices {
    let db = Arc::new(db);
    StageServices {
        ideation: IdeationService::new(db.clone()),
        action_plans: ActionPlanService::new(Arc::new(BrokenPlanUpdates(db.clone()))),
        architectures: ArchitectureService::new(db.clone()),
        modules: DevModuleService::new(db),
    }
}
