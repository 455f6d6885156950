use std::sync::Arc;
use std::time::Duration;

use ideaforge_core::services::StageServices;
use ideaforge_core::Database;

use crate::agent::AgentGateway;
use crate::chat::StageChat;
use crate::propagation::PropagationEngine;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub services: StageServices,
    pub chat: StageChat,
    pub engine: PropagationEngine,
}

impl AppState {
    pub fn new(
        db: Database,
        agent: Arc<dyn AgentGateway>,
        initial_content_timeout: Duration,
    ) -> Self {
        let services = StageServices::from_database(db);
        Self {
            chat: StageChat::new(services.clone(), agent.clone(), initial_content_timeout),
            engine: PropagationEngine::new(services.clone(), agent),
            services,
        }
    }
}
