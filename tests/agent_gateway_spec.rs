use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

use ideaforge::agent::{
    AgentError, AgentGateway, EditSectionRequest, GlobalChatRequest, HttpAgentGateway, IdeaDraft,
    StageChatRequest, StageContext, StageUpdates,
};
use ideaforge::config::AgentConfig;
use ideaforge_core::models::{Architecture, Idea, IdeaField};

type Seen = Arc<Mutex<Vec<(String, Option<String>, Value)>>>;

/// Serves `app` on an ephemeral port and returns its base URL.
async fn spawn_agent(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", address)
}

fn recording(path: &'static str, reply: Value, seen: Seen) -> Router {
    Router::new().route(
        path,
        post(move |headers: HeaderMap, Json(body): Json<Value>| {
            let seen = seen.clone();
            let reply = reply.clone();
            async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(String::from);
                seen.lock().unwrap().push((path.to_string(), auth, body));
                Json(reply)
            }
        }),
    )
}

fn gateway(base_url: &str) -> HttpAgentGateway {
    HttpAgentGateway::new(AgentConfig::default().with_base_url(base_url)).unwrap()
}

fn sample_idea() -> Idea {
    Idea::new("Planner", "Help teams ship", "Planning is scattered", "Web app", false, false)
}

#[tokio::test]
async fn improve_idea_sends_bearer_token() {
    let seen: Seen = Arc::default();
    let app = recording(
        "/ideation/improve-initial",
        json!({"title": "Better", "objective": "o", "problem": "p", "scope": "s"}),
        seen.clone(),
    );
    let base = spawn_agent(app).await;
    let gateway = HttpAgentGateway::new(
        AgentConfig::default()
            .with_base_url(format!("{}/", base))
            .with_auth_token("secret"),
    )
    .unwrap();

    let improved = gateway
        .improve_idea(&IdeaDraft::from(&sample_idea()))
        .await
        .unwrap();

    assert_eq!(improved.title, "Better");
    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].1.as_deref(), Some("Bearer secret"));
    assert_eq!(seen[0].2["title"], "Planner");
}

#[tokio::test]
async fn stage_chat_decodes_updates_for_its_stage() {
    let seen: Seen = Arc::default();
    let app = recording(
        "/flows/ideationAgent",
        json!({
            "response": "Try this title.",
            "shouldUpdate": true,
            "updates": {"title": "Team Planner", "budget": "n/a", "scope": 3},
            "isComplete": false
        }),
        seen.clone(),
    );
    let gateway = gateway(&spawn_agent(app).await);
    let idea = sample_idea();
    let request = StageChatRequest {
        subject: StageContext::ideation(&idea),
        history: Vec::new(),
        message: "Better title?".into(),
    };

    let reply = gateway.chat(&request).await.unwrap();

    assert_eq!(reply.reply, "Try this title.");
    assert!(reply.should_update);
    match &reply.updates {
        StageUpdates::Ideation(patch) => {
            assert_eq!(patch.get(IdeaField::Title), Some("Team Planner"));
            assert_eq!(patch.get(IdeaField::Scope), None);
        }
        other => panic!("expected ideation updates, got {:?}", other),
    }
    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].1, None);
    assert_eq!(seen[0].2["idea_id"], json!(idea.id));
    assert_eq!(seen[0].2["message"], "Better title?");
}

#[tokio::test]
async fn edit_section_posts_to_the_stage_path() {
    let seen: Seen = Arc::default();
    let app = recording(
        "/architecture/edit-section",
        json!({"reply": "ok", "updatedSection": "Rust", "addedText": "Rust", "propagation": {"ideation": {}}}),
        seen.clone(),
    );
    let gateway = gateway(&spawn_agent(app).await);
    let idea = sample_idea();
    let plan = ideaforge_core::models::ActionPlan::draft(idea.id);
    let arch = Architecture::draft(plan.id);
    let request = EditSectionRequest {
        subject: StageContext::architecture(&arch, &plan),
        section: "tech_stack".into(),
        message: "Use Rust".into(),
    };

    let reply = gateway.edit_section(&request).await.unwrap();

    assert_eq!(reply.updated_section, "Rust");
    assert!(reply.propagation.is_some());
    assert_eq!(seen.lock().unwrap()[0].2["section"], "tech_stack");
}

#[tokio::test]
async fn global_chat_tolerates_null_collections() {
    let app = recording(
        "/global-chat",
        json!({
            "reply": "Noted.",
            "is_global": true,
            "propagation": {"architecture": {"tech_stack": "Go"}, "action_plan": "not an object"},
            "new_modules": null
        }),
        Arc::default(),
    );
    let gateway = gateway(&spawn_agent(app).await);
    let request = GlobalChatRequest {
        message: "Switch to Go".into(),
        idea: sample_idea(),
        action_plan: None,
        architecture: None,
        modules: Vec::new(),
    };

    let reply = gateway.global_chat(&request).await.unwrap();

    assert_eq!(reply.reply, "Noted.");
    assert!(reply.new_modules.is_empty());
    assert!(reply.propagation.architecture.is_some());
    assert!(reply.propagation.action_plan.is_none());
}

#[tokio::test]
async fn error_statuses_are_reported() {
    let app = Router::new()
        .route(
            "/ideation/improve-initial",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        )
        .route(
            "/global-chat",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
    let gateway = gateway(&spawn_agent(app).await);

    let limited = gateway
        .improve_idea(&IdeaDraft::default())
        .await
        .unwrap_err();
    assert!(limited.is_unavailable());

    let request = GlobalChatRequest {
        message: "Hi".into(),
        idea: sample_idea(),
        action_plan: None,
        architecture: None,
        modules: Vec::new(),
    };
    match gateway.global_chat(&request).await {
        Err(AgentError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected a status error, got {:?}", other),
    }
}

#[tokio::test]
async fn malformed_replies_are_decode_errors() {
    let app = Router::new().route(
        "/ideation/improve-initial",
        post(|| async { "not json" }),
    );
    let gateway = gateway(&spawn_agent(app).await);

    let err = gateway
        .improve_idea(&IdeaDraft::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AgentError::Decode(_)));
}

#[tokio::test]
async fn slow_agents_time_out() {
    let app = Router::new().route(
        "/ideation/improve-initial",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({}))
        }),
    );
    let base = spawn_agent(app).await;
    let gateway = HttpAgentGateway::new(
        AgentConfig::default()
            .with_base_url(base)
            .with_timeout(Duration::from_millis(100)),
    )
    .unwrap();

    let err = gateway
        .improve_idea(&IdeaDraft::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AgentError::Timeout(t) if t == Duration::from_millis(100)));
}

#[tokio::test]
async fn unreachable_agents_are_transport_errors() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = gateway(&base)
        .improve_idea(&IdeaDraft::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AgentError::Transport(_)));
    assert!(!err.is_unavailable());
}
