mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use ideaforge::agent::{IdeaDraft, Stage, StageUpdates};
use ideaforge::api::{create_router, AppState};
use ideaforge::config::ServerConfig;
use ideaforge_core::models::{FieldPatch, IdeaField};

use common::*;

fn server(agent: &Arc<ScriptedAgent>) -> TestServer {
    let state = AppState::new(memory_db(), agent.clone(), Duration::from_secs(5));
    let app = create_router(state, &ServerConfig::default());
    TestServer::new(app).expect("Failed to start test server")
}

fn idea_body() -> Value {
    json!({
        "title": "Planner",
        "objective": "Help teams ship",
        "problem": "Planning is scattered",
        "scope": "Web app"
    })
}

async fn create_idea(server: &TestServer, agent: &ScriptedAgent) -> Value {
    agent.push_improve(Ok(IdeaDraft::default()));
    let response = server.post("/ideation/ideas").json(&idea_body()).await;
    response.assert_status_ok();
    response.json()
}

#[tokio::test]
async fn health_reports_ok_with_security_headers() {
    let server = server(&ScriptedAgent::new());

    let response = server.get("/health").await;

    response.assert_status_ok();
    response.assert_text("ok");
    assert_eq!(response.header("x-content-type-options"), "nosniff");
    assert_eq!(response.header("x-frame-options"), "DENY");
}

#[tokio::test]
async fn creating_an_idea_returns_the_stored_record() {
    let agent = ScriptedAgent::new();
    let server = server(&agent);

    let idea = create_idea(&server, &agent).await;

    assert_eq!(idea["title"], "Planner");
    assert_eq!(idea["completed"], false);

    let fetched: Value = server
        .get(&format!("/ideation/ideas/{}", idea["id"].as_str().unwrap()))
        .await
        .json();
    assert_eq!(fetched, idea);
}

#[tokio::test]
async fn missing_idea_fields_are_unprocessable() {
    let server = server(&ScriptedAgent::new());

    let response = server
        .post("/ideation/ideas")
        .json(&json!({"title": "Planner", "objective": "", "problem": "x", "scope": "y"}))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["code"], "BUSINESS_RULE");
    assert!(body["error"].as_str().unwrap().contains("objective"));
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let server = server(&ScriptedAgent::new());

    let response = server
        .post("/ideation/ideas")
        .bytes(Bytes::from_static(b"{not json"))
        .content_type("application/json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let server = server(&ScriptedAgent::new());
    let id = uuid::Uuid::new_v4();

    let response = server.get(&format!("/action-plan/{}", id)).await;

    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn stage_chat_applies_updates_and_completion() {
    let agent = ScriptedAgent::new();
    let server = server(&agent);
    let idea = create_idea(&server, &agent).await;
    let id = idea["id"].as_str().unwrap().to_string();
    agent.push_chat(Ok(reply(
        "Done refining.",
        StageUpdates::Ideation(FieldPatch::new().with(IdeaField::Title, "T2")),
        true,
    )));

    let response = server
        .post("/ideation/agent/chat")
        .json(&json!({"idea_id": id, "message": "Finalize it"}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["reply"], "Done refining.");
    assert_eq!(body["isComplete"], true);
    assert_eq!(body["updates"]["title"], "T2");

    let stored: Value = server.get(&format!("/ideation/ideas/{}", id)).await.json();
    assert_eq!(stored["title"], "T2");
    assert_eq!(stored["completed"], true);

    let messages: Vec<Value> = server
        .get(&format!("/ideation/ideas/{}/messages", id))
        .await
        .json();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[1]["role"], "assistant");
}

#[tokio::test]
async fn action_plan_is_created_once_per_idea() {
    let agent = ScriptedAgent::new();
    let server = server(&agent);
    let idea = create_idea(&server, &agent).await;
    agent.push_chat(Ok(plain_reply(Stage::ActionPlan, "Let's plan.")));

    let first: Value = server
        .post("/action-plan")
        .json(&json!({"idea_id": idea["id"]}))
        .await
        .json();
    let second: Value = server
        .post("/action-plan")
        .json(&json!({"idea_id": idea["id"]}))
        .await
        .json();

    assert_eq!(first["id"], second["id"]);
    assert_eq!(first["status"], "draft");

    let by_idea: Value = server
        .get(&format!("/action-plan/by-idea/{}", idea["id"].as_str().unwrap()))
        .await
        .json();
    assert_eq!(by_idea["id"], first["id"]);
}

#[tokio::test]
async fn modules_are_listed_by_priority() {
    let agent = ScriptedAgent::new();
    let server = server(&agent);
    let idea = create_idea(&server, &agent).await;
    let plan: Value = server
        .post("/action-plan")
        .json(&json!({"idea_id": idea["id"]}))
        .await
        .json();
    let arch: Value = server
        .post("/architecture")
        .json(&json!({"action_plan_id": plan["id"]}))
        .await
        .json();
    let arch_id = arch["id"].as_str().unwrap();

    server
        .post("/dev-modules/batch")
        .json(&json!({
            "architecture_id": arch_id,
            "modules": [
                {"name": "Billing", "priority": 2},
                {"name": "Auth", "priority": 1, "dependencies": ["Users"]}
            ]
        }))
        .await
        .assert_status_ok();

    let modules: Vec<Value> = server
        .get(&format!("/dev-modules/by-architecture/{}", arch_id))
        .await
        .json();
    assert_eq!(modules.len(), 2);
    assert_eq!(modules[0]["name"], "Auth");
    assert_eq!(modules[0]["dependencies"], json!(["Users"]));
    assert_eq!(modules[1]["status"], "pending");

    let module_id = modules[1]["id"].as_str().unwrap();
    server
        .delete(&format!("/dev-modules/{}", module_id))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get(&format!("/dev-modules/{}", module_id))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn global_chat_agent_failure_is_a_bad_gateway() {
    let agent = ScriptedAgent::new();
    let server = server(&agent);
    let idea = create_idea(&server, &agent).await;
    let id = idea["id"].as_str().unwrap().to_string();
    agent.push_global(Err(server_error()));

    let response = server
        .post("/global-chat")
        .json(&json!({"idea_id": id, "message": "Rethink the scope"}))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["code"], "AGENT_ERROR");

    let log: Vec<Value> = server
        .get(&format!("/global-chat/messages/{}", id))
        .await
        .json();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0]["role"], "user");
}

#[tokio::test]
async fn rate_limited_agent_is_service_unavailable() {
    let agent = ScriptedAgent::new();
    let server = server(&agent);
    let idea = create_idea(&server, &agent).await;

    let response = server
        .post("/ideation/agent/chat")
        .json(&json!({"idea_id": idea["id"], "message": "Hello"}))
        .await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["code"], "AGENT_UNAVAILABLE");
}

#[tokio::test]
async fn oversized_bodies_are_rejected() {
    let server = server(&ScriptedAgent::new());
    let big = "x".repeat(2 << 20);

    let response = server
        .post("/ideation/ideas")
        .json(&json!({"title": big, "objective": "o", "problem": "p", "scope": "s"}))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = response.json();
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn malformed_ids_are_json_bad_requests() {
    let server = server(&ScriptedAgent::new());

    for path in [
        "/ideation/ideas/not-a-uuid",
        "/action-plan/by-idea/123",
        "/dev-modules/by-architecture/xyz",
    ] {
        let response = server.get(path).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], "BAD_REQUEST", "{}", path);
        assert!(body["error"].is_string(), "{}", path);
    }
}

#[tokio::test]
async fn malformed_limits_are_json_bad_requests() {
    let server = server(&ScriptedAgent::new());

    let response = server.get("/ideation/ideas?limit=abc").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(body["error"].as_str().unwrap().contains("query"));
}
