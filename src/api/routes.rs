use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{action_plan, architecture, dev_modules, global_chat, health, ideation};
use super::state::AppState;
use crate::config::ServerConfig;

pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    let ideation_routes = Router::new()
        .route(
            "/ideation/ideas",
            get(ideation::list_ideas).post(ideation::create_idea),
        )
        .route(
            "/ideation/ideas/{id}",
            get(ideation::get_idea)
                .put(ideation::update_idea)
                .delete(ideation::delete_idea),
        )
        .route(
            "/ideation/ideas/{id}/messages",
            get(ideation::list_messages).post(ideation::add_message),
        )
        .route("/ideation/ideas/{id}/edit-section", post(ideation::edit_section))
        .route("/ideation/agent/chat", post(ideation::chat));

    let action_plan_routes = Router::new()
        .route("/action-plan", post(action_plan::create_action_plan))
        .route(
            "/action-plan/{id}",
            get(action_plan::get_action_plan)
                .put(action_plan::update_action_plan)
                .delete(action_plan::delete_action_plan),
        )
        .route("/action-plan/by-idea/{idea_id}", get(action_plan::get_by_idea))
        .route(
            "/action-plan/{id}/messages",
            get(action_plan::list_messages).post(action_plan::add_message),
        )
        .route("/action-plan/{id}/edit-section", post(action_plan::edit_section))
        .route("/action-plan/agent/chat", post(action_plan::chat));

    let architecture_routes = Router::new()
        .route("/architecture", post(architecture::create_architecture))
        .route(
            "/architecture/{id}",
            get(architecture::get_architecture)
                .put(architecture::update_architecture)
                .delete(architecture::delete_architecture),
        )
        .route(
            "/architecture/by-action-plan/{action_plan_id}",
            get(architecture::get_by_action_plan),
        )
        .route(
            "/architecture/{id}/messages",
            get(architecture::list_messages).post(architecture::add_message),
        )
        .route("/architecture/{id}/edit-section", post(architecture::edit_section))
        .route("/architecture/agent/chat", post(architecture::chat));

    let module_routes = Router::new()
        .route("/dev-modules", post(dev_modules::create_module))
        .route("/dev-modules/batch", post(dev_modules::create_batch))
        .route(
            "/dev-modules/{id}",
            get(dev_modules::get_module)
                .put(dev_modules::update_module)
                .delete(dev_modules::delete_module),
        )
        .route(
            "/dev-modules/by-architecture/{architecture_id}",
            get(dev_modules::list_by_architecture).put(dev_modules::replace_all),
        )
        .route("/global-chat", post(global_chat::chat))
        .route("/global-chat/messages/{idea_id}", get(global_chat::list_messages));

    Router::new()
        .route("/health", get(health))
        .merge(ideation_routes)
        .merge(action_plan_routes)
        .merge(architecture_routes)
        .merge(module_routes)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config.allowed_origins))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("DENY"),
                ))
                .layer(DefaultBodyLimit::max(config.body_limit)),
        )
}

/// Any origin when the list is empty, otherwise exactly the listed ones.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}
