use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use ideaforge_core::models::GlobalChatMessage;

use super::ListQuery;
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::propagation::GlobalChatOutcome;

const DEFAULT_GLOBAL_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct GlobalChatBody {
    pub idea_id: Uuid,
    #[serde(default)]
    pub message: String,
}

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<GlobalChatBody>, JsonRejection>,
) -> ApiResult<Json<GlobalChatOutcome>> {
    let Json(body) = payload?;
    let outcome = state.engine.run_turn(body.idea_id, &body.message).await?;
    Ok(Json(outcome))
}

pub async fn list_messages(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<GlobalChatMessage>>> {
    let Path(idea_id) = path?;
    let Query(query) = query?;
    let messages = state
        .services
        .modules
        .list_global_messages(idea_id, query.limit_or(DEFAULT_GLOBAL_LIMIT))?;
    Ok(Json(messages))
}
