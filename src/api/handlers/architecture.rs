use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use ideaforge_core::models::{Architecture, ArchitectureMessage, UpdateArchitectureInput};

use super::{AddMessageRequest, EditSectionBody, ListQuery, DEFAULT_MESSAGE_LIMIT};
use crate::agent::{EditSectionReply, StageChatReply};
use crate::api::error::ApiResult;
use crate::api::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateArchitectureRequest {
    pub action_plan_id: Uuid,
}

pub async fn create_architecture(
    State(state): State<AppState>,
    payload: Result<Json<CreateArchitectureRequest>, JsonRejection>,
) -> ApiResult<Json<Architecture>> {
    let Json(body) = payload?;
    Ok(Json(state.chat.create_architecture(body.action_plan_id)?))
}

pub async fn get_architecture(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Architecture>> {
    let Path(id) = path?;
    Ok(Json(state.services.architectures.get(id)?))
}

pub async fn get_by_action_plan(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Architecture>> {
    let Path(action_plan_id) = path?;
    Ok(Json(
        state
            .services
            .architectures
            .get_by_action_plan(action_plan_id)?,
    ))
}

pub async fn update_architecture(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateArchitectureInput>, JsonRejection>,
) -> ApiResult<Json<Architecture>> {
    let Path(id) = path?;
    let Json(input) = payload?;
    Ok(Json(state.services.architectures.patch(id, input)?))
}

pub async fn delete_architecture(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = path?;
    state.services.architectures.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_messages(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<ArchitectureMessage>>> {
    let Path(id) = path?;
    let Query(query) = query?;
    let messages = state
        .services
        .architectures
        .list_messages(id, query.limit_or(DEFAULT_MESSAGE_LIMIT))?;
    Ok(Json(messages))
}

pub async fn add_message(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<AddMessageRequest>, JsonRejection>,
) -> ApiResult<Json<ArchitectureMessage>> {
    let Path(id) = path?;
    let Json(body) = payload?;
    let message = state
        .services
        .architectures
        .add_message(id, body.role, body.content)?;
    Ok(Json(message))
}

pub async fn edit_section(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<EditSectionBody>, JsonRejection>,
) -> ApiResult<Json<EditSectionReply>> {
    let Path(id) = path?;
    let Json(body) = payload?;
    let reply = state
        .chat
        .edit_section::<Architecture>(id, &body.section, &body.message)
        .await?;
    Ok(Json(reply))
}

#[derive(Debug, Deserialize)]
pub struct ArchitectureChatRequest {
    pub architecture_id: Uuid,
    #[serde(default)]
    pub message: String,
}

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ArchitectureChatRequest>, JsonRejection>,
) -> ApiResult<Json<StageChatReply>> {
    let Json(body) = payload?;
    let reply = state
        .chat
        .turn::<Architecture>(body.architecture_id, &body.message)
        .await?;
    Ok(Json(reply))
}
