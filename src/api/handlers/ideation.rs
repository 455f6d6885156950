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

use ideaforge_core::models::{CreateIdeaInput, Idea, IdeaMessage, UpdateIdeaInput};

use super::{AddMessageRequest, EditSectionBody, ListQuery, DEFAULT_MESSAGE_LIMIT};
use crate::agent::{EditSectionReply, StageChatReply};
use crate::api::error::ApiResult;
use crate::api::state::AppState;

const DEFAULT_IDEA_LIMIT: usize = 50;

pub async fn list_ideas(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Idea>>> {
    let Query(query) = query?;
    let ideas = state.services.ideation.list(query.limit_or(DEFAULT_IDEA_LIMIT))?;
    Ok(Json(ideas))
}

pub async fn create_idea(
    State(state): State<AppState>,
    payload: Result<Json<CreateIdeaInput>, JsonRejection>,
) -> ApiResult<Json<Idea>> {
    let Json(input) = payload?;
    let idea = state.chat.create_idea(input).await?;
    Ok(Json(idea))
}

pub async fn get_idea(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Idea>> {
    let Path(id) = path?;
    Ok(Json(state.services.ideation.get(id)?))
}

pub async fn update_idea(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateIdeaInput>, JsonRejection>,
) -> ApiResult<Json<Idea>> {
    let Path(id) = path?;
    let Json(input) = payload?;
    Ok(Json(state.services.ideation.patch(id, input)?))
}

pub async fn delete_idea(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = path?;
    state.services.ideation.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_messages(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<IdeaMessage>>> {
    let Path(id) = path?;
    let Query(query) = query?;
    let messages = state
        .services
        .ideation
        .list_messages(id, query.limit_or(DEFAULT_MESSAGE_LIMIT))?;
    Ok(Json(messages))
}

pub async fn add_message(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<AddMessageRequest>, JsonRejection>,
) -> ApiResult<Json<IdeaMessage>> {
    let Path(id) = path?;
    let Json(body) = payload?;
    let message = state.services.ideation.add_message(id, body.role, body.content)?;
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
        .edit_section::<Idea>(id, &body.section, &body.message)
        .await?;
    Ok(Json(reply))
}

#[derive(Debug, Deserialize)]
pub struct IdeaChatRequest {
    pub idea_id: Uuid,
    #[serde(default)]
    pub message: String,
}

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<IdeaChatRequest>, JsonRejection>,
) -> ApiResult<Json<StageChatReply>> {
    let Json(body) = payload?;
    let reply = state.chat.turn::<Idea>(body.idea_id, &body.message).await?;
    Ok(Json(reply))
}
