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

use ideaforge_core::models::{ActionPlan, ActionPlanMessage, UpdateActionPlanInput};

use super::{AddMessageRequest, EditSectionBody, ListQuery, DEFAULT_MESSAGE_LIMIT};
use crate::agent::{EditSectionReply, StageChatReply};
use crate::api::error::ApiResult;
use crate::api::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateActionPlanRequest {
    pub idea_id: Uuid,
}

/// Returns the idea's existing plan if there is one.
pub async fn create_action_plan(
    State(state): State<AppState>,
    payload: Result<Json<CreateActionPlanRequest>, JsonRejection>,
) -> ApiResult<Json<ActionPlan>> {
    let Json(body) = payload?;
    Ok(Json(state.chat.create_action_plan(body.idea_id)?))
}

pub async fn get_action_plan(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<ActionPlan>> {
    let Path(id) = path?;
    Ok(Json(state.services.action_plans.get(id)?))
}

pub async fn get_by_idea(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<ActionPlan>> {
    let Path(idea_id) = path?;
    Ok(Json(state.services.action_plans.get_by_idea(idea_id)?))
}

pub async fn update_action_plan(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateActionPlanInput>, JsonRejection>,
) -> ApiResult<Json<ActionPlan>> {
    let Path(id) = path?;
    let Json(input) = payload?;
    Ok(Json(state.services.action_plans.patch(id, input)?))
}

pub async fn delete_action_plan(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = path?;
    state.services.action_plans.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_messages(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<ActionPlanMessage>>> {
    let Path(id) = path?;
    let Query(query) = query?;
    let messages = state
        .services
        .action_plans
        .list_messages(id, query.limit_or(DEFAULT_MESSAGE_LIMIT))?;
    Ok(Json(messages))
}

pub async fn add_message(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<AddMessageRequest>, JsonRejection>,
) -> ApiResult<Json<ActionPlanMessage>> {
    let Path(id) = path?;
    let Json(body) = payload?;
    let message = state
        .services
        .action_plans
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
        .edit_section::<ActionPlan>(id, &body.section, &body.message)
        .await?;
    Ok(Json(reply))
}

#[derive(Debug, Deserialize)]
pub struct ActionPlanChatRequest {
    pub action_plan_id: Uuid,
    #[serde(default)]
    pub message: String,
}

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ActionPlanChatRequest>, JsonRejection>,
) -> ApiResult<Json<StageChatReply>> {
    let Json(body) = payload?;
    let reply = state
        .chat
        .turn::<ActionPlan>(body.action_plan_id, &body.message)
        .await?;
    Ok(Json(reply))
}
