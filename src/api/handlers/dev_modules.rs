use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use ideaforge_core::models::{CreateModuleInput, DevelopmentModule, UpdateModuleInput};

use crate::api::error::ApiResult;
use crate::api::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateModuleRequest {
    pub architecture_id: Uuid,
    #[serde(flatten)]
    pub module: CreateModuleInput,
}

#[derive(Debug, Deserialize)]
pub struct CreateBatchRequest {
    pub architecture_id: Uuid,
    pub modules: Vec<CreateModuleInput>,
}

#[derive(Debug, Deserialize)]
pub struct ReplaceModulesRequest {
    pub modules: Vec<CreateModuleInput>,
}

pub async fn create_module(
    State(state): State<AppState>,
    payload: Result<Json<CreateModuleRequest>, JsonRejection>,
) -> ApiResult<Json<DevelopmentModule>> {
    let Json(body) = payload?;
    let module = state
        .services
        .modules
        .create_module(body.architecture_id, body.module)?;
    Ok(Json(module))
}

/// All-or-nothing insert of several modules.
pub async fn create_batch(
    State(state): State<AppState>,
    payload: Result<Json<CreateBatchRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<DevelopmentModule>>> {
    let Json(body) = payload?;
    let modules = state
        .services
        .modules
        .create_batch(body.architecture_id, body.modules)?;
    Ok(Json(modules))
}

pub async fn get_module(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<DevelopmentModule>> {
    let Path(id) = path?;
    Ok(Json(state.services.modules.get(id)?))
}

pub async fn update_module(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateModuleInput>, JsonRejection>,
) -> ApiResult<Json<DevelopmentModule>> {
    let Path(id) = path?;
    let Json(input) = payload?;
    Ok(Json(state.services.modules.patch(id, input)?))
}

pub async fn delete_module(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = path?;
    state.services.modules.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_by_architecture(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Vec<DevelopmentModule>>> {
    let Path(architecture_id) = path?;
    Ok(Json(
        state.services.modules.list_by_architecture(architecture_id)?,
    ))
}

pub async fn replace_all(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ReplaceModulesRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<DevelopmentModule>>> {
    let Path(architecture_id) = path?;
    let Json(body) = payload?;
    let modules = state
        .services
        .modules
        .replace_all(architecture_id, body.modules)?;
    Ok(Json(modules))
}
