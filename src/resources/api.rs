//! Resource API Endpoints
//! Mission: Ownership-gated project and task handlers

use crate::auth::models::Identity;
use crate::error::ApiError;
use crate::ownership::authorize_owner;
use crate::resources::models::{
    CreateProjectRequest, CreateTaskRequest, Project, Task, TaskStatus, UpdateTaskStatusRequest,
};
use crate::resources::store::ResourceStore;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

const PROJECT_NOT_FOUND: &str = "Project not found";
const TASK_NOT_FOUND: &str = "Task not found";

/// Shared resource state
#[derive(Clone)]
pub struct ResourcesState {
    pub store: Arc<ResourceStore>,
}

// ===== Projects =====

/// Create project - POST /api/projects
pub async fn create_project(
    State(state): State<ResourcesState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Project name is required"));
    }

    let project = state
        .store
        .create_project(&payload.name, payload.description.as_deref(), identity.id)
        .map_err(|_| ApiError::Internal)?;

    Ok((StatusCode::CREATED, Json(project)))
}

/// List the caller's projects - GET /api/projects
pub async fn list_projects(
    State(state): State<ResourcesState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<Project>>, ApiError> {
    let projects = state
        .store
        .projects_for_owner(identity.id)
        .map_err(|_| ApiError::Internal)?;

    Ok(Json(projects))
}

/// Get a single project - GET /api/projects/:project_id
pub async fn get_project(
    State(state): State<ResourcesState>,
    Extension(identity): Extension<Identity>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Project>, ApiError> {
    let project = load_owned_project(&state.store, &identity, project_id)?;
    Ok(Json(project))
}

/// Delete a project - DELETE /api/projects/:project_id
pub async fn delete_project(
    State(state): State<ResourcesState>,
    Extension(identity): Extension<Identity>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let project = load_owned_project(&state.store, &identity, project_id)?;

    state
        .store
        .delete_project(project.id)
        .map_err(|_| ApiError::Internal)?;

    Ok(Json(json!({ "message": "Project deleted successfully" })))
}

// ===== Tasks =====

/// List tasks under a project - GET /api/projects/:project_id/tasks
pub async fn list_tasks(
    State(state): State<ResourcesState>,
    Extension(identity): Extension<Identity>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let project = load_owned_project(&state.store, &identity, project_id)?;

    let tasks = state
        .store
        .tasks_for_project(project.id)
        .map_err(|_| ApiError::Internal)?;

    Ok(Json(tasks))
}

/// Create a task - POST /api/projects/:project_id/tasks
pub async fn create_task(
    State(state): State<ResourcesState>,
    Extension(identity): Extension<Identity>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Task title is required"));
    }

    let project = load_owned_project(&state.store, &identity, project_id)?;

    let task = state
        .store
        .create_task(
            project.id,
            &payload.title,
            payload.description.as_deref(),
            identity.id,
        )
        .map_err(|_| ApiError::Internal)?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Update task status - PATCH /api/tasks/:task_id
pub async fn update_task_status(
    State(state): State<ResourcesState>,
    Extension(identity): Extension<Identity>,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<UpdateTaskStatusRequest>,
) -> Result<Json<Task>, ApiError> {
    let status =
        TaskStatus::from_str(&payload.status).ok_or(ApiError::BadRequest("Invalid task status"))?;

    let task = load_owned_task(&state.store, &identity, task_id)?;

    state
        .store
        .update_task_status(task.id, status)
        .map_err(|_| ApiError::Internal)?;

    Ok(Json(Task { status, ..task }))
}

/// Delete a task - DELETE /api/tasks/:task_id
pub async fn delete_task(
    State(state): State<ResourcesState>,
    Extension(identity): Extension<Identity>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let task = load_owned_task(&state.store, &identity, task_id)?;

    state
        .store
        .delete_task(task.id)
        .map_err(|_| ApiError::Internal)?;

    Ok(Json(json!({ "message": "Task deleted successfully" })))
}

// ===== Ownership gating =====

/// Load a project and gate it on ownership. Absence and foreign ownership
/// are the same 404 to the caller.
fn load_owned_project(
    store: &ResourceStore,
    identity: &Identity,
    project_id: Uuid,
) -> Result<Project, ApiError> {
    let project = store
        .find_project(project_id)
        .map_err(|_| ApiError::Internal)?
        .ok_or(ApiError::NotFound(PROJECT_NOT_FOUND))?;

    authorize_owner(identity, project.owner_id, PROJECT_NOT_FOUND)?;
    Ok(project)
}

/// Load a task, gating every ownership level in the chain: the parent
/// project's owner first, then the task's own owner. A task whose parent
/// project is gone fails closed.
fn load_owned_task(
    store: &ResourceStore,
    identity: &Identity,
    task_id: Uuid,
) -> Result<Task, ApiError> {
    let task = store
        .find_task(task_id)
        .map_err(|_| ApiError::Internal)?
        .ok_or(ApiError::NotFound(TASK_NOT_FOUND))?;

    let project = store
        .find_project(task.project_id)
        .map_err(|_| ApiError::Internal)?
        .ok_or(ApiError::NotFound(TASK_NOT_FOUND))?;

    authorize_owner(identity, project.owner_id, TASK_NOT_FOUND)?;
    authorize_owner(identity, task.owner_id, TASK_NOT_FOUND)?;
    Ok(task)
}
