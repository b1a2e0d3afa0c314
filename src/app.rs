//! Router Assembly
//! Mission: Wire the credential endpoints, the auth gate, and the
//! protected resource routes into one app

use crate::auth::{api as auth_api, auth_gate, AuthState};
use crate::middleware::request_logging;
use crate::resources::{api as resources_api, ResourcesState};
use axum::{
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

/// Build the full application router.
///
/// `/api/auth/*` and the health check are public; every resource route
/// sits behind the auth gate.
pub fn build_router(auth_state: AuthState, resources_state: ResourcesState) -> Router {
    let auth_routes = Router::new()
        .route("/api/auth/register", post(auth_api::register))
        .route("/api/auth/login", post(auth_api::login))
        .route("/api/auth/google", post(auth_api::google_login))
        .with_state(auth_state.clone());

    let resource_routes = Router::new()
        .route(
            "/api/projects",
            post(resources_api::create_project).get(resources_api::list_projects),
        )
        .route(
            "/api/projects/:project_id",
            get(resources_api::get_project).delete(resources_api::delete_project),
        )
        .route(
            "/api/projects/:project_id/tasks",
            get(resources_api::list_tasks).post(resources_api::create_task),
        )
        .route(
            "/api/tasks/:task_id",
            patch(resources_api::update_task_status).delete(resources_api::delete_task),
        )
        .route_layer(axum::middleware::from_fn_with_state(auth_state, auth_gate))
        .with_state(resources_state);

    Router::new()
        .route("/api/health", get(health_check))
        .merge(auth_routes)
        .merge(resource_routes)
        .layer(axum::middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
}

/// Health check endpoint
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}
