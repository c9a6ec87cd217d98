// src/web/admin_assignment_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        assignment::{
            Assignment, AssignmentIdQuery, CreateAssignmentPayload, EnrichedAssignment,
            UpdateAssignmentPayload,
        },
        user::{DniQuery, SessionUser},
    },
    services::assignment_service,
    state::AppState,
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

/// GET /api/admin/assignments[?dni=]
pub async fn list_assignments(
    State(state): State<AppState>,
    query: Result<Query<DniQuery>, QueryRejection>,
) -> AppResult<Json<Vec<EnrichedAssignment>>> {
    let Query(params) = query?;
    let assignments = assignment_service::list_assignments(&state.db_pool, params.dni).await?;
    Ok(Json(assignments))
}

/// POST /api/admin/assignments
pub async fn create_assignment(
    State(state): State<AppState>,
    Extension(admin): Extension<SessionUser>,
    payload: Result<Json<CreateAssignmentPayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(form) = payload?;
    let assignment =
        assignment_service::create_assignment(&state.db_pool, form, &admin.username).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

/// PUT /api/admin/assignments (id interno no corpo)
pub async fn update_assignment(
    State(state): State<AppState>,
    payload: Result<Json<UpdateAssignmentPayload>, JsonRejection>,
) -> AppResult<Json<Assignment>> {
    let Json(form) = payload?;
    let assignment = assignment_service::update_assignment(&state.db_pool, form).await?;
    Ok(Json(assignment))
}

/// DELETE /api/admin/assignments?id=
pub async fn delete_assignment(
    State(state): State<AppState>,
    query: Result<Query<AssignmentIdQuery>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(params) = query?;
    let id = params
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Parâmetro 'id' em falta.".to_string()))?;
    assignment_service::delete_assignment(&state.db_pool, &id).await?;
    Ok(Json(json!({ "message": "Atribuição removida." })))
}
