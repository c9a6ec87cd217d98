// src/web/admin_routine_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        routine::{CreateRoutinePayload, Routine, RoutineIdQuery, UpdateRoutinePayload},
        user::SessionUser,
    },
    services::routine_service,
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

/// GET /api/admin/routines
pub async fn list_routines(State(state): State<AppState>) -> AppResult<Json<Vec<Routine>>> {
    let routines = routine_service::find_all_routines(&state.db_pool).await?;
    Ok(Json(routines))
}

/// POST /api/admin/routines (criador = utilizador da sessão)
pub async fn create_routine(
    State(state): State<AppState>,
    Extension(editor): Extension<SessionUser>,
    payload: Result<Json<CreateRoutinePayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(form) = payload?;
    let routine = routine_service::create_routine(&state.db_pool, form, &editor.username).await?;
    Ok((StatusCode::CREATED, Json(routine)))
}

/// PUT /api/admin/routines (id no corpo)
pub async fn update_routine(
    State(state): State<AppState>,
    Extension(editor): Extension<SessionUser>,
    payload: Result<Json<UpdateRoutinePayload>, JsonRejection>,
) -> AppResult<Json<Routine>> {
    let Json(form) = payload?;
    let routine = routine_service::update_routine(&state.db_pool, form, &editor.username).await?;
    Ok(Json(routine))
}

/// DELETE /api/admin/routines?id=
pub async fn delete_routine(
    State(state): State<AppState>,
    query: Result<Query<RoutineIdQuery>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(params) = query?;
    let id = params
        .id
        .ok_or_else(|| AppError::Validation("Parâmetro 'id' em falta.".to_string()))?;
    routine_service::delete_routine(&state.db_pool, id).await?;
    Ok(Json(json!({ "message": "Rotina removida." })))
}
