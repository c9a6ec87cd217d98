// src/web/admin_user_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUserPayload, DniQuery, UpdateUserPayload, UserView},
    services::user_service,
    state::AppState,
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

/// GET /api/admin/users
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserView>>> {
    let users = user_service::find_all_users(&state.db_pool).await?;
    Ok(Json(users))
}

/// POST /api/admin/users
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserPayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(form) = payload?;
    let user = user_service::create_user(&state.db_pool, form).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /api/admin/users (DNI no corpo)
pub async fn update_user(
    State(state): State<AppState>,
    payload: Result<Json<UpdateUserPayload>, JsonRejection>,
) -> AppResult<Json<UserView>> {
    let Json(form) = payload?;
    let user = user_service::update_user(&state.db_pool, form).await?;
    Ok(Json(user))
}

/// DELETE /api/admin/users?dni=
pub async fn delete_user(
    State(state): State<AppState>,
    query: Result<Query<DniQuery>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(params) = query?;
    let dni = params
        .dni
        .ok_or_else(|| AppError::Validation("Parâmetro 'dni' em falta.".to_string()))?;
    user_service::delete_user(&state.db_pool, dni).await?;
    Ok(Json(json!({ "message": "Utilizador removido." })))
}
