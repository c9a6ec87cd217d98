// src/web/member_handlers.rs
// Rotas para qualquer utilizador autenticado (catálogo de rotinas e registos de carga)
use crate::{
    error::{AppError, AppResult},
    models::{
        record::{CreateRecordPayload, LiftRecord},
        routine::{CatalogQuery, Routine},
        user::{DniQuery, SessionUser},
    },
    services::{record_service, routine_service},
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

/// GET /api/routines[?ids=1,2]
pub async fn list_catalog(
    State(state): State<AppState>,
    query: Result<Query<CatalogQuery>, QueryRejection>,
) -> AppResult<Json<Vec<Routine>>> {
    let Query(params) = query?;
    let ids = params.parse_ids().map_err(AppError::Validation)?;
    let routines = routine_service::find_routines_by_ids(&state.db_pool, ids.as_deref()).await?;
    Ok(Json(routines))
}

/// GET /api/records[?dni=]; sem admin só se pode ver os próprios registos
pub async fn list_records(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    query: Result<Query<DniQuery>, QueryRejection>,
) -> AppResult<Json<Vec<LiftRecord>>> {
    let Query(params) = query?;
    let dni = params.dni.unwrap_or(user.dni);
    if dni != user.dni && !user.admin {
        tracing::warn!("{} tentou ver registos de {}", user.username, dni);
        return Err(AppError::Unauthorized);
    }
    let records = record_service::list_records(&state.db_pool, dni).await?;
    Ok(Json(records))
}

/// POST /api/records (sempre para o utilizador da sessão)
pub async fn create_record(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    payload: Result<Json<CreateRecordPayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(form) = payload?;
    let record = record_service::create_record(&state.db_pool, user.dni, form).await?;
    Ok((StatusCode::CREATED, Json(record)))
}
