// src/web/auth_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{LoginPayload, RegisterPayload, SessionUser},
    services::{auth_service, user_service},
    state::AppState,
    web::mw_auth::SESSION_USER_KEY,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use tower_sessions::Session;

// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<LoginPayload>, JsonRejection>,
) -> AppResult<Json<SessionUser>> {
    let Json(form) = payload?;
    tracing::info!("Tentativa de login para: {}", form.username);

    let user = auth_service::authenticate(&state.db_pool, &form.username, &form.password).await?;
    let session_user = SessionUser::from(&user);

    // Gera novo ID de sessão antes de guardar a identidade
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::SessionError(format!("Falha ao rodar ID: {}", e)))?;
    session
        .insert(SESSION_USER_KEY, &session_user)
        .await
        .map_err(|e| AppError::SessionError(format!("Falha ao inserir na sessão: {}", e)))?;

    tracing::info!("✅ Login bem-sucedido para: {}", session_user.username);
    Ok(Json(session_user))
}

// POST /api/auth/logout
pub async fn handle_logout(session: Session) -> AppResult<impl IntoResponse> {
    let user: Option<SessionUser> = session.get(SESSION_USER_KEY).await.ok().flatten();

    // Apaga todos os dados da sessão atual
    session
        .delete()
        .await
        .map_err(|e| AppError::SessionError(format!("Falha ao apagar sessão: {}", e)))?;

    match user {
        Some(u) => tracing::info!("🚪 Utilizador '{}' desligado.", u.username),
        None => tracing::info!("🚪 Sessão anónima desligada."),
    }
    Ok(Json(json!({ "message": "Sessão terminada." })))
}

// GET /api/auth/session
pub async fn handle_current_session(session: Session) -> AppResult<Json<SessionUser>> {
    session
        .get::<SessionUser>(SESSION_USER_KEY)
        .await
        .map_err(|e| AppError::SessionError(format!("Erro ao ler sessão: {}", e)))?
        .map(Json)
        .ok_or(AppError::Unauthorized)
}

// POST /api/auth/register (público)
pub async fn handle_register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterPayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(form) = payload?;
    let user = user_service::register_user(&state.db_pool, form).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Utilizador registado com sucesso.",
            "user": user,
        })),
    ))
}
