// src/web/mw_admin.rs
use crate::{error::AppError, models::user::SessionUser};
use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::Response,
};

/// Middleware que exige a flag de admin na identidade da sessão.
/// Deve ser executado *depois* do middleware `require_auth`; não toca na base de dados.
pub async fn require_admin(
    Extension(user): Extension<SessionUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if user.admin {
        tracing::debug!("Admin MW: Acesso admin concedido para {}", user.username);
        Ok(next.run(request).await)
    } else {
        tracing::warn!("Admin MW: Acesso negado para {} (sem flag admin).", user.username);
        Err(AppError::Unauthorized)
    }
}
