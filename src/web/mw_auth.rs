// src/web/mw_auth.rs
use crate::{error::AppError, models::user::SessionUser};
use axum::{extract::Request, middleware::Next, response::Response};
use tower_sessions::Session;

/// Chave sob a qual a identidade do utilizador fica guardada na sessão.
pub const SESSION_USER_KEY: &str = "user";

// Middleware que verifica se o utilizador está logado
pub async fn require_auth(
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match session.get::<SessionUser>(SESSION_USER_KEY).await {
        Ok(Some(user)) => {
            tracing::debug!("Autenticação MW: Utilizador '{}' autenticado. Prosseguindo...", user.username);
            // Os handlers protegidos leem a identidade via Extension<SessionUser>
            request.extensions_mut().insert(user);
            Ok(next.run(request).await)
        }
        Ok(None) => {
            tracing::debug!("Autenticação MW: Pedido sem sessão válida.");
            Err(AppError::Unauthorized)
        }
        Err(e) => {
            tracing::error!("Autenticação MW: Erro ao ler sessão: {:?}", e);
            Err(AppError::SessionError(format!("Erro ao verificar sessão: {}", e)))
        }
    }
}
