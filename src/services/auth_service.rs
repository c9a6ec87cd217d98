// src/services/auth_service.rs
use crate::{
    error::{AppError, AppResult},
    models::user::User,
    services::user_service,
};
use sqlx::SqlitePool;

/// Verifica se a senha fornecida corresponde ao hash guardado.
pub async fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Verificando hash bcrypt...");
        bcrypt::verify(&password, &stored_hash)
    })
    .await
    .map_err(|e| {
        tracing::error!("Erro na task spawn_blocking (verify_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("Erro bcrypt ao verificar senha: {:?}", e);
        AppError::PasswordHashingError
    })
}

/// Gera um hash bcrypt (com sal) para uma senha.
pub async fn hash_password(password: &str) -> AppResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Gerando hash bcrypt...");
        bcrypt::hash(&password, bcrypt::DEFAULT_COST)
    })
    .await
    .map_err(|e| {
        tracing::error!("Erro na task spawn_blocking (hash_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("Erro bcrypt ao gerar hash: {:?}", e);
        AppError::PasswordHashingError
    })
}

/// Autentica pelo nome de utilizador ou pelo DNI.
/// Utilizador inexistente, desativado ou senha errada dão todos `Unauthorized`.
pub async fn authenticate(db_pool: &SqlitePool, login: &str, password: &str) -> AppResult<User> {
    let login = login.trim();
    if login.is_empty() || password.is_empty() {
        return Err(AppError::Unauthorized);
    }

    let Some(user) = user_service::find_user_by_login(db_pool, login).await? else {
        tracing::warn!("Login falhou: utilizador '{}' não encontrado.", login);
        return Err(AppError::Unauthorized);
    };

    if !user.enabled {
        tracing::warn!("Login falhou: utilizador '{}' está desativado.", user.username);
        return Err(AppError::Unauthorized);
    }

    if !verify_password(password, &user.password_hash).await? {
        tracing::warn!("Login falhou: senha incorreta para '{}'.", user.username);
        return Err(AppError::Unauthorized);
    }

    tracing::info!("✅ Credenciais válidas para: {}", user.username);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, models::user::CreateUserPayload};

    fn payload(dni: i64, username: &str, password: &str) -> CreateUserPayload {
        CreateUserPayload {
            dni,
            username: username.into(),
            password: password.into(),
            name: "Ana".into(),
            surname: "Lopez".into(),
            email: "ana@example.com".into(),
            sex: "F".into(),
            admin: false,
        }
    }

    #[tokio::test]
    async fn hash_is_salted_and_verifiable() {
        let first = hash_password("segredo").await.unwrap();
        let second = hash_password("segredo").await.unwrap();
        assert_ne!(first, second);
        assert!(verify_password("segredo", &first).await.unwrap());
        assert!(!verify_password("outra", &first).await.unwrap());
    }

    #[tokio::test]
    async fn authenticate_accepts_username_or_dni() {
        let pool = db::test_pool().await;
        user_service::create_user(&pool, payload(111, "ana", "segredo")).await.unwrap();

        let by_name = authenticate(&pool, "ana", "segredo").await.unwrap();
        assert_eq!(by_name.dni, 111);

        let by_dni = authenticate(&pool, "111", "segredo").await.unwrap();
        assert_eq!(by_dni.username, "ana");

        assert!(matches!(
            authenticate(&pool, "ana", "errada").await,
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            authenticate(&pool, "ninguem", "segredo").await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn disabled_users_cannot_log_in() {
        let pool = db::test_pool().await;
        user_service::create_user(&pool, payload(5, "rui", "segredo")).await.unwrap();
        sqlx::query("UPDATE users SET enabled = 0 WHERE dni = 5")
            .execute(&pool)
            .await
            .unwrap();

        assert!(matches!(
            authenticate(&pool, "rui", "segredo").await,
            Err(AppError::Unauthorized)
        ));
    }
}
