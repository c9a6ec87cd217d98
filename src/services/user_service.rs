// src/services/user_service.rs
use crate::{
    config::BootstrapAdmin,
    error::{AppError, AppResult},
    models::user::{CreateUserPayload, RegisterPayload, UpdateUserPayload, User, UserView},
    services::auth_service,
};
use chrono::Utc;
use sqlx::SqlitePool;

// Colunas públicas (sem password_hash)
const USER_VIEW_COLUMNS: &str =
    "dni, username, name, surname, email, sex, avatar, enabled, admin, created_at";

/// Busca um utilizador (completo, com hash) pelo DNI.
pub async fn find_user_by_dni(db_pool: &SqlitePool, dni: i64) -> AppResult<Option<User>> {
    tracing::debug!("Buscando utilizador por DNI: {}", dni);
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE dni = ?1")
        .bind(dni)
        .fetch_optional(db_pool)
        .await?;
    Ok(user)
}

/// Busca pelo nome de utilizador ou, se o texto for numérico, pelo DNI.
pub async fn find_user_by_login(db_pool: &SqlitePool, login: &str) -> AppResult<Option<User>> {
    tracing::debug!("Buscando utilizador por login: {}", login);
    let dni = login.parse::<i64>().unwrap_or(0);
    let user = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE username = ?1 OR dni = ?2 ORDER BY username = ?1 DESC LIMIT 1",
    )
    .bind(login)
    .bind(dni)
    .fetch_optional(db_pool)
    .await?;
    Ok(user)
}

async fn find_user_view(db_pool: &SqlitePool, dni: i64) -> AppResult<Option<UserView>> {
    let sql = format!("SELECT {} FROM users WHERE dni = ?1", USER_VIEW_COLUMNS);
    let user = sqlx::query_as::<_, UserView>(&sql)
        .bind(dni)
        .fetch_optional(db_pool)
        .await?;
    Ok(user)
}

/// Todos os utilizadores, mais recentes primeiro. O hash nunca sai da base de dados.
pub async fn find_all_users(db_pool: &SqlitePool) -> AppResult<Vec<UserView>> {
    tracing::debug!("Buscando todos os utilizadores...");
    let sql = format!(
        "SELECT {} FROM users ORDER BY created_at DESC, dni DESC",
        USER_VIEW_COLUMNS
    );
    let users = sqlx::query_as::<_, UserView>(&sql).fetch_all(db_pool).await?;
    tracing::debug!("Encontrados {} utilizadores.", users.len());
    Ok(users)
}

pub async fn count_users(db_pool: &SqlitePool) -> AppResult<i64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(db_pool)
        .await?;
    Ok(total)
}

/// Cria um utilizador (ação de admin).
/// Falha com `Conflict` se já existir alguém com o mesmo DNI ou o mesmo nome de utilizador.
pub async fn create_user(db_pool: &SqlitePool, payload: CreateUserPayload) -> AppResult<UserView> {
    tracing::info!("Tentando criar utilizador: {} ({})", payload.username, payload.dni);

    let username = payload.username.trim();
    if payload.dni <= 0 || username.is_empty() || payload.name.trim().is_empty() {
        return Err(AppError::Validation(
            "DNI, nome de utilizador e nome são obrigatórios.".to_string(),
        ));
    }
    if payload.password.trim().is_empty() {
        return Err(AppError::Validation("A senha é obrigatória.".to_string()));
    }

    // Verificação única e combinada (DNI OU username)
    let existing: Option<i64> =
        sqlx::query_scalar("SELECT dni FROM users WHERE dni = ?1 OR username = ?2 LIMIT 1")
            .bind(payload.dni)
            .bind(username)
            .fetch_optional(db_pool)
            .await?;
    if existing.is_some() {
        tracing::warn!("Falha ao criar user: DNI {} ou '{}' já existe.", payload.dni, username);
        return Err(AppError::Conflict("Utilizador ou DNI já existe.".to_string()));
    }

    let password_hash = auth_service::hash_password(&payload.password).await?;

    let user = User {
        dni: payload.dni,
        username: username.to_string(),
        password_hash,
        name: payload.name.trim().to_string(),
        surname: payload.surname.trim().to_string(),
        email: payload.email.trim().to_string(),
        sex: payload.sex,
        avatar: String::new(),
        enabled: true,
        admin: payload.admin,
        created_at: Utc::now(),
    };
    insert_user(db_pool, &user).await?;

    tracing::info!("✅ Utilizador '{}' criado com sucesso.", user.username);
    Ok(user.into())
}

// O índice UNIQUE apanha corridas entre a verificação e a inserção
async fn insert_user(db_pool: &SqlitePool, user: &User) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO users (dni, username, password_hash, name, surname, email, sex, avatar, enabled, admin, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(user.dni)
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(&user.name)
    .bind(&user.surname)
    .bind(&user.email)
    .bind(&user.sex)
    .bind(&user.avatar)
    .bind(user.enabled)
    .bind(user.admin)
    .bind(user.created_at)
    .execute(db_pool)
    .await
    .map_err(|e| AppError::from_insert(e, "Utilizador ou DNI já existe."))?;
    Ok(())
}

/// Auto-registo público: cria um utilizador ativo e sem privilégios de admin.
/// Ao contrário da criação pelo admin, indica qual dos campos está em conflito.
pub async fn register_user(db_pool: &SqlitePool, payload: RegisterPayload) -> AppResult<UserView> {
    let username = payload.username.trim().to_lowercase();
    let email = payload
        .email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .unwrap_or_default();

    let dni = match payload.dni {
        Some(dni) if dni > 0 => dni,
        _ => return Err(AppError::Validation("Todos os campos são obrigatórios.".to_string())),
    };
    if username.is_empty()
        || payload.password.is_empty()
        || payload.name.trim().is_empty()
        || payload.surname.trim().is_empty()
    {
        return Err(AppError::Validation("Todos os campos são obrigatórios.".to_string()));
    }

    tracing::info!("Registo de novo utilizador: {} ({})", username, dni);

    if find_user_by_dni(db_pool, dni).await?.is_some() {
        return Err(AppError::Conflict("Já existe um utilizador com esse DNI.".to_string()));
    }
    let username_taken: Option<i64> =
        sqlx::query_scalar("SELECT dni FROM users WHERE username = ?1")
            .bind(&username)
            .fetch_optional(db_pool)
            .await?;
    if username_taken.is_some() {
        return Err(AppError::Conflict("O nome de utilizador já está em uso.".to_string()));
    }
    if !email.is_empty() {
        let email_taken: Option<i64> = sqlx::query_scalar("SELECT dni FROM users WHERE email = ?1")
            .bind(&email)
            .fetch_optional(db_pool)
            .await?;
        if email_taken.is_some() {
            return Err(AppError::Conflict("O email já está registado.".to_string()));
        }
    }

    let password_hash = auth_service::hash_password(&payload.password).await?;
    let user = User {
        dni,
        username,
        password_hash,
        name: payload.name.trim().to_string(),
        surname: payload.surname.trim().to_string(),
        email,
        sex: String::new(),
        avatar: String::new(),
        enabled: true,
        admin: false,
        created_at: Utc::now(),
    };
    insert_user(db_pool, &user).await?;

    tracing::info!("✅ Utilizador '{}' registado.", user.username);
    Ok(user.into())
}

/// Atualiza dados e permissões. A senha só é trocada se vier preenchida.
pub async fn update_user(db_pool: &SqlitePool, payload: UpdateUserPayload) -> AppResult<UserView> {
    tracing::info!("Atualizando dados para user: {}", payload.dni);

    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("O nome é obrigatório.".to_string()));
    }
    if find_user_view(db_pool, payload.dni).await?.is_none() {
        tracing::warn!("Falha ao atualizar dados: Utilizador '{}' não encontrado.", payload.dni);
        return Err(AppError::NotFound("Utilizador não encontrado.".to_string()));
    }

    let new_hash = match payload.password.as_deref() {
        Some(raw) if !raw.trim().is_empty() => Some(auth_service::hash_password(raw).await?),
        _ => None,
    };

    let rows_affected = sqlx::query(
        r#"
        UPDATE users
        SET
            name = ?1,
            surname = ?2,
            email = ?3,
            sex = ?4,
            admin = ?5,
            enabled = ?6,
            password_hash = COALESCE(?7, password_hash)
        WHERE dni = ?8
        "#,
    )
    .bind(payload.name.trim())
    .bind(payload.surname.trim())
    .bind(payload.email.trim())
    .bind(&payload.sex)
    .bind(payload.admin)
    .bind(payload.enabled)
    .bind(new_hash)
    .bind(payload.dni)
    .execute(db_pool)
    .await?
    .rows_affected();

    if rows_affected == 0 {
        tracing::warn!("Falha ao atualizar dados: Utilizador '{}' não encontrado.", payload.dni);
        return Err(AppError::NotFound("Utilizador não encontrado.".to_string()));
    }

    let user = find_user_view(db_pool, payload.dni)
        .await?
        .ok_or_else(|| AppError::NotFound("Utilizador não encontrado.".to_string()))?;
    tracing::info!("✅ Dados atualizados com sucesso para user: {}", payload.dni);
    Ok(user)
}

pub async fn delete_user(db_pool: &SqlitePool, dni: i64) -> AppResult<()> {
    tracing::info!("Removendo utilizador: {}", dni);
    let rows_affected = sqlx::query("DELETE FROM users WHERE dni = ?1")
        .bind(dni)
        .execute(db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        tracing::warn!("Falha ao remover: Utilizador '{}' não encontrado.", dni);
        return Err(AppError::NotFound("Utilizador não encontrado.".to_string()));
    }
    tracing::info!("✅ Utilizador {} removido.", dni);
    Ok(())
}

/// Cria o primeiro administrador quando a tabela está vazia.
pub async fn ensure_bootstrap_admin(db_pool: &SqlitePool, admin: &BootstrapAdmin) -> AppResult<bool> {
    if count_users(db_pool).await? > 0 {
        tracing::debug!("Já existem utilizadores; admin inicial ignorado.");
        return Ok(false);
    }

    create_user(
        db_pool,
        CreateUserPayload {
            dni: admin.dni,
            username: admin.username.clone(),
            password: admin.password.clone(),
            name: admin.username.clone(),
            surname: String::new(),
            email: String::new(),
            sex: String::new(),
            admin: true,
        },
    )
    .await?;
    tracing::info!("🔑 Administrador inicial '{}' criado.", admin.username);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn new_user(dni: i64, username: &str) -> CreateUserPayload {
        CreateUserPayload {
            dni,
            username: username.into(),
            password: "segredo".into(),
            name: "Ana".into(),
            surname: "Lopez".into(),
            email: format!("{}@example.com", username),
            sex: "F".into(),
            admin: false,
        }
    }

    #[tokio::test]
    async fn duplicate_dni_or_username_is_a_conflict() {
        let pool = db::test_pool().await;
        create_user(&pool, new_user(111, "ana")).await.unwrap();

        // Mesmo username, DNI diferente
        for _ in 0..3 {
            let err = create_user(&pool, new_user(222, "ana")).await.unwrap_err();
            assert!(matches!(err, AppError::Conflict(_)));
        }
        // Mesmo DNI, username diferente
        let err = create_user(&pool, new_user(111, "bia")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        assert_eq!(count_users(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn created_user_round_trips_without_password() {
        let pool = db::test_pool().await;
        let created = create_user(&pool, new_user(111, "ana")).await.unwrap();
        assert!(created.enabled);
        assert!(!created.admin);
        assert_eq!(created.avatar, "");

        let listed = find_all_users(&pool).await.unwrap();
        assert_eq!(listed, vec![created]);

        let json = serde_json::to_value(&listed).unwrap();
        assert!(json[0].get("password_hash").is_none());

        let stored = find_user_by_dni(&pool, 111).await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "segredo");
    }

    #[tokio::test]
    async fn users_are_listed_newest_first() {
        let pool = db::test_pool().await;
        create_user(&pool, new_user(1, "primeiro")).await.unwrap();
        create_user(&pool, new_user(2, "segundo")).await.unwrap();

        let listed = find_all_users(&pool).await.unwrap();
        let names: Vec<_> = listed.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["segundo", "primeiro"]);
    }

    #[tokio::test]
    async fn blank_password_keeps_the_stored_hash() {
        let pool = db::test_pool().await;
        create_user(&pool, new_user(111, "ana")).await.unwrap();
        let before = find_user_by_dni(&pool, 111).await.unwrap().unwrap().password_hash;

        let updated = update_user(
            &pool,
            UpdateUserPayload {
                dni: 111,
                name: "Ana Maria".into(),
                surname: "Lopez".into(),
                email: "ana@example.com".into(),
                sex: "F".into(),
                admin: true,
                enabled: true,
                password: Some("   ".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Ana Maria");
        assert!(updated.admin);

        let after = find_user_by_dni(&pool, 111).await.unwrap().unwrap().password_hash;
        assert_eq!(before, after);

        update_user(
            &pool,
            UpdateUserPayload {
                dni: 111,
                name: "Ana Maria".into(),
                surname: "Lopez".into(),
                email: "ana@example.com".into(),
                sex: "F".into(),
                admin: true,
                enabled: true,
                password: Some("nova".into()),
            },
        )
        .await
        .unwrap();
        let rehashed = find_user_by_dni(&pool, 111).await.unwrap().unwrap().password_hash;
        assert_ne!(before, rehashed);
        assert!(auth_service::verify_password("nova", &rehashed).await.unwrap());
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_user_are_not_found() {
        let pool = db::test_pool().await;
        let err = update_user(
            &pool,
            UpdateUserPayload {
                dni: 9,
                name: "X".into(),
                surname: String::new(),
                email: String::new(),
                sex: String::new(),
                admin: false,
                enabled: true,
                password: Some("nova".into()),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        assert!(matches!(delete_user(&pool, 9).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_rejects_a_blank_name() {
        let pool = db::test_pool().await;
        create_user(&pool, new_user(111, "ana")).await.unwrap();

        let err = update_user(
            &pool,
            UpdateUserPayload {
                dni: 111,
                name: "   ".into(),
                surname: String::new(),
                email: String::new(),
                sex: String::new(),
                admin: false,
                enabled: true,
                password: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let stored = find_user_by_dni(&pool, 111).await.unwrap().unwrap();
        assert!(!stored.name.trim().is_empty());
    }

    #[tokio::test]
    async fn register_reports_which_field_conflicts() {
        let pool = db::test_pool().await;
        let registered = register_user(
            &pool,
            RegisterPayload {
                dni: Some(10),
                username: "Carla".into(),
                password: "segredo".into(),
                name: "Carla".into(),
                surname: "Ruiz".into(),
                email: Some("Carla@Example.com".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(registered.username, "carla");
        assert_eq!(registered.email, "carla@example.com");
        assert!(!registered.admin);

        let again = |dni: i64, username: &str, email: &str| RegisterPayload {
            dni: Some(dni),
            username: username.into(),
            password: "x".into(),
            name: "N".into(),
            surname: "S".into(),
            email: Some(email.into()),
        };

        let err = register_user(&pool, again(10, "outra", "o@x.com")).await.unwrap_err();
        assert_eq!(err.to_string(), "Já existe um utilizador com esse DNI.");
        let err = register_user(&pool, again(11, "CARLA", "o@x.com")).await.unwrap_err();
        assert_eq!(err.to_string(), "O nome de utilizador já está em uso.");
        let err = register_user(&pool, again(12, "nova", "carla@example.com")).await.unwrap_err();
        assert_eq!(err.to_string(), "O email já está registado.");

        let missing = RegisterPayload {
            dni: None,
            username: "z".into(),
            password: "z".into(),
            name: "z".into(),
            surname: "z".into(),
            email: None,
        };
        assert!(matches!(register_user(&pool, missing).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn bootstrap_admin_only_runs_on_an_empty_table() {
        let pool = db::test_pool().await;
        let admin = BootstrapAdmin {
            dni: 1,
            username: "admin".into(),
            password: "admin123".into(),
        };
        assert!(ensure_bootstrap_admin(&pool, &admin).await.unwrap());
        assert!(find_user_by_dni(&pool, 1).await.unwrap().unwrap().admin);
        assert!(!ensure_bootstrap_admin(&pool, &admin).await.unwrap());
    }
}
