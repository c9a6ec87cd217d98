// src/models/user.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

// Representa um utilizador lido da tabela 'users' (inclui o hash: nunca serializar diretamente)
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub dni: i64,
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub sex: String,
    pub avatar: String,
    pub enabled: bool,
    pub admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Projeção pública de um utilizador: igual a `User` sem o `password_hash`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserView {
    pub dni: i64,
    pub username: String,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub sex: String,
    pub avatar: String,
    pub enabled: bool,
    pub admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            dni: user.dni,
            username: user.username,
            name: user.name,
            surname: user.surname,
            email: user.email,
            sex: user.sex,
            avatar: user.avatar,
            enabled: user.enabled,
            admin: user.admin,
            created_at: user.created_at,
        }
    }
}

/// Resumo mostrado ao lado de cada atribuição.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserSummary {
    pub dni: i64,
    pub name: String,
    pub surname: String,
    pub email: String,
}

// Corpo do POST /api/admin/users
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserPayload {
    pub dni: i64,
    pub username: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub sex: String,
    #[serde(default)]
    pub admin: bool,
}

// Corpo do PUT /api/admin/users (password em branco = manter a atual)
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserPayload {
    pub dni: i64,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub sex: String,
    pub admin: bool,
    pub enabled: bool,
    #[serde(default)]
    pub password: Option<String>,
}

// Corpo do POST /api/auth/register
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterPayload {
    pub dni: Option<i64>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub email: Option<String>,
}

// Struct para dados do login
#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    // Nome de utilizador ou DNI
    pub username: String,
    pub password: String,
}

/// Identidade guardada na sessão depois do login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub dni: i64,
    pub username: String,
    pub name: String,
    pub admin: bool,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            dni: user.dni,
            username: user.username.clone(),
            name: format!("{} {}", user.name, user.surname).trim().to_string(),
            admin: user.admin,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DniQuery {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub dni: Option<i64>,
}

// `?dni=` (vazio) conta como filtro ausente
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse::<i64>().map(Some).map_err(serde::de::Error::custom),
    }
}
