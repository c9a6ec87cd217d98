// src/config.rs
use crate::error::AppResult;
use std::{env, fmt::Display, net::SocketAddr, str::FromStr};

/// Credenciais do administrador inicial (só usadas com a tabela `users` vazia).
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub dni: i64,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub session_inactivity_days: i64,
    pub secure_cookies: bool,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Config {
    /// Lê a configuração das variáveis de ambiente (com `.env` carregado via dotenvy).
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;

        let bootstrap_admin = match (
            env::var("BOOTSTRAP_ADMIN_USERNAME"),
            env::var("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Ok(username), Ok(password)) if !username.trim().is_empty() && !password.is_empty() => {
                Some(BootstrapAdmin {
                    dni: try_load("BOOTSTRAP_ADMIN_DNI", 1),
                    username,
                    password,
                })
            }
            _ => None,
        };

        Ok(Self {
            database_url,
            bind_addr: try_load("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000))),
            session_inactivity_days: try_load("SESSION_INACTIVITY_DAYS", 30),
            secure_cookies: try_load("SECURE_COOKIES", false),
            bootstrap_admin,
        })
    }
}

// Valor opcional: usa o padrão se a variável faltar ou não for válida
fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
            tracing::warn!("Valor inválido para {}: {}. Usando padrão {}", key, e, default);
            default
        }),
        Err(_) => {
            tracing::debug!("{} não definida, usando padrão: {}", key, default);
            default
        }
    }
}
