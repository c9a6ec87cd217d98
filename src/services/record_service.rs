// src/services/record_service.rs
use crate::{
    error::{AppError, AppResult},
    models::record::{CreateRecordPayload, LiftRecord},
};
use chrono::Utc;
use sqlx::SqlitePool;

/// Registos de um utilizador, mais recentes primeiro.
pub async fn list_records(db_pool: &SqlitePool, dni: i64) -> AppResult<Vec<LiftRecord>> {
    tracing::debug!("Buscando registos do utilizador {}", dni);
    let records = sqlx::query_as::<_, LiftRecord>(
        "SELECT * FROM lift_records WHERE dni = ?1 ORDER BY recorded_at DESC, id DESC",
    )
    .bind(dni)
    .fetch_all(db_pool)
    .await?;
    Ok(records)
}

pub async fn create_record(
    db_pool: &SqlitePool,
    dni: i64,
    payload: CreateRecordPayload,
) -> AppResult<LiftRecord> {
    let exercise = payload.exercise.trim();
    if exercise.is_empty() {
        return Err(AppError::Validation("O exercício é obrigatório.".to_string()));
    }
    if !payload.weight.is_finite() || payload.weight < 0.0 {
        return Err(AppError::Validation("Peso inválido.".to_string()));
    }

    let record = sqlx::query_as::<_, LiftRecord>(
        r#"
        INSERT INTO lift_records (dni, exercise, weight, recorded_at)
        VALUES (?1, ?2, ?3, ?4)
        RETURNING *
        "#,
    )
    .bind(dni)
    .bind(exercise)
    .bind(payload.weight)
    .bind(payload.recorded_at.unwrap_or_else(Utc::now))
    .fetch_one(db_pool)
    .await?;

    tracing::info!("Registo {} ({} = {}) guardado para {}", record.id, record.exercise, record.weight, dni);
    Ok(record)
}
