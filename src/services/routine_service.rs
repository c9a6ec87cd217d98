// src/services/routine_service.rs
use crate::{
    error::{AppError, AppResult},
    models::routine::{
        CreateRoutinePayload, Routine, UpdateRoutinePayload, DEFAULT_DIFFICULTY,
        DEFAULT_DURATION_MINUTES, DEFAULT_LEVEL, MAX_DIFFICULTY, MIN_DIFFICULTY,
    },
};
use chrono::Utc;
use sqlx::{types::Json, SqlitePool};

fn validate(name: &str, difficulty: i64, duration_minutes: i64) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("O nome da rotina é obrigatório.".to_string()));
    }
    if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&difficulty) {
        return Err(AppError::Validation(format!(
            "A dificuldade deve estar entre {} e {}.",
            MIN_DIFFICULTY, MAX_DIFFICULTY
        )));
    }
    if duration_minutes < 0 {
        return Err(AppError::Validation("A duração não pode ser negativa.".to_string()));
    }
    Ok(())
}

pub async fn find_routine_by_id(db_pool: &SqlitePool, id: i64) -> AppResult<Option<Routine>> {
    tracing::debug!("Buscando rotina por ID: {}", id);
    let routine = sqlx::query_as::<_, Routine>("SELECT * FROM routines WHERE id = ?1")
        .bind(id)
        .fetch_optional(db_pool)
        .await?;
    Ok(routine)
}

/// Todas as rotinas, mais recentes primeiro.
pub async fn find_all_routines(db_pool: &SqlitePool) -> AppResult<Vec<Routine>> {
    tracing::debug!("Buscando todas as rotinas...");
    let routines =
        sqlx::query_as::<_, Routine>("SELECT * FROM routines ORDER BY created_at DESC, id DESC")
            .fetch_all(db_pool)
            .await?;
    tracing::debug!("Encontradas {} rotinas.", routines.len());
    Ok(routines)
}

/// Catálogo: rotinas cujo id está na lista (ou todas), ordenadas por id.
pub async fn find_routines_by_ids(
    db_pool: &SqlitePool,
    ids: Option<&[i64]>,
) -> AppResult<Vec<Routine>> {
    let routines = match ids {
        None => {
            sqlx::query_as::<_, Routine>("SELECT * FROM routines ORDER BY id ASC")
                .fetch_all(db_pool)
                .await?
        }
        Some([]) => Vec::new(),
        Some(ids) => {
            // A lista vai como JSON para não montar placeholders dinâmicos
            let ids_json = serde_json::to_string(ids).map_err(|e| {
                tracing::error!("Erro ao serializar ids para JSON: {:?}", e);
                AppError::InternalServerError
            })?;
            sqlx::query_as::<_, Routine>(
                "SELECT * FROM routines WHERE id IN (SELECT value FROM json_each(?1)) ORDER BY id ASC",
            )
            .bind(ids_json)
            .fetch_all(db_pool)
            .await?
        }
    };
    Ok(routines)
}

/// Cria uma rotina com id = maior id atual + 1 (ou 1 se não houver nenhuma).
/// O cálculo do id e a inserção são uma única instrução, por isso criações
/// concorrentes não geram ids repetidos.
pub async fn create_routine(
    db_pool: &SqlitePool,
    payload: CreateRoutinePayload,
    editor: &str,
) -> AppResult<Routine> {
    let difficulty = payload.difficulty.unwrap_or(DEFAULT_DIFFICULTY);
    let duration_minutes = payload.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES);
    validate(&payload.name, difficulty, duration_minutes)?;

    tracing::info!("Criando rotina '{}' (por {})", payload.name, editor);
    let now = Utc::now();

    let routine = sqlx::query_as::<_, Routine>(
        r#"
        INSERT INTO routines (
            id, name, description, exercises, days, enabled, duration_minutes,
            difficulty, level, image, created_at, updated_at, created_by, updated_by
        )
        SELECT COALESCE(MAX(id), 0) + 1, ?1, ?2, ?3, ?4, 1, ?5, ?6, ?7, ?8, ?9, ?9, ?10, ?10
        FROM routines
        RETURNING *
        "#,
    )
    .bind(payload.name.trim())
    .bind(&payload.description)
    .bind(Json(&payload.exercises))
    .bind(Json(&payload.days))
    .bind(duration_minutes)
    .bind(difficulty)
    .bind(payload.level.unwrap_or_else(|| DEFAULT_LEVEL.to_string()))
    .bind(payload.image.unwrap_or_default())
    .bind(now)
    .bind(editor)
    .fetch_one(db_pool)
    .await?;

    tracing::info!("✅ Rotina {} ('{}') criada.", routine.id, routine.name);
    Ok(routine)
}

/// Substitui os campos editáveis de uma rotina. Exercícios só mudam se vierem no pedido.
pub async fn update_routine(
    db_pool: &SqlitePool,
    payload: UpdateRoutinePayload,
    editor: &str,
) -> AppResult<Routine> {
    validate(&payload.name, payload.difficulty, payload.duration_minutes)?;
    tracing::info!("Atualizando rotina {} (por {})", payload.id, editor);

    let exercises = payload.exercises.as_ref().map(Json);
    let routine = sqlx::query_as::<_, Routine>(
        r#"
        UPDATE routines
        SET
            name = ?1,
            description = ?2,
            days = ?3,
            exercises = COALESCE(?4, exercises),
            duration_minutes = ?5,
            difficulty = ?6,
            image = ?7,
            level = ?8,
            enabled = ?9,
            updated_at = ?10,
            updated_by = ?11
        WHERE id = ?12
        RETURNING *
        "#,
    )
    .bind(payload.name.trim())
    .bind(&payload.description)
    .bind(Json(&payload.days))
    .bind(exercises)
    .bind(payload.duration_minutes)
    .bind(payload.difficulty)
    .bind(&payload.image)
    .bind(&payload.level)
    .bind(payload.enabled)
    .bind(Utc::now())
    .bind(editor)
    .bind(payload.id)
    .fetch_optional(db_pool)
    .await?;

    match routine {
        Some(r) => {
            tracing::info!("✅ Rotina {} atualizada.", r.id);
            Ok(r)
        }
        None => {
            tracing::warn!("Falha ao atualizar: Rotina {} não encontrada.", payload.id);
            Err(AppError::NotFound("Rotina não encontrada.".to_string()))
        }
    }
}

pub async fn delete_routine(db_pool: &SqlitePool, id: i64) -> AppResult<()> {
    tracing::info!("Removendo rotina: {}", id);
    let rows_affected = sqlx::query("DELETE FROM routines WHERE id = ?1")
        .bind(id)
        .execute(db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        tracing::warn!("Falha ao remover: Rotina {} não encontrada.", id);
        return Err(AppError::NotFound("Rotina não encontrada.".to_string()));
    }
    Ok(())
}
