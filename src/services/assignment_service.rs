// src/services/assignment_service.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        assignment::{
            Assignment, CreateAssignmentPayload, EnrichedAssignment, UpdateAssignmentPayload,
        },
        routine::RoutineSummary,
        user::UserSummary,
    },
};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

const ACTIVE_DUPLICATE: &str = "O utilizador já tem esta rotina atribuída e ativa.";

pub async fn find_assignment_by_id(db_pool: &SqlitePool, id: &str) -> AppResult<Option<Assignment>> {
    let assignment = sqlx::query_as::<_, Assignment>("SELECT * FROM assignments WHERE id = ?1")
        .bind(id)
        .fetch_optional(db_pool)
        .await?;
    Ok(assignment)
}

async fn find_user_summary(db_pool: &SqlitePool, dni: i64) -> AppResult<Option<UserSummary>> {
    let summary = sqlx::query_as::<_, UserSummary>(
        "SELECT dni, name, surname, email FROM users WHERE dni = ?1",
    )
    .bind(dni)
    .fetch_optional(db_pool)
    .await?;
    Ok(summary)
}

async fn find_routine_summary(db_pool: &SqlitePool, id: i64) -> AppResult<Option<RoutineSummary>> {
    let summary = sqlx::query_as::<_, RoutineSummary>(
        "SELECT id, name, description, level FROM routines WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(db_pool)
    .await?;
    Ok(summary)
}

/// Lista as atribuições (opcionalmente só as de um DNI), mais recentes primeiro,
/// cada uma com o resumo do utilizador e da rotina.
/// Uma referência que já não existe fica `None`; não é um erro.
pub async fn list_assignments(
    db_pool: &SqlitePool,
    dni: Option<i64>,
) -> AppResult<Vec<EnrichedAssignment>> {
    tracing::debug!("Listando atribuições (filtro DNI: {:?})", dni);

    let assignments = match dni {
        Some(dni) => {
            sqlx::query_as::<_, Assignment>(
                "SELECT * FROM assignments WHERE dni = ?1 ORDER BY assigned_at DESC, rowid DESC",
            )
            .bind(dni)
            .fetch_all(db_pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Assignment>(
                "SELECT * FROM assignments ORDER BY assigned_at DESC, rowid DESC",
            )
            .fetch_all(db_pool)
            .await?
        }
    };

    let mut enriched = Vec::with_capacity(assignments.len());
    for assignment in assignments {
        let user = find_user_summary(db_pool, assignment.dni).await?;
        let routine = find_routine_summary(db_pool, assignment.routine_id).await?;
        if user.is_none() || routine.is_none() {
            tracing::debug!(
                "Atribuição {} com referência em falta (user: {}, rotina: {})",
                assignment.id,
                user.is_some(),
                routine.is_some()
            );
        }
        enriched.push(EnrichedAssignment {
            assignment,
            user,
            routine,
        });
    }

    tracing::debug!("Encontradas {} atribuições.", enriched.len());
    Ok(enriched)
}

/// Atribui uma rotina a um utilizador.
/// Falha com `NotFound` se o utilizador ou a rotina não existirem, e com
/// `Conflict` se o par já tiver uma atribuição ativa.
pub async fn create_assignment(
    db_pool: &SqlitePool,
    payload: CreateAssignmentPayload,
    assigned_by: &str,
) -> AppResult<Assignment> {
    tracing::info!(
        "Atribuindo rotina {} ao utilizador {} (por {})",
        payload.routine_id,
        payload.dni,
        assigned_by
    );

    if find_user_summary(db_pool, payload.dni).await?.is_none() {
        tracing::warn!("Atribuição falhou: utilizador {} não existe.", payload.dni);
        return Err(AppError::NotFound("Utilizador não encontrado.".to_string()));
    }
    if find_routine_summary(db_pool, payload.routine_id).await?.is_none() {
        tracing::warn!("Atribuição falhou: rotina {} não existe.", payload.routine_id);
        return Err(AppError::NotFound("Rotina não encontrada.".to_string()));
    }

    let already_active: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM assignments WHERE dni = ?1 AND routine_id = ?2 AND active = 1)",
    )
    .bind(payload.dni)
    .bind(payload.routine_id)
    .fetch_one(db_pool)
    .await?;
    if already_active {
        tracing::warn!(
            "Atribuição falhou: par ({}, {}) já está ativo.",
            payload.dni,
            payload.routine_id
        );
        return Err(AppError::Conflict(ACTIVE_DUPLICATE.to_string()));
    }

    let now = Utc::now();
    let assignment = Assignment {
        id: Uuid::new_v4().to_string(),
        dni: payload.dni,
        routine_id: payload.routine_id,
        assigned_by: assigned_by.to_string(),
        active: true,
        assigned_at: now,
        start_date: payload.start_date.unwrap_or(now),
        end_date: payload.end_date,
        notes: payload.notes.unwrap_or_default(),
    };

    // O índice parcial (dni, routine_id) WHERE active = 1 fecha a janela entre a verificação e a escrita
    sqlx::query(
        r#"
        INSERT INTO assignments (id, dni, routine_id, assigned_by, active, assigned_at, start_date, end_date, notes)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&assignment.id)
    .bind(assignment.dni)
    .bind(assignment.routine_id)
    .bind(&assignment.assigned_by)
    .bind(assignment.active)
    .bind(assignment.assigned_at)
    .bind(assignment.start_date)
    .bind(assignment.end_date)
    .bind(&assignment.notes)
    .execute(db_pool)
    .await
    .map_err(|e| AppError::from_insert(e, ACTIVE_DUPLICATE))?;

    tracing::info!("✅ Atribuição {} criada.", assignment.id);
    Ok(assignment)
}

/// Altera estado ativo, data de fim e notas. Campos ausentes não mudam.
pub async fn update_assignment(
    db_pool: &SqlitePool,
    payload: UpdateAssignmentPayload,
) -> AppResult<Assignment> {
    tracing::info!("Atualizando atribuição {}", payload.id);

    let Some(current) = find_assignment_by_id(db_pool, &payload.id).await? else {
        tracing::warn!("Falha ao atualizar: atribuição {} não encontrada.", payload.id);
        return Err(AppError::NotFound("Atribuição não encontrada.".to_string()));
    };

    let active = payload.active.unwrap_or(current.active);
    let end_date = payload.end_date.unwrap_or(current.end_date);
    let notes = payload.notes.unwrap_or(current.notes);

    let updated = sqlx::query_as::<_, Assignment>(
        r#"
        UPDATE assignments
        SET active = ?1, end_date = ?2, notes = ?3
        WHERE id = ?4
        RETURNING *
        "#,
    )
    .bind(active)
    .bind(end_date)
    .bind(&notes)
    .bind(&payload.id)
    .fetch_optional(db_pool)
    .await
    .map_err(|e| AppError::from_insert(e, ACTIVE_DUPLICATE))?
    .ok_or_else(|| AppError::NotFound("Atribuição não encontrada.".to_string()))?;

    tracing::info!("✅ Atribuição {} atualizada (ativa: {}).", updated.id, updated.active);
    Ok(updated)
}

pub async fn delete_assignment(db_pool: &SqlitePool, id: &str) -> AppResult<()> {
    tracing::info!("Removendo atribuição: {}", id);
    let rows_affected = sqlx::query("DELETE FROM assignments WHERE id = ?1")
        .bind(id)
        .execute(db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        tracing::warn!("Falha ao remover: atribuição {} não encontrada.", id);
        return Err(AppError::NotFound("Atribuição não encontrada.".to_string()));
    }
    Ok(())
}
