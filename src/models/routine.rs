// src/models/routine.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const MIN_DIFFICULTY: i64 = 1;
pub const MAX_DIFFICULTY: i64 = 5;
pub const DEFAULT_DIFFICULTY: i64 = 3;
pub const DEFAULT_DURATION_MINUTES: i64 = 60;
pub const DEFAULT_LEVEL: &str = "medio";

/// Um exercício dentro de uma rotina (a ordem no vetor é a ordem de execução).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    #[serde(default = "default_sets")]
    pub sets: i64,
    #[serde(default = "default_reps")]
    pub reps: i64,
    #[serde(default = "default_rest_seconds")]
    pub rest_seconds: i64,
    // ex: "20kg", "peso corporal"
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub notes: String,
}

fn default_sets() -> i64 {
    3
}

fn default_reps() -> i64 {
    10
}

fn default_rest_seconds() -> i64 {
    60
}

// Linha da tabela 'routines'; exercícios e dias guardados como JSON (TEXT)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Routine {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[sqlx(json)]
    pub exercises: Vec<Exercise>,
    #[sqlx(json)]
    pub days: Vec<String>,
    pub enabled: bool,
    pub duration_minutes: i64,
    pub difficulty: i64,
    pub level: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_by: String,
}

/// Resumo mostrado ao lado de cada atribuição.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RoutineSummary {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub level: String,
}

// Corpo do POST /api/admin/routines
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoutinePayload {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub days: Vec<String>,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    pub duration_minutes: Option<i64>,
    pub difficulty: Option<i64>,
    pub image: Option<String>,
    pub level: Option<String>,
}

// Corpo do PUT /api/admin/routines (substitui os campos; exercícios só se enviados)
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRoutinePayload {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub days: Vec<String>,
    pub exercises: Option<Vec<Exercise>>,
    pub duration_minutes: i64,
    pub difficulty: i64,
    #[serde(default)]
    pub image: String,
    pub level: String,
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct RoutineIdQuery {
    pub id: Option<i64>,
}

// GET /api/routines?ids=1,2,3
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub ids: Option<String>,
}

impl CatalogQuery {
    /// Interpreta a lista separada por vírgulas; `None` significa "todas".
    pub fn parse_ids(&self) -> Result<Option<Vec<i64>>, String> {
        let Some(raw) = self.ids.as_deref() else {
            return Ok(None);
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        raw.split(',')
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<i64>()
                    .map_err(|_| format!("Identificador de rotina inválido: '{}'", part))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exercise_fields_fall_back_to_defaults() {
        let ex: Exercise = serde_json::from_str(r#"{"name":"Agachamento"}"#).unwrap();
        assert_eq!(ex.sets, 3);
        assert_eq!(ex.reps, 10);
        assert_eq!(ex.rest_seconds, 60);
        assert!(ex.weight.is_empty());
        assert!(ex.notes.is_empty());
    }

    #[test]
    fn catalog_ids_are_parsed_from_a_comma_list() {
        let q = CatalogQuery { ids: Some("3, 1,,2".into()) };
        assert_eq!(q.parse_ids().unwrap(), Some(vec![3, 1, 2]));

        let q = CatalogQuery { ids: None };
        assert_eq!(q.parse_ids().unwrap(), None);

        let q = CatalogQuery { ids: Some("1,abc".into()) };
        assert!(q.parse_ids().is_err());
    }
}
