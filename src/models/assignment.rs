// src/models/assignment.rs
use crate::models::{routine::RoutineSummary, user::UserSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

// Linha da tabela 'assignments'
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Assignment {
    pub id: String, // UUID
    pub dni: i64,
    pub routine_id: i64,
    pub assigned_by: String,
    pub active: bool,
    pub assigned_at: DateTime<Utc>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub notes: String,
}

/// Atribuição com os resumos do utilizador e da rotina.
/// Referências que já não existem ficam a `null` em vez de falhar a listagem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedAssignment {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub user: Option<UserSummary>,
    pub routine: Option<RoutineSummary>,
}

// Corpo do POST /api/admin/assignments
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAssignmentPayload {
    pub dni: i64,
    pub routine_id: i64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

// Corpo do PUT /api/admin/assignments; campos ausentes ficam como estão
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAssignmentPayload {
    pub id: String,
    #[serde(default)]
    pub active: Option<bool>,
    // Ausente = não mexer; `null` = limpar a data de fim
    #[serde(default, deserialize_with = "present_or_null")]
    pub end_date: Option<Option<DateTime<Utc>>>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<DateTime<Utc>>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct AssignmentIdQuery {
    pub id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_date_distinguishes_absent_from_null() {
        let absent: UpdateAssignmentPayload = serde_json::from_str(r#"{"id":"a"}"#).unwrap();
        assert_eq!(absent.end_date, None);

        let cleared: UpdateAssignmentPayload =
            serde_json::from_str(r#"{"id":"a","end_date":null}"#).unwrap();
        assert_eq!(cleared.end_date, Some(None));

        let set: UpdateAssignmentPayload =
            serde_json::from_str(r#"{"id":"a","end_date":"2025-03-01T00:00:00Z"}"#).unwrap();
        assert!(matches!(set.end_date, Some(Some(_))));
    }
}
