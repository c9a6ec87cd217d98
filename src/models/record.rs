// src/models/record.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Uma carga registada por um utilizador num exercício.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct LiftRecord {
    pub id: i64,
    pub dni: i64,
    pub exercise: String,
    pub weight: f64,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRecordPayload {
    pub exercise: String,
    pub weight: f64,
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
}
