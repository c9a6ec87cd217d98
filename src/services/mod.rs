// src/services/mod.rs
pub mod assignment_service;
pub mod auth_service;
pub mod record_service;
pub mod routine_service;
pub mod user_service;
