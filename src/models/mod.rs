// src/models/mod.rs
pub mod assignment;
pub mod record;
pub mod routine;
pub mod user;
