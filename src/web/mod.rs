// src/web/mod.rs
pub mod admin_assignment_handlers;
pub mod admin_routine_handlers;
pub mod admin_user_handlers;
pub mod auth_handlers;
pub mod member_handlers;
pub mod mw_admin;
pub mod mw_auth;
pub mod routes;
