// src/web/routes.rs
use crate::{
    error::AppError,
    state::AppState,
    web::{
        admin_assignment_handlers, admin_routine_handlers, admin_user_handlers, auth_handlers,
        member_handlers, mw_admin, mw_auth,
    },
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

// Verbos não suportados respondem 405 em JSON (nas rotas protegidas, depois das verificações de sessão)
async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

pub fn create_router(app_state: AppState) -> Router {
    // --- Rotas Públicas ---
    let public_routes = Router::new()
        .route("/health", get(|| async { "ok" }).fallback(method_not_allowed))
        .route(
            "/api/auth/login",
            post(auth_handlers::handle_login).fallback(method_not_allowed),
        )
        .route(
            "/api/auth/logout",
            post(auth_handlers::handle_logout).fallback(method_not_allowed),
        )
        .route(
            "/api/auth/session",
            get(auth_handlers::handle_current_session).fallback(method_not_allowed),
        )
        .route(
            "/api/auth/register",
            post(auth_handlers::handle_register).fallback(method_not_allowed),
        );

    // --- Rotas de Admin --- (exigem login E flag admin)
    let admin_routes = Router::new()
        .route(
            "/users",
            get(admin_user_handlers::list_users)
                .post(admin_user_handlers::create_user)
                .put(admin_user_handlers::update_user)
                .delete(admin_user_handlers::delete_user)
                .fallback(method_not_allowed),
        )
        .route(
            "/routines",
            get(admin_routine_handlers::list_routines)
                .post(admin_routine_handlers::create_routine)
                .put(admin_routine_handlers::update_routine)
                .delete(admin_routine_handlers::delete_routine)
                .fallback(method_not_allowed),
        )
        .route(
            "/assignments",
            get(admin_assignment_handlers::list_assignments)
                .post(admin_assignment_handlers::create_assignment)
                .put(admin_assignment_handlers::update_assignment)
                .delete(admin_assignment_handlers::delete_assignment)
                .fallback(method_not_allowed),
        )
        .route_layer(middleware::from_fn(mw_admin::require_admin));

    // --- Rotas Autenticadas ---
    let authenticated_routes = Router::new()
        .route(
            "/api/routines",
            get(member_handlers::list_catalog).fallback(method_not_allowed),
        )
        .route(
            "/api/records",
            get(member_handlers::list_records)
                .post(member_handlers::create_record)
                .fallback(method_not_allowed),
        )
        .nest("/api/admin", admin_routes)
        // require_auth corre antes de require_admin (é a camada mais exterior)
        .route_layer(middleware::from_fn(mw_auth::require_auth));

    // --- Router Final ---
    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .with_state(app_state)
}
