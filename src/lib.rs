pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;
pub mod types;
pub mod validation;

#[cfg(test)]
pub mod testing;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::middleware::jwt_auth_middleware;
pub use crate::state::AppState;

/// Full HTTP surface with global middleware applied
pub fn app(state: AppState) -> Router {
    let layers = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config))
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes));

    Router::new()
        // Public
        .route("/", get(handlers::health::root))
        .route("/api/health", get(handlers::health::health))
        .merge(auth_routes(state.clone()))
        // Reads are public; mutating handlers require `AuthUser`
        .merge(employee_routes())
        .merge(task_routes())
        .merge(dashboard_routes())
        .fallback(handlers::health::not_found)
        .layer(layers)
        .with_state(state)
}

fn auth_routes(state: AppState) -> Router<AppState> {
    use handlers::auth;

    let protected = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware));

    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .merge(protected)
}

fn employee_routes() -> Router<AppState> {
    use handlers::employees;

    Router::new()
        .route("/api/employees", get(employees::list).post(employees::create))
        .route("/api/employees/departments", get(employees::departments))
        .route(
            "/api/employees/:id",
            get(employees::show).put(employees::update).delete(employees::delete),
        )
}

fn task_routes() -> Router<AppState> {
    use handlers::tasks;

    Router::new()
        .route("/api/tasks", get(tasks::list).post(tasks::create))
        .route("/api/tasks/stats", get(tasks::stats))
        .route("/api/tasks/bulk/status", patch(tasks::bulk_status))
        .route("/api/tasks/:id", get(tasks::show).put(tasks::update).delete(tasks::delete))
}

fn dashboard_routes() -> Router<AppState> {
    use handlers::dashboard;

    Router::new()
        .route("/api/dashboard/stats", get(dashboard::stats))
        .route("/api/dashboard/performance", get(dashboard::performance))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.is_development() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Bind the configured address and serve until Ctrl-C
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let bind_addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!(
        "Workforce API listening on http://{} ({:?} mode)",
        listener.local_addr()?,
        state.config.environment
    );

    let db = state.db.clone();
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    database::manager::close(&db).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
