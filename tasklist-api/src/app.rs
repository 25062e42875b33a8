/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use tasklist_api::{app::AppState, config::Config};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::from_config(config).await?;
/// let app = tasklist_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::{Config, StoreBackend};
use anyhow::Context;
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tasklist_shared::{
    auth::{middleware::require_session, token::TokenCodec, SESSION_HEADER},
    db::{
        migrations::run_migrations,
        pool::{create_pool, DatabaseConfig},
    },
    store::{
        memory::MemoryStore, postgres::PgStore, AccountRepository, AccountStore, TaskRepository,
        TaskStore,
    },
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Every field is reference counted, so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Accounts and their sessions
    pub accounts: AccountStore,

    /// Tasks, always scoped to an owner
    pub tasks: TaskStore,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates state over one backend serving both accounts and tasks
    pub fn with_backend<B>(config: Config, backend: B) -> Self
    where
        B: AccountRepository + TaskRepository + 'static,
    {
        let backend = Arc::new(backend);
        let codec = TokenCodec::new(&config.token.secret);

        Self {
            accounts: AccountStore::new(backend.clone(), codec),
            tasks: TaskStore::new(backend),
            config: Arc::new(config),
        }
    }

    /// Connects the configured backend
    ///
    /// For PostgreSQL this creates the pool and applies pending migrations.
    pub async fn from_config(config: Config) -> anyhow::Result<Self> {
        match config.store.backend {
            StoreBackend::Postgres => {
                let url = config
                    .store
                    .database_url
                    .clone()
                    .context("DATABASE_URL environment variable is required")?;

                let db_config = DatabaseConfig {
                    url,
                    max_connections: config.store.max_connections,
                    ..Default::default()
                };

                tracing::info!("Connecting to database...");
                let pool = create_pool(db_config).await?;

                tracing::info!("Running database migrations...");
                run_migrations(&pool).await?;

                Ok(Self::with_backend(config, PgStore::new(pool)))
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store; all data is lost on restart");
                Ok(Self::with_backend(config, MemoryStore::new()))
            }
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET    /health            # Health check (public)
/// ├── POST   /accounts          # Register (public)
/// ├── GET    /accounts/me       # Current account (session)
/// ├── POST   /sessions          # Login (public)
/// ├── DELETE /sessions          # Logout (session)
/// ├── GET    /sessions          # List own sessions (session)
/// └── /tasks                    # Task CRUD (session)
///     ├── GET    /
///     ├── POST   /
///     ├── GET    /:id
///     ├── PATCH  /:id
///     └── DELETE /:id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Session authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let auth = from_fn_with_state(state.accounts.clone(), require_session);

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let account_routes = Router::new()
        .route("/accounts", post(routes::accounts::register))
        .route(
            "/accounts/me",
            get(routes::accounts::me).route_layer(auth.clone()),
        );

    // Login is public, the rest of /sessions needs a live session
    let session_routes = Router::new().route(
        "/sessions",
        post(routes::sessions::login).merge(
            get(routes::sessions::list)
                .merge(delete(routes::sessions::logout))
                .route_layer(auth.clone()),
        ),
    );

    let task_routes = Router::new()
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route_layer(auth);

    let session_header = HeaderName::from_static(SESSION_HEADER);

    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        // Development mode: permissive CORS, still exposing the session header
        CorsLayer::permissive().expose_headers([session_header])
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, session_header.clone()])
            .expose_headers([session_header])
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .merge(account_routes)
        .merge(session_routes)
        .merge(task_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
