pub mod error;
pub mod handlers;

pub use error::ApiError;

use crate::auth::{bearer_token, Claims, TokenService};
use crate::config::{AppConfig, DEFAULT_JWT_SECRET};
use crate::scorer::EmailRiskScorer;
use crate::storage::{Database, HistoryStore, UserStore};
use anyhow::Context;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

/// Everything a request handler needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub scorer: Arc<EmailRiskScorer>,
    pub history: Arc<HistoryStore>,
    pub users: Arc<UserStore>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(scorer: EmailRiskScorer, db: Arc<Database>, config: &AppConfig) -> Self {
        Self {
            scorer: Arc::new(scorer),
            history: Arc::new(HistoryStore::new(
                db.clone(),
                config.storage.max_records_per_user,
            )),
            users: Arc::new(UserStore::new(db)),
            tokens: Arc::new(TokenService::new(
                &config.auth.jwt_secret,
                config.auth.token_ttl_days,
            )),
        }
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let scorer = config.build_scorer()?;
        let db = Arc::new(Database::open(&config.storage.database_path)?);
        let state = Self::new(scorer, db, config);

        if config.auth.demo_user {
            state.users.ensure_demo_user()?;
        }
        if config.auth.jwt_secret == DEFAULT_JWT_SECRET {
            log::warn!("Using the default JWT secret; set JWT_SECRET_KEY in production");
        }

        Ok(state)
    }
}

/// Claims of the caller, taken from a valid bearer token.
pub struct AuthUser(pub Claims);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;
        let token = bearer_token(header).ok_or(ApiError::Unauthorized)?;
        let claims = state.tokens.verify(token).ok_or(ApiError::InvalidToken)?;
        Ok(AuthUser(claims))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/analyze", post(handlers::analyze))
        .route(
            "/api/history",
            get(handlers::list_history).post(handlers::save_history),
        )
        .route(
            "/api/history/:id",
            get(handlers::get_history).delete(handlers::delete_history),
        )
        .with_state(state)
}

pub async fn serve(state: AppState, bind_address: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;

    log::info!(
        "API server listening on {} ({} mode)",
        bind_address,
        state.scorer.mode().as_str()
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for shutdown signal: {e}");
                std::future::pending::<()>().await;
            }
            log::info!("Shutting down API server");
        })
        .await
        .context("API server error")
}
