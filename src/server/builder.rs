//! ServerBuilder for fluent API to build the HTTP server

use super::router::build_routes;
use super::state::AppState;
use super::templates::Templates;
use crate::config::AppConfig;
use crate::core::auth::{Argon2PasswordHasher, PasswordHasher};
use crate::core::service::{FacilityService, ReviewService, UserService};
use crate::session::SessionStore;
use crate::storage::{InMemoryReviewService, InMemoryUserService};
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Upper bound on the time between two idle-session sweeps
const SWEEP_PERIOD: Duration = Duration::from_secs(10 * 60);

/// Builder for the nursery server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_config(AppConfig::default_config())
///     .with_facility_service(InMemoryFacilityService::with_facilities(seed))
///     .build()?;
/// ```
pub struct ServerBuilder {
    config: AppConfig,
    facility_service: Option<Arc<dyn FacilityService>>,
    user_service: Option<Arc<dyn UserService>>,
    review_service: Option<Arc<dyn ReviewService>>,
    hasher: Option<Arc<dyn PasswordHasher>>,
    sessions: Option<SessionStore>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder with the default configuration
    pub fn new() -> Self {
        Self {
            config: AppConfig::default_config(),
            facility_service: None,
            user_service: None,
            review_service: None,
            hasher: None,
            sessions: None,
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the facility catalog (required)
    pub fn with_facility_service(mut self, service: impl FacilityService + 'static) -> Self {
        self.facility_service = Some(Arc::new(service));
        self
    }

    /// Set the user store; defaults to an empty in-memory store
    pub fn with_user_service(mut self, service: impl UserService + 'static) -> Self {
        self.user_service = Some(Arc::new(service));
        self
    }

    /// Set the review store; defaults to an empty in-memory store
    pub fn with_review_service(mut self, service: impl ReviewService + 'static) -> Self {
        self.review_service = Some(Arc::new(service));
        self
    }

    /// Set the password hasher; defaults to [`Argon2PasswordHasher`]
    pub fn with_password_hasher(mut self, hasher: impl PasswordHasher + 'static) -> Self {
        self.hasher = Some(Arc::new(hasher));
        self
    }

    /// Share a session store with the caller, mostly useful in tests
    pub fn with_session_store(mut self, sessions: SessionStore) -> Self {
        self.sessions = Some(sessions);
        self
    }

    /// Assemble the shared state handed to every handler
    pub fn build_state(self) -> Result<AppState> {
        let facilities = self.facility_service.ok_or_else(|| {
            anyhow::anyhow!("FacilityService is required. Call .with_facility_service()")
        })?;

        self.config.validate()?;
        let templates = Templates::new(self.config.locale.languages.clone())
            .map_err(|e| anyhow::anyhow!("Failed to compile templates: {}", e))?;

        Ok(AppState {
            facilities,
            users: self
                .user_service
                .unwrap_or_else(|| Arc::new(InMemoryUserService::new())),
            reviews: self
                .review_service
                .unwrap_or_else(|| Arc::new(InMemoryReviewService::new())),
            hasher: self
                .hasher
                .unwrap_or_else(|| Arc::new(Argon2PasswordHasher::default())),
            sessions: self.sessions.unwrap_or_else(|| {
                SessionStore::with_idle_timeout(self.config.server.session_idle_timeout())
            }),
            rates: Arc::new(self.config.currency.exchange_rates()),
            config: Arc::new(self.config),
            templates: Arc::new(templates),
        })
    }

    /// Build the final router with request tracing
    pub fn build(self) -> Result<Router> {
        Ok(into_router(self.build_state()?))
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the configured address
    /// - Sweep idle sessions in the background
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.server.bind.clone();
        let state = self.build_state()?;
        let sweeper = tokio::spawn(sweep_sessions(state.sessions.clone()));
        let app = into_router(state);
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        sweeper.abort();
        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

fn into_router(state: AppState) -> Router {
    build_routes(state).layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

/// Evict idle sessions once per sweep period, forever
async fn sweep_sessions(sessions: SessionStore) {
    let period = sessions.idle_timeout().min(SWEEP_PERIOD);
    let mut ticker = tokio::time::interval(period);
    ticker.tick().await;
    loop {
        ticker.tick().await;
        match sessions.evict_idle() {
            Ok(0) => {}
            Ok(evicted) => tracing::debug!(evicted, "Evicted idle sessions"),
            Err(e) => tracing::error!("Failed to evict idle sessions: {}", e),
        }
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
