//! Server setup and configuration module

use crate::config::{DatabaseKind, Settings};
use crate::{DaemonError, Result};
use axum::http::{HeaderValue, header};
use bazaar_core::{AuthorizationGate, CachedPermissionStore, PermissionStore};
use bazaar_http::{
    AppState,
    middleware::trace_middleware,
    routes,
    services::{JwtConfig, JwtService},
};
use bazaar_sqlx::{PostgresPermissionStore, SqlitePermissionStore};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as _};

/// Open the configured database and run its migrations
///
/// The store is wrapped in the grant cache when `cache.enabled` is set.
pub async fn connect_store(settings: &Settings) -> Result<Arc<dyn PermissionStore>> {
    open(settings, settings.cache.enabled).await
}

/// Open the configured database without the grant cache
///
/// Writes made through this store reach a running server's cache only when
/// its entries expire, after at most `cache.ttl_seconds`.
pub async fn open_store(settings: &Settings) -> Result<Arc<dyn PermissionStore>> {
    open(settings, false).await
}

async fn open(settings: &Settings, cached: bool) -> Result<Arc<dyn PermissionStore>> {
    let database = &settings.database;
    match database.kind() {
        Some(DatabaseKind::Sqlite) => {
            let store = SqlitePermissionStore::new(&database.url).await?;
            info!("Connected to SQLite permission store");
            Ok(wrap(store, settings, cached))
        }
        Some(DatabaseKind::Postgres) => {
            let store =
                PostgresPermissionStore::new(&database.url, database.max_connections).await?;
            info!("Connected to PostgreSQL permission store");
            Ok(wrap(store, settings, cached))
        }
        None => Err(DaemonError::InvalidConfig(format!(
            "unsupported database url: {}",
            database.url
        ))),
    }
}

fn wrap<S: PermissionStore + 'static>(
    store: S,
    settings: &Settings,
    cached: bool,
) -> Arc<dyn PermissionStore> {
    if cached {
        let ttl = Duration::from_secs(settings.cache.ttl_seconds);
        info!(ttl_seconds = ttl.as_secs(), "Grant cache enabled");
        Arc::new(CachedPermissionStore::with_ttl(store, ttl))
    } else {
        Arc::new(store)
    }
}

/// Server configuration builder
pub struct ServerBuilder {
    settings: Settings,
    store: Arc<dyn PermissionStore>,
}

impl ServerBuilder {
    /// Create a new server builder
    pub fn new(settings: Settings, store: Arc<dyn PermissionStore>) -> Self {
        Self { settings, store }
    }

    /// Build the JWT service
    pub fn build_jwt_service(&self) -> Arc<JwtService> {
        let jwt_config: JwtConfig = self.settings.auth.jwt.clone().into();
        Arc::new(JwtService::new(jwt_config))
    }

    /// Build the gate every protected route checks against
    pub fn build_gate(&self, jwt_service: Arc<JwtService>) -> Arc<AuthorizationGate> {
        let timeout = Duration::from_millis(self.settings.auth.verify_timeout_ms);
        Arc::new(
            AuthorizationGate::new(self.store.clone(), jwt_service).with_verify_timeout(timeout),
        )
    }

    pub fn build_app_state(&self, gate: Arc<AuthorizationGate>) -> AppState {
        if !self.settings.auth.protect_administration {
            warn!("Grant administration routes are not protected");
        }
        AppState::new(self.store.clone(), gate)
            .with_protected_administration(self.settings.auth.protect_administration)
    }

    pub fn build_router(state: &AppState) -> OpenApiRouter<AppState> {
        routes::router(state)
    }

    pub fn build_axum_router(&self, router: OpenApiRouter<AppState>, state: AppState) -> axum::Router {
        let (router, api) = router.split_for_parts();

        router
            .merge(Scalar::with_url("/docs/", api))
            .with_state(state)
            .layer(axum::middleware::from_fn(trace_middleware))
            .layer(self.cors_layer())
    }

    fn cors_layer(&self) -> CorsLayer {
        let origins: Vec<HeaderValue> = self
            .settings
            .server
            .cors_origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();

        let layer = CorsLayer::new()
            .allow_methods(Any)
            .allow_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION]);

        if origins.is_empty() {
            layer.allow_origin(Any)
        } else {
            layer.allow_origin(AllowOrigin::list(origins))
        }
    }

    /// Assemble the full application
    pub fn build(&self) -> axum::Router {
        let gate = self.build_gate(self.build_jwt_service());
        let state = self.build_app_state(gate);
        let router = Self::build_router(&state);
        self.build_axum_router(router, state)
    }
}

/// Bind and serve until Ctrl+C
pub async fn serve(settings: Settings) -> Result<()> {
    settings.validate()?;

    let store = connect_store(&settings).await?;
    let app = ServerBuilder::new(settings.clone(), store).build();

    let listener = tokio::net::TcpListener::bind(settings.bind_address()).await?;
    info!(address = %listener.local_addr()?, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Received shutdown signal");
        })
        .await?;

    Ok(())
}
