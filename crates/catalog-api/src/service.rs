//! Catalog API service - owns the store client and runs the HTTP server.

use crate::adapters::PostgrestStore;
use crate::domain::config::ServiceConfig;
use crate::domain::error::ServiceError;
use crate::handlers::{Handlers, StoreHandle};
use crate::middleware::{create_cors_layer, ServiceMetrics, TracingLayer};
use crate::ports::CatalogStore;
use crate::router::{routes, AppState};
use axum::{extract::DefaultBodyLimit, Router};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tracing::{info, warn};

/// Catalog API service state
pub struct CatalogApiService {
    config: ServiceConfig,
    store: Option<Arc<dyn CatalogStore>>,
    handlers: Arc<Handlers>,
    metrics: Arc<ServiceMetrics>,
}

impl CatalogApiService {
    /// Create the service around an explicitly constructed store.
    ///
    /// `store` is `None` when the connection settings are missing; the
    /// service still serves, and store-backed routes answer 500.
    pub fn new(
        config: ServiceConfig,
        store: Option<Arc<dyn CatalogStore>>,
    ) -> Result<Self, ServiceError> {
        config
            .validate()
            .map_err(|e| ServiceError::Config(e.to_string()))?;

        let handlers = Arc::new(Handlers::new(StoreHandle::new(store.clone())));

        Ok(Self {
            config,
            store,
            handlers,
            metrics: Arc::new(ServiceMetrics::new()),
        })
    }

    /// Create the service with a PostgREST client built from `config.store`.
    ///
    /// Missing or unusable store settings are logged and leave the service
    /// unconfigured rather than failing startup.
    pub fn from_config(mut config: ServiceConfig) -> Result<Self, ServiceError> {
        let store: Option<Arc<dyn CatalogStore>> = match config.store.as_ref() {
            None => {
                warn!("SUPABASE_URL / SUPABASE_KEY not set; store routes will return 500");
                None
            }
            Some(store_config) => match store_config
                .validate()
                .and_then(|_| PostgrestStore::new(store_config))
            {
                Ok(client) => {
                    info!(url = %store_config.url, "Store client ready");
                    Some(Arc::new(client))
                }
                Err(e) => {
                    warn!(error = %e, "Store settings unusable; store routes will return 500");
                    None
                }
            },
        };

        if store.is_none() {
            config.store = None;
        }
        Self::new(config, store)
    }

    /// Probe the store once if configured to. Never fails startup.
    pub async fn startup_health_check(&self) {
        let enabled = self
            .config
            .store
            .as_ref()
            .is_some_and(|s| s.health_check_on_start);
        let Some(store) = self.store.as_ref().filter(|_| enabled) else {
            return;
        };

        match store.ping().await {
            Ok(()) => info!("Store health check passed"),
            Err(e) => warn!(error = %e, "Store health check failed; continuing"),
        }
    }

    /// Router with middleware and state applied.
    pub fn router(&self) -> Router {
        let state = AppState {
            handlers: Arc::clone(&self.handlers),
            metrics: Arc::clone(&self.metrics),
        };

        let middleware = ServiceBuilder::new()
            .layer(create_cors_layer(&self.config.cors))
            .layer(TracingLayer::new())
            .layer(DefaultBodyLimit::max(self.config.limits.max_request_size));

        routes().layer(middleware).with_state(state)
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn start<F>(&self, shutdown: F) -> Result<(), ServiceError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServiceError::Bind(format!("{}: {}", addr, e)))?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), ServiceError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local = listener
            .local_addr()
            .map_err(|e| ServiceError::Bind(e.to_string()))?;
        info!(
            addr = %local,
            store_configured = self.handlers.store_configured(),
            "Catalog API listening"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                shutdown.await;
                info!("Received shutdown signal");
            })
            .await
            .map_err(|e| ServiceError::Serve(e.to_string()))?;

        info!("Catalog API stopped");
        Ok(())
    }

    /// Get metrics
    pub fn metrics(&self) -> Arc<ServiceMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}
