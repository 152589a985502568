//! Gateway service: router assembly and server lifecycle.

use std::future::Future;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use deal_index::DealLookupApi;

use crate::domain::config::GatewayConfig;
use crate::domain::error::GatewayError;
use crate::middleware::create_cors_layer;
use crate::routes::{self, AppState};

/// HTTP gateway over a lookup service.
pub struct DealGateway {
    config: GatewayConfig,
    api: AppState,
}

impl DealGateway {
    /// Create a new gateway; the configuration is validated here.
    pub fn new(config: GatewayConfig, api: Arc<dyn DealLookupApi>) -> Result<Self, GatewayError> {
        config.validate()?;
        Ok(Self { config, api })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Build the HTTP router
    pub fn router(&self) -> Router {
        build_router(Arc::clone(&self.api), &self.config)
    }

    /// Bind the listener without serving yet.
    pub async fn bind(&self) -> Result<TcpListener, GatewayError> {
        let addr = self.config.http_addr();
        TcpListener::bind(addr)
            .await
            .map_err(|source| GatewayError::Bind { addr, source })
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener
            .local_addr()
            .unwrap_or_else(|_| self.config.http_addr());
        info!(addr = %addr, "Starting HTTP server");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(GatewayError::Serve)?;

        info!("HTTP server stopped");
        Ok(())
    }

    /// Bind and serve until `shutdown` resolves.
    pub async fn run<F>(&self, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = self.bind().await?;
        self.serve(listener, shutdown).await
    }
}

/// Assemble routes and middleware.
pub fn build_router(api: Arc<dyn DealLookupApi>, config: &GatewayConfig) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer(&config.cors));

    Router::new()
        .route("/provinces", get(routes::list_regions))
        .route("/cities/:id", get(routes::list_sub_regions))
        .route("/complexes/:id", get(routes::list_complexes))
        .route("/deals/:id", get(routes::resolve_complex_rows))
        .route("/districts/:id/deals", get(routes::resolve_sub_region_rows))
        .route("/deal/:id", get(routes::get_record))
        .route("/health", get(routes::health_check))
        .layer(middleware)
        .with_state(api)
}
