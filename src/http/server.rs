//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router for the selected service
//! - Wire up middleware (tracing, request ID, CORS, timeout, metrics, rate limit)
//! - Bind the server to a listener and serve until shutdown
//! - Apply configuration reloads without restarting

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::TestbedConfig;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::injection::{random, RandomSource};
use crate::observability::metrics;
use crate::security::{rate_limit_middleware, FixedWindowLimiter};
use crate::services::{self, external, internal, orchestrator, ServiceKind};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ArcSwap<TestbedConfig>>,
    pub random: Arc<dyn RandomSource>,
    pub client: reqwest::Client,
    pub service: ServiceKind,
}

impl AppState {
    /// Snapshot of the current configuration.
    pub fn config(&self) -> Arc<TestbedConfig> {
        self.config.load_full()
    }
}

/// HTTP server for one of the three services.
pub struct HttpServer {
    service: ServiceKind,
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a server whose randomness comes from `config.random_seed`.
    pub fn new(service: ServiceKind, config: TestbedConfig) -> Self {
        let random = random::from_seed(config.random_seed);
        Self::with_random(service, config, random)
    }

    /// Create a server with an explicit random source.
    pub fn with_random(
        service: ServiceKind,
        config: TestbedConfig,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        let state = AppState {
            config: Arc::new(ArcSwap::from_pointee(config.clone())),
            random,
            client: reqwest::Client::new(),
            service,
        };

        let router = Self::build_router(service, &config, state.clone());
        Self {
            service,
            router,
            state,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(service: ServiceKind, config: &TestbedConfig, state: AppState) -> Router {
        let routes = match service {
            ServiceKind::Orchestrator => orchestrator::router(&config.orchestrator.route_prefix),
            ServiceKind::External => external::routes(),
            ServiceKind::Internal => internal::routes(),
        };

        let mut routes = routes
            .route("/health", get(services::health))
            .route_layer(middleware::from_fn_with_state(service, metrics::track_requests));

        if service == ServiceKind::Orchestrator && config.rate_limit.enabled {
            tracing::info!(
                window_secs = config.rate_limit.window_secs,
                max_requests = config.rate_limit.max_requests,
                "Rate limiting enabled"
            );
            let limiter = Arc::new(FixedWindowLimiter::from_config(&config.rate_limit));
            routes = routes.route_layer(middleware::from_fn_with_state(limiter, rate_limit_middleware));
        }

        let mut router = routes.with_state(state);

        if config.observability.metrics_enabled {
            match metrics::init_metrics() {
                Some(handle) => {
                    router = router.route(
                        &config.observability.metrics_path,
                        get(metrics::render).with_state(handle),
                    );
                }
                None => tracing::warn!("Metrics endpoint disabled: no recorder available"),
            }
        }

        router
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(CorsLayer::permissive())
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<TestbedConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            service = %self.service,
            address = %addr,
            "HTTP server starting"
        );

        let config = self.state.config.clone();
        let service = self.service;
        tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                tracing::info!(service = %service, "Applying reloaded configuration");
                config.store(Arc::new(new_config));
            }
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!(service = %service, "HTTP server stopped");
        Ok(())
    }

    /// The assembled router, for in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}
