mod handlers;
pub mod routes;

use crate::config::Config;
use crate::directory::Directory;
use crate::notify::AdminNotifier;
use crate::plans::PlanAdmin;
use crate::storage::ObjectStorage;
use crate::store::DocumentStore;
use anyhow::Result;
use axum::{
    routing::{get, post, put},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared handles every handler receives
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub storage: Arc<dyn ObjectStorage>,
    pub notifier: Arc<dyn AdminNotifier>,
    pub directory: Arc<Directory>,
    pub plans: Arc<PlanAdmin>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        storage: Arc<dyn ObjectStorage>,
        notifier: Arc<dyn AdminNotifier>,
        config: &Config,
    ) -> Self {
        let directory = Directory::new(
            store.clone(),
            storage.clone(),
            config.directory.fetch_page_size,
            config.directory.page_size,
        );
        Self {
            plans: Arc::new(PlanAdmin::new(store.clone())),
            directory: Arc::new(directory),
            store,
            storage,
            notifier,
        }
    }
}

/// All routes with tracing and, when enabled, permissive CORS
pub fn build_router(state: AppState, enable_cors: bool) -> Router {
    let app = Router::new()
        // General routes
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::get_metrics))

        // Player routes
        .route(
            "/api/players",
            get(handlers::players::search_players).post(handlers::players::create_player),
        )
        .route(
            "/api/players/:id",
            get(handlers::players::get_player).put(handlers::players::save_player),
        )
        .route("/api/players/:id/steps/:step", post(handlers::players::submit_step))
        .route("/api/players/:id/canonicalize", post(handlers::players::canonicalize))

        // Subscription plan routes
        .route(
            "/api/plans",
            get(handlers::plans::list_plans).post(handlers::plans::create_plan),
        )
        .route("/api/plans/template", get(handlers::plans::get_template))
        .route(
            "/api/plans/:id",
            get(handlers::plans::get_plan)
                .put(handlers::plans::update_plan)
                .delete(handlers::plans::delete_plan),
        )
        .route("/api/plans/:id/duplicate", post(handlers::plans::duplicate_plan))
        .route("/api/plans/:id/active", put(handlers::plans::set_active))
        .route("/api/plans/:id/features", post(handlers::plans::add_feature))
        .route(
            "/api/plans/:id/features/:feature_id",
            put(handlers::plans::update_feature).delete(handlers::plans::remove_feature),
        )

        // Location routes
        .route("/api/geo/countries", get(handlers::geo::list_countries))
        .route("/api/geo/countries/:country/cities", get(handlers::geo::country_cities))
        .route("/api/geo/cities", get(handlers::geo::search_cities))
        .route("/api/geo/cities/:city/country", get(handlers::geo::city_country))

        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        app
    }
}

/// Serve the API until `shutdown` resolves
pub async fn start_api_server(
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let config = Config::get();
    let app = build_router(state, config.api.enable_cors);

    let addr = format!("{}:{}", config.server.host, config.server.port).parse::<SocketAddr>()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Starting API server on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
