//! Itinera - Main Entry Point

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use itinera_backend::{
    api::{routes, AppState},
    config::Config,
    db,
    error::Result,
    services::{
        identity::IdentityService,
        image_enricher::HttpImageEnricher,
        plan_generator::{HttpPlanGenerator, PlanGenerator},
    },
    telemetry,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    telemetry::init_tracing(&config.log_level);
    tracing::info!("Starting Itinera backend");

    // Connect to database. The pool is the one shared store handle: opened
    // here, injected into services, closed again on shutdown.
    let db_pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations").run(&db_pool).await?;
    tracing::info!("Database migrations complete");

    // Wire collaborators
    let identity = Arc::new(IdentityService::new(&config.jwt_secret));
    let plan_generator: Arc<dyn PlanGenerator> =
        Arc::new(HttpPlanGenerator::new(&config.plan_service_url));

    let mut app_state = AppState::new(
        config.clone(),
        db_pool.clone(),
        identity,
        plan_generator,
    );
    match &config.image_service_url {
        Some(url) => {
            app_state.set_image_enricher(Arc::new(HttpImageEnricher::new(
                url,
                config.image_service_key.clone(),
            )));
            tracing::info!("Image enrichment enabled via {}", url);
        }
        None => {
            tracing::info!("Image service not configured, enrichment disabled");
        }
    }

    // Build router
    let app = routes::create_router(Arc::new(app_state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = config.bind_address.parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Drain in-flight queries before exit
    db_pool.close().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("Failed to install shutdown signal handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}
