#![deny(
    clippy::expect_used,
    clippy::panic,
    clippy::print_stdout,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used
)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::{middleware, Extension};
use capitolwatch_api::auth::AuthTokens;
use capitolwatch_api::config::Config;
use capitolwatch_api::db::{setup_dynamo, setup_mongo};
use capitolwatch_api::http::security::{build_security_headers, security_headers_middleware};
use capitolwatch_api::http::{api_router, AppState};
use capitolwatch_api::store::DynamoStore;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Resolves when the process receives an interrupt, releasing
/// `axum::serve` to finish in-flight requests and return.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(err) => tracing::error!(error = %err, "Failed to listen for shutdown signal"),
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load and validate configuration first (fail-fast)
    let config = Config::load().map_err(|e| anyhow::anyhow!("{e}"))?;

    // Set up logging from config
    std::env::set_var("RUST_LOG", &config.logging.level);
    tracing_subscriber::fmt::init();

    // Init banner so container logs clearly show startup
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "capitolwatch-api starting up"
    );

    // Key material loads once; request handling never re-reads the files.
    let tokens = AuthTokens::load(&config.auth)?;

    tracing::info!("Connecting to stores...");
    let dynamo = setup_dynamo(&config.dynamo).await;
    let mongo = setup_mongo(&config.mongo).await?;

    let state = AppState {
        items: Arc::new(DynamoStore::from_client(dynamo)),
        docs: Arc::new(mongo),
        tokens: Arc::new(tokens),
    };

    // Build CORS layer from config
    let cors_origins = &config.cors.allowed_origins;
    let allow_origin: AllowOrigin = if cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow any origin - not recommended for production");
        AllowOrigin::any()
    } else if cors_origins.is_empty() {
        tracing::info!(
            "CORS allowed origins not configured - cross-origin requests will be blocked"
        );
        AllowOrigin::list(Vec::<HeaderValue>::new())
    } else {
        let origins: Vec<HeaderValue> = cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        tracing::info!(origins = ?cors_origins, "CORS allowed origins configured");
        AllowOrigin::list(origins)
    };

    let mut app = api_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                .allow_headers(Any)
                .allow_origin(allow_origin),
        );

    // Add security headers middleware if enabled
    if config.security_headers.enabled {
        tracing::info!("Security headers enabled");
        let headers = build_security_headers(&config.security_headers);
        app = app
            .layer(middleware::from_fn(security_headers_middleware))
            .layer(Extension(headers));
    } else {
        tracing::info!("Security headers disabled");
    }

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Starting server at http://{}/api/v1", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
