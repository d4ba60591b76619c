use std::sync::Arc;

use heyprodata::auth::{AuthBackend, MockAuthBackend};
use heyprodata::config::{AppConfig, StorageConfig};
use heyprodata::error::Result;
use heyprodata::onboarding::{FlowController, FlowRouteState, flow_routes};
use heyprodata::store::{LibSqlStore, MemoryStore, Store};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env();

    eprintln!("HeyPro Data v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://0.0.0.0:{}/api/flow", config.http_port);

    // ── Store ────────────────────────────────────────────────────────────
    let store: Arc<dyn Store> = match config.storage()? {
        StorageConfig::Memory => {
            eprintln!("   Store: in-memory (lost on restart)");
            Arc::new(MemoryStore::new())
        }
        StorageConfig::File(path) => {
            let store = LibSqlStore::new_local(&path)
                .await
                .inspect_err(|e| {
                    eprintln!("Error: Failed to open database at {}: {}", path.display(), e)
                })?
                .with_profile(config.profile_id.clone());
            eprintln!("   Store: {} (profile {})", path.display(), config.profile_id);
            Arc::new(store)
        }
    };

    // ── Flow ─────────────────────────────────────────────────────────────
    let auth: Arc<dyn AuthBackend> = Arc::new(MockAuthBackend::new(
        config.auth_latency,
        config.oauth_latency,
    ));
    let controller = Arc::new(FlowController::restore(store, auth).await?);
    eprintln!("   Resuming at: {}\n", controller.state().await.route());

    let app = flow_routes(FlowRouteState { controller })
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port)).await?;
    tracing::info!(port = config.http_port, "Flow server started");
    axum::serve(listener, app).await?;

    Ok(())
}
