use axum::{Router, response::IntoResponse, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use unitymedia_server::backend::{Backend, InMemoryBackend, RestBackend};
use unitymedia_server::config::{BackendMode, Config};
use unitymedia_server::session::{SessionManager, SessionManagerConfig};
use unitymedia_server::{AppState, api_routes};

/// Prometheus metrics handle for exposing metrics in Prometheus format
static PROMETHEUS_HANDLE: std::sync::OnceLock<PrometheusHandle> = std::sync::OnceLock::new();

/// Endpoint to expose metrics in Prometheus format
async fn prometheus_metrics() -> impl IntoResponse {
    PROMETHEUS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_default()
}

async fn build_backend(config: &Config) -> anyhow::Result<Arc<dyn Backend>> {
    let backend: Arc<dyn Backend> = match config.backend.mode {
        BackendMode::Memory if config.demo.seed => {
            info!("Using in-memory backend with demo data");
            Arc::new(InMemoryBackend::with_demo_data().await)
        }
        BackendMode::Memory => {
            info!("Using in-memory backend");
            Arc::new(InMemoryBackend::new())
        }
        BackendMode::Remote => {
            info!("Using hosted backend at: {}", config.backend.url);
            if config.backend.anon_key.is_empty() {
                warn!("BACKEND_ANON_KEY is not set - requests will likely be rejected");
            }
            Arc::new(RestBackend::new(&config.backend)?)
        }
    };
    Ok(backend)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize Prometheus metrics recorder (must be done before any metrics are recorded)
    let prometheus_handle = PrometheusBuilder::new().install_recorder()?;
    PROMETHEUS_HANDLE.set(prometheus_handle).ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "unitymedia=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = Config::from_env();
    info!(
        "Loaded configuration: host={}, port={}, backend={:?}",
        config.host, config.port, config.backend.mode
    );

    let backend = build_backend(&config).await?;

    let session_manager = Arc::new(SessionManager::with_config(
        backend,
        SessionManagerConfig {
            serialize_mutations: config.session.serialize_mutations,
        },
    ));
    session_manager.wait_until_ready().await;
    info!(
        "Initial session lookup finished: authenticated={}",
        session_manager.session().await.is_authenticated()
    );

    let app_state =
        AppState::new(session_manager.clone()).with_default_language(config.default_language);

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/metrics/prometheus", get(prometheus_metrics))
        .merge(api_routes(app_state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        );

    // Start the server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("UnityMedia server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    session_manager.shutdown();
    Ok(())
}
