use std::fs;
use std::sync::{Arc, RwLock};

use anyhow::Result;
use axum::middleware;
use axum::{Router, extract::Request, response::Response};
use http::{HeaderValue, header};
use tokio::sync::watch;
use tokio_rusqlite::Connection;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use super::routes;
use crate::api::state::{AppState, SharedState};
use crate::controller::{Controller, ViewStatus};
use crate::core::{AppConfig, StoreBackend, db::async_db};
use crate::session::{IdentityProvider, SessionBootstrapper, identity_provider};
use crate::web;

// Pages show live bookings and must never be served from cache
async fn set_page_cache_control(request: Request, next: middleware::Next) -> Response {
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}

pub fn app(shared_state: SharedState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        // API routes
        .nest("/api", routes::router())
        // Server rendered pages
        .merge(web::router().layer(middleware::from_fn(set_page_cache_control)))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(Arc::clone(&shared_state))
}

/// Build the application state and start the controller that signs in
/// and keeps the view up to date.
pub fn app_state(
    db: Option<Connection>,
    config: AppConfig,
    provider: Arc<dyn IdentityProvider>,
) -> (SharedState, Controller) {
    let bootstrapper = SessionBootstrapper::new(provider);
    let (view_tx, view_rx) = watch::channel(ViewStatus::Loading);
    let app_state = AppState::new(db, config, bootstrapper.state(), view_rx);
    let shared_state = Arc::new(RwLock::new(app_state));
    let controller = Controller::start(Arc::clone(&shared_state), bootstrapper, view_tx);
    (shared_state, controller)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}

// Run the server
pub async fn serve(host: String, port: String, config: AppConfig) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // axum logs rejections from built-in extractors with the `axum::rejection`
                // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
                format! {
                    "{}=debug,tower_http=debug,axum::rejection=trace",
                    env!("CARGO_CRATE_NAME")
                }
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = match config.store_backend {
        StoreBackend::Sqlite => {
            fs::create_dir_all(&config.db_path)?;
            Some(async_db(&config.db_path).await?)
        }
        StoreBackend::Firestore => None,
    };

    let provider = identity_provider(&config);
    let (shared_state, controller) = app_state(db, config, provider);
    let app = app(shared_state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;

    tracing::debug!("Server started. Listening on {}", listener.local_addr()?);

    // Closing the subscription also ends open snapshot streams so the
    // server can drain its connections
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            controller.shutdown().await;
        })
        .await?;

    Ok(())
}
