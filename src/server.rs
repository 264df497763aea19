//! Status HTTP server: health, munger listing and poll counters

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use serde::Serialize;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::mungers::MungerRegistry;
use crate::observability::{Metrics, MetricsSnapshot};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Registered and active munger names, captured once activation is done
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MungerList {
    pub registered: Vec<String>,
    pub active: Vec<String>,
}

impl MungerList {
    pub fn from_registry(registry: &MungerRegistry) -> Self {
        Self {
            registered: registry.registered_names(),
            active: registry.active_names().to_vec(),
        }
    }
}

#[derive(Clone)]
pub struct StatusState {
    pub mungers: Arc<MungerList>,
    pub metrics: Arc<Metrics>,
}

impl StatusState {
    pub fn new(mungers: MungerList, metrics: Arc<Metrics>) -> Self {
        Self {
            mungers: Arc::new(mungers),
            metrics,
        }
    }
}

pub fn router(state: StatusState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/mungers", get(mungers))
        .route("/metrics", get(metrics))
        .with_state(state)
}

pub async fn run<F>(address: SocketAddr, state: StatusState, shutdown: F) -> Result<(), AnyError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(state);

    let listener = TcpListener::bind(address).await?;
    info!(%address, "Status server listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn mungers(State(state): State<StatusState>) -> Json<MungerList> {
    Json(state.mungers.as_ref().clone())
}

async fn metrics(State(state): State<StatusState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

/// Resolves on Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
