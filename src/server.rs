use std::sync::Arc;

use anyhow::Result;
use axum::{Router, routing::post};
use tokio::{
    net::TcpListener,
    signal::unix::{SignalKind, signal},
};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    config::{Pricing, ServerSettings},
    handlers::{
        delivery_fee::{handle_delivery_fee, handle_method_not_allowed},
        not_found,
    },
};

pub const PATH_DELIVERY_FEE: &str = "/delivery-fee";

/// Shared by every handler. Read-only after startup.
#[derive(Debug, Clone)]
pub struct AppState {
    pub pricing: Arc<Pricing>,
}

pub fn router(pricing: Pricing) -> Router {
    let state = AppState {
        pricing: Arc::new(pricing),
    };

    Router::new()
        .route(
            PATH_DELIVERY_FEE,
            post(handle_delivery_fee).fallback(handle_method_not_allowed),
        )
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the listener and serves until SIGTERM or SIGINT, letting in-flight
/// requests finish.
pub async fn serve(server: &ServerSettings, pricing: Pricing) -> Result<()> {
    let listener = TcpListener::bind((server.host.as_str(), server.port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let shutdown = async move {
        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM. Shutting down...");
            },
            _ = sigint.recv() => {
                info!("Received SIGINT. Shutting down...");
            }
        }
    };

    axum::serve(listener, router(pricing))
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
