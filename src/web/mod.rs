pub mod routes;
pub mod templates;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::trace::TraceLayer;

use crate::roster::{Pick, Selector, Standing};

/// State shared by every request: the class label and the selector.
pub struct AppState {
    pub class_name: String,
    selector: Mutex<Selector>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(class_name: impl Into<String>, selector: Selector) -> SharedState {
        Arc::new(Self {
            class_name: class_name.into(),
            selector: Mutex::new(selector),
        })
    }

    /// The count bump is the last step of a pick, so a poisoned lock still
    /// guards a consistent roster.
    fn selector(&self) -> MutexGuard<'_, Selector> {
        self.selector.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn pick(&self) -> Option<Pick> {
        self.selector().pick()
    }

    pub fn standings(&self) -> Vec<Standing> {
        self.selector().standings()
    }
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/question", post(routes::question))
        .route("/standings", get(routes::standings))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl-C.
pub async fn serve(state: SharedState, host: &str, port: u16) -> Result<()> {
    let ip = host
        .parse()
        .with_context(|| format!("invalid bind address: {}", host))?;
    let addr = SocketAddr::new(ip, port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(%addr, channel = %state.class_name, "serving");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for Ctrl-C");
            }
        })
        .await
        .context("server error")?;

    tracing::info!("shutting down");
    Ok(())
}
