//! Router construction and server lifecycle.

use super::AppState;
use super::handlers;
use super::routes::Routes;
use crate::config::RouteLayout;
use axum::{
    Router,
    routing::{get, post},
};
use std::net::SocketAddr;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the router for the state's route layout.
pub fn build_router(state: AppState) -> Router {
    let routes = *state.routes();

    let mut router = Router::new()
        .route(routes.list(), get(handlers::list_tasks))
        .route(
            Routes::CREATE,
            get(handlers::create_form).post(handlers::create_task),
        )
        .route(Routes::DONE, get(handlers::list_done))
        .route(routes.not_done(), get(handlers::list_not_done))
        .route(routes.mark_done_pattern(), post(handlers::mark_done))
        .route(Routes::DELETE_PATTERN, post(handlers::delete_task))
        .route(Routes::HEALTH, get(handlers::health));

    if routes.layout() == RouteLayout::Main {
        router = router.route("/", get(handlers::redirect_home));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// A running server.
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the listener is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting connections and wait for in-flight requests to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = self.task.await {
            tracing::error!("Server task failed: {}", e);
        }
    }
}

/// Bind `addr` and serve in a background task.
pub async fn start_server(state: AppState, addr: SocketAddr) -> anyhow::Result<ServerHandle> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    info!("Taskboard listening on http://{}", bound_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Server shutting down");
            })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok(ServerHandle {
        addr: bound_addr,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}
