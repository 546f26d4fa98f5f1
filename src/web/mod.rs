//! HTTP surface: routing, handlers and server-rendered views.

pub mod handlers;
pub mod routes;
mod server;
pub mod templates;

pub use routes::Routes;
pub use server::{ServerHandle, build_router, start_server};

use crate::config::RouteLayout;
use crate::db::Database;

/// State shared across handlers.
#[derive(Clone)]
pub struct AppState {
    db: Database,
    routes: Routes,
}

impl AppState {
    pub fn new(db: Database, layout: RouteLayout) -> Self {
        Self {
            db,
            routes: Routes::new(layout),
        }
    }

    /// Get the task store.
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Get the route layout being served.
    pub fn routes(&self) -> &Routes {
        &self.routes
    }
}
