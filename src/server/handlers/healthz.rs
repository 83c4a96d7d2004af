use std::sync::Arc;

use log::error;

use crate::server::db::Database;
use crate::server::response::Response;
use crate::types::healthz::StatusResponse;

pub const WELCOME_MESSAGE: &str = "Welcome to the todo service";

pub struct HealthzHandler {
    db: Arc<Database>,
}

impl HealthzHandler {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn root(&self) -> Response {
        Response::text(WELCOME_MESSAGE)
    }

    /// Liveness, never touches the store.
    pub fn healthz(&self) -> Response {
        Response::json(StatusResponse::new("ok"))
    }

    pub fn readyz(&self) -> Response {
        match self.db.with_transaction(|tx| tx.ping()) {
            Ok(()) => Response::json(StatusResponse::new("ready")),
            Err(e) => {
                error!("Readiness check failed: {e:#}");
                Response::service_unavailable("Database is not ready")
            }
        }
    }

    pub fn public(&self) -> Response {
        Response::json(StatusResponse::new("public"))
    }
}
