use std::sync::Arc;

use log::{error, info};

use crate::server::context::AuthzContext;
use crate::server::db::Database;
use crate::server::response::Response;
use crate::types::todo::CreateTodoRequest;

/// `/api/v1/todos`. The caller identity is only used for logging, todos are
/// not scoped per user.
pub struct TodoHandler {
    db: Arc<Database>,
}

impl TodoHandler {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn list(&self, user: &AuthzContext) -> Response {
        info!("Listing todos for '{}'", user.email);
        match self.db.with_transaction(|tx| tx.list_todos()) {
            Ok(todos) => Response::json(todos),
            Err(e) => {
                error!("Failed to get todos: {e:#}");
                Response::error("Failed to get todos")
            }
        }
    }

    pub fn create(&self, user: &AuthzContext, body: &[u8]) -> Response {
        let req: CreateTodoRequest = match serde_json::from_slice(body) {
            Ok(req) => req,
            Err(_) => return Response::bad_request("Title is required"),
        };
        let title = req.title.trim();
        if title.is_empty() {
            return Response::bad_request("Title is required");
        }

        info!("Creating todo for '{}': {title}", user.email);
        match self.db.with_transaction(|tx| tx.create_todo(title)) {
            Ok(todo) => Response::created(todo),
            Err(e) => {
                error!("Failed to create todo: {e:#}");
                Response::error("Failed to create todo")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use actix_web::http::StatusCode;
    use actix_web::HttpResponse;

    use crate::types::todo::Todo;

    use super::*;

    fn user() -> AuthzContext {
        AuthzContext {
            email: String::from("alice@example.com"),
            subject: String::from("alice@example.com"),
            name: String::from("alice@example.com"),
            is_superadmin: false,
        }
    }

    #[actix_web::test]
    async fn test_todos() {
        let handler = TodoHandler::new(Arc::new(Database::new_test()));

        let resp: HttpResponse = handler.list(&user()).into();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = to_bytes(resp.into_body()).await.unwrap();
        let todos: Vec<Todo> = serde_json::from_slice(&body).unwrap();
        assert!(todos.is_empty());

        let resp: HttpResponse = handler
            .create(&user(), br#"{"title":"  Write tests  "}"#)
            .into();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = to_bytes(resp.into_body()).await.unwrap();
        let todo: Todo = serde_json::from_slice(&body).unwrap();
        assert_eq!(todo.title, "Write tests");
        assert!(!todo.completed);

        let cases: [&[u8]; 5] = [b"", b"{}", br#"{"title":""}"#, br#"{"title":"  "}"#, b"[1]"];
        for body in cases {
            assert_eq!(
                handler.create(&user(), body).status(),
                StatusCode::BAD_REQUEST
            );
        }

        let resp: HttpResponse = handler.list(&user()).into();
        let body = to_bytes(resp.into_body()).await.unwrap();
        let todos: Vec<Todo> = serde_json::from_slice(&body).unwrap();
        assert_eq!(todos, vec![todo]);
    }
}
