mod common;

use actix_web::http::{header, StatusCode};
use actix_web::test;
use serde_json::json;
use todo_service::server::restful::RestfulServer;
use todo_service::types::healthz::StatusResponse;
use todo_service::types::todo::Todo;
use todo_service::types::token::TokenResponse;

use common::{build_context, path_set, read_message, server_config, SUPERADMIN};

const LOCAL: &str = r#"
    [authn]
    mode = "local"

    [authn.token]
    secret = "integration-secret"
"#;

macro_rules! local_app {
    ($name:expr) => {{
        let ps = path_set($name);
        let cfg = server_config(&ps, LOCAL);
        let ctx = build_context(cfg).await;
        test::init_service(RestfulServer::build_app(ctx, 1)).await
    }};
}

macro_rules! issue_token {
    ($app:expr, $email:expr) => {{
        let req = test::TestRequest::post()
            .uri("/auth")
            .set_json(json!({ "email": $email }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: TokenResponse = test::read_body_json(resp).await;
        body.token
    }};
}

#[actix_web::test]
async fn test_public_routes() {
    let app = local_app!("public");

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(body, "Welcome to the todo service");

    for (uri, status) in [
        ("/healthz", "ok"),
        ("/readyz", "ready"),
        ("/public", "public"),
        ("/public/docs/index.html", "public"),
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        let body: StatusResponse = test::read_body_json(resp).await;
        assert_eq!(body.status, status, "{uri}");
    }

    // Only the listed methods are public.
    let req = test::TestRequest::post().uri("/healthz").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_unauthenticated() {
    let app = local_app!("unauthenticated");

    let req = test::TestRequest::get().uri("/api/v1/todos").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(read_message(resp).await, "Authorization header is missing");

    for value in ["Token abc", "Bearer", "Bearer a b", "abc"] {
        let req = test::TestRequest::get()
            .uri("/api/v1/todos")
            .insert_header((header::AUTHORIZATION, value))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{value}");
        assert_eq!(
            read_message(resp).await,
            "Authorization header format must be 'Bearer {token}'",
            "{value}"
        );
    }

    let req = test::TestRequest::get()
        .uri("/api/v1/todos")
        .insert_header((header::AUTHORIZATION, "Bearer not-a-jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(read_message(resp).await, "Authentication failed");

    // Unknown routes still need a credential.
    let req = test::TestRequest::get().uri("/nothing").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_issue_token() {
    let app = local_app!("issue-token");

    let token = issue_token!(app, "alice@example.com");
    assert_eq!(token.split('.').count(), 3);

    let cases: [(&[u8], &str); 5] = [
        (b"not json", "Invalid request"),
        (b"{}", "Email is required"),
        (br#"{"email": "   "}"#, "Invalid email format"),
        (br#"{"email": " alice@example.com"}"#, "Invalid email format"),
        (br#"{"email": "alice"}"#, "Invalid email format"),
    ];
    for (body, message) in cases {
        let req = test::TestRequest::post()
            .uri("/auth")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload(body.to_vec())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{message}");
        assert_eq!(read_message(resp).await, message);
    }

    // Oidc routes are not served in local mode.
    let req = test::TestRequest::get().uri("/auth/login").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_todos_policy() {
    let app = local_app!("todos-policy");

    let alice = issue_token!(app, "alice@example.com");
    let bob = issue_token!(app, "bob@example.com");
    let carol = issue_token!(app, "carol@example.com");

    // alice holds the admin role.
    let req = test::TestRequest::post()
        .uri("/api/v1/todos")
        .insert_header((header::AUTHORIZATION, format!("Bearer {alice}")))
        .set_json(json!({ "title": "  Write docs  " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let todo: Todo = test::read_body_json(resp).await;
    assert_eq!(todo.title, "Write docs");
    assert!(!todo.completed);

    let req = test::TestRequest::post()
        .uri("/api/v1/todos")
        .insert_header((header::AUTHORIZATION, format!("Bearer {alice}")))
        .set_json(json!({ "title": " " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_message(resp).await, "Title is required");

    // bob may only read.
    let req = test::TestRequest::get()
        .uri("/api/v1/todos")
        .insert_header((header::AUTHORIZATION, format!("Bearer {bob}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<Todo> = test::read_body_json(resp).await;
    assert_eq!(todos, vec![todo]);

    let req = test::TestRequest::post()
        .uri("/api/v1/todos")
        .insert_header((header::AUTHORIZATION, format!("Bearer {bob}")))
        .set_json(json!({ "title": "Not allowed" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(read_message(resp).await, "Forbidden");

    // carol is authenticated but has no role at all.
    let req = test::TestRequest::get()
        .uri("/api/v1/todos")
        .insert_header((header::AUTHORIZATION, format!("Bearer {carol}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Authenticated requests to unknown routes outside the api scope.
    let req = test::TestRequest::get()
        .uri("/nothing")
        .insert_header((header::AUTHORIZATION, format!("Bearer {carol}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_message(resp).await, "No route to GET /nothing");
}

#[actix_web::test]
async fn test_superadmin() {
    let app = local_app!("superadmin");

    let root = issue_token!(app, SUPERADMIN);

    let req = test::TestRequest::post()
        .uri("/api/v1/todos")
        .insert_header((header::AUTHORIZATION, format!("Bearer {root}")))
        .set_json(json!({ "title": "Anything goes" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri("/api/v1/todos")
        .insert_header((header::AUTHORIZATION, format!("Bearer {root}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<Todo> = test::read_body_json(resp).await;
    assert_eq!(todos.len(), 1);

    // No policy row covers this path, the override still lets it through to
    // routing.
    let req = test::TestRequest::delete()
        .uri("/api/v1/todos")
        .insert_header((header::AUTHORIZATION, format!("Bearer {root}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // The override is an exact match on the email.
    let upper = issue_token!(app, SUPERADMIN.to_uppercase());
    let req = test::TestRequest::get()
        .uri("/api/v1/todos")
        .insert_header((header::AUTHORIZATION, format!("Bearer {upper}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
