#![allow(dead_code)]

use std::fs;
use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::test;
use todo_service::config::{CommonConfig, PathSet};
use todo_service::server::config::ServerConfig;
use todo_service::server::factory::ServerFactory;
use todo_service::server::restful::RestfulContext;
use todo_service::types::response::CommonResponse;

pub const SUPERADMIN: &str = "root@example.com";

const POLICY: &str = "\
p, admin, /api/v1/todos, GET
p, admin, /api/v1/todos, POST
p, user, /api/v1/todos, GET
g, alice@example.com, admin
g, bob@example.com, user
";

/// A private config and data directory with the standard policy in
/// `rbac/policy.csv`.
pub fn path_set(name: &str) -> PathSet {
    let root = std::env::temp_dir().join(format!(
        "todo-service-it-{name}-{}",
        std::process::id()
    ));
    let config_path = root.join("config");
    let data_path = root.join("data");
    fs::create_dir_all(config_path.join("rbac")).unwrap();
    fs::create_dir_all(&data_path).unwrap();
    fs::write(config_path.join("rbac").join("policy.csv"), POLICY).unwrap();

    PathSet {
        config_path,
        data_path,
        environment: String::from("dev"),
    }
}

/// Parse a server config on top of an in-memory database and the given
/// superadmin, then complete it against `ps`.
pub fn server_config(ps: &PathSet, extra: &str) -> ServerConfig {
    let raw = format!(
        r#"
        {extra}

        [authz]
        superadmin_email = "{SUPERADMIN}"

        [db.sqlite]
        memory = true
        "#
    );
    let mut cfg: ServerConfig = toml::from_str(&raw).unwrap();
    cfg.complete(ps).unwrap();
    cfg
}

pub async fn build_context(cfg: ServerConfig) -> Arc<RestfulContext> {
    let factory = ServerFactory::new(cfg).unwrap();
    factory.build_context().await.unwrap()
}

pub async fn read_message<B>(resp: ServiceResponse<B>) -> String
where
    B: MessageBody,
{
    let body: CommonResponse = test::read_body_json(resp).await;
    body.message.unwrap_or_default()
}
