use std::sync::Arc;
use std::time::Duration;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::{from_fn, Logger};
use actix_web::web::{self, Bytes, Data, PayloadConfig, Query, ReqData};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer};
use anyhow::{Context, Result};
use log::{info, warn};
use openssl::ssl::SslAcceptorBuilder;
use sd_notify::NotifyState;

use super::authn::AuthnGate;
use super::authz::chain::ChainAuthorizer;
use super::context::AuthzContext;
use super::gate;
use super::handlers::healthz::HealthzHandler;
use super::handlers::oidc::{CallbackQuery, OidcHandler};
use super::handlers::todos::TodoHandler;
use super::handlers::token::TokenHandler;
use super::response::Response;

pub struct RestfulServer {
    ssl: Option<SslAcceptorBuilder>,
    ctx: Arc<RestfulContext>,

    keep_alive_secs: Option<u64>,
    workers: Option<u64>,
    request_timeout_secs: u64,
    shutdown_timeout_secs: u64,

    bind: String,

    payload_limit_mib: usize,
}

/// Shared, read-only state behind every worker.
pub struct RestfulContext {
    pub authn: AuthnGate,
    pub authz: ChainAuthorizer,

    pub healthz_handler: HealthzHandler,
    pub todo_handler: TodoHandler,

    /// Present in local mode only.
    pub token_handler: Option<TokenHandler>,
    /// Present in oidc mode only.
    pub oidc_handler: Option<OidcHandler>,
}

impl RestfulServer {
    const API_PATH: &'static str = "/api/v1";
    const LOG_FORMAT: &'static str = r#"%a "%r" %s %b "%{User-Agent}i" %Dms"#;

    pub fn new(
        bind: String,
        ssl: Option<SslAcceptorBuilder>,
        ctx: Arc<RestfulContext>,
        payload_limit_mib: usize,
    ) -> Self {
        Self {
            ssl,
            ctx,
            keep_alive_secs: None,
            workers: None,
            request_timeout_secs: 30,
            shutdown_timeout_secs: 10,
            bind,
            payload_limit_mib,
        }
    }

    pub fn set_keep_alive_secs(&mut self, keep_alive_secs: u64) {
        self.keep_alive_secs = Some(keep_alive_secs);
    }

    pub fn set_workers(&mut self, workers: u64) {
        self.workers = Some(workers);
    }

    pub fn set_request_timeout_secs(&mut self, secs: u64) {
        self.request_timeout_secs = secs;
    }

    pub fn set_shutdown_timeout_secs(&mut self, secs: u64) {
        self.shutdown_timeout_secs = secs;
    }

    /// The full application: request logging, the authentication gate on
    /// every route and the authorization gate on the API scope.
    pub fn build_app(
        ctx: Arc<RestfulContext>,
        payload_limit_mib: usize,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(Data::from(ctx))
            .app_data(PayloadConfig::new(payload_limit_mib * 1024 * 1024))
            .wrap(from_fn(gate::authn_gate))
            .wrap(Logger::new(Self::LOG_FORMAT))
            .route("/", web::get().to(Self::handle_root))
            .route("/healthz", web::get().to(Self::handle_healthz))
            .route("/readyz", web::get().to(Self::handle_readyz))
            .route("/public", web::get().to(Self::handle_public))
            .route("/public/{path:.*}", web::get().to(Self::handle_public))
            .route("/auth", web::post().to(Self::handle_issue_token))
            .route("/auth/login", web::get().to(Self::handle_login))
            .route("/auth/callback", web::get().to(Self::handle_callback))
            .service(
                web::scope(Self::API_PATH)
                    .wrap(from_fn(gate::authz_gate))
                    .route("/todos", web::get().to(Self::handle_list_todos))
                    .route("/todos", web::post().to(Self::handle_create_todo)),
            )
            .default_service(web::route().to(Self::default_handler))
    }

    pub async fn run(mut self) -> Result<()> {
        let ctx = self.ctx.clone();
        let payload_limit_mib = self.payload_limit_mib;
        let mut srv = HttpServer::new(move || Self::build_app(ctx.clone(), payload_limit_mib))
            .client_request_timeout(Duration::from_secs(self.request_timeout_secs))
            .shutdown_timeout(self.shutdown_timeout_secs);

        if let Some(ssl) = self.ssl.take() {
            info!("Binding to https://{}", self.bind);
            srv = srv.bind_openssl(&self.bind, ssl).context("bind with ssl")?
        } else {
            warn!("Using HTTP (without SSL), do not expose this to untrusted networks");
            info!("Binding to http://{}", self.bind);
            srv = srv.bind(&self.bind).context("bind without ssl")?
        };

        if let Some(keep_alive) = self.keep_alive_secs {
            srv = srv.keep_alive(Duration::from_secs(keep_alive));
        }
        if let Some(workers) = self.workers {
            srv = srv.workers(workers as usize);
        }

        if let Err(e) = sd_notify::notify(true, &[NotifyState::Ready]) {
            warn!("Failed to notify systemd: {e}");
        }
        info!("Starting restful server");
        srv.run().await.context("run server")?;

        info!("Server stopped");
        Ok(())
    }

    async fn handle_root(ctx: Data<RestfulContext>) -> HttpResponse {
        ctx.healthz_handler.root().into()
    }

    async fn handle_healthz(ctx: Data<RestfulContext>) -> HttpResponse {
        ctx.healthz_handler.healthz().into()
    }

    async fn handle_readyz(ctx: Data<RestfulContext>) -> HttpResponse {
        ctx.healthz_handler.readyz().into()
    }

    async fn handle_public(ctx: Data<RestfulContext>) -> HttpResponse {
        ctx.healthz_handler.public().into()
    }

    async fn handle_issue_token(
        req: HttpRequest,
        body: Bytes,
        ctx: Data<RestfulContext>,
    ) -> HttpResponse {
        match ctx.token_handler {
            Some(ref handler) => handler.issue_token(&body).into(),
            None => Self::default_handler(req).await,
        }
    }

    async fn handle_login(req: HttpRequest, ctx: Data<RestfulContext>) -> HttpResponse {
        match ctx.oidc_handler {
            Some(ref handler) => handler.login().into(),
            None => Self::default_handler(req).await,
        }
    }

    async fn handle_callback(
        req: HttpRequest,
        query: Query<CallbackQuery>,
        ctx: Data<RestfulContext>,
    ) -> HttpResponse {
        match ctx.oidc_handler {
            Some(ref handler) => handler.callback(&req, query.into_inner()).await.into(),
            None => Self::default_handler(req).await,
        }
    }

    async fn handle_list_todos(
        user: ReqData<AuthzContext>,
        ctx: Data<RestfulContext>,
    ) -> HttpResponse {
        ctx.todo_handler.list(&user).into()
    }

    async fn handle_create_todo(
        user: ReqData<AuthzContext>,
        body: Bytes,
        ctx: Data<RestfulContext>,
    ) -> HttpResponse {
        ctx.todo_handler.create(&user, &body).into()
    }

    async fn default_handler(req: HttpRequest) -> HttpResponse {
        let message = format!("No route to {} {}", req.method(), req.path());
        Response::not_found(message).into()
    }
}
