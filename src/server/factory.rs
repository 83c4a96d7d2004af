use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::info;
use openssl::ssl::{SslAcceptor, SslAcceptorBuilder, SslFiletype, SslMethod};

use super::authn::config::AuthnMode;
use super::authn::factory::AuthnFactory;
use super::authn::oidc::client::OidcClient;
use super::authn::token::factory::TokenFactory;
use super::authn::UnionVerifier;
use super::authz::factory::AuthzFactory;
use super::config::ServerConfig;
use super::db::factory::DbFactory;
use super::db::Database;
use super::handlers::healthz::HealthzHandler;
use super::handlers::oidc::OidcHandler;
use super::handlers::todos::TodoHandler;
use super::handlers::token::TokenHandler;
use super::restful::{RestfulContext, RestfulServer};

pub struct ServerFactory {
    db: Arc<Database>,
    cfg: ServerConfig,
}

impl ServerFactory {
    pub fn new(cfg: ServerConfig) -> Result<Self> {
        let db_factory = DbFactory::new();
        let db = db_factory.build_db(&cfg.db).context("init database")?;

        let count = db
            .with_transaction(|tx| tx.count_todos())
            .context("count stored todos")?;
        info!("Database ready with {count} stored todo(s)");

        Ok(Self { cfg, db })
    }

    pub async fn build_server(&self) -> Result<RestfulServer> {
        let ssl = self.build_ssl()?;
        let ctx = self.build_context().await?;

        let mut srv =
            RestfulServer::new(self.cfg.bind.clone(), ssl, ctx, self.cfg.payload_limit_mib);
        if self.cfg.keep_alive_secs > 0 {
            srv.set_keep_alive_secs(self.cfg.keep_alive_secs);
        }
        if self.cfg.workers > 0 {
            srv.set_workers(self.cfg.workers);
        }
        srv.set_request_timeout_secs(self.cfg.request_timeout_secs);
        srv.set_shutdown_timeout_secs(self.cfg.shutdown_timeout_secs);

        Ok(srv)
    }

    pub fn build_ssl(&self) -> Result<Option<SslAcceptorBuilder>> {
        if !self.cfg.ssl {
            return Ok(None);
        }

        let mut builder =
            SslAcceptor::mozilla_intermediate(SslMethod::tls()).context("init ssl acceptor")?;

        builder
            .set_private_key_file(&self.cfg.key_path, SslFiletype::PEM)
            .context("load ssl key file")?;
        builder
            .set_certificate_chain_file(&self.cfg.cert_path)
            .context("load ssl cert file")?;

        Ok(Some(builder))
    }

    /// Build the shared request context. In oidc mode this talks to the
    /// provider once for discovery and its signing keys.
    pub async fn build_context(&self) -> Result<Arc<RestfulContext>> {
        let superadmin_email = self.cfg.authz.superadmin_email.as_str();

        let (verifier, token_handler, oidc_handler) = match self.cfg.authn.mode {
            AuthnMode::Local => {
                info!("Using local token authentication");
                let token_factory = TokenFactory::new(&self.cfg.authn.token);
                let verifier = UnionVerifier::Local(token_factory.build_token_validator());
                let token_handler = TokenHandler::new(token_factory.build_token_generator())
                    .context("init token handler")?;
                (verifier, Some(token_handler), None)
            }
            AuthnMode::Oidc => {
                info!(
                    "Using oidc authentication with provider '{}'",
                    self.cfg.authn.oidc.issuer_url
                );
                // Bounds the code exchange made inside a request.
                let timeout = Duration::from_secs(self.cfg.request_timeout_secs / 2);
                let client = OidcClient::discover(&self.cfg.authn.oidc, timeout)
                    .await
                    .context("discover oidc provider")?;
                let verifier = UnionVerifier::Oidc(client.verifier());
                let oidc_handler = OidcHandler::new(
                    Arc::new(client),
                    self.cfg.authn.oidc.state_cookie.clone(),
                    self.cfg.authn.oidc.state_ttl_secs,
                    self.cfg.ssl,
                );
                (verifier, None, Some(oidc_handler))
            }
        };

        let authn_factory = AuthnFactory::new();
        let authn = authn_factory
            .build_authenticator(&self.cfg.authn, verifier, superadmin_email)
            .context("init authenticator")?;

        let authz_factory = AuthzFactory::new();
        let authz = authz_factory
            .build_authorizer(&self.cfg.authz)
            .await
            .context("init authorizer")?;

        let ctx = RestfulContext {
            authn,
            authz,
            healthz_handler: HealthzHandler::new(self.db.clone()),
            todo_handler: TodoHandler::new(self.db.clone()),
            token_handler,
            oidc_handler,
        };
        Ok(Arc::new(ctx))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::config::CommonConfig;

    use super::*;

    #[test]
    fn test_new_with_stored_todos() {
        let dir = std::env::temp_dir().join(format!(
            "todo-service-factory-{}",
            std::process::id()
        ));
        _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();

        let mut cfg = ServerConfig::default();
        cfg.db.sqlite.path = dir.join("todo.db").display().to_string();

        {
            let db = DbFactory::new().build_db(&cfg.db).unwrap();
            db.with_transaction(|tx| {
                tx.create_todo("first")?;
                tx.create_todo("second")?;
                Ok(())
            })
            .unwrap();
        }

        let factory = ServerFactory::new(cfg).unwrap();
        let count = factory
            .db
            .with_transaction(|tx| tx.count_todos())
            .unwrap();
        assert_eq!(count, 2);
    }
}
