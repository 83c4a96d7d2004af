pub mod healthz;
pub mod oidc;
pub mod todos;
pub mod token;
