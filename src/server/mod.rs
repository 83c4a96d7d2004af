mod context;
mod error;
mod gate;
mod response;

pub mod authn;
pub mod authz;
pub mod config;
pub mod db;
pub mod factory;
pub mod handlers;
pub mod restful;

pub use context::AuthzContext;
