pub mod healthz;
pub mod response;
pub mod todo;
pub mod token;
