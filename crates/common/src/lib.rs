//! Shared building blocks for the unlock relay: logging setup, runtime
//! directory checks, the health payload and the metrics admin server.

pub mod types;
pub mod utils;
pub mod env;
pub mod admin_http;
