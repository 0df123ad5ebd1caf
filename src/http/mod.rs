//! HTTP surface.
//!
//! # Responsibilities
//! - Model the inbound request the core consumes (method, path, AJAX
//!   flag, remote address, filtered POST fields, session token)
//! - Model the outbound response (status, body kind, session cookie)
//! - Adapt axum to the synchronous dispatch core (server.rs)

pub mod request;
pub mod response;
pub mod server;

pub use request::{FieldFilter, Request};
pub use response::{Response, ResponseKind, SessionCookie};
pub use server::HttpServer;
