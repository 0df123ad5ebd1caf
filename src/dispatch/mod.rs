//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! RequestArgs { handler, action, params }
//!     → registry.rs (name → factory + action table, built at startup)
//!     → dispatcher.rs (fresh instance, invoke, gate, render)
//!     → Response | typed error
//!
//! On a redirectable error:
//!     → Site.ErrorRedirects.<class> target
//!     → one re-dispatch; a second failure propagates
//! ```
//!
//! # Design Decisions
//! - Handlers and actions are registered explicitly at startup; existence
//!   and invokability are lookups, not reflection
//! - Actions return an explicit outcome; there is no sentinel value whose
//!   falsiness means failure
//! - A fresh handler instance is constructed per request, so no state
//!   leaks between requests
//! - Actions reach POST fields only through the context, which verifies
//!   the submitted form token on the first read of each request

pub mod dispatcher;
pub mod registry;

pub use dispatcher::Dispatcher;
pub use registry::{ActionContext, ActionOutcome, HandlerRegistry, FORM_TOKEN_FIELD};
