//! Armature web framework core.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────┐
//!                       │                  ARMATURE                    │
//!                       │                                              │
//!   Client Request      │  ┌────────┐   ┌──────────┐   ┌───────────┐  │
//!   ────────────────────┼─▶│  http  │──▶│ routing  │──▶│ dispatch  │  │
//!                       │  │ server │   │ resolver │   │ registry  │  │
//!                       │  └────────┘   └──────────┘   └─────┬─────┘  │
//!                       │                                    │        │
//!                       │                                    ▼        │
//!   Client Response     │  ┌────────┐   ┌──────────┐   ┌───────────┐  │
//!   ◀───────────────────┼──│response│◀──│   view   │◀──│  action   │  │
//!                       │  │ cookie │   │ renderer │   │ callback  │  │
//!                       │  └────────┘   └──────────┘   └───────────┘  │
//!                       │                                              │
//!                       │  ┌────────────────────────────────────────┐ │
//!                       │  │          Cross-Cutting Concerns         │ │
//!                       │  │  ┌────────┐ ┌─────────┐ ┌────────────┐ │ │
//!                       │  │  │ config │ │ session │ │  security  │ │ │
//!                       │  │  └────────┘ └─────────┘ └────────────┘ │ │
//!                       │  └────────────────────────────────────────┘ │
//!                       └──────────────────────────────────────────────┘
//! ```
//!
//! Handlers and their actions are registered explicitly in a
//! [`dispatch::HandlerRegistry`]; the [`dispatch::Dispatcher`] resolves
//! each incoming URI against configured routes and prefixes, opens the
//! caller's session, enforces access levels and IP restrictions, and
//! runs exactly one action per request.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod observability;
pub mod routing;
pub mod security;
pub mod session;
pub mod view;

pub use config::{ConfigDoc, Environment};
pub use dispatch::{ActionContext, ActionOutcome, Dispatcher, HandlerRegistry};
pub use error::{FrameworkError, FrameworkResult};
pub use http::{HttpServer, Request, Response};
pub use session::SessionConfig;
pub use view::{JsonRenderer, ViewRenderer};
