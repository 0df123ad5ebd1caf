//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//! ```
//!
//! # Design Decisions
//! - Log level configurable via RUST_LOG, with a crate-local default
//! - Request handling emits span-structured events through tower-http

pub mod logging;

pub use logging::init_logging;
