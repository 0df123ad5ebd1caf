//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! config file (XML)
//!     → loader.rs (read from disk)
//!     → document.rs (parse into an owned node tree)
//!     → ConfigDoc (immutable, shared via Arc to all subsystems)
//!
//! Lookup:
//!     ConfigDoc::resolve("Site.Routes.Route")
//!     → cursor.rs (environment-scoped traversal)
//!     → ConfigCursor (borrowed view over the selected sibling set)
//! ```
//!
//! # Design Decisions
//! - The document is loaded once at startup and never mutated; concurrent
//!   reads need no synchronization
//! - Absent paths resolve to an empty cursor whose string value is `""`;
//!   callers treat empty string as "not configured", never as an error
//! - Load or parse failure is fatal: no other subsystem can start

pub mod cursor;
pub mod document;
pub mod loader;

pub use cursor::ConfigCursor;
pub use document::{ConfigDoc, ConfigNode, ConnectionSettings, Environment};
pub use loader::load_document;
