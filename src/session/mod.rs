//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! Request cookie (opaque token)
//!     → store.rs SessionStore::open (resume or create, rotation policy)
//!     → Session handle (per-request, exclusive lock on the record)
//!     → read/write (validity check on every touch)
//!     → cookie issued back with the possibly rotated token
//! ```
//!
//! # Design Decisions
//! - Records are keyed per token in a concurrent map; requests for
//!   different tokens never contend, one token serializes on its record
//! - The record lock is taken per operation, not per request: each read
//!   or write is atomic, but two requests racing on one token may
//!   interleave between operations
//! - Validity (address binding, TTL) is re-checked on every read and
//!   write, not cached per request
//! - Token rotation fires after a randomized number of session starts so
//!   fixation attacks cannot time the window

pub mod store;

pub use store::{Session, SessionConfig, SessionStore};
