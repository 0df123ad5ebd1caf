//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → restrictions.rs (URI prefix vs IP allow-list, before routing)
//!     → normal dispatch
//!     → access.rs (required level vs session level, before rendering)
//! ```
//!
//! # Design Decisions
//! - Fail closed: an address outside a matching restriction's allow-list
//!   never reaches the resolved handler
//! - The gate reads the session level fresh on every check, no caching

pub mod access;
pub mod restrictions;

pub use access::AccessGate;
pub use restrictions::IpRestrictions;
