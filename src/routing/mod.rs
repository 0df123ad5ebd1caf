//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming URI
//!     → resolver.rs (route match, else positional decomposition)
//!     → RequestArgs { handler, action, params }
//!
//! Table Compilation (at startup):
//!     ConfigDoc "Site.Routes.Route[]"
//!     → table.rs (reject "/", freeze in document order)
//!     → RouteTable (immutable)
//! ```
//!
//! # Design Decisions
//! - Longest prefix wins among matching patterns; ties break to the
//!   earlier rule in document order
//! - No regex: plain prefix comparison keeps matching O(rules × len)
//! - Verb and call style are encoded into the action name (`Ajax`, `Post`
//!   suffixes) so the dispatcher never branches on method

pub mod resolver;
pub mod table;

pub use resolver::{RequestArgs, RequestResolver};
pub use table::{RouteRule, RouteTable};
