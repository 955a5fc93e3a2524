//! Session registry.
//!
//! Sessions live in an explicit registry owned by the caller instead of
//! ambient per-request globals.

pub mod in_memory;

pub use in_memory::{InMemorySessionManager, Session};
