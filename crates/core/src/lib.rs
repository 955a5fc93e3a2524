//! `ssobridge-core` — identity building blocks shared by the SSO crates.
//!
//! Nothing in here touches storage, sessions or the network.

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::LocalId;
pub use value_object::ValueObject;
