//! `ssobridge-auth` — reconciles identity provider assertions with local accounts.
//!
//! The crate is decoupled from HTTP, SAML parsing and storage. Persistence and
//! session issuing are reached through the [`UserStore`] and [`SessionManager`]
//! traits.

pub mod account;
pub mod assertion;
pub mod naming;
pub mod reconcile;
pub mod roles;
pub mod session;
pub mod store;

pub use account::{AccountStatus, AccountUpdate, LocalAccount, NewAccount};
pub use assertion::{GroupRole, SsoAssertion};
pub use naming::{sanitize, unique_display_name};
pub use reconcile::{IdentityReconciler, ReconcileError, ReconcileOutcome, Reconciliation};
pub use roles::{LocalRole, derive_role};
pub use session::{SessionError, SessionManager, SessionToken};
pub use store::{StoreError, UserStore, normalize_email};
