//! Infrastructure layer: account storage, session registry, configuration and
//! the serialized entry point used by SSO callback handlers.

pub mod config;
pub mod serialized_reconciler;
pub mod session;
pub mod uid_locks;
pub mod user_store;


pub use config::{ConfigError, SsoConfig};
pub use serialized_reconciler::{DispatchError, SerializedReconciler};
pub use session::{InMemorySessionManager, Session};
pub use uid_locks::{LockError, UidLocks};
pub use user_store::InMemoryUserStore;

/// Load configuration from the environment and initialize logging.
///
/// Intended for process entry points; libraries should take an [`SsoConfig`].
pub fn bootstrap() -> anyhow::Result<SsoConfig> {
    bootstrap_from(|key| std::env::var(key).ok())
}

/// [`bootstrap`] with an explicit key lookup in place of the environment.
pub fn bootstrap_from<F>(lookup: F) -> anyhow::Result<SsoConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let config = SsoConfig::from_lookup(lookup)?;
    ssobridge_observability::init_with_default(&config.log_filter);
    tracing::info!(
        session_ttl_secs = config.session_ttl_secs,
        session_recheck_secs = config.session_recheck_secs,
        "sso bridge configured"
    );
    Ok(config)
}
