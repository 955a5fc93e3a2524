//! Tracing and logging setup shared by SSO bridge binaries and tests.

/// Initialize process-wide tracing with an `info` fallback filter.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init("info");
}

/// Like [`init`], but with a caller-chosen fallback filter (e.g. from config).
pub fn init_with_default(default_filter: &str) {
    tracing::init(default_filter);
}

/// Tracing configuration (filters, layers).
pub mod tracing;
