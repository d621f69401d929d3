use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Recreo";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default remote backend when `RECREO_BACKEND_URL` is unset.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8787";

/// Default listen address when `RECREO_BIND` is unset.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:4815";

/// Seconds to wait on a structured-generation call.
pub const GENERATION_TIMEOUT_SECS: u64 = 120;

/// Get the application data directory
/// ~/Recreo/ on all platforms (user-visible)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Recreo")
}

/// Path of the local fallback database.
pub fn fallback_db_path() -> PathBuf {
    app_data_dir().join("fallback.db")
}

/// Remote backend base URL, overridable via `RECREO_BACKEND_URL`.
pub fn backend_url() -> String {
    std::env::var("RECREO_BACKEND_URL").unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string())
}

/// Listen address, overridable via `RECREO_BIND`.
pub fn bind_addr() -> String {
    std::env::var("RECREO_BIND").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
}

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> String {
    format!("{}=info", env!("CARGO_PKG_NAME"))
}
