use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "TriageCore";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Hard ceiling on how long intake waits for a model verdict before the
/// fallback diagnosis is used.
pub const PREDICTION_TIMEOUT: Duration = Duration::from_secs(3);

/// Get the application data directory
/// ~/TriageCore/ on all platforms (user-visible by design)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("TriageCore")
}

/// Default on-disk database location.
pub fn default_db_path() -> PathBuf {
    app_data_dir().join("triage.db")
}

/// Log filter applied when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    format!("{}=info", env!("CARGO_PKG_NAME").replace('-', "_"))
}
