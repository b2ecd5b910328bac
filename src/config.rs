use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "SymptomTracker";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// File name of the local store inside the data directory.
pub const DATABASE_FILE: &str = "symptoms.db";

/// Get the application data directory.
/// Platform local data dir (e.g. ~/.local/share/SymptomTracker), or the
/// working directory when the platform reports none.
pub fn app_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Get the path of the local SQLite store
pub fn database_path() -> PathBuf {
    app_data_dir().join(DATABASE_FILE)
}

/// Filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,symptom_tracker_lib=debug"
}
