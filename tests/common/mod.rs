//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use std::path::PathBuf;
use tempfile::TempDir;

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times; subsequent calls are no-ops.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// The mixed document used throughout the integration tests.
#[allow(dead_code)]
pub const MIXED_DOCUMENT: &str = "==alpha== and %%beta note%%\n\
<mark>gamma</mark> then <!-- delta -->\n\
[^1]: epsilon";

/// Write `content` to `notes.md` inside `temp_dir` and return its path.
#[allow(dead_code)]
pub fn create_test_document(temp_dir: &TempDir, content: &str) -> PathBuf {
    let path = temp_dir.path().join("notes.md");
    std::fs::write(&path, content).unwrap();
    path
}

/// Path for a settings file inside `temp_dir` (not created).
#[allow(dead_code)]
pub fn settings_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("marginalia.toml")
}
