//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` to keep binary crates importing
//! `service::runtime::ensure_env` without depending directly on `common`.

use std::path::Path;

/// Ensure the data directory exists; warn on a missing public directory.
pub async fn ensure_env(public_dir: impl AsRef<Path>, data_dir: impl AsRef<Path>) -> anyhow::Result<()> {
    common::env::ensure_env(public_dir, data_dir).await
}
