//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` so binaries can prepare the store
//! location without depending directly on `common`.

use std::path::Path;

/// Ensure the directory that will hold the store file exists.
pub async fn ensure_env(store_path: &Path) -> anyhow::Result<()> {
    common::env::ensure_env(store_path).await
}
