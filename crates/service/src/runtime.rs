//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` so binary crates can import
//! `service::runtime::ensure_data_dir` without depending directly on `common`.

/// Ensure the data directory exists before the stores touch it.
pub async fn ensure_data_dir(data_dir: &str) -> anyhow::Result<()> {
    common::env::ensure_data_dir(data_dir).await
}
