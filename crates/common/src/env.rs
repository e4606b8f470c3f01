//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::warn;

/// Ensure the data directory exists; warn when the static asset directory is missing.
pub async fn ensure_env(public_dir: impl AsRef<Path>, data_dir: impl AsRef<Path>) -> anyhow::Result<()> {
    let public_dir = public_dir.as_ref();
    let data_dir = data_dir.as_ref();
    if tokio::fs::metadata(public_dir).await.is_err() {
        warn!(public_dir = %public_dir.display(), "public assets directory not found; static assets may 404");
    }
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", data_dir.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ensure_env_creates_nested_data_dir() -> anyhow::Result<()> {
        let root = std::env::temp_dir().join(format!("unlock_env_{}", std::process::id()));
        let data = root.join("nested").join("data");
        ensure_env(root.join("missing-public"), &data).await?;
        assert!(tokio::fs::metadata(&data).await?.is_dir());
        // second call is a no-op
        ensure_env(root.join("missing-public"), &data).await?;
        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }
}
