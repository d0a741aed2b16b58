//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::{info, warn};

/// Ensure the data directory exists and is a directory.
pub async fn ensure_data_dir(data_dir: &Path) -> anyhow::Result<()> {
    match tokio::fs::metadata(data_dir).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(anyhow::anyhow!("{} exists but is not a directory", data_dir.display())),
        Err(_) => {
            warn!(data_dir = %data_dir.display(), "data directory missing; creating it");
            tokio::fs::create_dir_all(data_dir)
                .await
                .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", data_dir.display()))?;
            info!(data_dir = %data_dir.display(), "data directory created");
            Ok(())
        }
    }
}
