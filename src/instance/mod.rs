use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

pub const DEFAULT_CLOUD_INIT_DIR: &str = "/var/lib/cloud/instances";

/// Source of an opaque identifier for the host this process runs on.
#[async_trait]
pub trait InstanceMetadataProvider: Send + Sync {
    /// `None` when the host does not expose an identifier.
    async fn instance_id(&self) -> Option<String>;
}

/// Reads the instance id from the cloud-init instances directory, where each
/// instance the host has booted as leaves a subdirectory named by its id.
#[derive(Debug, Clone)]
pub struct CloudInitProvider {
    root: PathBuf,
}

impl CloudInitProvider {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl Default for CloudInitProvider {
    fn default() -> Self {
        Self::new(DEFAULT_CLOUD_INIT_DIR)
    }
}

#[async_trait]
impl InstanceMetadataProvider for CloudInitProvider {
    async fn instance_id(&self) -> Option<String> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(err) => {
                debug!(path = %self.root.display(), %err, "instance directory unavailable");
                return None;
            }
        };

        let mut names = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        names.into_iter().next()
    }
}

/// Fixed answer, for hosts configured out of band and for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticInstance(pub Option<String>);

#[async_trait]
impl InstanceMetadataProvider for StaticInstance {
    async fn instance_id(&self) -> Option<String> {
        self.0.clone()
    }
}
