//! Package store — resolves a platform key to its update archive.
//!
//! The archive set is fixed: one zip per supported platform under a
//! single content root. Matching is case-insensitive; an unrecognized
//! key is a caller error, not a store fault.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Filename presented to the downloading agent, identical for every
/// platform. Existing agents expect exactly this name.
pub const DOWNLOAD_FILE_NAME: &str = "RemotelyUpdate.zip";

/// Platform keys the store recognizes.
pub const PLATFORMS: [&str; 4] = ["win-x64", "win-x86", "linux", "macos-x64"];

#[derive(Clone)]
pub struct PackageStore {
    root: PathBuf,
}

impl PackageStore {
    /// A store rooted at the given content directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a platform key (case-insensitive) to its archive path.
    /// Returns `None` for unrecognized platforms.
    pub fn resolve(&self, platform: &str) -> Option<PathBuf> {
        let file = match platform.to_ascii_lowercase().as_str() {
            "win-x64" => "agent-win-x64.zip",
            "win-x86" => "agent-win-x86.zip",
            "linux" => "agent-linux.zip",
            "macos-x64" => "agent-macos-x64.zip",
            _ => return None,
        };
        Some(self.root.join(file))
    }

    /// Open the archive for `platform`. `Ok(None)` means the platform
    /// key itself is unknown; a recognized key whose archive cannot be
    /// opened is an error.
    pub async fn open(&self, platform: &str) -> Result<Option<tokio::fs::File>> {
        let Some(path) = self.resolve(platform) else {
            return Ok(None);
        };
        let file = tokio::fs::File::open(&path)
            .await
            .with_context(|| format!("failed to open update archive: {}", path.display()))?;
        Ok(Some(file))
    }
}
