use super::Fetch;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Local file fetcher resolving resources against a base directory
pub struct LocalFetcher {
    base_dir: PathBuf,
}

impl LocalFetcher {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, resource: &str) -> PathBuf {
        self.base_dir.join(resource)
    }
}

#[async_trait]
impl Fetch for LocalFetcher {
    async fn fetch(&self, resource: &str) -> Result<Vec<u8>> {
        let path = self.path_for(resource);
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))
    }
}

/// Write `bytes` to `path` so that `path` either holds all of them or is untouched.
///
/// The data goes to a `.{name}.part` sibling first and is renamed into place
/// once flushed; the sibling is removed again if any step fails.
pub async fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let part = part_path(path)?;
    let result = write_then_rename(&part, path, bytes).await;
    if result.is_err() {
        let _ = tokio::fs::remove_file(&part).await;
    }
    result
}

fn part_path(path: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .with_context(|| format!("{} has no file name", path.display()))?;
    let mut part = std::ffi::OsString::from(".");
    part.push(name);
    part.push(".part");
    Ok(path.with_file_name(part))
}

async fn write_then_rename(part: &Path, path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = tokio::fs::File::create(part)
        .await
        .with_context(|| format!("Failed to create {}", part.display()))?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(part, path)
        .await
        .with_context(|| format!("Failed to move archive to {}", path.display()))
}
