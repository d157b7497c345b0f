//! Snapshot sources / 数据快照来源

use std::borrow::Cow;
use std::path::PathBuf;

use async_trait::async_trait;
use rust_embed::RustEmbed;

use crate::error::{Result, StoreError};

/// Snapshot files embedded at compile time (from ./assets) / 编译期嵌入的快照文件
#[derive(RustEmbed)]
#[folder = "assets/"]
#[include = "*.db"]
struct BundledAssets;

/// Bytes of the read-only corpus snapshot / 只读语料快照
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Human readable origin, used in logs and errors / 来源描述
    fn name(&self) -> String;

    /// Load the complete snapshot / 读取完整快照
    async fn load(&self) -> Result<Cow<'static, [u8]>>;
}

/// Snapshot bundled into the binary / 内置快照
pub struct EmbeddedSnapshot {
    file: String,
}

impl EmbeddedSnapshot {
    pub fn new(file: impl Into<String>) -> Self {
        Self { file: file.into() }
    }
}

#[async_trait]
impl SnapshotSource for EmbeddedSnapshot {
    fn name(&self) -> String {
        format!("bundled:{}", self.file)
    }

    async fn load(&self) -> Result<Cow<'static, [u8]>> {
        BundledAssets::get(&self.file)
            .map(|asset| asset.data)
            .ok_or_else(|| StoreError::SnapshotUnavailable {
                source_name: self.name(),
                reason: "asset not bundled".to_string(),
            })
    }
}

/// Snapshot read from a file on disk / 文件快照
pub struct FileSnapshot {
    path: PathBuf,
}

impl FileSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnapshotSource for FileSnapshot {
    fn name(&self) -> String {
        format!("file:{}", self.path.display())
    }

    async fn load(&self) -> Result<Cow<'static, [u8]>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| StoreError::SnapshotUnavailable {
                source_name: self.name(),
                reason: e.to_string(),
            })?;
        Ok(Cow::Owned(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[tokio::test]
    async fn test_file_snapshot_reads_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.db");
        std::fs::write(&path, b"opaque bytes").unwrap();

        let snapshot = FileSnapshot::new(&path);
        assert_eq!(snapshot.load().await.unwrap().as_ref(), b"opaque bytes");
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_provision_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileSnapshot::new(dir.path().join("absent.db"))
            .load()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Provision);

        let err = EmbeddedSnapshot::new("no-such-asset.db").load().await.unwrap_err();
        assert!(matches!(err, StoreError::SnapshotUnavailable { .. }));
    }
}
