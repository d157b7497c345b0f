//! Store provisioner / 数据库准备器
//!
//! First caller performs copy-then-open, concurrent callers await the same
//! initialization. A failed attempt leaves the provisioner empty so the next
//! call retries from scratch.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;

use super::snapshot::{EmbeddedSnapshot, FileSnapshot, SnapshotSource};
use super::{OpenOptions, Store};
use crate::config::AppConfig;
use crate::error::{Result, StoreError};

pub struct StoreProvisioner {
    destination: PathBuf,
    snapshot: Arc<dyn SnapshotSource>,
    options: OpenOptions,
    handle: OnceCell<Store>,
}

impl StoreProvisioner {
    pub fn new(destination: impl Into<PathBuf>, snapshot: Arc<dyn SnapshotSource>) -> Self {
        Self {
            destination: destination.into(),
            snapshot,
            options: OpenOptions::default(),
            handle: OnceCell::new(),
        }
    }

    /// Build from configuration: external snapshot file if set, bundled asset otherwise / 从配置创建
    pub fn from_config(config: &AppConfig) -> Self {
        let snapshot: Arc<dyn SnapshotSource> = match config.get_snapshot_path() {
            Some(path) => Arc::new(FileSnapshot::new(path)),
            None => Arc::new(EmbeddedSnapshot::new(config.database.db_file.clone())),
        };
        Self::new(config.get_db_path(), snapshot).with_options(OpenOptions {
            max_connections: config.database.max_connections.max(1),
            busy_timeout: Duration::from_millis(config.database.busy_timeout_ms),
        })
    }

    pub fn with_options(mut self, options: OpenOptions) -> Self {
        self.options = options;
        self
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Whether a handle has been opened / 是否已就绪
    pub fn is_ready(&self) -> bool {
        self.handle.initialized()
    }

    /// The opened handle, if any, without provisioning / 已打开的句柄
    pub fn handle(&self) -> Option<&Store> {
        self.handle.get()
    }

    /// Get the shared handle, provisioning it on first use / 获取共享句柄
    pub async fn acquire(&self) -> Result<Store> {
        self.handle
            .get_or_try_init(|| self.provision())
            .await
            .cloned()
    }

    async fn provision(&self) -> Result<Store> {
        let dir = self
            .destination
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| StoreError::Provision {
                path: dir.clone(),
                source,
            })?;

        let exists = tokio::fs::try_exists(&self.destination)
            .await
            .map_err(|source| StoreError::Provision {
                path: self.destination.clone(),
                source,
            })?;

        if exists {
            tracing::debug!("Corpus database already present: {:?}", self.destination);
        } else {
            self.materialize(&dir).await?;
        }

        Store::open(&self.destination, self.options).await
    }

    /// Copy the snapshot verbatim: temp file in the same directory, then rename / 复制快照
    async fn materialize(&self, dir: &Path) -> Result<()> {
        let bytes = self.snapshot.load().await?;
        let dir = dir.to_path_buf();
        let destination = self.destination.clone();
        let len = bytes.len();

        let copied = tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            tmp.write_all(&bytes)?;
            tmp.as_file().sync_all()?;
            match tmp.persist_noclobber(&destination) {
                Ok(_) => Ok(()),
                // Another process finished the same copy first
                Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
                Err(e) => Err(e.error),
            }
        })
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
        .and_then(|r| r);

        copied.map_err(|source| StoreError::Provision {
            path: self.destination.clone(),
            source,
        })?;

        tracing::info!(
            "Corpus snapshot {} materialized to {:?} ({} bytes)",
            self.snapshot.name(),
            self.destination,
            len
        );
        Ok(())
    }
}
