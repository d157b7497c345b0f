//! Corpus store / 语料数据库
//!
//! - The bundled snapshot is copied once into a writable location
//! - The copy is opened as one shared, read-only-in-practice SQLite pool
//! - Every caller converges on the same handle / 所有调用方共享同一句柄

pub mod provisioner;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod testing;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::error::{Result, StoreError};

pub use provisioner::StoreProvisioner;
pub use snapshot::{EmbeddedSnapshot, FileSnapshot, SnapshotSource};

/// Corpus table name / 语料表名
pub const CORPUS_TABLE: &str = "bible";

/// Process-wide provisioner / 全局数据库准备器
static PROVISIONER: OnceCell<StoreProvisioner> = OnceCell::new();

/// Pool settings used when opening the copy / 连接池设置
#[derive(Debug, Clone, Copy)]
pub struct OpenOptions {
    pub max_connections: u32,
    pub busy_timeout: Duration,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            max_connections: 4,
            busy_timeout: Duration::from_millis(5000),
        }
    }
}

/// Open store handle, cheap to clone / 数据库句柄
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    pool: SqlitePool,
    path: PathBuf,
}

impl Store {
    /// Open an existing database file and verify it holds the corpus / 打开并校验数据库
    pub(crate) async fn open(path: &Path, options: OpenOptions) -> Result<Self> {
        let connect = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(false)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(options.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(options.max_connections)
            .connect_with(connect)
            .await
            .map_err(|source| StoreError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        // A partial copy or a foreign file fails here, not on the first user query
        if let Err(source) = sqlx::query(&format!("SELECT 1 FROM {} LIMIT 1", CORPUS_TABLE))
            .fetch_optional(&pool)
            .await
        {
            pool.close().await;
            return Err(StoreError::Open {
                path: path.to_path_buf(),
                source,
            });
        }

        tracing::info!("Corpus database opened: {:?} (WAL mode)", path);

        Ok(Self {
            inner: Arc::new(StoreInner {
                pool,
                path: path.to_path_buf(),
            }),
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Whether both handles point at the same open pool / 是否为同一句柄
    pub fn same_store(&self, other: &Store) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// 关闭数据库连接池 / Close database connection pool
    pub async fn close(&self) {
        self.inner.pool.close().await;
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").field("path", &self.inner.path).finish()
    }
}

/// Install the process-wide provisioner / 安装全局准备器
pub fn init_provisioner(provisioner: StoreProvisioner) -> std::result::Result<&'static StoreProvisioner, String> {
    PROVISIONER
        .set(provisioner)
        .map_err(|_| "Store provisioner already initialized".to_string())?;
    Ok(provisioner_instance())
}

/// Process-wide provisioner, built from the global config on first use / 获取全局准备器
pub fn provisioner_instance() -> &'static StoreProvisioner {
    PROVISIONER.get_or_init(|| StoreProvisioner::from_config(&crate::config::config()))
}

/// Acquire the shared store handle / 获取共享数据库句柄
pub async fn acquire_store() -> Result<Store> {
    provisioner_instance().acquire().await
}
