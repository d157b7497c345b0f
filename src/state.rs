use std::sync::Arc;

use bible_reader::config::AppConfig;
use bible_reader::{Library, StoreError, StoreProvisioner};
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;

pub struct AppState {
    pub config: AppConfig,
    pub provisioner: &'static StoreProvisioner,
    pub started_at: DateTime<Utc>,
    library: OnceCell<Arc<Library>>,
}

impl AppState {
    pub fn new(config: AppConfig, provisioner: &'static StoreProvisioner) -> Self {
        Self {
            config,
            provisioner,
            started_at: Utc::now(),
            library: OnceCell::new(),
        }
    }

    /// 获取阅读器（懒加载）
    ///
    /// A failed provisioning attempt leaves both cells empty, the next request retries.
    pub async fn library(&self) -> Result<Arc<Library>, StoreError> {
        self.library
            .get_or_try_init(|| async move {
                let store = self.provisioner.acquire().await?;
                Ok::<_, StoreError>(Arc::new(Library::from_store(store, &self.config)))
            })
            .await
            .cloned()
    }

    pub fn is_ready(&self) -> bool {
        self.provisioner.is_ready()
    }
}
