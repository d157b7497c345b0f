//! Application configuration module / 应用配置模块
//!
//! Manages application configuration loaded from config.json
//! Creates default config file on first run / 首次运行时创建默认配置文件

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Global configuration instance / 全局配置实例
static CONFIG: OnceCell<Arc<RwLock<AppConfig>>> = OnceCell::new();

/// Application configuration / 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration / 服务器配置
    pub server: ServerConfig,
    /// Database configuration / 数据库配置
    pub database: DatabaseConfig,
    /// Snapshot source configuration / 数据快照配置
    pub snapshot: SnapshotConfig,
    /// Search configuration / 搜索配置
    pub search: SearchConfig,
    /// Corpus configuration / 语料配置
    pub corpus: CorpusConfig,
}

/// Server configuration / 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address / 服务器监听地址
    pub host: String,
    /// Server port / 服务器端口
    pub port: u16,
}

/// Database configuration / 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Data directory path / 数据目录路径
    pub data_dir: String,
    /// Directory holding the writable copy (relative to data_dir) / 可写副本目录
    pub db_dir: String,
    /// Database file name / 数据库文件名
    pub db_file: String,
    /// Pool size / 连接池大小
    pub max_connections: u32,
    /// SQLite busy timeout in milliseconds / 忙等待超时（毫秒）
    pub busy_timeout_ms: u64,
}

/// Snapshot configuration / 数据快照配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// External snapshot file, None means the bundled asset / 外部快照文件，为空则使用内置资源
    pub path: Option<String>,
}

/// Search configuration / 搜索配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Rows per page / 每页条数
    pub page_size: usize,
    /// Minimum query length in characters / 最小查询长度
    pub min_query_len: usize,
    /// Quiet interval before a query is applied / 防抖间隔（毫秒）
    pub debounce_ms: u64,
    /// Re-entrancy guard after a page load / 加载更多冷却（毫秒）
    pub load_more_cooldown_ms: u64,
}

/// Corpus configuration / 语料配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Book count reported when the corpus is empty / 空语料时返回的书卷数
    pub fallback_book_count: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8190,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            db_dir: "SQLite".to_string(),
            db_file: "holybible.db".to_string(),
            max_connections: 4,
            busy_timeout_ms: 5000,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            min_query_len: 2,
            debounce_ms: 300,
            load_more_cooldown_ms: 150,
        }
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            fallback_book_count: 66,
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn load_more_cooldown(&self) -> Duration {
        Duration::from_millis(self.load_more_cooldown_ms)
    }
}

impl AppConfig {
    /// Get the full data directory path / 获取完整的数据目录路径
    pub fn get_data_dir(&self) -> PathBuf {
        PathBuf::from(&self.database.data_dir)
    }

    /// Get the directory holding the writable copy / 获取可写副本目录
    pub fn get_db_dir(&self) -> PathBuf {
        let data_dir = self.get_data_dir();
        if self.database.db_dir.is_empty() {
            data_dir
        } else {
            data_dir.join(&self.database.db_dir)
        }
    }

    /// Get the writable database path, `DATABASE_PATH` wins / 获取数据库路径
    pub fn get_db_path(&self) -> PathBuf {
        match std::env::var("DATABASE_PATH") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => self.get_db_dir().join(&self.database.db_file),
        }
    }

    /// Get the external snapshot path, if any / 获取外部快照路径
    pub fn get_snapshot_path(&self) -> Option<PathBuf> {
        self.snapshot
            .path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(|p| Path::new(p).to_path_buf())
    }

    /// Get the server bind address / 获取服务器绑定地址
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Get the config file path / 获取配置文件路径
fn get_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.json")
}

/// Load configuration from file, or create default if not exists / 加载配置文件，不存在则创建默认配置
pub fn load_config() -> Result<AppConfig, String> {
    load_config_from(&get_config_path())
}

/// Load configuration from an explicit path / 从指定路径加载配置
pub fn load_config_from(config_path: &Path) -> Result<AppConfig, String> {
    if config_path.exists() {
        let content = std::fs::read_to_string(config_path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        tracing::info!("Loaded configuration from {:?}", config_path);
        Ok(config)
    } else {
        let config = AppConfig::default();
        save_config_to(&config, config_path)?;
        tracing::info!("Created default configuration at {:?}", config_path);
        Ok(config)
    }
}

/// Save configuration to file / 保存配置到文件
pub fn save_config_to(config: &AppConfig, config_path: &Path) -> Result<(), String> {
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;

    std::fs::write(config_path, content)
        .map_err(|e| format!("Failed to write config file: {}", e))?;

    Ok(())
}

/// Initialize global configuration / 初始化全局配置
pub fn init_config() -> Result<Arc<RwLock<AppConfig>>, String> {
    let config = load_config()?;

    let config_arc = Arc::new(RwLock::new(config));

    CONFIG
        .set(config_arc.clone())
        .map_err(|_| "Config already initialized".to_string())?;

    Ok(config_arc)
}

/// Get global configuration instance / 获取全局配置实例
pub fn get_config() -> Arc<RwLock<AppConfig>> {
    CONFIG
        .get_or_init(|| {
            let config = load_config().unwrap_or_default();
            Arc::new(RwLock::new(config))
        })
        .clone()
}

/// Get a read-only snapshot of current config / 获取当前配置的只读快照
pub fn config() -> AppConfig {
    get_config().read().clone()
}
