//! Error taxonomy / 错误分类
//!
//! Provisioning and open failures are fatal for any data access; query
//! failures are recoverable and end up in the owning search session.

use std::path::PathBuf;

use serde::Serialize;

/// Error class reported to collaborators / 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Destination or snapshot unusable / 无法准备数据副本
    Provision,
    /// Destination exists but cannot be opened / 数据库无法打开
    StoreOpen,
    /// A read failed on an opened store / 查询失败
    Query,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cannot prepare database destination {path:?}: {source}")]
    Provision {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot {source_name} is unavailable: {reason}")]
    SnapshotUnavailable { source_name: String, reason: String },

    #[error("cannot open database {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },

    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Provision { .. } | StoreError::SnapshotUnavailable { .. } => {
                ErrorKind::Provision
            }
            StoreError::Open { .. } => ErrorKind::StoreOpen,
            StoreError::Query(_) => ErrorKind::Query,
        }
    }

    /// Fatal errors block every data access until provisioning succeeds / 是否为致命错误
    pub fn is_fatal(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Query)
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
